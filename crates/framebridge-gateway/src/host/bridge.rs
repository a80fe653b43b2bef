//! Bridge host (parent side).
//!
//! Pipeline per received message:
//! 1. source check: sender must be the attached frame's content window;
//! 2. shape check: payload must be a call envelope;
//! 3. dispatch through the method table (one task per call, unordered);
//! 4. answer with a response envelope scoped to the sender's origin.
//!
//! Steps 1-2 drop silently. Untrusted payloads are never logged.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use framebridge_core::error::{BridgeError, Result};
use framebridge_core::protocol::{classify, CallEnvelope, Inbound, InjectRequest, ResponseEnvelope};

use super::frame::{EmbeddedFrame, HostState};
use crate::discovery::ProviderInfo;
use crate::dispatch::MethodTable;
use crate::obs::BridgeMetrics;
use crate::stub;
use crate::transport::{MessageEvent, MessagePort, Origin, TargetOrigin, WindowId};
use crate::wallet::WalletConnector;

/// Built-in provider stub template for the cross-origin injection fallback.
/// Render it with `stub::render_script` before sending.
pub const DEFAULT_INJECT_SCRIPT: &str = include_str!("../../assets/provider_stub.js");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No frame attached.
    Detached,
    /// Sender is not the attached frame's content window.
    UntrustedSource,
    /// Not a call envelope.
    NotACall,
}

impl IgnoreReason {
    pub fn as_str(self) -> &'static str {
        match self {
            IgnoreReason::Detached => "detached",
            IgnoreReason::UntrustedSource => "untrusted_source",
            IgnoreReason::NotACall => "not_a_call",
        }
    }
}

/// What the host did with one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Ignored(IgnoreReason),
    /// A call task was started for this id.
    Dispatched { id: u64 },
}

/// How the stub reached the frame on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionPath {
    SameOrigin,
    Message,
}

struct Attached {
    frame: Arc<dyn EmbeddedFrame>,
    port: Arc<dyn MessagePort>,
    window: WindowId,
}

pub struct BridgeHost {
    attached: RwLock<Option<Attached>>,
    methods: Arc<MethodTable>,
    wallet: Arc<dyn WalletConnector>,
    inject_script: Arc<str>,
    in_flight: Arc<AtomicUsize>,
    metrics: Arc<BridgeMetrics>,
}

impl BridgeHost {
    pub fn new(wallet: Arc<dyn WalletConnector>, methods: Arc<MethodTable>) -> Self {
        Self {
            attached: RwLock::new(None),
            methods,
            wallet,
            inject_script: Arc::from(stub::render_script(
                DEFAULT_INJECT_SCRIPT,
                &ProviderInfo::default(),
                stub::DEFAULT_CALL_TIMEOUT,
            )),
            in_flight: Arc::new(AtomicUsize::new(0)),
            metrics: Arc::new(BridgeMetrics::default()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<BridgeMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_inject_script(mut self, script: impl Into<Arc<str>>) -> Self {
        self.inject_script = script.into();
        self
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    /// Attach a frame (replaces any previous one).
    pub fn attach(&self, frame: Arc<dyn EmbeddedFrame>) {
        let port = frame.content_window();
        let window = port.window_id();
        if let Ok(mut g) = self.attached.write() {
            if g.is_none() {
                self.metrics.frames_active.inc(&[]);
            }
            *g = Some(Attached { frame, port, window });
        }
        tracing::info!(frame = %window, "frame attached; bridge listening");
    }

    pub fn detach(&self) {
        if let Ok(mut g) = self.attached.write() {
            if let Some(prev) = g.take() {
                self.metrics.frames_active.dec(&[]);
                tracing::info!(frame = %prev.window, "frame detached");
            }
        }
    }

    pub fn state(&self) -> HostState {
        let attached = self.attached.read().map(|g| g.is_some()).unwrap_or(false);
        if !attached {
            return HostState::Idle;
        }
        match self.in_flight.load(Ordering::Acquire) {
            0 => HostState::Listening,
            n => HostState::Executing { in_flight: n },
        }
    }

    fn current(&self) -> Option<(Arc<dyn EmbeddedFrame>, Arc<dyn MessagePort>, WindowId)> {
        let g = self.attached.read().ok()?;
        g.as_ref()
            .map(|a| (Arc::clone(&a.frame), Arc::clone(&a.port), a.window))
    }

    /// Load-completion hook: inject directly when same-origin, otherwise ask
    /// the frame to run the stub via `INJECT_PROVIDER`.
    pub fn on_frame_load(&self) -> Result<InjectionPath> {
        let (frame, port, window) = self
            .current()
            .ok_or_else(|| BridgeError::BadRequest("no frame attached".into()))?;

        match frame.inject_same_origin(&self.inject_script) {
            Ok(()) => {
                tracing::info!(frame = %window, "provider injected directly (same origin)");
                self.metrics.injections.inc(&[("path", "same_origin")]);
                Ok(InjectionPath::SameOrigin)
            }
            Err(e) => {
                tracing::debug!(frame = %window, reason = %e, "direct injection unavailable; posting INJECT_PROVIDER");
                let req = InjectRequest::new(self.inject_script.as_ref());
                let data = serde_json::to_value(&req)
                    .map_err(|e| BridgeError::Internal(format!("inject encode failed: {e}")))?;
                port.post_message(data, TargetOrigin::Any)?;
                self.metrics.injections.inc(&[("path", "message")]);
                Ok(InjectionPath::Message)
            }
        }
    }

    /// Validate one received message and start executing it if it is a call
    /// from the attached frame.
    pub fn handle_message(self: &Arc<Self>, ev: MessageEvent) -> Disposition {
        let Some((_, port, window)) = self.current() else {
            return self.ignore(IgnoreReason::Detached);
        };

        if ev.source != window {
            tracing::debug!(source = %ev.source, "message from untrusted source dropped");
            return self.ignore(IgnoreReason::UntrustedSource);
        }

        let call = match classify(&ev.data) {
            Inbound::Call(call) => call,
            _ => return self.ignore(IgnoreReason::NotACall),
        };

        let id = call.id;
        let this = Arc::clone(self);
        let guard = InFlight::enter(&self.in_flight);
        tokio::spawn(async move {
            let _guard = guard;
            this.execute(call, port, ev.origin).await;
        });

        Disposition::Dispatched { id }
    }

    fn ignore(&self, reason: IgnoreReason) -> Disposition {
        self.metrics.ignored_messages.inc(&[("reason", reason.as_str())]);
        Disposition::Ignored(reason)
    }

    async fn execute(&self, call: CallEnvelope, port: Arc<dyn MessagePort>, origin: Origin) {
        let started = Instant::now();
        let label = method_label(&call.method);
        tracing::debug!(id = call.id, method = %call.method, origin = %origin, "executing bridge call");

        let response = match self.methods.dispatch(self.wallet.as_ref(), &call).await {
            Ok(result) => {
                self.metrics.calls.inc(&[("method", label), ("outcome", "ok")]);
                ResponseEnvelope::result(call.id, result)
            }
            Err(e) => {
                let obj = e.to_rpc_error();
                tracing::debug!(id = call.id, method = %call.method, code = obj.code, "bridge call failed");
                self.metrics.calls.inc(&[("method", label), ("outcome", "error")]);
                ResponseEnvelope::error(call.id, obj)
            }
        };
        self.metrics.call_duration.observe(&[("method", label)], started.elapsed());

        let data = match serde_json::to_value(&response) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(id = call.id, error = %e, "response encode failed");
                return;
            }
        };

        if origin.is_opaque() {
            tracing::warn!(id = call.id, "caller has an opaque origin; reply cannot be delivered");
        }
        // Replies are never wildcard: only the caller's origin may read them.
        if let Err(e) = port.post_message(data, TargetOrigin::Exact(origin)) {
            tracing::warn!(id = call.id, error = %e, "posting response to frame failed");
        }
    }

    /// Drive `handle_message` from a mailbox until it closes.
    pub fn spawn_listener(self: &Arc<Self>, mut rx: mpsc::UnboundedReceiver<MessageEvent>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                this.handle_message(ev);
            }
            tracing::debug!("bridge host mailbox closed");
        })
    }
}

/// Counts a call as executing until dropped.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        InFlight(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Method names come from the frame; keep metric cardinality bounded.
fn method_label(method: &str) -> &str {
    let well_formed = method.len() <= 64
        && method.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if well_formed {
        method
    } else {
        "other"
    }
}
