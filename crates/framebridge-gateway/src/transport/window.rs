//! In-process cross-window messaging.
//!
//! Models the browser's `postMessage` contract between two isolated
//! execution contexts:
//! - every window has an id, an origin and a mailbox;
//! - a message carries the sender's window id and origin;
//! - `TargetOrigin::Exact` delivery is dropped when the target's origin differs;
//! - delivery is fire-and-forget (posting never blocks, order across
//!   windows is not guaranteed).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use framebridge_core::error::{BridgeError, Result};

static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a window (the `event.source` reference).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(u64);

impl WindowId {
    /// Allocate a process-unique id.
    pub fn next() -> Self {
        WindowId(NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// Serialized origin (`scheme://host[:port]`, or `null` for opaque origins).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin(Arc<str>);

impl Origin {
    pub fn new(s: impl AsRef<str>) -> Self {
        Origin(Arc::from(s.as_ref().trim_end_matches('/')))
    }

    /// Opaque origin (sandboxed frames, `about:blank`, `file:`).
    pub fn opaque() -> Self {
        Origin(Arc::from("null"))
    }

    /// Origin of a URL. Non-tuple origins come back opaque.
    pub fn from_url(url: &url::Url) -> Self {
        match url.origin() {
            o @ url::Origin::Tuple(..) => Origin::new(o.ascii_serialization()),
            url::Origin::Opaque(_) => Origin::opaque(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_opaque(&self) -> bool {
        &*self.0 == "null"
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Second argument of `postMessage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOrigin {
    /// `"*"`: deliver whatever the receiver's origin is.
    Any,
    /// Deliver only if the receiver's origin matches.
    Exact(Origin),
}

impl TargetOrigin {
    pub fn admits(&self, receiver: &Origin) -> bool {
        match self {
            TargetOrigin::Any => true,
            TargetOrigin::Exact(o) => o == receiver && !o.is_opaque(),
        }
    }
}

/// A delivered message as seen by the receiver.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    /// Sender window.
    pub source: WindowId,
    /// Sender origin.
    pub origin: Origin,
    pub data: Value,
}

/// Something a message can be posted to.
pub trait MessagePort: Send + Sync {
    /// Window the port delivers into.
    fn window_id(&self) -> WindowId;

    /// Post `data`. Dropped silently when `target` does not admit the receiver.
    fn post_message(&self, data: Value, target: TargetOrigin) -> Result<()>;
}

/// Cloneable reference to a window (what other contexts hold).
#[derive(Debug, Clone)]
pub struct WindowHandle {
    id: WindowId,
    origin: Origin,
    tx: mpsc::UnboundedSender<MessageEvent>,
}

impl WindowHandle {
    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Port for posting into `self` on behalf of `from`.
    pub fn port_from(&self, from: &WindowHandle) -> Port {
        Port {
            from_id: from.id,
            from_origin: from.origin.clone(),
            to: self.clone(),
        }
    }

    fn deliver(&self, ev: MessageEvent, target: &TargetOrigin) -> Result<()> {
        if !target.admits(&self.origin) {
            tracing::trace!(to = %self.id, target = ?target, "target origin mismatch; message dropped");
            return Ok(());
        }
        self.tx
            .send(ev)
            .map_err(|_| BridgeError::Transport(format!("window {} closed", self.id)))
    }
}

/// Sender-bound handle: posts into one window with a fixed source identity.
#[derive(Debug, Clone)]
pub struct Port {
    from_id: WindowId,
    from_origin: Origin,
    to: WindowHandle,
}

impl MessagePort for Port {
    fn window_id(&self) -> WindowId {
        self.to.id
    }

    fn post_message(&self, data: Value, target: TargetOrigin) -> Result<()> {
        let ev = MessageEvent {
            source: self.from_id,
            origin: self.from_origin.clone(),
            data,
        };
        self.to.deliver(ev, &target)
    }
}

/// An execution context with its own mailbox.
#[derive(Debug)]
pub struct Window {
    handle: WindowHandle,
    rx: mpsc::UnboundedReceiver<MessageEvent>,
}

impl Window {
    pub fn new(origin: Origin) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            handle: WindowHandle {
                id: WindowId::next(),
                origin,
                tx,
            },
            rx,
        }
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle.clone()
    }

    pub fn id(&self) -> WindowId {
        self.handle.id
    }

    pub fn origin(&self) -> &Origin {
        &self.handle.origin
    }

    /// Next delivered message. `None` once every handle is dropped.
    pub async fn recv(&mut self) -> Option<MessageEvent> {
        self.rx.recv().await
    }

    /// Non-blocking poll, mostly for tests.
    pub fn try_recv(&mut self) -> Option<MessageEvent> {
        self.rx.try_recv().ok()
    }

    /// Split into the handle and the raw mailbox (for listener tasks).
    pub fn into_parts(self) -> (WindowHandle, mpsc::UnboundedReceiver<MessageEvent>) {
        (self.handle, self.rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exact_target_drops_on_origin_mismatch() {
        let parent = Window::new(Origin::new("https://host.example"));
        let mut frame = Window::new(Origin::new("https://app.example"));

        let port = frame.handle().port_from(&parent.handle());
        port.post_message(json!(1), TargetOrigin::Exact(Origin::new("https://evil.example")))
            .unwrap();
        assert!(frame.try_recv().is_none());

        port.post_message(json!(2), TargetOrigin::Exact(Origin::new("https://app.example/")))
            .unwrap();
        let ev = frame.try_recv().unwrap();
        assert_eq!(ev.source, parent.id());
        assert_eq!(ev.origin, Origin::new("https://host.example"));
        assert_eq!(ev.data, json!(2));
    }

    #[test]
    fn wildcard_reaches_opaque_origin() {
        let parent = Window::new(Origin::new("https://host.example"));
        let mut frame = Window::new(Origin::opaque());
        let port = frame.handle().port_from(&parent.handle());

        port.post_message(json!("x"), TargetOrigin::Exact(Origin::opaque())).unwrap();
        assert!(frame.try_recv().is_none());

        port.post_message(json!("y"), TargetOrigin::Any).unwrap();
        assert!(frame.try_recv().is_some());
    }

    #[test]
    fn origin_from_url() {
        let u = url::Url::parse("https://app.example:8443/path?q=1").unwrap();
        assert_eq!(Origin::from_url(&u).as_str(), "https://app.example:8443");
        let blank = url::Url::parse("about:blank").unwrap();
        assert!(Origin::from_url(&blank).is_opaque());
    }
}
