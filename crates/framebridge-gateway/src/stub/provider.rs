//! Provider stub (frame side).
//!
//! Presents an EIP-1193 shaped provider to dapp code inside the embedded
//! frame without holding any wallet credentials. Every call becomes a call
//! envelope posted to the parent window; the correlator resumes the caller
//! when the matching response envelope arrives.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use framebridge_core::error::{BridgeError, Result};
use framebridge_core::protocol::envelope::deserialize_params;
use framebridge_core::protocol::{classify, CallEnvelope, Inbound, ResponseEnvelope, JSONRPC_VERSION};

use super::correlator::Correlator;
use crate::transport::{MessageEvent, MessagePort, TargetOrigin};

/// Method whose result is cached as the advisory chain id.
const CHAIN_ID_METHOD: &str = "eth_chainId";

/// Minimal provider capability shared by the stub and any provider already
/// present in a frame scope.
#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value>;

    /// `true` only for the bridge stub.
    fn is_bridge(&self) -> bool {
        false
    }
}

/// Legacy `send`/`sendAsync` payload object.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyPayload {
    pub method: String,
    #[serde(default, deserialize_with = "deserialize_params")]
    pub params: Vec<Value>,
    #[serde(default)]
    pub id: Option<Value>,
}

pub struct ProviderStub {
    parent: Arc<dyn MessagePort>,
    correlator: Correlator,
    chain_id: RwLock<Option<String>>,
}

impl std::fmt::Debug for ProviderStub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderStub")
            .field("parent", &self.parent.window_id())
            .field("pending", &self.correlator.pending_len())
            .field("chain_id", &self.chain_id())
            .finish()
    }
}

impl ProviderStub {
    pub fn new(parent: Arc<dyn MessagePort>, call_timeout: Duration) -> Self {
        Self {
            parent,
            correlator: Correlator::new(call_timeout),
            chain_id: RwLock::new(None),
        }
    }

    pub fn correlator(&self) -> &Correlator {
        &self.correlator
    }

    /// Advisory chain id from the last successful `eth_chainId` call.
    pub fn chain_id(&self) -> Option<String> {
        self.chain_id.read().ok().and_then(|g| g.clone())
    }

    pub fn is_bridge(&self) -> bool {
        true
    }

    /// Forward one request to the parent and wait for its answer.
    pub async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let pending = self.correlator.register(method);
        let id = pending.id;
        let call = CallEnvelope::new(id, method, params);

        let data = serde_json::to_value(&call)
            .map_err(|e| BridgeError::Internal(format!("call encode failed: {e}")))?;

        // Parent may be cross-origin, so the outbound path uses a wildcard target.
        if let Err(e) = self.parent.post_message(data, TargetOrigin::Any) {
            tracing::warn!(id, method, error = %e, "posting call to parent failed");
            self.correlator.fail(id, e);
        } else {
            tracing::debug!(id, method, "call posted to parent");
        }

        pending.wait().await
    }

    /// Legacy `enable()`.
    pub async fn enable(&self) -> Result<Value> {
        self.request("eth_requestAccounts", Vec::new()).await
    }

    /// Legacy `send(method, params)` (promise form).
    pub async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        self.request(method, params).await
    }

    /// Legacy `send(payload, callback)` (callback form).
    ///
    /// The callback receives a JSON-RPC response object echoing the payload id.
    pub fn send_legacy<F>(self: &Arc<Self>, payload: Value, callback: F)
    where
        F: FnOnce(Result<Value>) + Send + 'static,
    {
        let payload: LegacyPayload = match serde_json::from_value(payload) {
            Ok(p) => p,
            Err(e) => {
                callback(Err(BridgeError::BadRequest(format!("invalid legacy payload: {e}"))));
                return;
            }
        };

        let this = Arc::clone(self);
        tokio::spawn(async move {
            let echo_id = payload.id.clone().unwrap_or(Value::Null);
            let outcome = this
                .request(&payload.method, payload.params)
                .await
                .map(|result| json!({ "jsonrpc": JSONRPC_VERSION, "id": echo_id, "result": result }));
            callback(outcome);
        });
    }

    /// Legacy `sendAsync(payload, callback)`.
    pub fn send_async<F>(self: &Arc<Self>, payload: Value, callback: F)
    where
        F: FnOnce(Result<Value>) + Send + 'static,
    {
        self.send_legacy(payload, callback);
    }

    /// Accepted for compatibility. Push events are not relayed.
    pub fn on<F>(&self, event: &str, _listener: F) -> &Self
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        tracing::debug!(event, "provider listener registered (events are not relayed)");
        self
    }

    pub fn remove_listener(&self, event: &str) -> &Self {
        tracing::debug!(event, "provider listener removed");
        self
    }

    pub fn remove_all_listeners(&self, event: Option<&str>) -> &Self {
        tracing::debug!(event = event.unwrap_or("*"), "provider listeners cleared");
        self
    }

    /// Feed one received message. Returns `true` when it completed a pending call.
    pub fn handle_message(&self, ev: &MessageEvent) -> bool {
        match classify(&ev.data) {
            Inbound::Response(resp) => self.complete(resp),
            _ => false,
        }
    }

    fn complete(&self, resp: ResponseEnvelope) -> bool {
        let id = resp.id;
        let Some(call) = self.correlator.take(id) else {
            tracing::debug!(id, "response for unknown or settled call discarded");
            return false;
        };

        let outcome = resp.into_result();
        match &outcome {
            Ok(result) if call.method == CHAIN_ID_METHOD => self.cache_chain_id(result),
            Ok(_) => {}
            Err(e) => tracing::debug!(id, method = %call.method, code = e.code, "call rejected by host"),
        }

        call.complete(outcome.map_err(BridgeError::Rpc));
        true
    }

    fn cache_chain_id(&self, result: &Value) {
        let value = match result {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if let Ok(mut g) = self.chain_id.write() {
            *g = Some(value);
        }
    }

    /// Drive `handle_message` from a mailbox until it closes.
    pub fn spawn_listener(self: &Arc<Self>, mut rx: mpsc::UnboundedReceiver<MessageEvent>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                this.handle_message(&ev);
            }
            tracing::debug!("provider stub mailbox closed");
        })
    }
}

#[async_trait]
impl Eip1193Provider for ProviderStub {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        ProviderStub::request(self, method, params).await
    }

    fn is_bridge(&self) -> bool {
        true
    }
}
