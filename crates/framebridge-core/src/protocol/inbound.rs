//! Shape classification for channel traffic.
//!
//! Both sides share one transport with unrelated messages (devtools, other
//! scripts, analytics beacons), so this module only *recognises* envelopes.
//! It never reports an error for traffic it does not understand.

use serde_json::Value;

use super::envelope::{CallEnvelope, ResponseEnvelope, JSONRPC_VERSION};
use super::inject::{InjectRequest, INJECT_PROVIDER};

/// Classified inbound payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Carries a `method`: a request for the host.
    Call(CallEnvelope),
    /// Carries `jsonrpc == "2.0"` and an `id` but no `method`: an answer for the stub.
    Response(ResponseEnvelope),
    /// `{ type: "INJECT_PROVIDER", script }`.
    Inject(InjectRequest),
    /// Anything else, including envelopes that fail to parse.
    Unrelated,
}

impl Inbound {
    pub fn kind(&self) -> &'static str {
        match self {
            Inbound::Call(_) => "call",
            Inbound::Response(_) => "response",
            Inbound::Inject(_) => "inject",
            Inbound::Unrelated => "unrelated",
        }
    }
}

/// Classify a received message payload.
pub fn classify(data: &Value) -> Inbound {
    let Some(obj) = data.as_object() else {
        return Inbound::Unrelated;
    };

    if obj.get("method").is_some_and(Value::is_string) {
        return match serde_json::from_value::<CallEnvelope>(data.clone()) {
            Ok(call) => Inbound::Call(call),
            Err(e) => {
                tracing::trace!(error = %e, "method-bearing message is not a call envelope");
                Inbound::Unrelated
            }
        };
    }

    if obj.get("type").and_then(Value::as_str) == Some(INJECT_PROVIDER) {
        return serde_json::from_value::<InjectRequest>(data.clone())
            .map(Inbound::Inject)
            .unwrap_or(Inbound::Unrelated);
    }

    let versioned = obj.get("jsonrpc").and_then(Value::as_str) == Some(JSONRPC_VERSION);
    if versioned && obj.contains_key("id") && !obj.contains_key("method") {
        return serde_json::from_value::<ResponseEnvelope>(data.clone())
            .map(Inbound::Response)
            .unwrap_or(Inbound::Unrelated);
    }

    Inbound::Unrelated
}
