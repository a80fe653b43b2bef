//! Call / Response envelopes (JSON-RPC 2.0 shaped).
//!
//! `params` and `result` are opaque: the bridge forwards them without
//! looking inside.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Literal carried in the `jsonrpc` field of every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Message used when a failure does not supply one.
pub const DEFAULT_ERROR_MESSAGE: &str = "Internal Error";

/// Protocol version tag. Only `"2.0"` exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Version {
    #[default]
    #[serde(rename = "2.0")]
    V2,
}

/// One RPC request in flight (frame -> parent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEnvelope {
    #[serde(default)]
    pub jsonrpc: Version,
    /// Correlation id, unique per stub instance.
    pub id: u64,
    /// Wallet method name (opaque to the bridge).
    pub method: String,
    #[serde(default, deserialize_with = "deserialize_params")]
    pub params: Vec<Value>,
}

/// `params` as sent by arbitrary dapp code: an array stays as-is, `null`
/// becomes `[]` and any other value is wrapped as the single parameter.
pub fn deserialize_params<'de, D>(d: D) -> std::result::Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    })
}

impl CallEnvelope {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: Version::V2,
            id,
            method: method.into(),
            params,
        }
    }
}

/// Error object carried by a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default = "default_code")]
    pub code: i64,
    #[serde(default = "default_message")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcErrorObject {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// `-32603 Internal Error`.
    pub fn internal() -> Self {
        Self::new(default_code(), DEFAULT_ERROR_MESSAGE)
    }
}

fn default_code() -> i64 {
    -32603
}

fn default_message() -> String {
    DEFAULT_ERROR_MESSAGE.to_string()
}

/// Exactly one of `result` / `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePayload {
    Result(Value),
    Error(RpcErrorObject),
}

/// The answer to one call envelope (parent -> frame).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawResponse")]
pub struct ResponseEnvelope {
    pub jsonrpc: Version,
    /// Must match the originating call's id.
    pub id: u64,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

impl ResponseEnvelope {
    pub fn result(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: Version::V2,
            id,
            payload: ResponsePayload::Result(result),
        }
    }

    pub fn error(id: u64, error: RpcErrorObject) -> Self {
        Self {
            jsonrpc: Version::V2,
            id,
            payload: ResponsePayload::Error(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.payload, ResponsePayload::Error(_))
    }

    /// Split into the caller-facing outcome.
    pub fn into_result(self) -> std::result::Result<Value, RpcErrorObject> {
        match self.payload {
            ResponsePayload::Result(v) => Ok(v),
            ResponsePayload::Error(e) => Err(e),
        }
    }
}

/// Lenient wire form: an absent `result` resolves to `null`, `error` wins if present.
#[derive(Deserialize)]
struct RawResponse {
    #[serde(default)]
    jsonrpc: Version,
    id: u64,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

impl From<RawResponse> for ResponseEnvelope {
    fn from(raw: RawResponse) -> Self {
        let payload = match raw.error {
            Some(e) => ResponsePayload::Error(e),
            None => ResponsePayload::Result(raw.result.unwrap_or(Value::Null)),
        };
        Self {
            jsonrpc: raw.jsonrpc,
            id: raw.id,
            payload,
        }
    }
}
