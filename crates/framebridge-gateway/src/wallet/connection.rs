use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use framebridge_core::protocol::{RpcErrorObject, DEFAULT_ERROR_MESSAGE};

/// Failure reported by a wallet connection.
///
/// Every field is optional: wallets throw anything from structured
/// EIP-1193 errors to bare strings. Missing parts are defaulted only when
/// the error is put on the wire.
#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("wallet error: {}", message_or_default(.message))]
pub struct WalletError {
    pub code: Option<i64>,
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl WalletError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: Some(message.into()),
            data: None,
        }
    }

    /// Error carrying only a message (code defaulted on the wire).
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Wire form: `-32603` / `"Internal Error"` when not supplied.
    pub fn into_rpc_error(self) -> RpcErrorObject {
        let mut obj = RpcErrorObject::internal();
        if let Some(code) = self.code {
            obj.code = code;
        }
        if let Some(message) = self.message {
            obj.message = message;
        }
        obj.data = self.data;
        obj
    }
}

fn message_or_default(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or(DEFAULT_ERROR_MESSAGE)
}

/// An authenticated link to a wallet.
#[async_trait]
pub trait WalletConnection: Send + Sync {
    /// Active accounts, first entry is the selected one.
    async fn accounts(&self) -> Result<Vec<String>, WalletError>;

    /// Execute a named RPC-shaped request.
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, WalletError>;
}

/// Source of connection handles.
///
/// `connection()` is called once per forwarded call so a disconnect between
/// calls is never masked by a cached handle.
pub trait WalletConnector: Send + Sync {
    fn connection(&self) -> Option<Arc<dyn WalletConnection>>;
}

/// Connector for hosts without a wallet (`wallet.mode: disabled`).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWallet;

impl WalletConnector for NoWallet {
    fn connection(&self) -> Option<Arc<dyn WalletConnection>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_error_gets_defaults() {
        let obj = WalletError::default().into_rpc_error();
        assert_eq!(obj.code, -32603);
        assert_eq!(obj.message, "Internal Error");
    }

    #[test]
    fn message_only_keeps_message() {
        let obj = WalletError::message("nonce too low").into_rpc_error();
        assert_eq!(obj.code, -32603);
        assert_eq!(obj.message, "nonce too low");
    }

    #[test]
    fn structured_error_passes_through() {
        let mut e = WalletError::new(4001, "User rejected");
        e.data = Some(json!({ "origin": "popup" }));
        let obj = e.into_rpc_error();
        assert_eq!(obj.code, 4001);
        assert_eq!(obj.message, "User rejected");
        assert_eq!(obj.data, Some(json!({ "origin": "popup" })));
    }
}
