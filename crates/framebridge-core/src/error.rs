//! Shared error type across framebridge crates.

use thiserror::Error;

use crate::protocol::envelope::RpcErrorObject;

/// JSON-RPC / EIP-1193 error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON received.
    ParseError,
    /// Not a valid request object.
    InvalidRequest,
    /// Method does not exist.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal error (bridge default).
    InternalError,
    /// EIP-1193: user rejected the request.
    UserRejected,
    /// EIP-1193: method/account not authorized.
    Unauthorized,
    /// EIP-1193: provider does not support the method.
    UnsupportedMethod,
    /// EIP-1193: provider disconnected from all chains.
    Disconnected,
    /// EIP-1193: provider not connected to the requested chain.
    ChainDisconnected,
}

impl ErrorCode {
    /// Numeric code used on the wire.
    pub fn code(self) -> i64 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
            ErrorCode::UserRejected => 4001,
            ErrorCode::Unauthorized => 4100,
            ErrorCode::UnsupportedMethod => 4200,
            ErrorCode::Disconnected => 4900,
            ErrorCode::ChainDisconnected => 4901,
        }
    }

    /// Short label used in metrics and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::MethodNotFound => "METHOD_NOT_FOUND",
            ErrorCode::InvalidParams => "INVALID_PARAMS",
            ErrorCode::InternalError => "INTERNAL",
            ErrorCode::UserRejected => "USER_REJECTED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::UnsupportedMethod => "UNSUPPORTED_METHOD",
            ErrorCode::Disconnected => "DISCONNECTED",
            ErrorCode::ChainDisconnected => "CHAIN_DISCONNECTED",
        }
    }

    /// Reverse lookup for a wire code. Unknown codes return `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        let known = [
            ErrorCode::ParseError,
            ErrorCode::InvalidRequest,
            ErrorCode::MethodNotFound,
            ErrorCode::InvalidParams,
            ErrorCode::InternalError,
            ErrorCode::UserRejected,
            ErrorCode::Unauthorized,
            ErrorCode::UnsupportedMethod,
            ErrorCode::Disconnected,
            ErrorCode::ChainDisconnected,
        ];
        known.into_iter().find(|c| c.code() == code)
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    /// No response envelope arrived before the call deadline.
    #[error("Request timeout")]
    Timeout,
    /// The host could not obtain a live wallet connection.
    #[error("Connector Not Connected")]
    NotConnected,
    /// Error object returned by the counterpart, passed through untouched.
    #[error("{}", .0.message)]
    Rpc(RpcErrorObject),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("unsupported protocol version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Map to a stable code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            BridgeError::Rpc(obj) => {
                ErrorCode::from_code(obj.code).unwrap_or(ErrorCode::InternalError)
            }
            BridgeError::BadRequest(_) => ErrorCode::InvalidRequest,
            BridgeError::UnsupportedVersion => ErrorCode::InvalidRequest,
            BridgeError::Timeout
            | BridgeError::NotConnected
            | BridgeError::Transport(_)
            | BridgeError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Wire error object for a response envelope.
    ///
    /// `Rpc` errors keep their original code/message/data.
    pub fn to_rpc_error(&self) -> RpcErrorObject {
        match self {
            BridgeError::Rpc(obj) => obj.clone(),
            other => RpcErrorObject::new(other.error_code().code(), other.to_string()),
        }
    }

    /// Numeric code as seen by the caller.
    pub fn code(&self) -> i64 {
        match self {
            BridgeError::Rpc(obj) => obj.code,
            other => other.error_code().code(),
        }
    }
}

impl From<RpcErrorObject> for BridgeError {
    fn from(obj: RpcErrorObject) -> Self {
        BridgeError::Rpc(obj)
    }
}
