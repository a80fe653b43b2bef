//! Protocol modules.
//!
//! - `envelope`: JSON-RPC shaped Call / Response envelopes.
//! - `inject`: the cross-origin injection request.
//! - `inbound`: cheap shape classification of arbitrary channel traffic.
//!
//! The transport may carry messages that have nothing to do with the bridge,
//! so classification never fails: anything unrecognised is `Inbound::Unrelated`.

pub mod envelope;
pub mod inbound;
pub mod inject;

pub use envelope::{
    CallEnvelope, ResponseEnvelope, ResponsePayload, RpcErrorObject, Version,
    DEFAULT_ERROR_MESSAGE, JSONRPC_VERSION,
};
pub use inbound::{classify, Inbound};
pub use inject::{InjectRequest, INJECT_PROVIDER};
