//! Method dispatch for the bridge host.
//!
//! Re-exports the method table and handler trait so downstream consumers can
//! depend on this module directly.

pub mod dispatcher;

pub use dispatcher::{AccountsHandler, ForwardHandler, MethodHandler, MethodTable};
