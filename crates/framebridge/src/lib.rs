//! Top-level facade crate for framebridge.
//!
//! Re-exports the wire contracts and the bridge runtime so users can depend on a single crate.

pub mod core {
    pub use framebridge_core::*;
}

pub mod gateway {
    pub use framebridge_gateway::*;
}
