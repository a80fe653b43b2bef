//! Parent-side half of the bridge.
//!
//! The host listens to one embedded frame at a time, executes its calls
//! against the wallet connector and answers each with exactly one response.

pub mod bridge;
pub mod frame;

pub use bridge::{BridgeHost, Disposition, IgnoreReason, InjectionPath, DEFAULT_INJECT_SCRIPT};
pub use frame::{EmbeddedFrame, HostState, InjectError, LocalFrame};
