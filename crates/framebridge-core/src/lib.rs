//! framebridge core: wire contracts for the embedded-frame wallet bridge.
//!
//! This crate defines the envelopes exchanged between an embedded frame's
//! provider stub and the parent page's bridge host, plus the error surface
//! shared by the runtime crates. It carries no transport or runtime
//! dependencies so it can be reused on either side of the frame boundary.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed or
//! unrelated traffic is classified, never raised.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{BridgeError, ErrorCode, Result};
