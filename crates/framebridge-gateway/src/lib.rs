//! framebridge runtime library.
//!
//! Wires the in-process window transport, the frame-side provider stub and
//! discovery, the parent-side bridge host with its method table, wallet
//! seams, policy, and the WebSocket relay into one stack. It is intended to
//! be consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod host;
pub mod miniapp;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;
pub mod stub;
pub mod transport;
pub mod wallet;
