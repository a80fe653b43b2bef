//! Wallet connection seams.
//!
//! The bridge never holds keys. It consumes a connector that hands out a
//! live connection handle, and forwards requests to it.

pub mod connection;
pub mod simulated;

pub use connection::{NoWallet, WalletConnection, WalletConnector, WalletError};
pub use simulated::{SimulatedConnector, SimulatedWallet};
