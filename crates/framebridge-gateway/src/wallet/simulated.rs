//! Simulated wallet for previews where a real wallet cannot connect
//! (popup-blocking webviews, passkey-less hosts).
//!
//! Answers the read-only account and chain queries from fixed state and
//! refuses everything that would need a signature.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use framebridge_core::ErrorCode;

use super::connection::{WalletConnection, WalletConnector, WalletError};
use crate::config::WalletSection;

/// Fixed-state wallet connection.
#[derive(Debug, Clone)]
pub struct SimulatedWallet {
    address: String,
    chain_id: String,
    balance_wei: String,
}

impl SimulatedWallet {
    pub fn new(
        address: impl Into<String>,
        chain_id: impl Into<String>,
        balance_wei: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            chain_id: chain_id.into(),
            balance_wei: balance_wei.into(),
        }
    }

    pub fn from_config(cfg: &WalletSection) -> Self {
        Self::new(&cfg.address, &cfg.chain_id, &cfg.balance_wei)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn net_version(&self) -> Result<Value, WalletError> {
        let hex = self.chain_id.trim_start_matches("0x");
        u64::from_str_radix(hex, 16)
            .map(|n| Value::String(n.to_string()))
            .map_err(|_| WalletError::message(format!("invalid chain id: {}", self.chain_id)))
    }

    fn balance_of(&self, params: &[Value]) -> Result<Value, WalletError> {
        let who = params
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| {
                WalletError::new(ErrorCode::InvalidParams.code(), "eth_getBalance requires an address")
            })?;
        if who.eq_ignore_ascii_case(&self.address) {
            Ok(json!(self.balance_wei))
        } else {
            Ok(json!("0x0"))
        }
    }
}

#[async_trait]
impl WalletConnection for SimulatedWallet {
    async fn accounts(&self) -> Result<Vec<String>, WalletError> {
        Ok(vec![self.address.clone()])
    }

    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, WalletError> {
        match method {
            "eth_accounts" | "eth_requestAccounts" => Ok(json!([self.address])),
            "eth_chainId" => Ok(json!(self.chain_id)),
            "net_version" => self.net_version(),
            "eth_getBalance" => self.balance_of(&params),
            other => Err(WalletError::new(
                ErrorCode::UnsupportedMethod.code(),
                format!("Unsupported method: {other}"),
            )),
        }
    }
}

/// Connector over a simulated wallet with a runtime connect switch.
#[derive(Debug)]
pub struct SimulatedConnector {
    wallet: Arc<SimulatedWallet>,
    connected: AtomicBool,
}

impl SimulatedConnector {
    pub fn new(wallet: SimulatedWallet, connected: bool) -> Self {
        Self {
            wallet: Arc::new(wallet),
            connected: AtomicBool::new(connected),
        }
    }

    pub fn from_config(cfg: &WalletSection) -> Self {
        Self::new(SimulatedWallet::from_config(cfg), cfg.connected)
    }

    pub fn connect(&self) {
        self.connected.store(true, Ordering::Release);
        tracing::info!(address = %self.wallet.address(), "simulated wallet connected");
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
        tracing::info!("simulated wallet disconnected");
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl WalletConnector for SimulatedConnector {
    fn connection(&self) -> Option<Arc<dyn WalletConnection>> {
        if self.is_connected() {
            Some(Arc::clone(&self.wallet) as Arc<dyn WalletConnection>)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x00000000000000000000000000000000000000aa";

    fn wallet() -> SimulatedWallet {
        SimulatedWallet::new(ADDR, "0x2105", "0xde0b6b3a7640000")
    }

    #[tokio::test]
    async fn answers_chain_queries() {
        let w = wallet();
        assert_eq!(w.request("eth_chainId", vec![]).await.unwrap(), json!("0x2105"));
        assert_eq!(w.request("net_version", vec![]).await.unwrap(), json!("8453"));
    }

    #[tokio::test]
    async fn balance_matches_address_case_insensitively() {
        let w = wallet();
        let own = w
            .request("eth_getBalance", vec![json!(ADDR.to_uppercase().replace("0X", "0x")), json!("latest")])
            .await
            .unwrap();
        assert_eq!(own, json!("0xde0b6b3a7640000"));

        let other = w
            .request("eth_getBalance", vec![json!("0x0000000000000000000000000000000000000001")])
            .await
            .unwrap();
        assert_eq!(other, json!("0x0"));
    }

    #[tokio::test]
    async fn refuses_signing() {
        let err = wallet()
            .request("personal_sign", vec![json!("0xdeadbeef"), json!(ADDR)])
            .await
            .unwrap_err();
        assert_eq!(err.code, Some(4200));
    }

    #[test]
    fn connector_hands_out_nothing_when_disconnected() {
        let c = SimulatedConnector::new(wallet(), false);
        assert!(c.connection().is_none());
        c.connect();
        assert!(c.connection().is_some());
        c.disconnect();
        assert!(c.connection().is_none());
    }
}
