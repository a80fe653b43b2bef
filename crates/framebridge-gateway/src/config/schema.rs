use serde::Deserialize;
use framebridge_core::error::{BridgeError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub bridge: BridgeSection,

    #[serde(default)]
    pub discovery: DiscoverySection,

    #[serde(default)]
    pub wallet: WalletSection,
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(BridgeError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.bridge.validate()?;
        self.discovery.validate()?;
        self.wallet.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(BridgeError::BadRequest(
                "gateway.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(BridgeError::BadRequest(
                "gateway.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(BridgeError::BadRequest(
                "gateway.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if !(1024..=16 * 1024 * 1024).contains(&self.max_frame_bytes) {
            return Err(BridgeError::BadRequest(
                "gateway.max_frame_bytes must be between 1024 and 16777216".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "127.0.0.1:8787".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
fn default_max_frame_bytes() -> usize {
    64 * 1024
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeSection {
    /// Per-call deadline on the stub side.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Origins allowed to attach over the socket relay. `"*"` admits any.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Provider stub source sent in `INJECT_PROVIDER`. Built-in loader when unset.
    #[serde(default)]
    pub inject_script_path: Option<String>,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout_ms(),
            allowed_origins: default_allowed_origins(),
            inject_script_path: None,
        }
    }
}

impl BridgeSection {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=600000).contains(&self.call_timeout_ms) {
            return Err(BridgeError::BadRequest(
                "bridge.call_timeout_ms must be between 1000 and 600000".into(),
            ));
        }
        if self.allowed_origins.is_empty() {
            return Err(BridgeError::BadRequest(
                "bridge.allowed_origins must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_call_timeout_ms() -> u64 {
    60000
}
fn default_allowed_origins() -> Vec<String> {
    vec!["*".into()]
}

/// Identity announced to discovery listeners.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoverySection {
    #[serde(default = "default_uuid")]
    pub uuid: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_rdns")]
    pub rdns: String,
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            uuid: default_uuid(),
            name: default_name(),
            icon: default_icon(),
            rdns: default_rdns(),
        }
    }
}

impl DiscoverySection {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BridgeError::BadRequest("discovery.name must not be empty".into()));
        }
        if !self.icon.starts_with("data:") && !self.icon.starts_with("https://") {
            return Err(BridgeError::BadRequest(
                "discovery.icon must be a data: or https: URI".into(),
            ));
        }
        if !self.rdns.contains('.') {
            return Err(BridgeError::BadRequest(
                "discovery.rdns must be a reverse domain name".into(),
            ));
        }
        Ok(())
    }
}

fn default_uuid() -> String {
    "6f6e9c1e-7d3a-4a8e-9c61-2b1f0d5a8e42".into()
}
fn default_name() -> String {
    "Mini App Bridge".into()
}
fn default_icon() -> String {
    "data:image/svg+xml;base64,PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciIHZpZXdCb3g9IjAgMCAzMiAzMiI+PGNpcmNsZSBjeD0iMTYiIGN5PSIxNiIgcj0iMTYiIGZpbGw9IiMwMDUyRkYiLz48L3N2Zz4=".into()
}
fn default_rdns() -> String {
    "app.framebridge".into()
}

/// Wallet backing the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletMode {
    /// Fixed-state development wallet.
    #[default]
    Simulated,
    /// No wallet: every forwarded call fails as not connected.
    Disabled,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WalletSection {
    #[serde(default)]
    pub mode: WalletMode,
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: String,
    #[serde(default = "default_balance_wei")]
    pub balance_wei: String,
    #[serde(default = "default_connected")]
    pub connected: bool,
}

impl Default for WalletSection {
    fn default() -> Self {
        Self {
            mode: WalletMode::default(),
            address: default_address(),
            chain_id: default_chain_id(),
            balance_wei: default_balance_wei(),
            connected: default_connected(),
        }
    }
}

impl WalletSection {
    pub fn validate(&self) -> Result<()> {
        if self.mode == WalletMode::Disabled {
            return Ok(());
        }
        if !is_hex_of_len(&self.address, Some(40)) {
            return Err(BridgeError::BadRequest(
                "wallet.address must be 0x followed by 40 hex characters".into(),
            ));
        }
        if !is_hex_of_len(&self.chain_id, None) {
            return Err(BridgeError::BadRequest("wallet.chain_id must be 0x-prefixed hex".into()));
        }
        if !is_hex_of_len(&self.balance_wei, None) {
            return Err(BridgeError::BadRequest(
                "wallet.balance_wei must be 0x-prefixed hex".into(),
            ));
        }
        Ok(())
    }
}

fn is_hex_of_len(s: &str, len: Option<usize>) -> bool {
    let Some(digits) = s.strip_prefix("0x") else { return false; };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }
    len.map_or(true, |n| digits.len() == n)
}

fn default_address() -> String {
    "0x1234567890abcdef1234567890abcdef12345678".into()
}
fn default_chain_id() -> String {
    // Base mainnet (8453)
    "0x2105".into()
}
fn default_balance_wei() -> String {
    "0x14d1120d7b160000".into()
}
fn default_connected() -> bool {
    true
}
