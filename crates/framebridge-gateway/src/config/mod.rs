//! Bridge config loader (strict parsing).

pub mod schema;

use std::fs;

use framebridge_core::error::{BridgeError, Result};

pub use schema::{
    BridgeConfig, BridgeSection, DiscoverySection, GatewaySection, WalletMode, WalletSection,
};

pub fn load_from_file(path: &str) -> Result<BridgeConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| BridgeError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<BridgeConfig> {
    let cfg: BridgeConfig = serde_yaml::from_str(s)
        .map_err(|e| BridgeError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Provider stub source for the cross-origin injection fallback.
pub fn load_inject_script(cfg: &BridgeSection) -> Result<String> {
    match &cfg.inject_script_path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| BridgeError::Internal(format!("read inject script failed ({path}): {e}"))),
        None => Ok(crate::host::DEFAULT_INJECT_SCRIPT.to_string()),
    }
}
