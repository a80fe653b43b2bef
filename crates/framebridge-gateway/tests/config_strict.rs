#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use framebridge_core::error::ErrorCode;
use framebridge_gateway::config::{self, WalletMode};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
bridge:
  call_timeout: 1000 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.error_code(), ErrorCode::InvalidRequest);
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.listen, "127.0.0.1:8787");
    assert_eq!(cfg.bridge.call_timeout_ms, 60000);
    assert_eq!(cfg.bridge.allowed_origins, vec!["*".to_string()]);
    assert_eq!(cfg.wallet.mode, WalletMode::Simulated);
    assert_eq!(cfg.discovery.rdns, "app.framebridge");
}

#[test]
fn unsupported_version_is_rejected() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.to_string(), "unsupported protocol version");
}

#[test]
fn ranges_are_validated() {
    for bad in [
        "version: 1\nbridge: { call_timeout_ms: 10 }\n",
        "version: 1\nbridge: { allowed_origins: [] }\n",
        "version: 1\ngateway: { ping_interval_ms: 60000, idle_timeout_ms: 30000 }\n",
        "version: 1\nwallet: { address: \"0x1234\" }\n",
        "version: 1\nwallet: { chain_id: \"8453\" }\n",
    ] {
        assert!(config::load_from_str(bad).is_err(), "{bad}");
    }
}

#[test]
fn full_config_round_trip() {
    let ok = r#"
version: 1
gateway:
  listen: "0.0.0.0:9000"
  ping_interval_ms: 15000
  idle_timeout_ms: 45000
  max_frame_bytes: 4096
bridge:
  call_timeout_ms: 30000
  allowed_origins: ["https://*.example.com", "http://localhost:3000"]
discovery:
  uuid: "3b8c5d1e-0000-4000-8000-000000000001"
  name: "Preview Wallet"
  icon: "https://example.com/icon.png"
  rdns: "com.example.preview"
wallet:
  mode: disabled
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.gateway.max_frame_bytes, 4096);
    assert_eq!(cfg.bridge.allowed_origins.len(), 2);
    assert_eq!(cfg.discovery.name, "Preview Wallet");
    assert_eq!(cfg.wallet.mode, WalletMode::Disabled);
}

#[test]
fn missing_inject_script_file_is_an_error() {
    let cfg = config::load_from_str(
        "version: 1\nbridge: { inject_script_path: \"/nonexistent/stub.js\" }\n",
    )
    .expect("must parse");
    assert!(config::load_inject_script(&cfg.bridge).is_err());
}
