//! Shared application state for the bridge relay.
//!
//! Startup errors are explicit (Result instead of panic).

use std::sync::Arc;
use std::time::Duration;

use framebridge_core::error::Result;

use crate::config::{self, BridgeConfig, WalletMode};
use crate::discovery::ProviderInfo;
use crate::dispatch::MethodTable;
use crate::host::BridgeHost;
use crate::obs::BridgeMetrics;
use crate::policy::FramePolicy;
use crate::stub;
use crate::wallet::{NoWallet, SimulatedConnector, WalletConnector};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: BridgeConfig,
    policy: FramePolicy,
    wallet: Arc<dyn WalletConnector>,
    simulated: Option<Arc<SimulatedConnector>>,
    methods: Arc<MethodTable>,
    metrics: Arc<BridgeMetrics>,
    inject_script: Arc<str>,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: BridgeConfig) -> Result<Self> {
        let policy = FramePolicy::new(&cfg.gateway, &cfg.bridge)?;

        let simulated = match cfg.wallet.mode {
            WalletMode::Simulated => Some(Arc::new(SimulatedConnector::from_config(&cfg.wallet))),
            WalletMode::Disabled => None,
        };
        let wallet: Arc<dyn WalletConnector> = match &simulated {
            Some(c) => Arc::clone(c) as Arc<dyn WalletConnector>,
            None => Arc::new(NoWallet),
        };

        let info = ProviderInfo::from_config(&cfg.discovery);
        let template = config::load_inject_script(&cfg.bridge)?;
        let call_timeout = Duration::from_millis(cfg.bridge.call_timeout_ms);
        let inject_script: Arc<str> = Arc::from(stub::render_script(&template, &info, call_timeout));

        let methods = Arc::new(MethodTable::new());
        tracing::info!(
            wallet = ?cfg.wallet.mode,
            methods = ?methods.registered_methods(),
            origins = ?cfg.bridge.allowed_origins,
            "bridge state ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                policy,
                wallet,
                simulated,
                methods,
                metrics: Arc::new(BridgeMetrics::default()),
                inject_script,
            }),
        })
    }

    pub fn cfg(&self) -> &BridgeConfig {
        &self.inner.cfg
    }

    pub fn policy(&self) -> &FramePolicy {
        &self.inner.policy
    }

    pub fn metrics(&self) -> Arc<BridgeMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    /// Simulated connector, when the wallet runs in simulated mode.
    pub fn simulated_wallet(&self) -> Option<Arc<SimulatedConnector>> {
        self.inner.simulated.clone()
    }

    /// Fresh host for one frame, sharing the wallet, method table and metrics.
    pub fn new_host(&self) -> Arc<BridgeHost> {
        Arc::new(
            BridgeHost::new(Arc::clone(&self.inner.wallet), Arc::clone(&self.inner.methods))
                .with_metrics(self.metrics())
                .with_inject_script(Arc::clone(&self.inner.inject_script)),
        )
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    /// Extra gauge lines for `/metrics`.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        let connected = self
            .inner
            .simulated
            .as_ref()
            .map(|c| c.is_connected())
            .unwrap_or(false);
        vec![("framebridge_wallet_connected", u64::from(connected))]
    }
}
