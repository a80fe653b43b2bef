use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::config::DiscoverySection;
use crate::stub::{FrameScope, ProviderStub};

/// Marker in the stub script replaced by the configured `ProviderInfo`.
pub const PROVIDER_INFO_PLACEHOLDER: &str = "__FRAMEBRIDGE_PROVIDER_INFO__";

/// Fixed identity advertised with every announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    pub uuid: String,
    pub name: String,
    /// Data URI or https URL.
    pub icon: String,
    /// Reverse-domain identifier.
    pub rdns: String,
}

impl ProviderInfo {
    pub fn from_config(cfg: &DiscoverySection) -> Self {
        Self {
            uuid: cfg.uuid.clone(),
            name: cfg.name.clone(),
            icon: cfg.icon.clone(),
            rdns: cfg.rdns.clone(),
        }
    }

    /// Substitute this info into a stub script template.
    pub fn render_script(&self, template: &str) -> String {
        let info = json!({
            "uuid": self.uuid,
            "name": self.name,
            "icon": self.icon,
            "rdns": self.rdns,
        });
        template.replace(PROVIDER_INFO_PLACEHOLDER, &info.to_string())
    }
}

impl Default for ProviderInfo {
    fn default() -> Self {
        Self::from_config(&DiscoverySection::default())
    }
}

/// Announcement payload. `provider` is the live stub, not a snapshot.
#[derive(Debug, Clone)]
pub struct ProviderDetail {
    pub info: ProviderInfo,
    pub provider: Arc<ProviderStub>,
}

/// Window-level events in a frame scope.
#[derive(Debug, Clone)]
pub enum ScopeEvent {
    /// `eip6963:announceProvider`
    AnnounceProvider(ProviderDetail),
    /// `eip6963:requestProvider`
    RequestProvider,
    /// Legacy `ethereum#initialized`
    EthereumInitialized,
}

impl ScopeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ScopeEvent::AnnounceProvider(_) => "eip6963:announceProvider",
            ScopeEvent::RequestProvider => "eip6963:requestProvider",
            ScopeEvent::EthereumInitialized => "ethereum#initialized",
        }
    }
}

pub struct AnnouncementChannel {
    detail: ProviderDetail,
    initialized_sent: AtomicBool,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl AnnouncementChannel {
    pub fn new(info: ProviderInfo, provider: Arc<ProviderStub>) -> Self {
        Self {
            detail: ProviderDetail { info, provider },
            initialized_sent: AtomicBool::new(false),
            listener: Mutex::new(None),
        }
    }

    pub fn info(&self) -> &ProviderInfo {
        &self.detail.info
    }

    /// Announce now, send the legacy initialized event once, and re-announce
    /// on every discovery request observed in `scope`.
    pub fn start(&self, scope: Arc<FrameScope>) {
        // Subscribe before announcing so no request slips between the two.
        let mut rx = scope.subscribe();

        self.announce(&scope);
        if !self.initialized_sent.swap(true, Ordering::AcqRel) {
            scope.dispatch(ScopeEvent::EthereumInitialized);
        }

        let detail = self.detail.clone();
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ScopeEvent::RequestProvider) => {
                        tracing::debug!(rdns = %detail.info.rdns, "discovery request observed; re-announcing");
                        scope.dispatch(ScopeEvent::AnnounceProvider(detail.clone()));
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "discovery listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        if let Ok(mut slot) = self.listener.lock() {
            if let Some(old) = slot.replace(task) {
                old.abort();
            }
        }
    }

    pub fn announce(&self, scope: &FrameScope) {
        tracing::debug!(name = %self.detail.info.name, "announcing provider");
        scope.dispatch(ScopeEvent::AnnounceProvider(self.detail.clone()));
    }

    pub fn stop(&self) {
        if let Ok(mut slot) = self.listener.lock() {
            if let Some(task) = slot.take() {
                task.abort();
            }
        }
    }
}

impl Drop for AnnouncementChannel {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DEFAULT_INJECT_SCRIPT;
    use std::time::Duration;

    #[test]
    fn stub_script_carries_configured_info() {
        let info = ProviderInfo {
            uuid: "u-1".into(),
            name: "Test Bridge".into(),
            icon: "data:image/svg+xml,<svg/>".into(),
            rdns: "test.bridge".into(),
        };
        let script = crate::stub::render_script(DEFAULT_INJECT_SCRIPT, &info, Duration::from_secs(5));
        assert!(!script.contains(PROVIDER_INFO_PLACEHOLDER));
        assert!(!script.contains(crate::stub::CALL_TIMEOUT_PLACEHOLDER));
        assert!(script.contains("var TIMEOUT_MS = 5000;"));
        assert!(script.contains(r#""rdns":"test.bridge""#));
        assert!(script.contains("eip6963:announceProvider"));
    }

    #[test]
    fn event_names() {
        assert_eq!(ScopeEvent::RequestProvider.name(), "eip6963:requestProvider");
        assert_eq!(ScopeEvent::EthereumInitialized.name(), "ethereum#initialized");
    }
}
