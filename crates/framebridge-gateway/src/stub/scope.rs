//! Frame scope: the embedded page's global namespace as far as the bridge
//! cares about it (one provider slot plus a window-level event bus).

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::broadcast;

use super::provider::{Eip1193Provider, ProviderStub};
use crate::discovery::ScopeEvent;
use crate::transport::MessagePort;

const EVENT_CAPACITY: usize = 64;

pub struct FrameScope {
    provider: OnceLock<Arc<dyn Eip1193Provider>>,
    events: broadcast::Sender<ScopeEvent>,
}

impl Default for FrameScope {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScope {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            provider: OnceLock::new(),
            events,
        }
    }

    /// Scope that already carries a provider (e.g. a wallet extension).
    pub fn with_provider(provider: Arc<dyn Eip1193Provider>) -> Self {
        let scope = Self::new();
        let _ = scope.provider.set(provider);
        scope
    }

    /// The wallet-shaped global, if any.
    pub fn provider(&self) -> Option<Arc<dyn Eip1193Provider>> {
        self.provider.get().cloned()
    }

    pub fn has_provider(&self) -> bool {
        self.provider.get().is_some()
    }

    /// Dispatch a window-level event. Dropped when nobody listens.
    pub fn dispatch(&self, ev: ScopeEvent) {
        let _ = self.events.send(ev);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScopeEvent> {
        self.events.subscribe()
    }
}

/// Result of an injection attempt.
#[derive(Debug)]
pub enum Installation {
    Installed(Arc<ProviderStub>),
    /// A provider was already present; nothing was touched.
    Skipped,
}

/// Install a fresh stub unless the scope already has a provider.
pub fn install_provider(
    scope: &FrameScope,
    parent: Arc<dyn MessagePort>,
    call_timeout: Duration,
) -> Installation {
    if scope.has_provider() {
        tracing::info!("wallet provider already present; bridge injection skipped");
        return Installation::Skipped;
    }

    let stub = Arc::new(ProviderStub::new(parent, call_timeout));
    let as_provider: Arc<dyn Eip1193Provider> = Arc::clone(&stub) as Arc<dyn Eip1193Provider>;
    match scope.provider.set(as_provider) {
        Ok(()) => {
            tracing::info!("bridge provider stub installed");
            Installation::Installed(stub)
        }
        Err(_) => Installation::Skipped,
    }
}
