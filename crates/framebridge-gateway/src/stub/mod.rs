//! Frame-side half of the bridge: provider stub, request correlator and
//! injection into a frame scope.

pub mod correlator;
pub mod provider;
pub mod scope;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

pub use correlator::{Correlator, PendingCall};
pub use provider::{Eip1193Provider, LegacyPayload, ProviderStub};
pub use scope::{install_provider, FrameScope, Installation};

use crate::discovery::{AnnouncementChannel, ProviderInfo};
use crate::transport::{MessageEvent, MessagePort};

/// Default per-call deadline.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Marker in the stub script replaced by the per-call deadline in milliseconds.
pub const CALL_TIMEOUT_PLACEHOLDER: &str = "__FRAMEBRIDGE_CALL_TIMEOUT_MS__";

/// Fill a stub script template with discovery info and the call deadline.
pub fn render_script(template: &str, info: &ProviderInfo, call_timeout: Duration) -> String {
    info.render_script(template)
        .replace(CALL_TIMEOUT_PLACEHOLDER, &call_timeout.as_millis().to_string())
}

/// Everything a page load of embedded content sets up once.
pub struct StubRuntime {
    pub stub: Arc<ProviderStub>,
    pub announcements: AnnouncementChannel,
}

/// Install the stub, start its mailbox listener and announce it.
///
/// Returns `None` when the scope already holds a provider.
pub fn bootstrap(
    scope: Arc<FrameScope>,
    parent: Arc<dyn MessagePort>,
    mailbox: mpsc::UnboundedReceiver<MessageEvent>,
    info: ProviderInfo,
    call_timeout: Duration,
) -> Option<StubRuntime> {
    let Installation::Installed(stub) = install_provider(&scope, parent, call_timeout) else {
        return None;
    };

    stub.spawn_listener(mailbox);
    let announcements = AnnouncementChannel::new(info, Arc::clone(&stub));
    announcements.start(scope);

    Some(StubRuntime {
        stub,
        announcements,
    })
}
