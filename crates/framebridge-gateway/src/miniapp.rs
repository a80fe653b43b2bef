//! Mini-app targets typed by the user into the preview frame.

use serde::Serialize;
use url::Url;

use framebridge_core::error::{BridgeError, Result};

/// URL shown by an empty frame.
pub const EMPTY_FRAME_URL: &str = "about:blank";

const FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MiniApp {
    pub name: String,
    pub icon: String,
    pub url: String,
}

impl MiniApp {
    /// Normalize raw input: trim, default to `https://`, derive a display name
    /// and icon from the host.
    pub fn from_input(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(BridgeError::BadRequest("mini-app url is empty".into()));
        }

        let url = if raw.starts_with("http://") || raw.starts_with("https://") {
            raw.to_string()
        } else {
            format!("https://{raw}")
        };
        let parsed = Url::parse(&url)
            .map_err(|e| BridgeError::BadRequest(format!("invalid mini-app url {url}: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| BridgeError::BadRequest(format!("mini-app url has no host: {url}")))?;

        let (name, icon) = if is_loopback(host) {
            let port = parsed.port_or_known_default().map(|p| p.to_string()).unwrap_or_default();
            (
                format!("Localhost:{port}"),
                format!("{}/favicon.ico", parsed.origin().ascii_serialization()),
            )
        } else {
            (
                display_name(host),
                format!("{FAVICON_SERVICE}?domain={host}&sz=64"),
            )
        };

        tracing::debug!(%url, %name, "mini-app target normalized");
        Ok(Self { name, icon, url })
    }

    pub fn is_empty_state(url: &str) -> bool {
        let url = url.trim();
        url.is_empty() || url == EMPTY_FRAME_URL
    }
}

fn is_loopback(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "[::1]")
}

/// `www.uniswap.org` -> `Uniswap`
fn display_name(host: &str) -> String {
    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next().unwrap_or(host);
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => host.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_domain_gets_https_and_a_name() {
        let app = MiniApp::from_input("  www.uniswap.org/swap ").unwrap();
        assert_eq!(app.url, "https://www.uniswap.org/swap");
        assert_eq!(app.name, "Uniswap");
        assert_eq!(
            app.icon,
            "https://www.google.com/s2/favicons?domain=www.uniswap.org&sz=64"
        );
    }

    #[test]
    fn explicit_http_is_kept() {
        let app = MiniApp::from_input("http://app.test").unwrap();
        assert_eq!(app.url, "http://app.test");
        assert_eq!(app.name, "App");
    }

    #[test]
    fn localhost_uses_port_and_local_favicon() {
        let app = MiniApp::from_input("http://localhost:3000").unwrap();
        assert_eq!(app.name, "Localhost:3000");
        assert_eq!(app.icon, "http://localhost:3000/favicon.ico");
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(MiniApp::from_input("   "), Err(BridgeError::BadRequest(_))));
    }

    #[test]
    fn empty_state() {
        assert!(MiniApp::is_empty_state("about:blank"));
        assert!(MiniApp::is_empty_state(""));
        assert!(!MiniApp::is_empty_state("https://app.test"));
    }
}
