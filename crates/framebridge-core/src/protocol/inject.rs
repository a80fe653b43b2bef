//! Injection request (host -> embedded content, cross-origin fallback only).
//!
//! The embedded page must cooperate by executing the received script; the
//! host cannot force it.

use serde::{Deserialize, Serialize};

/// Value of the `type` tag.
pub const INJECT_PROVIDER: &str = "INJECT_PROVIDER";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "INJECT_PROVIDER")]
pub struct InjectRequest {
    /// Provider stub source text.
    pub script: String,
}

impl InjectRequest {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn carries_type_tag() {
        let v = serde_json::to_value(InjectRequest::new("(() => {})()")).unwrap();
        assert_eq!(v, json!({ "type": "INJECT_PROVIDER", "script": "(() => {})()" }));
    }
}
