//! Origin allowlist compilation and matching.
//!
//! Entry forms:
//! - `*` matches every non-opaque origin;
//! - `https://app.example.com` (optionally with port) matches exactly;
//! - `https://*.example.com` matches any subdomain of `example.com` on that
//!   scheme, but not `example.com` itself.

use framebridge_core::error::{BridgeError, Result};

use crate::transport::Origin;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginRule {
    Any,
    Exact(Origin),
    Subdomain { scheme: String, suffix: String },
}

impl OriginRule {
    pub fn matches(&self, origin: &Origin) -> bool {
        if origin.is_opaque() {
            return false;
        }
        match self {
            OriginRule::Any => true,
            OriginRule::Exact(o) => o == origin,
            OriginRule::Subdomain { scheme, suffix } => {
                let Some((s, host)) = origin.as_str().split_once("://") else {
                    return false;
                };
                let host = host.split(':').next().unwrap_or(host);
                s == scheme && host.len() > suffix.len() && host.ends_with(suffix.as_str())
            }
        }
    }
}

fn compile_rule(raw: &str) -> Result<OriginRule> {
    let s = raw.trim();
    if s == "*" {
        return Ok(OriginRule::Any);
    }

    let (scheme, rest) = s.split_once("://").ok_or_else(|| {
        BridgeError::BadRequest(format!("invalid allowed_origins entry: {s} (expected scheme://host)"))
    })?;

    if let Some(domain) = rest.strip_prefix("*.") {
        if domain.is_empty() || domain.contains(['/', '*', ':']) {
            return Err(BridgeError::BadRequest(format!("invalid wildcard origin: {s}")));
        }
        return Ok(OriginRule::Subdomain {
            scheme: scheme.to_ascii_lowercase(),
            suffix: format!(".{}", domain.to_ascii_lowercase()),
        });
    }

    let url = url::Url::parse(s)
        .map_err(|e| BridgeError::BadRequest(format!("invalid allowed_origins entry: {s} ({e})")))?;
    let origin = Origin::from_url(&url);
    if origin.is_opaque() {
        return Err(BridgeError::BadRequest(format!("allowed_origins entry has an opaque origin: {s}")));
    }
    Ok(OriginRule::Exact(origin))
}

pub fn compile_origin_rules(raw: &[String]) -> Result<Vec<OriginRule>> {
    raw.iter().map(|s| compile_rule(s)).collect()
}

pub fn is_origin_allowed(rules: &[OriginRule], origin: &Origin) -> bool {
    rules.iter().any(|r| r.matches(origin))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(raw: &[&str]) -> Vec<OriginRule> {
        compile_origin_rules(&raw.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn wildcard_admits_everything_but_opaque() {
        let r = rules(&["*"]);
        assert!(is_origin_allowed(&r, &Origin::new("https://a.test")));
        assert!(!is_origin_allowed(&r, &Origin::opaque()));
    }

    #[test]
    fn exact_entry_is_normalized() {
        let r = rules(&["https://App.Example.com/"]);
        assert!(is_origin_allowed(&r, &Origin::new("https://app.example.com")));
        assert!(!is_origin_allowed(&r, &Origin::new("http://app.example.com")));
        assert!(!is_origin_allowed(&r, &Origin::new("https://app.example.com:8443")));
    }

    #[test]
    fn subdomain_entry_excludes_apex_and_other_schemes() {
        let r = rules(&["https://*.example.com"]);
        assert!(is_origin_allowed(&r, &Origin::new("https://a.example.com")));
        assert!(is_origin_allowed(&r, &Origin::new("https://a.b.example.com:8443")));
        assert!(!is_origin_allowed(&r, &Origin::new("https://example.com")));
        assert!(!is_origin_allowed(&r, &Origin::new("https://evilexample.com")));
        assert!(!is_origin_allowed(&r, &Origin::new("http://a.example.com")));
    }

    #[test]
    fn malformed_entries_are_rejected() {
        for bad in ["example.com", "https://*.", "https://*.a/b", "data:text/plain,x"] {
            let raw = vec![bad.to_string()];
            assert!(compile_origin_rules(&raw).is_err(), "{bad} should not compile");
        }
    }
}
