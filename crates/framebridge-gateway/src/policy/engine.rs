use framebridge_core::error::Result;

use crate::config::{BridgeSection, GatewaySection};
use crate::transport::Origin;

use super::allowlist::{compile_origin_rules, is_origin_allowed, OriginRule};

/// Decision from policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Pass,
    Close { reason: &'static str },
}

/// Relay policy for remote frames.
/// Construct once at startup, then share via Arc.
#[derive(Debug)]
pub struct FramePolicy {
    max_frame_bytes: usize,
    origin_rules: Vec<OriginRule>,
}

impl FramePolicy {
    pub fn new(gateway: &GatewaySection, bridge: &BridgeSection) -> Result<Self> {
        Ok(Self {
            max_frame_bytes: gateway.max_frame_bytes,
            origin_rules: compile_origin_rules(&bridge.allowed_origins)?,
        })
    }

    /// Handshake check: may a frame with this origin attach at all?
    pub fn check_origin(&self, origin: &Origin) -> PolicyDecision {
        if is_origin_allowed(&self.origin_rules, origin) {
            PolicyDecision::Pass
        } else {
            PolicyDecision::Close { reason: "origin not allowed" }
        }
    }

    /// Cheap check on every inbound socket message, before decoding.
    pub fn check_len(&self, bytes_len: usize) -> PolicyDecision {
        if bytes_len > self.max_frame_bytes {
            return PolicyDecision::Close { reason: "frame too large" };
        }
        PolicyDecision::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(origins: &[&str]) -> FramePolicy {
        let bridge = BridgeSection {
            allowed_origins: origins.iter().map(|s| s.to_string()).collect(),
            ..BridgeSection::default()
        };
        FramePolicy::new(&GatewaySection::default(), &bridge).unwrap()
    }

    #[test]
    fn origin_check() {
        let p = policy(&["https://miniapp.test"]);
        assert_eq!(p.check_origin(&Origin::new("https://miniapp.test")), PolicyDecision::Pass);
        assert!(matches!(
            p.check_origin(&Origin::new("https://other.test")),
            PolicyDecision::Close { .. }
        ));
    }

    #[test]
    fn length_limit_closes() {
        let p = policy(&["*"]);
        let max = GatewaySection::default().max_frame_bytes;
        assert_eq!(p.check_len(max), PolicyDecision::Pass);
        assert_eq!(p.check_len(max + 1), PolicyDecision::Close { reason: "frame too large" });
    }
}
