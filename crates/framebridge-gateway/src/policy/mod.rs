//! Policy layer (origin allowlist, frame limits, embeddability).
//!
//! Compiles relay configuration into fast lookup structures consumed by the
//! socket handshake and session loop.

pub mod allowlist;
pub mod embed;
pub mod engine;

pub use embed::{check_embeddable, BlockReason, EmbedVerdict};
pub use engine::{FramePolicy, PolicyDecision};
