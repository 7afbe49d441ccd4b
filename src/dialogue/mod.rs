//! Dialogue router: owns the per-turn flow from utterance to response.

pub mod fast_path;
pub mod router;

pub use fast_path::FastPath;
pub use router::{DialogueRouter, FALLBACK_REPLY, MAX_HANDOFFS, TurnOutcome};
