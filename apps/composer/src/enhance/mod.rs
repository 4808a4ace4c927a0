//! Enhancement Engine: tone-directed rewrites of the narrative and repeated
//! sections, with a non-destructive version history.
//!
//! Flow: prepare (snapshot + in-flight guard) → run (capability call, parse,
//! reconcile against the pre-call model) → the session applies the completion.

pub mod capability;
pub mod engine;
pub mod fragment;
pub mod history;
pub mod prompts;
pub mod reconcile;
pub mod tone;

#[cfg(test)]
pub(crate) mod testing;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use capability::{
    CapabilityError, DisabledCapability, EnhanceRequest, EnhancementCapability,
};
pub use engine::{EnhancementCompletion, EnhancementEngine, PendingEnhancement, Proposal};
pub use fragment::{parse_response, EnhancedFragment, ParsedResponse};
pub use history::{VersionEntry, VersionHistory, VersionSummary};
pub use reconcile::reconcile;
pub use tone::Tone;

/// Whether a rewrite is the first pass or a re-roll from the original snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Enhance,
    Regenerate,
}

#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("an enhancement is already in flight")]
    Busy,

    #[error("nothing to regenerate: no enhancement has run yet")]
    NothingToRegenerate,

    #[error("enhancement capability failed: {0}")]
    Capability(#[from] CapabilityError),

    #[error("malformed enhancement response: {0}")]
    Malformed(String),
}
