use thiserror::Error;

use crate::enhance::EnhanceError;
use crate::export::ExportError;
use crate::store::StoreError;
use crate::wizard::WizardStep;

/// Session-level error type.
///
/// Only `Persistence` is a hard stop. Everything else leaves the session usable
/// with its document unchanged.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("save failed: {0}")]
    Persistence(#[from] StoreError),

    #[error("enhancement unavailable: {0}")]
    Enhance(#[from] EnhanceError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("no template selected")]
    NoTemplate,

    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    #[error("enhancement cannot start from step {0:?}")]
    NotReady(WizardStep),

    #[error("session is closed")]
    Closed,
}

impl SessionError {
    /// Whether the user must acknowledge and retry before moving on.
    pub fn is_hard_stop(&self) -> bool {
        matches!(self, SessionError::Persistence(_))
    }
}
