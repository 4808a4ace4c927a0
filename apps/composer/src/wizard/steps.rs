use serde::{Deserialize, Serialize};

use crate::document::DocumentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Optional one-time import of an existing document.
    Import,
    Template,
    Contact,
    Experience,
    Education,
    Skills,
    Summary,
    Recipient,
    Body,
    Review,
    /// Enhancement in flight. Not part of any navigable order.
    Processing,
}

const RESUME_ORDER: &[WizardStep] = &[
    WizardStep::Import,
    WizardStep::Template,
    WizardStep::Contact,
    WizardStep::Experience,
    WizardStep::Education,
    WizardStep::Skills,
    WizardStep::Summary,
    WizardStep::Review,
];

const LETTER_ORDER: &[WizardStep] = &[
    WizardStep::Template,
    WizardStep::Contact,
    WizardStep::Recipient,
    WizardStep::Body,
    WizardStep::Review,
];

/// The fixed total order of steps for a document kind. Always ends with `Review`.
pub fn step_order(kind: DocumentKind) -> &'static [WizardStep] {
    match kind {
        DocumentKind::Resume => RESUME_ORDER,
        DocumentKind::CoverLetter => LETTER_ORDER,
    }
}

impl WizardStep {
    /// Whether the live preview may render while this step is active.
    pub fn shows_preview(&self) -> bool {
        !matches!(
            self,
            WizardStep::Import | WizardStep::Template | WizardStep::Processing
        )
    }

    pub fn position(&self, kind: DocumentKind) -> Option<usize> {
        step_order(kind).iter().position(|s| s == self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_end_with_review() {
        for kind in [DocumentKind::Resume, DocumentKind::CoverLetter] {
            assert_eq!(step_order(kind).last(), Some(&WizardStep::Review));
            assert!(!step_order(kind).contains(&WizardStep::Processing));
        }
    }

    #[test]
    fn test_letter_has_no_import() {
        assert_eq!(WizardStep::Import.position(DocumentKind::CoverLetter), None);
        assert_eq!(WizardStep::Template.position(DocumentKind::CoverLetter), Some(0));
    }

    #[test]
    fn test_preview_steps() {
        assert!(!WizardStep::Template.shows_preview());
        assert!(!WizardStep::Processing.shows_preview());
        assert!(WizardStep::Contact.shows_preview());
        assert!(WizardStep::Review.shows_preview());
    }
}
