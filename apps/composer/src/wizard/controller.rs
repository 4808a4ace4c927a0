//! Wizard Controller: the single source of truth for an editing session's content.
//!
//! # Navigation rules
//! - `advance()` validates only the step being left.
//! - `jump_to()` reaches any step at or below the highest index ever reached.
//!   Unlocked steps never re-lock, even if their data is later edited into an
//!   invalid state.
//! - `Review` is terminal for forward navigation.
//! - `Processing` is entered only through `begin_processing()` and always exits
//!   to `Review` through `finish_processing()`. No edits are accepted meanwhile.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::document::validation::{validate_step, ValidationReport};
use crate::document::{ContentFragment, DocumentKind, DocumentModel, FieldUpdate, PartialDocument};
use crate::ingest::IngestError;
use crate::style::{ColorScheme, StyleModel, TypographyScale};
use crate::templates::Template;
use crate::wizard::steps::{step_order, WizardStep};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    pub current_step: WizardStep,
    pub collected: DocumentModel,
    pub template_id: Option<String>,
    pub style: StyleModel,
    /// Highest index in the step order ever reached.
    pub highest_reached: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    Moved { from: WizardStep, to: WizardStep },
    /// The current step failed validation; feedback belongs on the same step.
    Blocked(ValidationReport),
    /// Already on `Review`.
    AtEnd,
    /// Enhancement in flight; navigation is disabled.
    Busy,
}

#[derive(Debug, Clone)]
pub struct WizardController {
    state: WizardState,
}

impl WizardController {
    /// A blank wizard positioned on the first step for `kind`.
    pub fn new(kind: DocumentKind) -> Self {
        Self::restore(kind, DocumentModel::new(kind), None, StyleModel::default(), 0)
    }

    /// Rebuilds a wizard from previously collected content (e.g. a draft).
    /// Navigation restarts at the first step; steps up to `highest_reached`
    /// stay unlocked.
    pub fn restore(
        kind: DocumentKind,
        mut collected: DocumentModel,
        template_id: Option<String>,
        style: StyleModel,
        highest_reached: usize,
    ) -> Self {
        collected.kind = kind;
        let order = step_order(kind);
        Self {
            state: WizardState {
                current_step: order[0],
                collected,
                template_id,
                style,
                highest_reached: highest_reached.min(order.len() - 1),
            },
        }
    }

    /// A wizard for an already-saved record: every step is unlocked and the
    /// import step, if any, is skipped.
    pub fn for_existing(collected: DocumentModel, style: StyleModel) -> Self {
        let kind = collected.kind;
        let order = step_order(kind);
        let start = order
            .iter()
            .position(|s| *s != WizardStep::Import)
            .unwrap_or(0);
        let template_id = Some(style.template_id.clone()).filter(|id| !id.is_empty());
        Self {
            state: WizardState {
                current_step: order[start],
                collected,
                template_id,
                style,
                highest_reached: order.len() - 1,
            },
        }
    }

    // ── accessors ────────────────────────────────────────────────────────────

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn kind(&self) -> DocumentKind {
        self.state.collected.kind
    }

    pub fn current_step(&self) -> WizardStep {
        self.state.current_step
    }

    pub fn document(&self) -> &DocumentModel {
        &self.state.collected
    }

    pub fn style(&self) -> &StyleModel {
        &self.state.style
    }

    pub fn template_id(&self) -> Option<&str> {
        self.state.template_id.as_deref()
    }

    pub fn is_processing(&self) -> bool {
        self.state.current_step == WizardStep::Processing
    }

    /// Whether the live preview may render on the current step.
    pub fn shows_preview(&self) -> bool {
        self.state.current_step.shows_preview()
    }

    /// Steps the user may jump to. Never shrinks over the life of the wizard.
    pub fn reachable_steps(&self) -> &'static [WizardStep] {
        &step_order(self.kind())[..=self.state.highest_reached]
    }

    pub fn can_jump_to(&self, step: WizardStep) -> bool {
        !self.is_processing()
            && step
                .position(self.kind())
                .is_some_and(|idx| idx <= self.state.highest_reached)
    }

    // ── navigation ───────────────────────────────────────────────────────────

    pub fn advance(&mut self) -> AdvanceOutcome {
        if self.is_processing() {
            return AdvanceOutcome::Busy;
        }
        let from = self.state.current_step;
        let order = step_order(self.kind());
        let idx = self.current_index();
        if idx + 1 >= order.len() {
            return AdvanceOutcome::AtEnd;
        }

        let report = validate_step(from, &self.state.collected, self.template_id());
        if !report.passed {
            debug!(step = ?from, issues = report.issues.len(), "Advance blocked by validation");
            return AdvanceOutcome::Blocked(report);
        }

        let to = order[idx + 1];
        self.move_to(idx + 1);
        info!(from = ?from, to = ?to, "Wizard advanced");
        AdvanceOutcome::Moved { from, to }
    }

    /// Moves one step back. Never validates.
    pub fn retreat(&mut self) -> bool {
        if self.is_processing() {
            return false;
        }
        let idx = self.current_index();
        if idx == 0 {
            return false;
        }
        self.move_to(idx - 1);
        true
    }

    /// Jumps to an unlocked step. Locked or foreign steps are rejected silently.
    pub fn jump_to(&mut self, step: WizardStep) -> bool {
        if !self.can_jump_to(step) {
            return false;
        }
        if let Some(idx) = step.position(self.kind()) {
            self.move_to(idx);
        }
        true
    }

    // ── edits ────────────────────────────────────────────────────────────────

    /// Pure merge into the Document Model. No validation happens here.
    pub fn update(&mut self, update: FieldUpdate) -> bool {
        if self.is_processing() {
            return false;
        }
        self.state.collected.apply(update);
        true
    }

    /// Selects a template, resetting colors and layout to its defaults.
    pub fn select_template(&mut self, template: &Template) -> bool {
        if self.is_processing() || !template.supports(self.kind()) {
            return false;
        }
        self.state.template_id = Some(template.id.clone());
        self.state.style.select_template(template);
        true
    }

    pub fn set_typography(&mut self, scale: TypographyScale) -> bool {
        if self.is_processing() {
            return false;
        }
        self.state.style.typography = scale;
        true
    }

    pub fn set_color_scheme(&mut self, colors: ColorScheme) -> bool {
        if self.is_processing() {
            return false;
        }
        self.state.style.color_scheme = colors;
        true
    }

    // ── ingestion ────────────────────────────────────────────────────────────

    /// Consumes the outcome of the import step and moves past it.
    ///
    /// A failed import is logged and otherwise ignored; the wizard continues with
    /// whatever values it already holds.
    pub fn apply_ingestion(&mut self, result: Result<PartialDocument, IngestError>) -> bool {
        if self.state.current_step != WizardStep::Import {
            return false;
        }
        match result {
            Ok(partial) => {
                self.state.collected.merge_partial(partial);
                info!("Imported document merged into wizard");
            }
            Err(e) => warn!("Import failed, continuing with defaults: {e}"),
        }
        self.move_to(self.current_index() + 1);
        true
    }

    pub fn skip_ingestion(&mut self) -> bool {
        if self.state.current_step != WizardStep::Import {
            return false;
        }
        self.move_to(self.current_index() + 1);
        true
    }

    // ── processing ───────────────────────────────────────────────────────────

    /// Whether `begin_processing` would succeed: only from the last input step
    /// or from `Review`.
    pub fn can_begin_processing(&self) -> bool {
        let order = step_order(self.kind());
        self.state
            .current_step
            .position(self.kind())
            .is_some_and(|idx| idx + 2 >= order.len())
    }

    /// Enters `Processing`.
    pub fn begin_processing(&mut self) -> bool {
        if !self.can_begin_processing() {
            return false;
        }
        self.state.current_step = WizardStep::Processing;
        info!("Wizard entered processing");
        true
    }

    /// Leaves `Processing` for `Review`, whatever the enhancement outcome was.
    pub fn finish_processing(&mut self) -> bool {
        if !self.is_processing() {
            return false;
        }
        let review = step_order(self.kind()).len() - 1;
        self.move_to(review);
        info!("Wizard left processing");
        true
    }

    /// Replaces the enhanceable content. Used for committed enhancements and
    /// version switches; allowed while processing.
    pub(crate) fn commit_fragment(&mut self, fragment: &ContentFragment) {
        self.state.collected.apply_fragment(fragment);
    }

    // ── internal ─────────────────────────────────────────────────────────────

    fn current_index(&self) -> usize {
        self.state
            .current_step
            .position(self.kind())
            .unwrap_or(step_order(self.kind()).len() - 1)
    }

    fn move_to(&mut self, idx: usize) {
        let order = step_order(self.kind());
        let idx = idx.min(order.len() - 1);
        self.state.current_step = order[idx];
        self.state.highest_reached = self.state.highest_reached.max(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ContactField, ExperienceEntry};
    use crate::templates::{StaticCatalog, TemplateCatalog};

    fn template(id: &str) -> Template {
        StaticCatalog::builtin().get_template(id).unwrap()
    }

    /// Resume wizard past Import and Template, sitting on Contact.
    fn at_contact() -> WizardController {
        let mut w = WizardController::new(DocumentKind::Resume);
        assert!(w.skip_ingestion());
        assert!(w.select_template(&template("hacker")));
        assert!(matches!(w.advance(), AdvanceOutcome::Moved { .. }));
        assert_eq!(w.current_step(), WizardStep::Contact);
        w
    }

    fn fill_contact(w: &mut WizardController) {
        w.update(FieldUpdate::Contact(ContactField::FullName, "Ada Lovelace".into()));
    }

    fn to_review(w: &mut WizardController) {
        while w.current_step() != WizardStep::Review {
            assert!(matches!(w.advance(), AdvanceOutcome::Moved { .. }));
        }
    }

    #[test]
    fn test_new_starts_on_first_step() {
        let w = WizardController::new(DocumentKind::Resume);
        assert_eq!(w.current_step(), WizardStep::Import);
        let w = WizardController::new(DocumentKind::CoverLetter);
        assert_eq!(w.current_step(), WizardStep::Template);
        assert_eq!(w.document().kind, DocumentKind::CoverLetter);
    }

    #[test]
    fn test_advance_blocked_without_name() {
        let mut w = at_contact();
        match w.advance() {
            AdvanceOutcome::Blocked(report) => {
                assert_eq!(report.issues[0].field, "contact.full_name")
            }
            other => panic!("expected Blocked, got {other:?}"),
        }
        assert_eq!(w.current_step(), WizardStep::Contact);
    }

    #[test]
    fn test_update_never_validates_inline() {
        let mut w = at_contact();
        assert!(w.update(FieldUpdate::Contact(ContactField::Email, "not-an-email".into())));
        assert_eq!(w.document().contact.email, "not-an-email");
    }

    #[test]
    fn test_jump_to_locked_step_rejected() {
        let mut w = at_contact();
        assert!(!w.jump_to(WizardStep::Skills));
        assert!(!w.jump_to(WizardStep::Recipient));
        assert_eq!(w.current_step(), WizardStep::Contact);
        assert!(w.jump_to(WizardStep::Template));
        assert_eq!(w.current_step(), WizardStep::Template);
    }

    #[test]
    fn test_monotonic_unlock_never_shrinks() {
        let mut w = at_contact();
        fill_contact(&mut w);
        let mut reachable = w.reachable_steps().len();
        let script: Vec<Box<dyn Fn(&mut WizardController)>> = vec![
            Box::new(|w| {
                w.advance();
            }),
            Box::new(|w| {
                w.jump_to(WizardStep::Template);
            }),
            Box::new(|w| {
                w.retreat();
            }),
            Box::new(|w| {
                w.jump_to(WizardStep::Experience);
            }),
            Box::new(|w| {
                w.advance();
            }),
            Box::new(|w| {
                w.update(FieldUpdate::Contact(ContactField::FullName, String::new()));
            }),
            Box::new(|w| {
                w.jump_to(WizardStep::Contact);
            }),
            Box::new(|w| {
                w.advance();
            }),
        ];
        for step in script {
            step(&mut w);
            let now = w.reachable_steps().len();
            assert!(now >= reachable, "reachable set shrank from {reachable} to {now}");
            reachable = now;
        }
        assert!(w.can_jump_to(WizardStep::Education));
    }

    #[test]
    fn test_later_failure_does_not_reblock_earlier_steps() {
        let mut w = at_contact();
        fill_contact(&mut w);
        assert!(matches!(w.advance(), AdvanceOutcome::Moved { .. }));
        w.update(FieldUpdate::SetExperience(vec![ExperienceEntry {
            title: "Engineer".into(),
            ..Default::default()
        }]));
        assert!(matches!(w.advance(), AdvanceOutcome::Blocked(_)));

        assert!(w.jump_to(WizardStep::Contact));
        assert!(matches!(
            w.advance(),
            AdvanceOutcome::Moved {
                to: WizardStep::Experience,
                ..
            }
        ));
        assert!(w.jump_to(WizardStep::Template));
        assert!(w.jump_to(WizardStep::Experience));
    }

    #[test]
    fn test_edits_after_unlock_do_not_relock() {
        let mut w = at_contact();
        fill_contact(&mut w);
        w.advance();
        w.update(FieldUpdate::Contact(ContactField::FullName, String::new()));
        assert!(w.jump_to(WizardStep::Experience));
    }

    #[test]
    fn test_review_is_terminal() {
        let mut w = at_contact();
        fill_contact(&mut w);
        to_review(&mut w);
        assert_eq!(w.advance(), AdvanceOutcome::AtEnd);
    }

    #[test]
    fn test_processing_only_from_last_steps() {
        let mut w = at_contact();
        assert!(!w.begin_processing());
        fill_contact(&mut w);
        to_review(&mut w);
        assert!(w.jump_to(WizardStep::Summary));
        assert!(w.begin_processing());
        assert!(w.is_processing());
    }

    #[test]
    fn test_processing_is_not_interactive() {
        let mut w = at_contact();
        fill_contact(&mut w);
        to_review(&mut w);
        assert!(w.begin_processing());

        assert_eq!(w.advance(), AdvanceOutcome::Busy);
        assert!(!w.retreat());
        assert!(!w.jump_to(WizardStep::Contact));
        assert!(!w.update(FieldUpdate::Summary("x".into())));
        assert!(!w.select_template(&template("classic")));
        assert!(!w.shows_preview());

        assert!(w.finish_processing());
        assert_eq!(w.current_step(), WizardStep::Review);
        assert!(!w.finish_processing());
    }

    #[test]
    fn test_failed_ingestion_still_usable() {
        let mut w = WizardController::new(DocumentKind::Resume);
        let err = IngestError::Extraction("corrupt file".into());
        assert!(w.apply_ingestion(Err(err)));
        assert_eq!(w.current_step(), WizardStep::Template);
        assert!(w.document().is_blank());
        assert!(!w.apply_ingestion(Ok(PartialDocument::default())));
    }

    #[test]
    fn test_successful_ingestion_merges() {
        let mut w = WizardController::new(DocumentKind::Resume);
        let partial = PartialDocument {
            summary: Some("Systems engineer".into()),
            ..Default::default()
        };
        assert!(w.apply_ingestion(Ok(partial)));
        assert_eq!(w.document().summary, "Systems engineer");
        assert_eq!(w.current_step(), WizardStep::Template);
    }

    #[test]
    fn test_select_template_rejects_unsupported_kind() {
        let mut w = WizardController::new(DocumentKind::CoverLetter);
        assert!(!w.select_template(&template("operator")));
        assert!(w.template_id().is_none());
        assert!(w.select_template(&template("researcher")));
        assert_eq!(w.template_id(), Some("researcher"));
        assert_eq!(w.style().template_id, "researcher");
    }

    #[test]
    fn test_for_existing_unlocks_everything() {
        let mut doc = DocumentModel::new(DocumentKind::Resume);
        doc.contact.full_name = "Ada".into();
        let style = StyleModel::for_template(&template("hacker"));
        let w = WizardController::for_existing(doc, style);
        assert_eq!(w.current_step(), WizardStep::Template);
        assert!(w.can_jump_to(WizardStep::Review));
        assert_eq!(w.template_id(), Some("hacker"));
    }

    #[test]
    fn test_restore_keeps_unlocked_steps() {
        let doc = DocumentModel::new(DocumentKind::Resume);
        let w = WizardController::restore(
            DocumentKind::Resume,
            doc.clone(),
            None,
            StyleModel::default(),
            3,
        );
        assert_eq!(w.current_step(), WizardStep::Import);
        assert!(w.can_jump_to(WizardStep::Experience));
        assert!(!w.can_jump_to(WizardStep::Education));

        let w =
            WizardController::restore(DocumentKind::CoverLetter, doc, None, StyleModel::default(), 99);
        assert_eq!(w.state().highest_reached, 4);
        assert!(w.can_jump_to(WizardStep::Review));
    }

    #[test]
    fn test_letter_flow() {
        let mut w = WizardController::new(DocumentKind::CoverLetter);
        w.select_template(&template("founder"));
        assert!(matches!(w.advance(), AdvanceOutcome::Moved { .. }));
        w.update(FieldUpdate::Contact(ContactField::FullName, "Sam".into()));
        w.advance();
        assert!(matches!(w.advance(), AdvanceOutcome::Blocked(_)));
        w.update(FieldUpdate::Letter(crate::document::LetterField::Company, "Initech".into()));
        w.advance();
        assert_eq!(w.current_step(), WizardStep::Body);
        assert!(w.begin_processing());
    }
}
