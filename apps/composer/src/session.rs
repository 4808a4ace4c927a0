//! Editing Session: one wizard, one document, one lifetime.
//!
//! The session owns the Wizard Controller, the Enhancement Engine and the draft
//! scheduler. Every mutation flows through `&mut EditingSession`, so async
//! completions are applied one at a time and never interleave.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::document::{DocumentKind, DocumentModel, FieldUpdate};
use crate::draft::{DraftKey, DraftScheduler, DraftSnapshot};
use crate::enhance::{
    EnhanceError, EnhancementCompletion, EnhancementEngine, PendingEnhancement, Tone,
    VersionSummary,
};
use crate::errors::SessionError;
use crate::export::{artifact_filename, ExportArtifact, ExportEngine, ExportMode};
use crate::ingest::{IngestionCapability, SourceFile};
use crate::render::{render, RenderOptions, VisualTree};
use crate::state::AppState;
use crate::store::{RecordPayload, RemoteRecordStore};
use crate::style::{ColorScheme, StyleModel, TypographyScale};
use crate::templates::{Template, TemplateCatalog};
use crate::wizard::{AdvanceOutcome, WizardController, WizardStep};

/// Identity plus liveness of a session. Travels with every pending
/// enhancement so late results can tell whether anyone is still listening.
#[derive(Debug, Clone)]
pub struct SessionTicket {
    session_id: Uuid,
    live: Arc<AtomicBool>,
}

impl SessionTicket {
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    pub fn revoke(&self) {
        self.live.store(false, Ordering::Release);
    }
}

/// What became of a finished enhancement.
#[derive(Debug)]
pub enum EnhancementOutcome {
    /// Applied to the live document and recorded at `version`.
    Applied { version: usize },
    /// The call failed; the document keeps its pre-call content.
    Failed(EnhanceError),
    /// The result arrived for a closed or foreign session, or for a cancelled
    /// run, and was dropped.
    Discarded,
}

pub struct EditingSession {
    ticket: SessionTicket,
    user_id: Uuid,
    controller: WizardController,
    engine: EnhancementEngine,
    drafts: DraftScheduler,
    catalog: Arc<dyn TemplateCatalog>,
    record_id: Option<Uuid>,
    // Run whose completion may still be applied; cleared on finish and cancel.
    active_run: Option<u64>,
}

impl EditingSession {
    // ── lifecycle ────────────────────────────────────────────────────────────

    /// Starts a new document. The user's draft for `kind` is loaded here and
    /// nowhere else; an unreadable draft counts as no draft.
    pub async fn start_fresh(state: &AppState, user_id: Uuid, kind: DocumentKind) -> Self {
        let key = DraftKey::new(user_id, kind);
        let draft = match state.drafts.load(&key).await {
            Ok(draft) => draft,
            Err(e) => {
                warn!(%key, error = %e, "Draft load failed, starting blank");
                None
            }
        };

        let controller = match draft {
            Some(snapshot) => {
                info!(%key, saved_at = %snapshot.saved_at, "Restored draft");
                WizardController::restore(
                    kind,
                    snapshot.collected,
                    snapshot.template_id,
                    snapshot.style,
                    snapshot.highest_reached,
                )
            }
            None => WizardController::new(kind),
        };
        Self::assemble(state, user_id, controller, None)
    }

    /// Opens a saved record for editing. Drafts are never consulted.
    pub async fn open_existing(
        state: &AppState,
        store: &dyn RemoteRecordStore,
        record_id: Uuid,
    ) -> Result<Self, SessionError> {
        let payload = store.read(record_id).await?;
        let (document, style) = payload.decode()?;
        info!(%record_id, kind = document.kind.as_str(), "Opened existing record");
        let controller = WizardController::for_existing(document, style);
        Ok(Self::assemble(
            state,
            payload.user_id,
            controller,
            Some(record_id),
        ))
    }

    fn assemble(
        state: &AppState,
        user_id: Uuid,
        controller: WizardController,
        record_id: Option<Uuid>,
    ) -> Self {
        let key = DraftKey::new(user_id, controller.kind());
        let ticket = SessionTicket::new(Uuid::new_v4());
        info!(session = %ticket.session_id(), %key, "Editing session started");
        Self {
            ticket,
            user_id,
            controller,
            engine: EnhancementEngine::new(Arc::clone(&state.capability)),
            drafts: DraftScheduler::new(state.drafts.clone(), key, state.draft_debounce),
            catalog: Arc::clone(&state.catalog),
            record_id,
            active_run: None,
        }
    }

    /// Ends the session. Pending draft writes are dropped and any enhancement
    /// still in flight will be discarded when it lands.
    pub fn close(&mut self) {
        if !self.ticket.is_live() {
            return;
        }
        self.ticket.revoke();
        self.drafts.cancel();
        info!(session = %self.id(), "Editing session closed");
    }

    // ── accessors ────────────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.ticket.session_id()
    }

    pub fn is_live(&self) -> bool {
        self.ticket.is_live()
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn record_id(&self) -> Option<Uuid> {
        self.record_id
    }

    pub fn controller(&self) -> &WizardController {
        &self.controller
    }

    pub fn document(&self) -> &DocumentModel {
        self.controller.document()
    }

    pub fn style(&self) -> &StyleModel {
        self.controller.style()
    }

    pub fn versions(&self) -> Vec<VersionSummary> {
        self.engine.list()
    }

    /// The pre-enhancement snapshot, once the first enhancement has started.
    pub fn original(&self) -> Option<&DocumentModel> {
        self.engine.original()
    }

    // ── wizard ───────────────────────────────────────────────────────────────

    pub fn advance(&mut self) -> AdvanceOutcome {
        self.controller.advance()
    }

    pub fn retreat(&mut self) -> bool {
        self.controller.retreat()
    }

    pub fn jump_to(&mut self, step: WizardStep) -> bool {
        self.controller.jump_to(step)
    }

    /// Merges an edit and restarts the draft timer.
    pub fn update(&mut self, update: FieldUpdate) -> bool {
        if !self.is_live() || !self.controller.update(update) {
            return false;
        }
        self.schedule_draft();
        true
    }

    pub fn select_template(&mut self, template_id: &str) -> Result<bool, SessionError> {
        let template = self
            .catalog
            .get_template(template_id)
            .ok_or_else(|| SessionError::UnknownTemplate(template_id.to_string()))?;
        let changed = self.is_live() && self.controller.select_template(&template);
        if changed {
            self.schedule_draft();
        }
        Ok(changed)
    }

    pub fn set_typography(&mut self, scale: TypographyScale) -> bool {
        let changed = self.is_live() && self.controller.set_typography(scale);
        if changed {
            self.schedule_draft();
        }
        changed
    }

    pub fn set_color_scheme(&mut self, colors: ColorScheme) -> bool {
        let changed = self.is_live() && self.controller.set_color_scheme(colors);
        if changed {
            self.schedule_draft();
        }
        changed
    }

    /// Runs the import step. Ingestion failures are absorbed by the controller.
    pub async fn import(&mut self, ingestor: &dyn IngestionCapability, file: SourceFile) -> bool {
        if !self.is_live() || self.controller.current_step() != WizardStep::Import {
            return false;
        }
        let result = ingestor.ingest(file).await;
        let applied = self.controller.apply_ingestion(result);
        if applied {
            self.schedule_draft();
        }
        applied
    }

    pub fn skip_import(&mut self) -> bool {
        self.controller.skip_ingestion()
    }

    // ── enhancement ──────────────────────────────────────────────────────────

    /// Enters processing and hands back the call to run. The session accepts
    /// no edits until `finish_enhancement` or `cancel_enhancement`.
    pub fn start_enhancement(&mut self, tone: Tone) -> Result<PendingEnhancement, SessionError> {
        self.start(tone, false)
    }

    /// Like `start_enhancement`, but rewrites the original snapshot again.
    pub fn start_regeneration(&mut self, tone: Tone) -> Result<PendingEnhancement, SessionError> {
        self.start(tone, true)
    }

    fn start(&mut self, tone: Tone, regenerate: bool) -> Result<PendingEnhancement, SessionError> {
        if !self.is_live() {
            return Err(SessionError::Closed);
        }
        if self.controller.is_processing() {
            return Err(EnhanceError::Busy.into());
        }
        let step = self.controller.current_step();
        if !self.controller.can_begin_processing() {
            return Err(SessionError::NotReady(step));
        }

        let pre_call = self.controller.document().clone();
        let pending = if regenerate {
            self.engine
                .prepare_regenerate(&pre_call, tone, self.ticket.clone())?
        } else {
            self.engine
                .prepare_enhance(&pre_call, tone, self.ticket.clone())?
        };

        self.active_run = Some(pending.run_id());
        self.controller.begin_processing();
        self.drafts.suspend();
        info!(session = %self.id(), run = pending.run_id(), ?tone, regenerate, "Enhancement started");
        Ok(pending)
    }

    /// Applies a completion. Results for another session, a closed session or
    /// a cancelled run are dropped without touching any state.
    pub fn finish_enhancement(&mut self, completion: EnhancementCompletion) -> EnhancementOutcome {
        if completion.session_id() != self.id()
            || !completion.is_current()
            || !self.controller.is_processing()
            || self.active_run != Some(completion.run_id())
        {
            info!(
                session = %self.id(),
                origin = %completion.session_id(),
                run = completion.run_id(),
                "Discarding enhancement result for inactive run"
            );
            return EnhancementOutcome::Discarded;
        }

        let outcome = match completion.into_outcome() {
            Ok(proposal) => {
                self.controller.commit_fragment(&proposal.content);
                let version = self.engine.record(proposal);
                EnhancementOutcome::Applied { version }
            }
            Err(e) => {
                warn!(session = %self.id(), error = %e, "Enhancement failed, keeping current content");
                EnhancementOutcome::Failed(e)
            }
        };

        self.leave_processing();
        outcome
    }

    /// Leaves processing without waiting for the call. Its result, if it ever
    /// arrives, is discarded.
    pub fn cancel_enhancement(&mut self) -> bool {
        if !self.controller.is_processing() {
            return false;
        }
        info!(session = %self.id(), "Enhancement cancelled");
        self.leave_processing();
        true
    }

    pub async fn enhance(&mut self, tone: Tone) -> Result<EnhancementOutcome, SessionError> {
        let pending = self.start_enhancement(tone)?;
        let completion = pending.run().await;
        Ok(self.finish_enhancement(completion))
    }

    pub async fn regenerate(&mut self, tone: Tone) -> Result<EnhancementOutcome, SessionError> {
        let pending = self.start_regeneration(tone)?;
        let completion = pending.run().await;
        Ok(self.finish_enhancement(completion))
    }

    /// Makes a recorded version live. History length never changes.
    pub fn select_version(&mut self, index: usize) -> bool {
        if !self.is_live() || self.controller.is_processing() {
            return false;
        }
        let Some(fragment) = self.engine.select(index) else {
            return false;
        };
        self.controller.commit_fragment(&fragment);
        self.schedule_draft();
        info!(session = %self.id(), index, "Version selected");
        true
    }

    fn leave_processing(&mut self) {
        self.active_run = None;
        self.controller.finish_processing();
        self.drafts.resume();
        self.schedule_draft();
    }

    // ── projection ───────────────────────────────────────────────────────────

    /// The live preview, when the current step shows one and a template is set.
    pub fn preview(&self, scale: f32) -> Option<VisualTree> {
        if !self.controller.shows_preview() {
            return None;
        }
        let template = self.template().ok()?;
        Some(render(
            self.document(),
            self.style(),
            &template,
            RenderOptions { scale },
        ))
    }

    /// Renders at unit scale and writes a PDF. The document is never modified.
    pub async fn export(&self, mode: ExportMode) -> Result<ExportArtifact, SessionError> {
        let template = self.template()?;
        let tree = render(
            self.document(),
            self.style(),
            &template,
            RenderOptions::default(),
        );
        let artifact = ExportEngine::new(mode)
            .export(&tree, artifact_filename(self.document()))
            .await?;
        Ok(artifact)
    }

    fn template(&self) -> Result<Template, SessionError> {
        let id = self.controller.template_id().ok_or(SessionError::NoTemplate)?;
        self.catalog
            .get_template(id)
            .ok_or_else(|| SessionError::UnknownTemplate(id.to_string()))
    }

    // ── persistence ──────────────────────────────────────────────────────────

    /// Pushes the document and style to the record store: create on first save,
    /// update afterwards. The draft is cleared only once the store confirms.
    pub async fn save(&mut self, store: &dyn RemoteRecordStore) -> Result<Uuid, SessionError> {
        let payload = RecordPayload::encode(self.user_id, self.document(), self.style())?;
        let result = match self.record_id {
            Some(id) => store.update(id, &payload).await.map(|()| id),
            None => store.create(&payload).await,
        };

        let id = match result {
            Ok(id) => id,
            Err(e) => {
                error!(session = %self.id(), error = %e, "Save failed, draft kept");
                return Err(SessionError::Persistence(e));
            }
        };
        self.record_id = Some(id);

        if let Err(e) = self.drafts.clear().await {
            warn!(session = %self.id(), error = %e, "Draft clear failed after save");
        }
        info!(session = %self.id(), record_id = %id, "Document saved");
        Ok(id)
    }

    fn schedule_draft(&mut self) {
        self.drafts.schedule(DraftSnapshot {
            collected: self.controller.document().clone(),
            template_id: self.controller.template_id().map(str::to_string),
            style: self.controller.style().clone(),
            highest_reached: self.controller.state().highest_reached,
            saved_at: Utc::now(),
        });
    }
}

impl Drop for EditingSession {
    fn drop(&mut self) {
        self.ticket.revoke();
    }
}
