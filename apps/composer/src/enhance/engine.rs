use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::document::{ContentFragment, DocumentModel};
use crate::enhance::capability::{EnhanceRequest, EnhancementCapability};
use crate::enhance::fragment::{parse_response, ParsedResponse};
use crate::enhance::history::{VersionEntry, VersionHistory, VersionSummary};
use crate::enhance::reconcile::reconcile;
use crate::enhance::tone::Tone;
use crate::enhance::{EnhanceError, RequestKind};
use crate::session::SessionTicket;

/// Per-session enhancement state: the original snapshot, the version history and
/// the single-flight flag.
pub struct EnhancementEngine {
    capability: Arc<dyn EnhancementCapability>,
    original: Option<Arc<DocumentModel>>,
    history: VersionHistory,
    in_flight: Arc<AtomicBool>,
    next_run: u64,
}

/// A reconciled rewrite waiting to be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub content: ContentFragment,
    pub tone: Tone,
    pub kind: RequestKind,
    pub generated_at: DateTime<Utc>,
}

/// An enhancement ready to run. Owns everything it needs, so it can be moved
/// into a spawned task. Holds the in-flight slot until dropped.
pub struct PendingEnhancement {
    capability: Arc<dyn EnhancementCapability>,
    request: EnhanceRequest,
    pre_call: DocumentModel,
    ticket: SessionTicket,
    run_id: u64,
    _guard: InFlightGuard,
}

/// The outcome of a run, tagged with the session and run that started it.
#[derive(Debug)]
pub struct EnhancementCompletion {
    ticket: SessionTicket,
    run_id: u64,
    outcome: Result<Proposal, EnhanceError>,
}

struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(Arc::clone(flag)))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl EnhancementEngine {
    pub fn new(capability: Arc<dyn EnhancementCapability>) -> Self {
        Self {
            capability,
            original: None,
            history: VersionHistory::default(),
            in_flight: Arc::new(AtomicBool::new(false)),
            next_run: 0,
        }
    }

    /// First call captures `pre_call` as the original; every request is built
    /// from the original, never from an enhanced model.
    pub fn prepare_enhance(
        &mut self,
        pre_call: &DocumentModel,
        tone: Tone,
        ticket: SessionTicket,
    ) -> Result<PendingEnhancement, EnhanceError> {
        let guard = InFlightGuard::acquire(&self.in_flight).ok_or(EnhanceError::Busy)?;
        let original = Arc::clone(
            self.original
                .get_or_insert_with(|| Arc::new(pre_call.clone())),
        );
        Ok(self.pending(guard, &original, pre_call, tone, RequestKind::Enhance, ticket))
    }

    pub fn prepare_regenerate(
        &mut self,
        pre_call: &DocumentModel,
        tone: Tone,
        ticket: SessionTicket,
    ) -> Result<PendingEnhancement, EnhanceError> {
        let guard = InFlightGuard::acquire(&self.in_flight).ok_or(EnhanceError::Busy)?;
        let original = self
            .original
            .clone()
            .ok_or(EnhanceError::NothingToRegenerate)?;
        Ok(self.pending(guard, &original, pre_call, tone, RequestKind::Regenerate, ticket))
    }

    fn pending(
        &mut self,
        guard: InFlightGuard,
        original: &DocumentModel,
        pre_call: &DocumentModel,
        tone: Tone,
        kind: RequestKind,
        ticket: SessionTicket,
    ) -> PendingEnhancement {
        self.next_run += 1;
        PendingEnhancement {
            capability: Arc::clone(&self.capability),
            request: EnhanceRequest::from_document(original, tone, kind),
            pre_call: pre_call.clone(),
            ticket,
            run_id: self.next_run,
            _guard: guard,
        }
    }

    /// Appends an applied proposal to the history and makes it active.
    pub fn record(&mut self, proposal: Proposal) -> usize {
        self.history.push(VersionEntry {
            content: proposal.content,
            generated_at: proposal.generated_at,
            tone: proposal.tone,
            kind: proposal.kind,
        })
    }

    pub fn select(&mut self, index: usize) -> Option<ContentFragment> {
        self.history.select(index).cloned()
    }

    pub fn list(&self) -> Vec<VersionSummary> {
        self.history.list()
    }

    pub fn history(&self) -> &VersionHistory {
        &self.history
    }

    pub fn original(&self) -> Option<&DocumentModel> {
        self.original.as_deref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl PendingEnhancement {
    pub fn request(&self) -> &EnhanceRequest {
        &self.request
    }

    /// Distinct for every run prepared by the same engine.
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Calls the capability and reconciles. Never touches session state; the
    /// in-flight slot is released when this returns or is cancelled.
    pub async fn run(self) -> EnhancementCompletion {
        let started = Instant::now();
        let kind = self.request.request_kind;
        let tone = self.request.tone;

        let outcome = match self.capability.rewrite(&self.request).await {
            Ok(text) => match parse_response(&text, self.request.document_kind) {
                ParsedResponse::Fragment(fragment) => Ok(Proposal {
                    content: reconcile(&self.pre_call, &fragment),
                    tone,
                    kind,
                    generated_at: Utc::now(),
                }),
                ParsedResponse::Malformed { reason } => {
                    warn!(session = %self.ticket.session_id(), %reason, "Discarding malformed enhancement");
                    Err(EnhanceError::Malformed(reason))
                }
            },
            Err(e) => {
                warn!(session = %self.ticket.session_id(), error = %e, "Enhancement call failed");
                Err(EnhanceError::Capability(e))
            }
        };

        info!(
            session = %self.ticket.session_id(),
            run = self.run_id,
            ?kind,
            ?tone,
            ok = outcome.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Enhancement finished"
        );

        EnhancementCompletion {
            ticket: self.ticket,
            run_id: self.run_id,
            outcome,
        }
    }
}

impl EnhancementCompletion {
    pub fn session_id(&self) -> Uuid {
        self.ticket.session_id()
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// False once the originating session has been closed.
    pub fn is_current(&self) -> bool {
        self.ticket.is_live()
    }

    pub fn outcome(&self) -> &Result<Proposal, EnhanceError> {
        &self.outcome
    }

    pub fn into_outcome(self) -> Result<Proposal, EnhanceError> {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentKind;
    use crate::enhance::testing::ScriptedCapability;

    fn doc(summary: &str) -> DocumentModel {
        let mut doc = DocumentModel::new(DocumentKind::Resume);
        doc.contact.full_name = "Jane Doe".into();
        doc.summary = summary.into();
        doc
    }

    fn ticket() -> SessionTicket {
        SessionTicket::new(Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_second_call_while_in_flight_is_busy() {
        let cap = ScriptedCapability::replying(&[r#"{"summary": "Better"}"#]);
        let mut engine = EnhancementEngine::new(cap.clone());

        let first = engine
            .prepare_enhance(&doc("orig"), Tone::Confident, ticket())
            .unwrap();
        assert!(engine.is_in_flight());
        assert!(matches!(
            engine.prepare_enhance(&doc("orig"), Tone::Confident, ticket()),
            Err(EnhanceError::Busy)
        ));
        assert!(matches!(
            engine.prepare_regenerate(&doc("orig"), Tone::Confident, ticket()),
            Err(EnhanceError::Busy)
        ));

        let completion = first.run().await;
        assert!(completion.outcome().is_ok());
        assert_eq!(cap.calls(), 1);
        assert!(!engine.is_in_flight());
    }

    #[test]
    fn test_dropping_pending_releases_slot() {
        let cap = ScriptedCapability::replying(&[]);
        let mut engine = EnhancementEngine::new(cap);
        let pending = engine
            .prepare_enhance(&doc("orig"), Tone::Professional, ticket())
            .unwrap();
        drop(pending);
        assert!(!engine.is_in_flight());
        assert!(engine
            .prepare_enhance(&doc("orig"), Tone::Professional, ticket())
            .is_ok());
    }

    #[test]
    fn test_regenerate_without_original() {
        let mut engine = EnhancementEngine::new(ScriptedCapability::replying(&[]));
        assert!(matches!(
            engine.prepare_regenerate(&doc("x"), Tone::Professional, ticket()),
            Err(EnhanceError::NothingToRegenerate)
        ));
        assert!(!engine.is_in_flight());
    }

    #[tokio::test]
    async fn test_regenerate_reads_original_not_enhanced() {
        let cap = ScriptedCapability::replying(&[
            r#"{"summary": "Enhanced once"}"#,
            r#"{"summary": "Enhanced twice"}"#,
        ]);
        let mut engine = EnhancementEngine::new(cap.clone());

        let first = engine
            .prepare_enhance(&doc("orig"), Tone::Professional, ticket())
            .unwrap()
            .run()
            .await
            .into_outcome()
            .unwrap();
        assert_eq!(first.content.summary, "Enhanced once");
        engine.record(first);

        // The live model now holds the enhanced text.
        let second = engine
            .prepare_regenerate(&doc("Enhanced once"), Tone::Concise, ticket())
            .unwrap()
            .run()
            .await
            .into_outcome()
            .unwrap();
        assert_eq!(second.kind, RequestKind::Regenerate);
        assert_eq!(second.tone, Tone::Concise);

        let seen = cap.requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].narrative, "orig");
        assert_eq!(seen[1].narrative, "orig");
        assert_eq!(engine.original().map(|d| d.summary.as_str()), Some("orig"));
    }

    #[tokio::test]
    async fn test_malformed_response_is_error() {
        let cap = ScriptedCapability::replying(&["sorry, no json today"]);
        let mut engine = EnhancementEngine::new(cap);
        let completion = engine
            .prepare_enhance(&doc("orig"), Tone::Professional, ticket())
            .unwrap()
            .run()
            .await;
        assert!(matches!(completion.outcome(), Err(EnhanceError::Malformed(_))));
        assert!(engine.history().is_empty());
    }

    #[tokio::test]
    async fn test_capability_failure_is_error() {
        let cap = ScriptedCapability::failing();
        let mut engine = EnhancementEngine::new(cap);
        let completion = engine
            .prepare_enhance(&doc("orig"), Tone::Professional, ticket())
            .unwrap()
            .run()
            .await;
        assert!(matches!(completion.outcome(), Err(EnhanceError::Capability(_))));
        assert!(!engine.is_in_flight());
    }

    #[tokio::test]
    async fn test_reconciles_against_pre_call_model() {
        let cap = ScriptedCapability::replying(&[r#"{"experience": [{"description": "New"}]}"#]);
        let mut engine = EnhancementEngine::new(cap);
        let mut pre_call = doc("orig");
        pre_call.experience = vec![crate::document::ExperienceEntry {
            title: "Engineer".into(),
            company: "Acme".into(),
            description: "Old".into(),
            ..Default::default()
        }];
        let proposal = engine
            .prepare_enhance(&pre_call, Tone::Professional, ticket())
            .unwrap()
            .run()
            .await
            .into_outcome()
            .unwrap();
        assert_eq!(proposal.content.summary, "orig");
        assert_eq!(proposal.content.experience[0].title, "Engineer");
        assert_eq!(proposal.content.experience[0].description, "New");
    }

    #[tokio::test]
    async fn test_each_run_gets_its_own_id() {
        let cap = ScriptedCapability::replying(&[r#"{"summary": "a"}"#, r#"{"summary": "b"}"#]);
        let mut engine = EnhancementEngine::new(cap);

        let first = engine
            .prepare_enhance(&doc("orig"), Tone::Professional, ticket())
            .unwrap();
        let first_id = first.run_id();
        let first_done = first.run().await;
        assert_eq!(first_done.run_id(), first_id);

        let second = engine
            .prepare_regenerate(&doc("a"), Tone::Professional, ticket())
            .unwrap();
        assert_ne!(second.run_id(), first_id);
        assert_eq!(second.run().await.run_id(), first_id + 1);
    }

    #[tokio::test]
    async fn test_completion_reports_closed_ticket() {
        let cap = ScriptedCapability::replying(&[r#"{"summary": "x"}"#]);
        let mut engine = EnhancementEngine::new(cap);
        let t = ticket();
        let pending = engine
            .prepare_enhance(&doc("orig"), Tone::Professional, t.clone())
            .unwrap();
        t.revoke();
        let completion = pending.run().await;
        assert!(!completion.is_current());
        assert_eq!(completion.session_id(), t.session_id());
    }
}
