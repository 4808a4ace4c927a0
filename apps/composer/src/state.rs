use std::sync::Arc;
use std::time::Duration;

use crate::draft::DraftStore;
use crate::enhance::EnhancementCapability;
use crate::ingest::IngestionCapability;
use crate::store::{MemoryRecordStore, RemoteRecordStore};
use crate::templates::{StaticCatalog, TemplateCatalog};

pub const DEFAULT_DRAFT_DEBOUNCE: Duration = Duration::from_millis(800);

/// Collaborators shared by every editing session. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn TemplateCatalog>,
    pub capability: Arc<dyn EnhancementCapability>,
    /// Absent when no extraction model is configured; the import step is then skipped.
    pub ingestor: Option<Arc<dyn IngestionCapability>>,
    pub drafts: DraftStore,
    pub records: Arc<dyn RemoteRecordStore>,
    pub draft_debounce: Duration,
}

impl AppState {
    /// Built-in catalog, in-memory drafts and records.
    pub fn in_memory(capability: Arc<dyn EnhancementCapability>) -> Self {
        Self {
            catalog: Arc::new(StaticCatalog::builtin()),
            capability,
            ingestor: None,
            drafts: DraftStore::memory(),
            records: Arc::new(MemoryRecordStore::default()),
            draft_debounce: DEFAULT_DRAFT_DEBOUNCE,
        }
    }
}
