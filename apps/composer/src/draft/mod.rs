//! Draft Store: crash-recovery snapshots of an in-progress wizard.
//!
//! Drafts are ephemeral. They are written on a debounce timer while the user
//! edits, read once when a fresh session starts, and deleted only after an
//! explicit save has been confirmed by the record store.

pub mod memory;
pub mod redis_backend;
pub mod scheduler;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::document::{DocumentKind, DocumentModel};
use crate::style::StyleModel;

pub use memory::MemoryDraftBackend;
pub use redis_backend::RedisDraftBackend;
pub use scheduler::DraftScheduler;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("draft encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One draft per user per document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftKey {
    pub user_id: Uuid,
    pub kind: DocumentKind,
}

impl DraftKey {
    pub fn new(user_id: Uuid, kind: DocumentKind) -> Self {
        Self { user_id, kind }
    }
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "draft:{}:{}", self.user_id, self.kind.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub collected: DocumentModel,
    pub template_id: Option<String>,
    pub style: StyleModel,
    /// Furthest wizard step unlocked when the draft was taken.
    #[serde(default)]
    pub highest_reached: usize,
    pub saved_at: DateTime<Utc>,
}

#[async_trait]
pub trait DraftBackend: Send + Sync {
    async fn put(&self, key: &DraftKey, snapshot: &DraftSnapshot) -> Result<(), DraftError>;
    async fn get(&self, key: &DraftKey) -> Result<Option<DraftSnapshot>, DraftError>;
    async fn delete(&self, key: &DraftKey) -> Result<(), DraftError>;
}

/// Thin handle over a backend. Cheap to clone.
#[derive(Clone)]
pub struct DraftStore {
    backend: Arc<dyn DraftBackend>,
}

impl DraftStore {
    pub fn new(backend: Arc<dyn DraftBackend>) -> Self {
        Self { backend }
    }

    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryDraftBackend::default()))
    }

    pub async fn load(&self, key: &DraftKey) -> Result<Option<DraftSnapshot>, DraftError> {
        let snapshot = self.backend.get(key).await?;
        debug!(%key, found = snapshot.is_some(), "Draft lookup");
        Ok(snapshot)
    }

    pub async fn save(&self, key: &DraftKey, snapshot: &DraftSnapshot) -> Result<(), DraftError> {
        self.backend.put(key, snapshot).await?;
        debug!(%key, "Draft written");
        Ok(())
    }

    pub async fn clear(&self, key: &DraftKey) -> Result<(), DraftError> {
        self.backend.delete(key).await?;
        info!(%key, "Draft cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let id = Uuid::nil();
        assert_eq!(
            DraftKey::new(id, DocumentKind::CoverLetter).to_string(),
            "draft:00000000-0000-0000-0000-000000000000:cover_letter"
        );
    }

    #[tokio::test]
    async fn test_store_roundtrip_and_clear() {
        let store = DraftStore::memory();
        let key = DraftKey::new(Uuid::new_v4(), DocumentKind::Resume);
        assert!(store.load(&key).await.unwrap().is_none());

        let mut collected = DocumentModel::new(DocumentKind::Resume);
        collected.contact.full_name = "Jane Doe".into();
        let snapshot = DraftSnapshot {
            collected,
            template_id: Some("hacker".into()),
            style: StyleModel::default(),
            highest_reached: 2,
            saved_at: Utc::now(),
        };
        store.save(&key, &snapshot).await.unwrap();
        assert_eq!(store.load(&key).await.unwrap(), Some(snapshot));

        store.clear(&key).await.unwrap();
        assert!(store.load(&key).await.unwrap().is_none());
    }
}
