use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::draft::{DraftBackend, DraftError, DraftKey, DraftSnapshot};

/// In-process backend. Snapshots are kept as JSON so encoding issues surface
/// the same way they would against Redis.
#[derive(Default)]
pub struct MemoryDraftBackend {
    entries: RwLock<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryDraftBackend {
    /// Number of successful `put` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DraftBackend for MemoryDraftBackend {
    async fn put(&self, key: &DraftKey, snapshot: &DraftSnapshot) -> Result<(), DraftError> {
        let json = serde_json::to_string(snapshot)?;
        self.entries.write().await.insert(key.to_string(), json);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, key: &DraftKey) -> Result<Option<DraftSnapshot>, DraftError> {
        let entries = self.entries.read().await;
        entries
            .get(&key.to_string())
            .map(|json| serde_json::from_str(json))
            .transpose()
            .map_err(DraftError::from)
    }

    async fn delete(&self, key: &DraftKey) -> Result<(), DraftError> {
        self.entries.write().await.remove(&key.to_string());
        Ok(())
    }
}
