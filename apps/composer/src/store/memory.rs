use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{RecordPayload, RemoteRecordStore, StoreError};

/// In-process record store. `set_available(false)` makes every call fail,
/// which is how callers exercise the persistence-failure path.
pub struct MemoryRecordStore {
    records: RwLock<HashMap<Uuid, RecordPayload>>,
    available: AtomicBool,
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }
}

impl MemoryRecordStore {
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store offline".to_string()))
        }
    }
}

#[async_trait]
impl RemoteRecordStore for MemoryRecordStore {
    async fn create(&self, payload: &RecordPayload) -> Result<Uuid, StoreError> {
        self.check()?;
        let id = Uuid::new_v4();
        self.records.write().await.insert(id, payload.clone());
        Ok(id)
    }

    async fn update(&self, id: Uuid, payload: &RecordPayload) -> Result<(), StoreError> {
        self.check()?;
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        *record = payload.clone();
        Ok(())
    }

    async fn read(&self, id: Uuid) -> Result<RecordPayload, StoreError> {
        self.check()?;
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }
}
