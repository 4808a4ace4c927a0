//! Remote Record Store: durable home of saved documents.
//!
//! The pipeline only needs create, update and read. Payloads carry the document
//! and style as opaque JSON so adapters never depend on model internals.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::document::{DocumentKind, DocumentModel};
use crate::style::StyleModel;

pub use memory::MemoryRecordStore;
pub use pg::PgRecordStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPayload {
    pub user_id: Uuid,
    pub kind: DocumentKind,
    pub document: Value,
    pub style: Value,
}

impl RecordPayload {
    pub fn encode(
        user_id: Uuid,
        document: &DocumentModel,
        style: &StyleModel,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            user_id,
            kind: document.kind,
            document: serde_json::to_value(document)?,
            style: serde_json::to_value(style)?,
        })
    }

    pub fn decode(&self) -> Result<(DocumentModel, StyleModel), StoreError> {
        let mut document: DocumentModel = serde_json::from_value(self.document.clone())?;
        document.kind = self.kind;
        let style: StyleModel = serde_json::from_value(self.style.clone())?;
        Ok((document, style))
    }
}

#[async_trait]
pub trait RemoteRecordStore: Send + Sync {
    async fn create(&self, payload: &RecordPayload) -> Result<Uuid, StoreError>;
    async fn update(&self, id: Uuid, payload: &RecordPayload) -> Result<(), StoreError>;
    async fn read(&self, id: Uuid) -> Result<RecordPayload, StoreError>;
}
