use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::store::{RecordPayload, RemoteRecordStore, StoreError};

const MAX_CONNECTIONS: u32 = 5;

/// Postgres adapter. One row per saved document; document and style are JSONB.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await?;
        info!("PostgreSQL connection pool established");
        Ok(Self::new(pool))
    }

    /// Creates the `documents` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id          UUID PRIMARY KEY,
                user_id     UUID NOT NULL,
                kind        TEXT NOT NULL,
                document    JSONB NOT NULL,
                style       JSONB NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteRecordStore for PgRecordStore {
    async fn create(&self, payload: &RecordPayload) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO documents (id, user_id, kind, document, style)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(payload.user_id)
        .bind(payload.kind.as_str())
        .bind(&payload.document)
        .bind(&payload.style)
        .execute(&self.pool)
        .await?;

        info!("Created document {id} for user {}", payload.user_id);
        Ok(id)
    }

    async fn update(&self, id: Uuid, payload: &RecordPayload) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET document = $2, style = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&payload.document)
        .bind(&payload.style)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        info!("Updated document {id}");
        Ok(())
    }

    async fn read(&self, id: Uuid) -> Result<RecordPayload, StoreError> {
        let row = sqlx::query("SELECT user_id, kind, document, style FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        let kind: String = row.try_get("kind")?;
        Ok(RecordPayload {
            user_id: row.try_get("user_id")?,
            kind: serde_json::from_value(Value::String(kind))?,
            document: row.try_get("document")?,
            style: row.try_get("style")?,
        })
    }
}
