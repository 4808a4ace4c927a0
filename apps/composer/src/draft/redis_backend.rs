use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::info;

use crate::draft::{DraftBackend, DraftError, DraftKey, DraftSnapshot};

/// Redis-backed drafts. Every write refreshes the key's TTL, so abandoned
/// drafts expire on their own.
#[derive(Clone)]
pub struct RedisDraftBackend {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisDraftBackend {
    pub fn new(redis_url: &str, ttl_secs: u64) -> Result<Self, DraftError> {
        let client = redis::Client::open(redis_url)?;
        info!(ttl_secs, "Redis draft backend initialized");
        Ok(Self { client, ttl_secs })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, DraftError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl DraftBackend for RedisDraftBackend {
    async fn put(&self, key: &DraftKey, snapshot: &DraftSnapshot) -> Result<(), DraftError> {
        let json = serde_json::to_string(snapshot)?;
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key.to_string(), json, self.ttl_secs)
            .await?;
        Ok(())
    }

    async fn get(&self, key: &DraftKey) -> Result<Option<DraftSnapshot>, DraftError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(key.to_string()).await?;
        Ok(raw.map(|json| serde_json::from_str(&json)).transpose()?)
    }

    async fn delete(&self, key: &DraftKey) -> Result<(), DraftError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key.to_string()).await?;
        Ok(())
    }
}
