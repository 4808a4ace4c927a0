use std::time::Duration;

use anyhow::{Context, Result};

/// Runtime configuration loaded from environment variables.
///
/// Every collaborator is optional: without an API key enhancement is disabled,
/// without `DATABASE_URL` / `REDIS_URL` records and drafts stay in memory.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: Option<String>,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub draft_debounce: Duration,
    pub draft_ttl_secs: u64,
    pub export_dir: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let debounce_ms = optional("DRAFT_DEBOUNCE_MS")
            .unwrap_or_else(|| "800".to_string())
            .parse::<u64>()
            .context("DRAFT_DEBOUNCE_MS must be a whole number of milliseconds")?;

        Ok(Config {
            anthropic_api_key: optional("ANTHROPIC_API_KEY"),
            anthropic_model: optional("ANTHROPIC_MODEL"),
            database_url: optional("DATABASE_URL"),
            redis_url: optional("REDIS_URL"),
            draft_debounce: Duration::from_millis(debounce_ms),
            draft_ttl_secs: optional("DRAFT_TTL_SECS")
                .unwrap_or_else(|| "604800".to_string())
                .parse::<u64>()
                .context("DRAFT_TTL_SECS must be a whole number of seconds")?,
            export_dir: optional("EXPORT_DIR").unwrap_or_else(|| "exports".to_string()),
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
