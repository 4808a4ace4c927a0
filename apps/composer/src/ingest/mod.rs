//! Ingestion: turns an uploaded resume (PDF or plain text) into a best-effort
//! `PartialDocument` for the wizard's import step.
//!
//! Every failure here is recoverable. The wizard logs it and keeps its defaults.

pub mod prompts;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

use crate::document::PartialDocument;
use crate::ingest::prompts::{INGEST_PROMPT, INGEST_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};

/// Text beyond this many characters is not sent to the model.
pub const MAX_SOURCE_CHARS: usize = 20_000;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("could not extract text: {0}")]
    Extraction(String),

    #[error("unsupported file '{0}': not a PDF or UTF-8 text")]
    Unsupported(String),

    #[error("file contains no text")]
    Empty,

    #[error("extraction model failed: {0}")]
    Llm(#[from] LlmError),
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Content type wins; otherwise the extension, then the `%PDF` magic bytes.
    pub fn is_pdf(&self) -> bool {
        if let Some(ct) = &self.content_type {
            return ct.eq_ignore_ascii_case("application/pdf");
        }
        self.name.to_ascii_lowercase().ends_with(".pdf") || self.bytes.starts_with(b"%PDF")
    }
}

#[async_trait]
pub trait IngestionCapability: Send + Sync {
    async fn ingest(&self, file: SourceFile) -> Result<PartialDocument, IngestError>;
}

/// Extracts the file's text: `pdf-extract` for PDFs, UTF-8 decoding otherwise.
/// The result is trimmed and capped at `MAX_SOURCE_CHARS`.
pub async fn extract_text(file: &SourceFile) -> Result<String, IngestError> {
    let text = if file.is_pdf() {
        let bytes = file.bytes.clone();
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| {
                IngestError::Extraction(format!("spawn_blocking failed in extract_text: {e}"))
            })?
            .map_err(|e| IngestError::Extraction(e.to_string()))?
    } else {
        std::str::from_utf8(&file.bytes)
            .map_err(|_| IngestError::Unsupported(file.name.clone()))?
            .to_string()
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(IngestError::Empty);
    }
    Ok(truncate_chars(trimmed, MAX_SOURCE_CHARS).to_string())
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_ingest_prompt(raw_text: &str) -> String {
    INGEST_PROMPT.replace("{raw_text}", raw_text)
}

/// Model-backed ingestion through the shared LLM client.
#[derive(Clone)]
pub struct LlmIngestor {
    llm: LlmClient,
}

impl LlmIngestor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl IngestionCapability for LlmIngestor {
    async fn ingest(&self, file: SourceFile) -> Result<PartialDocument, IngestError> {
        let text = extract_text(&file).await?;
        debug!(file = %file.name, chars = text.chars().count(), "Extracted source text");

        let partial: PartialDocument = self
            .llm
            .call_json(&build_ingest_prompt(&text), INGEST_SYSTEM)
            .await?;

        info!(
            file = %file.name,
            experience = partial.experience.as_ref().map_or(0, Vec::len),
            education = partial.education.as_ref().map_or(0, Vec::len),
            "Ingested source file"
        );
        Ok(partial)
    }
}
