//! The rewrite capability seam. The engine only sees `EnhancementCapability`;
//! `LlmClient` is the production backend, tests plug in scripted doubles.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::document::{DocumentKind, DocumentModel, EducationEntry, ExperienceEntry, SkillGroup};
use crate::enhance::prompts::{ENHANCE_SYSTEM, LETTER_PROMPT_TEMPLATE, RESUME_PROMPT_TEMPLATE};
use crate::enhance::tone::{tone_guidance, Tone};
use crate::enhance::RequestKind;
use crate::llm_client::prompts::PRESERVE_FACTS_INSTRUCTION;
use crate::llm_client::{LlmClient, LlmError};

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("capability returned no content")]
    Empty,

    #[error("could not encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<LlmError> for CapabilityError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Api { status, message } => CapabilityError::Rejected { status, message },
            LlmError::EmptyContent => CapabilityError::Empty,
            other => CapabilityError::Transport(other.to_string()),
        }
    }
}

/// What the capability is asked to rewrite.
///
/// Carries only the name and headline from the contact block; email, phone and
/// address never leave the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhanceRequest {
    pub request_kind: RequestKind,
    pub document_kind: DocumentKind,
    pub tone: Tone,
    pub name: String,
    pub headline: String,
    pub narrative: String,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<SkillGroup>,
    /// Target company, for cover letters.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub company: String,
}

impl EnhanceRequest {
    pub fn from_document(doc: &DocumentModel, tone: Tone, request_kind: RequestKind) -> Self {
        Self {
            request_kind,
            document_kind: doc.kind,
            tone,
            name: doc.contact.full_name.clone(),
            headline: doc.contact.headline.clone(),
            narrative: doc.narrative().to_string(),
            experience: doc.experience.clone(),
            education: doc.education.clone(),
            skills: doc.skills.clone(),
            company: doc.letter.company.clone(),
        }
    }
}

/// An external service that rewrites document content and returns free-form text
/// expected to contain one JSON object.
#[async_trait]
pub trait EnhancementCapability: Send + Sync {
    async fn rewrite(&self, request: &EnhanceRequest) -> Result<String, CapabilityError>;
}

#[async_trait]
impl EnhancementCapability for LlmClient {
    async fn rewrite(&self, request: &EnhanceRequest) -> Result<String, CapabilityError> {
        let prompt = build_enhance_prompt(request)?;
        Ok(self.call_text(&prompt, ENHANCE_SYSTEM).await?)
    }
}

/// Stand-in used when no model is configured. Every call fails as a transport
/// error, which the engine reports as a recoverable enhancement failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCapability;

#[async_trait]
impl EnhancementCapability for DisabledCapability {
    async fn rewrite(&self, _request: &EnhanceRequest) -> Result<String, CapabilityError> {
        Err(CapabilityError::Transport(
            "enhancement is disabled: no model configured".to_string(),
        ))
    }
}

pub fn build_enhance_prompt(request: &EnhanceRequest) -> Result<String, serde_json::Error> {
    let tone_json = serde_json::to_string(&tone_guidance(request.tone))?;

    let (template, content_json) = match request.document_kind {
        DocumentKind::Resume => (
            RESUME_PROMPT_TEMPLATE,
            serde_json::to_string_pretty(&serde_json::json!({
                "name": request.name,
                "headline": request.headline,
                "summary": request.narrative,
                "experience": request.experience,
                "education": request.education,
                "skills": request.skills,
            }))?,
        ),
        DocumentKind::CoverLetter => (
            LETTER_PROMPT_TEMPLATE,
            serde_json::to_string_pretty(&serde_json::json!({
                "name": request.name,
                "headline": request.headline,
                "company": request.company,
                "body": request.narrative,
                "experience": request.experience,
                "skills": request.skills,
            }))?,
        ),
    };

    Ok(template
        .replace("{preserve_facts}", PRESERVE_FACTS_INSTRUCTION)
        .replace("{tone_json}", &tone_json)
        .replace("{content_json}", &content_json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ContactInfo;

    fn resume() -> DocumentModel {
        DocumentModel {
            contact: ContactInfo {
                full_name: "Jane Doe".into(),
                headline: "Platform Engineer".into(),
                email: "jane@example.com".into(),
                phone: "+1 555 0100".into(),
                ..Default::default()
            },
            summary: "Builds things.".into(),
            ..DocumentModel::new(DocumentKind::Resume)
        }
    }

    #[test]
    fn test_request_omits_contact_details() {
        let request = EnhanceRequest::from_document(&resume(), Tone::Confident, RequestKind::Enhance);
        let prompt = build_enhance_prompt(&request).unwrap();
        assert!(prompt.contains("Jane Doe"));
        assert!(prompt.contains("Builds things."));
        assert!(!prompt.contains("jane@example.com"));
        assert!(!prompt.contains("555 0100"));
    }

    #[test]
    fn test_letter_prompt_uses_body() {
        let mut doc = DocumentModel::new(DocumentKind::CoverLetter);
        doc.letter.body = "I am writing to apply.".into();
        doc.letter.company = "Initech".into();
        let request = EnhanceRequest::from_document(&doc, Tone::Friendly, RequestKind::Enhance);
        let prompt = build_enhance_prompt(&request).unwrap();
        assert!(prompt.contains("I am writing to apply."));
        assert!(prompt.contains("Initech"));
        assert!(prompt.contains("\"body\""));
    }

    #[test]
    fn test_llm_error_mapping() {
        let e: CapabilityError = LlmError::Api {
            status: 400,
            message: "bad".into(),
        }
        .into();
        assert!(matches!(e, CapabilityError::Rejected { status: 400, .. }));
        assert!(matches!(
            CapabilityError::from(LlmError::EmptyContent),
            CapabilityError::Empty
        ));
    }

    #[tokio::test]
    async fn test_disabled_capability_fails_as_transport() {
        let request = EnhanceRequest::from_document(&resume(), Tone::default(), RequestKind::Enhance);
        assert!(matches!(
            DisabledCapability.rewrite(&request).await,
            Err(CapabilityError::Transport(_))
        ));
    }
}
