//! Document Model: the canonical, style-independent content of one document.
//!
//! Every struct here is `#[serde(default)]`: a model is always fully defined, and
//! unset values are empty strings or empty sequences. Downstream consumers
//! (renderer, draft store, reconciliation) never branch on missing keys.

pub mod validation;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Kinds
// ────────────────────────────────────────────────────────────────────────────

/// The two families of documents the wizard can compose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    Resume,
    CoverLetter,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover_letter",
        }
    }

    /// Slug used in exported filenames.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover-letter",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub full_name: String,
    /// Job title or professional headline shown under the name.
    pub headline: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    FullName,
    Headline,
    Email,
    Phone,
    Location,
    Website,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    /// Empty means "present".
    pub end_date: String,
    /// Free text; one bullet per line when rendered.
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillGroup {
    pub category: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterDetails {
    pub recipient_name: String,
    pub recipient_title: String,
    pub company: String,
    pub company_address: String,
    /// Narrative body of the letter; the enhancement target for cover letters.
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterField {
    RecipientName,
    RecipientTitle,
    Company,
    CompanyAddress,
    Body,
}

// ────────────────────────────────────────────────────────────────────────────
// Document Model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentModel {
    pub kind: DocumentKind,
    pub contact: ContactInfo,
    /// Narrative summary; the enhancement target for resumes.
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<SkillGroup>,
    pub letter: LetterDetails,
}

/// A single merge into the Document Model. Never validated at apply time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum FieldUpdate {
    Contact(ContactField, String),
    Summary(String),
    SetExperience(Vec<ExperienceEntry>),
    UpsertExperience { index: usize, entry: ExperienceEntry },
    RemoveExperience(usize),
    SetEducation(Vec<EducationEntry>),
    UpsertEducation { index: usize, entry: EducationEntry },
    RemoveEducation(usize),
    SetSkills(Vec<SkillGroup>),
    Letter(LetterField, String),
}

/// The enhanceable subset of a Document Model, stored verbatim in version history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentFragment {
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<SkillGroup>,
    pub letter_body: String,
}

impl DocumentModel {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// The free-text narrative for this document's kind.
    pub fn narrative(&self) -> &str {
        match self.kind {
            DocumentKind::Resume => &self.summary,
            DocumentKind::CoverLetter => &self.letter.body,
        }
    }

    /// Merges a single update. Upserts past the end append; removals past the end are ignored.
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Contact(field, value) => *self.contact.field_mut(field) = value,
            FieldUpdate::Summary(value) => self.summary = value,
            FieldUpdate::SetExperience(entries) => self.experience = entries,
            FieldUpdate::UpsertExperience { index, entry } => {
                upsert(&mut self.experience, index, entry)
            }
            FieldUpdate::RemoveExperience(index) => remove(&mut self.experience, index),
            FieldUpdate::SetEducation(entries) => self.education = entries,
            FieldUpdate::UpsertEducation { index, entry } => {
                upsert(&mut self.education, index, entry)
            }
            FieldUpdate::RemoveEducation(index) => remove(&mut self.education, index),
            FieldUpdate::SetSkills(groups) => self.skills = groups,
            FieldUpdate::Letter(field, value) => *self.letter.field_mut(field) = value,
        }
    }

    pub fn fragment(&self) -> ContentFragment {
        ContentFragment {
            summary: self.summary.clone(),
            experience: self.experience.clone(),
            education: self.education.clone(),
            skills: self.skills.clone(),
            letter_body: self.letter.body.clone(),
        }
    }

    /// Writes a fragment back exactly as stored. No trimming or reformatting.
    pub fn apply_fragment(&mut self, fragment: &ContentFragment) {
        self.summary = fragment.summary.clone();
        self.experience = fragment.experience.clone();
        self.education = fragment.education.clone();
        self.skills = fragment.skills.clone();
        self.letter.body = fragment.letter_body.clone();
    }

    /// Merges a best-effort partial model: only non-empty values land.
    pub fn merge_partial(&mut self, partial: PartialDocument) {
        let PartialDocument {
            contact,
            summary,
            experience,
            education,
            skills,
        } = partial;

        if let Some(contact) = contact {
            let pairs = [
                (ContactField::FullName, contact.full_name),
                (ContactField::Headline, contact.headline),
                (ContactField::Email, contact.email),
                (ContactField::Phone, contact.phone),
                (ContactField::Location, contact.location),
                (ContactField::Website, contact.website),
            ];
            for (field, value) in pairs {
                if let Some(value) = non_empty(value) {
                    *self.contact.field_mut(field) = value;
                }
            }
        }
        if let Some(summary) = non_empty(summary) {
            self.summary = summary;
        }
        if let Some(entries) = experience.filter(|e| !e.is_empty()) {
            self.experience = entries;
        }
        if let Some(entries) = education.filter(|e| !e.is_empty()) {
            self.education = entries;
        }
        if let Some(groups) = skills.filter(|g| !g.is_empty()) {
            self.skills = groups;
        }
    }

    /// True when nothing has been entered yet.
    pub fn is_blank(&self) -> bool {
        let kind = self.kind;
        *self == DocumentModel::new(kind)
    }
}

impl ContactInfo {
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::FullName => &self.full_name,
            ContactField::Headline => &self.headline,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
            ContactField::Location => &self.location,
            ContactField::Website => &self.website,
        }
    }

    fn field_mut(&mut self, field: ContactField) -> &mut String {
        match field {
            ContactField::FullName => &mut self.full_name,
            ContactField::Headline => &mut self.headline,
            ContactField::Email => &mut self.email,
            ContactField::Phone => &mut self.phone,
            ContactField::Location => &mut self.location,
            ContactField::Website => &mut self.website,
        }
    }
}

impl LetterDetails {
    fn field_mut(&mut self, field: LetterField) -> &mut String {
        match field {
            LetterField::RecipientName => &mut self.recipient_name,
            LetterField::RecipientTitle => &mut self.recipient_title,
            LetterField::Company => &mut self.company,
            LetterField::CompanyAddress => &mut self.company_address,
            LetterField::Body => &mut self.body,
        }
    }
}

impl ExperienceEntry {
    /// Description split into bullet lines, blank lines and leading bullet glyphs removed.
    pub fn bullet_lines(&self) -> Vec<&str> {
        bullet_lines(&self.description)
    }
}

pub(crate) fn bullet_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|l| !l.is_empty())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Partial model (ingestion output)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialContact {
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}

/// Best-effort extraction result. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialDocument {
    pub contact: Option<PartialContact>,
    pub summary: Option<String>,
    pub experience: Option<Vec<ExperienceEntry>>,
    pub education: Option<Vec<EducationEntry>>,
    pub skills: Option<Vec<SkillGroup>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn upsert<T>(items: &mut Vec<T>, index: usize, item: T) {
    if index < items.len() {
        items[index] = item;
    } else {
        items.push(item);
    }
}

fn remove<T>(items: &mut Vec<T>, index: usize) {
    if index < items.len() {
        items.remove(index);
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
