//! Step-local validation.
//!
//! Rules are evaluated only when the wizard tries to leave a step. A failing report
//! blocks `advance()` for that step alone; earlier steps are never re-checked.
//! Hints are advisory and never block.

use serde::{Deserialize, Serialize};

use crate::document::{bullet_lines, DocumentModel};
use crate::wizard::steps::WizardStep;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Dotted path of the offending field, e.g. `experience[1].company`.
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub issues: Vec<FieldIssue>,
    /// Non-blocking writing suggestions.
    pub hints: Vec<String>,
}

impl ValidationReport {
    fn from_parts(issues: Vec<FieldIssue>, hints: Vec<String>) -> Self {
        Self {
            passed: issues.is_empty(),
            issues,
            hints,
        }
    }
}

const VAGUE_VERBS: &[&str] = &[
    "helped",
    "worked on",
    "assisted",
    "participated",
    "involved in",
    "responsible for",
];

/// Validates the fields owned by `step`.
pub fn validate_step(
    step: WizardStep,
    doc: &DocumentModel,
    template_id: Option<&str>,
) -> ValidationReport {
    let mut issues = Vec::new();
    let mut hints = Vec::new();

    match step {
        WizardStep::Template => {
            if template_id.map_or(true, |id| id.trim().is_empty()) {
                issues.push(issue("template_id", "Choose a template to continue"));
            }
        }
        WizardStep::Contact => {
            if doc.contact.full_name.trim().is_empty() {
                issues.push(issue("contact.full_name", "Name is required"));
            }
            let email = doc.contact.email.trim();
            if !email.is_empty() && !looks_like_email(email) {
                issues.push(issue("contact.email", "Enter a valid email address"));
            }
        }
        WizardStep::Experience => {
            for (i, entry) in doc.experience.iter().enumerate() {
                if entry.title.trim().is_empty() {
                    issues.push(issue(
                        &format!("experience[{i}].title"),
                        "Job title is required",
                    ));
                }
                if entry.company.trim().is_empty() {
                    issues.push(issue(
                        &format!("experience[{i}].company"),
                        "Company is required",
                    ));
                }
                hints.extend(
                    bullet_lines(&entry.description)
                        .into_iter()
                        .filter_map(impact_hint),
                );
            }
        }
        WizardStep::Education => {
            for (i, entry) in doc.education.iter().enumerate() {
                if entry.institution.trim().is_empty() {
                    issues.push(issue(
                        &format!("education[{i}].institution"),
                        "Institution is required",
                    ));
                }
            }
        }
        WizardStep::Recipient => {
            if doc.letter.company.trim().is_empty() {
                issues.push(issue("letter.company", "Company name is required"));
            }
        }
        WizardStep::Body => {
            if doc.letter.body.trim().is_empty() {
                issues.push(issue("letter.body", "Write the body of your letter"));
            }
        }
        WizardStep::Import
        | WizardStep::Skills
        | WizardStep::Summary
        | WizardStep::Review
        | WizardStep::Processing => {}
    }

    ValidationReport::from_parts(issues, hints)
}

/// Flags a description line that uses a vague verb and carries no number.
fn impact_hint(line: &str) -> Option<String> {
    if line.chars().any(|c| c.is_ascii_digit()) || line.contains('%') || line.contains('$') {
        return None;
    }
    let lower = line.to_lowercase();
    VAGUE_VERBS
        .iter()
        .find(|verb| lower.contains(*verb))
        .map(|verb| format!("'{line}': replace '{verb}' with a concrete, measurable outcome"))
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn issue(field: &str, message: &str) -> FieldIssue {
    FieldIssue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentKind, ExperienceEntry};

    #[test]
    fn test_contact_requires_name() {
        let doc = DocumentModel::new(DocumentKind::Resume);
        let r = validate_step(WizardStep::Contact, &doc, None);
        assert!(!r.passed);
        assert_eq!(r.issues[0].field, "contact.full_name");
    }

    #[test]
    fn test_contact_rejects_bad_email_only_when_present() {
        let mut doc = DocumentModel::new(DocumentKind::Resume);
        doc.contact.full_name = "Ada".into();
        assert!(validate_step(WizardStep::Contact, &doc, None).passed);
        doc.contact.email = "ada.example.com".into();
        assert!(!validate_step(WizardStep::Contact, &doc, None).passed);
        doc.contact.email = "ada@example.com".into();
        assert!(validate_step(WizardStep::Contact, &doc, None).passed);
    }

    #[test]
    fn test_template_step_needs_selection() {
        let doc = DocumentModel::new(DocumentKind::Resume);
        assert!(!validate_step(WizardStep::Template, &doc, None).passed);
        assert!(!validate_step(WizardStep::Template, &doc, Some(" ")).passed);
        assert!(validate_step(WizardStep::Template, &doc, Some("classic")).passed);
    }

    #[test]
    fn test_experience_zero_entries_passes() {
        let doc = DocumentModel::new(DocumentKind::Resume);
        assert!(validate_step(WizardStep::Experience, &doc, None).passed);
    }

    #[test]
    fn test_experience_entry_fields_indexed() {
        let mut doc = DocumentModel::new(DocumentKind::Resume);
        doc.experience = vec![
            ExperienceEntry {
                title: "Dev".into(),
                company: "Acme".into(),
                ..Default::default()
            },
            ExperienceEntry {
                title: "Dev".into(),
                ..Default::default()
            },
        ];
        let r = validate_step(WizardStep::Experience, &doc, None);
        assert!(!r.passed);
        assert_eq!(r.issues.len(), 1);
        assert_eq!(r.issues[0].field, "experience[1].company");
    }

    #[test]
    fn test_vague_description_is_hint_not_issue() {
        let mut doc = DocumentModel::new(DocumentKind::Resume);
        doc.experience = vec![ExperienceEntry {
            title: "Dev".into(),
            company: "Acme".into(),
            description: "Helped the team ship features\nCut build time by 40%".into(),
            ..Default::default()
        }];
        let r = validate_step(WizardStep::Experience, &doc, None);
        assert!(r.passed);
        assert_eq!(r.hints.len(), 1);
        assert!(r.hints[0].contains("helped"));
    }

    #[test]
    fn test_letter_steps() {
        let mut doc = DocumentModel::new(DocumentKind::CoverLetter);
        assert!(!validate_step(WizardStep::Recipient, &doc, None).passed);
        assert!(!validate_step(WizardStep::Body, &doc, None).passed);
        doc.letter.company = "Initech".into();
        doc.letter.body = "Dear hiring team".into();
        assert!(validate_step(WizardStep::Recipient, &doc, None).passed);
        assert!(validate_step(WizardStep::Body, &doc, None).passed);
    }

    #[test]
    fn test_steps_without_rules_pass() {
        let doc = DocumentModel::new(DocumentKind::Resume);
        for step in [WizardStep::Import, WizardStep::Skills, WizardStep::Summary] {
            assert!(validate_step(step, &doc, None).passed);
        }
    }
}
