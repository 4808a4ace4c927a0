//! Lenient parsing of capability output into a partial rewrite.
//!
//! Every field of an `EnhancedFragment` is optional. A key that is missing or
//! has the wrong JSON type is treated as "no replacement"; only output with no
//! JSON object at all, or an object carrying none of the known keys, counts as
//! malformed.

use serde_json::Value;

use crate::document::DocumentKind;
use crate::llm_client::extract_json_object;

/// Result of interpreting one capability response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    Fragment(EnhancedFragment),
    Malformed { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnhancedFragment {
    pub summary: Option<String>,
    pub letter_body: Option<String>,
    pub experience: Option<Vec<EnhancedExperience>>,
    pub education: Option<Vec<EnhancedEducation>>,
    pub skills: Option<Vec<EnhancedSkillGroup>>,
}

/// Positional replacement for one experience entry. `None` keeps the existing value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnhancedExperience {
    pub title: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnhancedEducation {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnhancedSkillGroup {
    pub category: Option<String>,
    pub items: Option<Vec<String>>,
}

impl EnhancedFragment {
    fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.letter_body.is_none()
            && self.experience.is_none()
            && self.education.is_none()
            && self.skills.is_none()
    }
}

/// `kind` decides where the shared `narrative` key lands: the summary of a
/// resume, the body of a letter. Keys belonging to the other kind are ignored.
pub fn parse_response(text: &str, kind: DocumentKind) -> ParsedResponse {
    let Some(json) = extract_json_object(text) else {
        return ParsedResponse::Malformed {
            reason: "no JSON object in response".to_string(),
        };
    };

    let value: Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            return ParsedResponse::Malformed {
                reason: format!("invalid JSON: {e}"),
            }
        }
    };

    let (summary, letter_body) = match kind {
        DocumentKind::Resume => (string_field(&value, &["summary", "narrative"]), None),
        DocumentKind::CoverLetter => (
            None,
            string_field(&value, &["body", "letter_body", "narrative"]),
        ),
    };

    let fragment = EnhancedFragment {
        summary,
        letter_body,
        experience: value
            .get("experience")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().map(parse_experience).collect()),
        education: value
            .get("education")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().map(parse_education).collect()),
        skills: value
            .get("skills")
            .and_then(|v| v.as_array())
            .map(|items| parse_skills(items)),
    };

    if fragment.is_empty() {
        return ParsedResponse::Malformed {
            reason: "response carries no enhanceable fields".to_string(),
        };
    }

    ParsedResponse::Fragment(fragment)
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| value.get(*k).and_then(|v| v.as_str()))
        .map(str::to_string)
}

// Non-object array elements become all-`None` entries so positions stay aligned.
fn parse_experience(value: &Value) -> EnhancedExperience {
    let description = string_field(value, &["description"]).or_else(|| {
        value.get("bullets").and_then(|v| v.as_array()).map(|bullets| {
            bullets
                .iter()
                .filter_map(|b| b.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
    });

    EnhancedExperience {
        title: string_field(value, &["title"]),
        company: string_field(value, &["company"]),
        description,
    }
}

fn parse_education(value: &Value) -> EnhancedEducation {
    EnhancedEducation {
        degree: string_field(value, &["degree"]),
        institution: string_field(value, &["institution"]),
        details: string_field(value, &["details"]),
    }
}

fn parse_skills(items: &[Value]) -> Vec<EnhancedSkillGroup> {
    // A flat list of strings is read as the items of a single group.
    if !items.is_empty() && items.iter().all(Value::is_string) {
        return vec![EnhancedSkillGroup {
            category: None,
            items: Some(
                items
                    .iter()
                    .filter_map(|s| s.as_str())
                    .map(str::to_string)
                    .collect(),
            ),
        }];
    }

    items
        .iter()
        .map(|group| EnhancedSkillGroup {
            category: string_field(group, &["category", "name"]),
            items: group.get("items").and_then(|v| match v {
                Value::Array(list) => Some(
                    list.iter()
                        .filter_map(|s| s.as_str())
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                ),
                Value::String(joined) => Some(
                    joined
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                ),
                _ => None,
            }),
        })
        .collect()
}
