//! Reconciles a partial rewrite against the model as it stood before the call.
//!
//! Any field the response leaves out, leaves blank, or gives the wrong type falls
//! back to the pre-call value. Repeated sections are matched by position: entry
//! `i` of the response rewrites entry `i` of the model, surplus response entries
//! are appended, and model entries past the end of the response are kept as-is.

use crate::document::{ContentFragment, DocumentModel, EducationEntry, ExperienceEntry, SkillGroup};
use crate::enhance::fragment::{
    EnhancedEducation, EnhancedExperience, EnhancedFragment, EnhancedSkillGroup,
};

pub fn reconcile(pre_call: &DocumentModel, enhanced: &EnhancedFragment) -> ContentFragment {
    ContentFragment {
        summary: pick(&enhanced.summary, &pre_call.summary),
        letter_body: pick(&enhanced.letter_body, &pre_call.letter.body),
        experience: merge_positional(
            &pre_call.experience,
            enhanced.experience.as_deref(),
            merge_experience,
            new_experience,
        ),
        education: merge_positional(
            &pre_call.education,
            enhanced.education.as_deref(),
            merge_education,
            new_education,
        ),
        skills: merge_positional(
            &pre_call.skills,
            enhanced.skills.as_deref(),
            merge_skills,
            new_skills,
        ),
    }
}

fn pick(candidate: &Option<String>, fallback: &str) -> String {
    match candidate {
        Some(value) if !value.trim().is_empty() => value.clone(),
        _ => fallback.to_string(),
    }
}

fn merge_positional<T: Clone, E>(
    existing: &[T],
    response: Option<&[E]>,
    merge: fn(&T, &E) -> T,
    create: fn(&E) -> Option<T>,
) -> Vec<T> {
    let Some(response) = response else {
        return existing.to_vec();
    };

    let mut out: Vec<T> = existing
        .iter()
        .enumerate()
        .map(|(i, item)| match response.get(i) {
            Some(e) => merge(item, e),
            None => item.clone(),
        })
        .collect();

    out.extend(response.iter().skip(existing.len()).filter_map(create));
    out
}

fn merge_experience(entry: &ExperienceEntry, e: &EnhancedExperience) -> ExperienceEntry {
    ExperienceEntry {
        title: pick(&e.title, &entry.title),
        company: pick(&e.company, &entry.company),
        description: pick(&e.description, &entry.description),
        ..entry.clone()
    }
}

fn new_experience(e: &EnhancedExperience) -> Option<ExperienceEntry> {
    let entry = merge_experience(&ExperienceEntry::default(), e);
    (entry != ExperienceEntry::default()).then_some(entry)
}

fn merge_education(entry: &EducationEntry, e: &EnhancedEducation) -> EducationEntry {
    EducationEntry {
        degree: pick(&e.degree, &entry.degree),
        institution: pick(&e.institution, &entry.institution),
        details: pick(&e.details, &entry.details),
        ..entry.clone()
    }
}

fn new_education(e: &EnhancedEducation) -> Option<EducationEntry> {
    let entry = merge_education(&EducationEntry::default(), e);
    (entry != EducationEntry::default()).then_some(entry)
}

fn merge_skills(group: &SkillGroup, e: &EnhancedSkillGroup) -> SkillGroup {
    SkillGroup {
        category: pick(&e.category, &group.category),
        items: match &e.items {
            Some(items) if !items.is_empty() => items.clone(),
            _ => group.items.clone(),
        },
    }
}

fn new_skills(e: &EnhancedSkillGroup) -> Option<SkillGroup> {
    let group = merge_skills(&SkillGroup::default(), e);
    (group != SkillGroup::default()).then_some(group)
}
