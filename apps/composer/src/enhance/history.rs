use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::ContentFragment;
use crate::enhance::tone::Tone;
use crate::enhance::RequestKind;

/// One completed enhancement, stored exactly as reconciled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub content: ContentFragment,
    pub generated_at: DateTime<Utc>,
    pub tone: Tone,
    pub kind: RequestKind,
}

/// Listing row for a version picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionSummary {
    pub index: usize,
    pub generated_at: DateTime<Utc>,
    pub tone: Tone,
    pub kind: RequestKind,
    pub active: bool,
}

/// Append-only list of enhancement results with one active pointer.
/// Selecting never mutates or reorders entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionHistory {
    entries: Vec<VersionEntry>,
    active: Option<usize>,
}

impl VersionHistory {
    /// Appends an entry and makes it active. Returns its index.
    pub fn push(&mut self, entry: VersionEntry) -> usize {
        self.entries.push(entry);
        let index = self.entries.len() - 1;
        self.active = Some(index);
        index
    }

    pub fn list(&self) -> Vec<VersionSummary> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, e)| VersionSummary {
                index,
                generated_at: e.generated_at,
                tone: e.tone,
                kind: e.kind,
                active: self.active == Some(index),
            })
            .collect()
    }

    /// Marks `index` active and returns its stored content. Out-of-range is a no-op.
    pub fn select(&mut self, index: usize) -> Option<&ContentFragment> {
        let entry = self.entries.get(index)?;
        self.active = Some(index);
        Some(&entry.content)
    }

    pub fn get(&self, index: usize) -> Option<&VersionEntry> {
        self.entries.get(index)
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
