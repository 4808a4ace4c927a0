//! Export Engine: paginates the renderer's visual tree onto fixed A4 pages and
//! writes a PDF.
//!
//! The engine never re-lays out text. It draws the exact lines the renderer
//! produced, so the preview and the file agree line for line. Pagination and
//! encoding are CPU-bound and run on `spawn_blocking`.

pub mod paginate;
pub mod pdf;

use std::path::{Path, PathBuf};
use std::time::Instant;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::document::{DocumentKind, DocumentModel};
use crate::render::VisualTree;

pub use paginate::{paginate, PageLayout, PlacedItem};
pub use pdf::encode_win_ansi;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    /// Template styling: colors, rules, columns and alignment.
    #[default]
    Visual,
    /// Plain single-column flow in black.
    TextStream,
}

impl ExportMode {
    pub fn default_for(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Resume => ExportMode::Visual,
            DocumentKind::CoverLetter => ExportMode::TextStream,
        }
    }
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub bytes: Bytes,
    pub page_count: usize,
}

impl ExportArtifact {
    /// Writes the artifact into `dir`, creating it if needed.
    pub async fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await?;
        info!(path = %path.display(), bytes = self.bytes.len(), "Export written");
        Ok(path)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportEngine {
    mode: ExportMode,
}

impl ExportEngine {
    pub fn new(mode: ExportMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ExportMode {
        self.mode
    }

    pub async fn export(
        &self,
        tree: &VisualTree,
        filename: impl Into<String>,
    ) -> Result<ExportArtifact, ExportError> {
        let started = Instant::now();
        let filename = filename.into();
        let tree = tree.clone();
        let mode = self.mode;

        let (bytes, page_count) = tokio::task::spawn_blocking(move || build_pdf(&tree, mode))
            .await
            .map_err(|e| ExportError::Task(format!("spawn_blocking failed in export: {e}")))??;

        info!(
            %filename,
            ?mode,
            page_count,
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Export finished"
        );

        Ok(ExportArtifact {
            filename,
            bytes: Bytes::from(bytes),
            page_count,
        })
    }
}

fn build_pdf(tree: &VisualTree, mode: ExportMode) -> Result<(Vec<u8>, usize), ExportError> {
    let pages = paginate(tree, mode);
    let bytes = pdf::write_pdf(tree, &pages, mode)?;
    Ok((bytes, pages.len()))
}

/// `jane-doe-resume.pdf`; `untitled-cover-letter.pdf` when no name is set.
pub fn artifact_filename(doc: &DocumentModel) -> String {
    let mut slug = String::new();
    for c in doc.contact.full_name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    let slug = if slug.is_empty() { "untitled" } else { slug };
    format!("{slug}-{}.pdf", doc.kind.file_suffix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentKind, ExperienceEntry};
    use crate::render::{render, RenderOptions};
    use crate::style::StyleModel;
    use crate::templates::{StaticCatalog, TemplateCatalog};

    fn tree_for(doc: &DocumentModel, template_id: &str) -> VisualTree {
        let template = StaticCatalog::builtin().get_template(template_id).unwrap();
        let style = StyleModel::for_template(&template);
        render(doc, &style, &template, RenderOptions { scale: 0.6 })
    }

    fn long_resume() -> DocumentModel {
        let mut doc = DocumentModel::new(DocumentKind::Resume);
        doc.contact.full_name = "Jane Q. Doe".into();
        doc.summary = "Engineer.".into();
        doc.experience = (0..30)
            .map(|i| ExperienceEntry {
                title: format!("Role {i}"),
                company: "Acme".into(),
                description: "- Shipped things\n- Fixed things\n- Measured things by 10%".into(),
                ..Default::default()
            })
            .collect();
        doc
    }

    #[test]
    fn test_artifact_filename() {
        let mut doc = DocumentModel::new(DocumentKind::Resume);
        doc.contact.full_name = "  Jane   Doe ".into();
        assert_eq!(artifact_filename(&doc), "jane-doe-resume.pdf");

        let letter = DocumentModel::new(DocumentKind::CoverLetter);
        assert_eq!(artifact_filename(&letter), "untitled-cover-letter.pdf");

        doc.contact.full_name = "José O'Brien".into();
        assert_eq!(artifact_filename(&doc), "jos-o-brien-resume.pdf");
    }

    #[test]
    fn test_default_mode_per_kind() {
        assert_eq!(ExportMode::default_for(DocumentKind::Resume), ExportMode::Visual);
        assert_eq!(
            ExportMode::default_for(DocumentKind::CoverLetter),
            ExportMode::TextStream
        );
    }

    #[tokio::test]
    async fn test_export_produces_pdf() {
        let doc = long_resume();
        let tree = tree_for(&doc, "hacker");
        let artifact = ExportEngine::new(ExportMode::Visual)
            .export(&tree, artifact_filename(&doc))
            .await
            .unwrap();
        assert!(artifact.bytes.starts_with(b"%PDF-1.5"));
        assert!(artifact.page_count >= 2);
        assert_eq!(artifact.filename, "jane-q-doe-resume.pdf");

        let parsed = lopdf::Document::load_mem(&artifact.bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), artifact.page_count);
    }

    #[tokio::test]
    async fn test_export_ignores_preview_scale() {
        let doc = long_resume();
        let mut small = tree_for(&doc, "hacker");
        let mut large = small.clone();
        small.scale = 0.25;
        large.scale = 2.0;
        let engine = ExportEngine::default();
        let a = engine.export(&small, "a.pdf").await.unwrap();
        let b = engine.export(&large, "b.pdf").await.unwrap();
        assert_eq!(a.page_count, b.page_count);
        assert_eq!(a.bytes, b.bytes);
    }

    #[tokio::test]
    async fn test_empty_document_exports_one_page() {
        let doc = DocumentModel::new(DocumentKind::CoverLetter);
        let tree = tree_for(&doc, "classic");
        let artifact = ExportEngine::new(ExportMode::TextStream)
            .export(&tree, "empty.pdf")
            .await
            .unwrap();
        assert_eq!(artifact.page_count, 1);
    }

    #[tokio::test]
    async fn test_sidebar_exports_in_both_modes() {
        let doc = long_resume();
        let tree = tree_for(&doc, "operator");
        for mode in [ExportMode::Visual, ExportMode::TextStream] {
            let artifact = ExportEngine::new(mode).export(&tree, "x.pdf").await.unwrap();
            assert!(artifact.page_count >= 2);
        }
    }

    #[tokio::test]
    async fn test_write_to_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = long_resume();
        let artifact = ExportEngine::default()
            .export(&tree_for(&doc, "researcher"), "out.pdf")
            .await
            .unwrap();
        let path = artifact.write_to(dir.path().join("nested")).await.unwrap();
        let written = std::fs::read(path).unwrap();
        assert_eq!(written, artifact.bytes.to_vec());
    }
}
