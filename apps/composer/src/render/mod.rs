//! Renderer: a pure projection of (Document Model, Style Model, Template) into a
//! laid-out `VisualTree`.
//!
//! No clocks, no counters, no randomness: the same inputs always produce an
//! equal tree. Layout happens once, in points on an A4 page at 100%. The preview
//! scale is carried along for display only, so the export engine can draw the
//! exact lines the user saw.

mod sections;

use serde::Serialize;

use crate::document::{DocumentKind, DocumentModel};
use crate::layout::{FontFace, FontFamily, PageGeometry};
use crate::style::{ColorToken, LayoutVariant, StyleModel};
use crate::templates::Template;

/// Gap between the sidebar and the main column.
pub const GUTTER_PT: f32 = 18.0;
/// Share of the content width given to the sidebar.
pub const SIDEBAR_RATIO: f32 = 0.32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderOptions {
    /// Preview zoom. Never affects layout.
    pub scale: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Name,
    Headline,
    ContactLine,
    SectionHeading,
    EntryTitle,
    EntryMeta,
    Paragraph,
    Bullet,
    SkillLine,
    Rule,
}

impl BlockKind {
    /// Blocks that must not end a page on their own.
    pub fn keeps_with_next(&self) -> bool {
        matches!(
            self,
            BlockKind::SectionHeading | BlockKind::Rule | BlockKind::EntryTitle | BlockKind::EntryMeta
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
}

/// Horizontal placement of one column on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnFrame {
    pub x_pt: f32,
    pub width_pt: f32,
}

/// One laid-out block. Text is already wrapped to its column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    /// Index into `VisualTree::columns`.
    pub column: usize,
    pub indent_pt: f32,
    pub face: FontFace,
    pub size_pt: f32,
    pub line_height_pt: f32,
    pub space_before_pt: f32,
    pub color: ColorToken,
    pub align: Align,
    pub lines: Vec<String>,
    pub height_pt: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualTree {
    pub kind: DocumentKind,
    pub template_id: String,
    pub font: FontFamily,
    pub layout: LayoutVariant,
    pub page: PageGeometry,
    pub columns: Vec<ColumnFrame>,
    /// Blocks in reading order; each column's blocks keep their relative order.
    pub blocks: Vec<Block>,
    pub scale: f32,
}

impl VisualTree {
    /// Page size in display units at the preview scale.
    pub fn display_size(&self) -> (f32, f32) {
        (self.page.width_pt * self.scale, self.page.height_pt * self.scale)
    }

    pub fn column_blocks(&self, column: usize) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.column == column)
    }

    /// Unpaginated height of one column.
    pub fn column_height(&self, column: usize) -> f32 {
        self.column_blocks(column).map(|b| b.height_pt).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All text lines in reading order.
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .flat_map(|b| b.lines.iter().map(String::as_str))
    }
}

/// Projects a document into a visual tree. Same inputs, equal outputs.
///
/// Letters always flow in a single column; the sidebar variant only applies to
/// resumes.
pub fn render(
    doc: &DocumentModel,
    style: &StyleModel,
    template: &Template,
    options: RenderOptions,
) -> VisualTree {
    let page = PageGeometry::a4();
    let sidebar = style.layout == LayoutVariant::Sidebar && doc.kind == DocumentKind::Resume;

    let columns = if sidebar {
        let side = page.content_width() * SIDEBAR_RATIO;
        vec![
            ColumnFrame {
                x_pt: page.margin_pt,
                width_pt: side,
            },
            ColumnFrame {
                x_pt: page.margin_pt + side + GUTTER_PT,
                width_pt: page.content_width() - side - GUTTER_PT,
            },
        ]
    } else {
        vec![ColumnFrame {
            x_pt: page.margin_pt,
            width_pt: page.content_width(),
        }]
    };

    let ctx = sections::Context::new(template.font, style);
    let blocks = match (doc.kind, sidebar) {
        (DocumentKind::CoverLetter, _) => sections::letter(&ctx, doc, &columns[0], style.layout),
        (DocumentKind::Resume, false) => sections::resume_single(&ctx, doc, &columns[0], style.layout),
        (DocumentKind::Resume, true) => sections::resume_sidebar(&ctx, doc, &columns[0], &columns[1]),
    };

    VisualTree {
        kind: doc.kind,
        template_id: template.id.clone(),
        font: template.font,
        layout: style.layout,
        page,
        columns,
        blocks,
        scale: options.scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ContactInfo, EducationEntry, ExperienceEntry, SkillGroup};
    use crate::style::TypographyScale;
    use crate::templates::{StaticCatalog, TemplateCatalog};

    fn template(id: &str) -> Template {
        StaticCatalog::builtin().get_template(id).unwrap()
    }

    fn resume() -> DocumentModel {
        DocumentModel {
            contact: ContactInfo {
                full_name: "Jane Doe".into(),
                headline: "Platform Engineer".into(),
                email: "jane@example.com".into(),
                location: "Berlin".into(),
                ..Default::default()
            },
            summary: "Engineer with a decade of experience building reliable distributed \
                      systems, payment rails and internal developer tooling."
                .into(),
            experience: vec![ExperienceEntry {
                title: "Staff Engineer".into(),
                company: "Acme".into(),
                start_date: "2019".into(),
                description: "- Cut p99 latency by 40%\n- Led migration of 200 services".into(),
                ..Default::default()
            }],
            education: vec![EducationEntry {
                degree: "BSc Computer Science".into(),
                institution: "TU Berlin".into(),
                ..Default::default()
            }],
            skills: vec![SkillGroup {
                category: "Languages".into(),
                items: vec!["Rust".into(), "Go".into()],
            }],
            ..DocumentModel::new(DocumentKind::Resume)
        }
    }

    #[test]
    fn test_render_is_idempotent() {
        let t = template("hacker");
        let style = StyleModel::for_template(&t);
        let doc = resume();
        let a = render(&doc, &style, &t, RenderOptions::default());
        let b = render(&doc, &style, &t, RenderOptions::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_scale_only_changes_display_size() {
        let t = template("researcher");
        let style = StyleModel::for_template(&t);
        let doc = resume();
        let full = render(&doc, &style, &t, RenderOptions { scale: 1.0 });
        let half = render(&doc, &style, &t, RenderOptions { scale: 0.5 });
        assert_eq!(full.blocks, half.blocks);
        assert_eq!(full.columns, half.columns);
        let (w, h) = half.display_size();
        assert!((w - full.page.width_pt / 2.0).abs() < 1e-3);
        assert!((h - full.page.height_pt / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_empty_document_renders_nothing() {
        let t = template("hacker");
        let style = StyleModel::for_template(&t);
        let tree = render(&DocumentModel::new(DocumentKind::Resume), &style, &t, RenderOptions::default());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_empty_sections_produce_no_blocks() {
        let t = template("hacker");
        let style = StyleModel::for_template(&t);
        let mut doc = resume();
        doc.education.clear();
        doc.skills = vec![SkillGroup::default()];
        let tree = render(&doc, &style, &t, RenderOptions::default());
        let headings: Vec<&str> = tree
            .blocks
            .iter()
            .filter(|b| b.kind == BlockKind::SectionHeading)
            .flat_map(|b| b.lines.iter().map(String::as_str))
            .collect();
        assert_eq!(headings, vec!["SUMMARY", "EXPERIENCE"]);
    }

    #[test]
    fn test_sidebar_places_contact_and_skills_left() {
        let t = template("operator");
        let style = StyleModel::for_template(&t);
        let tree = render(&resume(), &style, &t, RenderOptions::default());
        assert_eq!(tree.columns.len(), 2);

        let side: Vec<BlockKind> = tree.column_blocks(0).map(|b| b.kind).collect();
        assert!(side.contains(&BlockKind::ContactLine));
        assert!(side.contains(&BlockKind::SkillLine));
        assert!(tree.column_blocks(1).all(|b| b.kind != BlockKind::SkillLine));
        assert!(tree.column_blocks(1).any(|b| b.kind == BlockKind::Bullet));
    }

    #[test]
    fn test_letter_ignores_sidebar_layout() {
        let t = template("hacker");
        let mut style = StyleModel::for_template(&t);
        style.layout = LayoutVariant::Sidebar;
        let mut doc = DocumentModel::new(DocumentKind::CoverLetter);
        doc.contact.full_name = "Jane Doe".into();
        doc.letter.company = "Initech".into();
        doc.letter.body = "First paragraph.\n\nSecond paragraph.".into();
        let tree = render(&doc, &style, &t, RenderOptions::default());
        assert_eq!(tree.columns.len(), 1);

        let text: Vec<&str> = tree.text_lines().collect();
        assert!(text.contains(&"Initech"));
        assert!(text.contains(&"Dear Hiring Manager,"));
        assert!(text.contains(&"First paragraph."));
        assert!(text.contains(&"Second paragraph."));
    }

    #[test]
    fn test_lines_fit_their_column() {
        let t = template("classic");
        let style = StyleModel::for_template(&t);
        let mut doc = resume();
        doc.summary = "word ".repeat(300);
        let tree = render(&doc, &style, &t, RenderOptions::default());
        let metrics = crate::layout::get_metrics(tree.font);
        for block in &tree.blocks {
            let width = tree.columns[block.column].width_pt - block.indent_pt;
            for line in &block.lines {
                if line.split_whitespace().count() > 1 {
                    assert!(metrics.measure_str(line, block.face, block.size_pt) <= width + 0.01);
                }
            }
        }
    }

    #[test]
    fn test_typography_changes_sizes() {
        let t = template("hacker");
        let mut style = StyleModel::for_template(&t);
        let standard = render(&resume(), &style, &t, RenderOptions::default());
        style.typography = TypographyScale::Large;
        let large = render(&resume(), &style, &t, RenderOptions::default());
        let name = |tree: &VisualTree| {
            tree.blocks
                .iter()
                .find(|b| b.kind == BlockKind::Name)
                .map(|b| b.size_pt)
        };
        assert!(name(&large) > name(&standard));
        assert!(large.column_height(0) > standard.column_height(0));
    }

    #[test]
    fn test_centered_header() {
        let t = template("founder");
        let style = StyleModel::for_template(&t);
        let tree = render(&resume(), &style, &t, RenderOptions::default());
        let name = tree.blocks.iter().find(|b| b.kind == BlockKind::Name).unwrap();
        assert_eq!(name.align, Align::Center);
        let bullet = tree.blocks.iter().find(|b| b.kind == BlockKind::Bullet).unwrap();
        assert_eq!(bullet.align, Align::Left);
    }
}
