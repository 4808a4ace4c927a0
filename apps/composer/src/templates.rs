//! Template Catalog: the external source of (layout, default style) pairs.
//!
//! The catalog is a collaborator: the pipeline only ever asks it for a template by
//! id. `StaticCatalog` ships the built-in set.

use serde::{Deserialize, Serialize};

use crate::document::DocumentKind;
use crate::layout::FontFamily;
use crate::style::{ColorScheme, LayoutVariant};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub layout: LayoutVariant,
    pub default_colors: ColorScheme,
    pub font: FontFamily,
    pub kinds: Vec<DocumentKind>,
}

impl Template {
    pub fn supports(&self, kind: DocumentKind) -> bool {
        self.kinds.contains(&kind)
    }
}

pub trait TemplateCatalog: Send + Sync {
    fn get_template(&self, id: &str) -> Option<Template>;

    /// Templates usable for `kind`, in catalog order.
    fn templates_for(&self, kind: DocumentKind) -> Vec<Template>;
}

/// In-process catalog with the five built-in templates.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    templates: Vec<Template>,
}

impl StaticCatalog {
    pub fn builtin() -> Self {
        let both = vec![DocumentKind::Resume, DocumentKind::CoverLetter];
        Self {
            templates: vec![
                template(
                    "hacker",
                    "Hacker",
                    LayoutVariant::Classic,
                    ["#111827", "#2563eb", "#6b7280"],
                    FontFamily::Sans,
                    both.clone(),
                ),
                template(
                    "researcher",
                    "Researcher",
                    LayoutVariant::Centered,
                    ["#1c1917", "#7c2d12", "#78716c"],
                    FontFamily::Serif,
                    both.clone(),
                ),
                template(
                    "operator",
                    "Operator",
                    LayoutVariant::Sidebar,
                    ["#0f172a", "#0d9488", "#64748b"],
                    FontFamily::Sans,
                    vec![DocumentKind::Resume],
                ),
                template(
                    "founder",
                    "Founder",
                    LayoutVariant::Centered,
                    ["#18181b", "#db2777", "#71717a"],
                    FontFamily::Sans,
                    both.clone(),
                ),
                template(
                    "classic",
                    "Classic",
                    LayoutVariant::Classic,
                    ["#000000", "#000000", "#404040"],
                    FontFamily::Mono,
                    both,
                ),
            ],
        }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateCatalog for StaticCatalog {
    fn get_template(&self, id: &str) -> Option<Template> {
        self.templates.iter().find(|t| t.id == id).cloned()
    }

    fn templates_for(&self, kind: DocumentKind) -> Vec<Template> {
        self.templates
            .iter()
            .filter(|t| t.supports(kind))
            .cloned()
            .collect()
    }
}

fn template(
    id: &str,
    name: &str,
    layout: LayoutVariant,
    colors: [&str; 3],
    font: FontFamily,
    kinds: Vec<DocumentKind>,
) -> Template {
    Template {
        id: id.to_string(),
        name: name.to_string(),
        layout,
        default_colors: ColorScheme::from_hex(colors),
        font,
        kinds,
    }
}
