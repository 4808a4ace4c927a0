//! Style Model: visual customization layered over a Document Model at render time.

use serde::{Deserialize, Serialize};

use crate::templates::Template;

/// A `#rrggbb` color token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorToken(pub String);

impl ColorToken {
    /// RGB components in `0.0..=1.0`. Unparseable tokens render black.
    pub fn rgb(&self) -> (f32, f32, f32) {
        parse_hex(&self.0).unwrap_or((0.0, 0.0, 0.0))
    }
}

/// Ordered color tuple: text, accent, muted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme(pub ColorToken, pub ColorToken, pub ColorToken);

impl ColorScheme {
    pub fn from_hex(colors: [&str; 3]) -> Self {
        let [text, accent, muted] = colors;
        Self(
            ColorToken(text.to_string()),
            ColorToken(accent.to_string()),
            ColorToken(muted.to_string()),
        )
    }

    pub fn text(&self) -> &ColorToken {
        &self.0
    }

    pub fn accent(&self) -> &ColorToken {
        &self.1
    }

    pub fn muted(&self) -> &ColorToken {
        &self.2
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::from_hex(["#000000", "#000000", "#404040"])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutVariant {
    /// Single column, left-aligned header.
    #[default]
    Classic,
    /// Single column, centered header.
    Centered,
    /// Narrow left column for contact details and skills.
    Sidebar,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypographyScale {
    Compact,
    #[default]
    Standard,
    Large,
}

/// Point sizes derived from a typography scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeSizes {
    pub body: f32,
    pub heading: f32,
    pub name: f32,
    /// Line height as a multiple of the font size.
    pub leading: f32,
}

impl TypographyScale {
    pub fn sizes(&self) -> TypeSizes {
        match self {
            TypographyScale::Compact => TypeSizes {
                body: 9.5,
                heading: 11.0,
                name: 20.0,
                leading: 1.25,
            },
            TypographyScale::Standard => TypeSizes {
                body: 10.5,
                heading: 12.5,
                name: 24.0,
                leading: 1.3,
            },
            TypographyScale::Large => TypeSizes {
                body: 12.0,
                heading: 14.0,
                name: 28.0,
                leading: 1.35,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleModel {
    pub template_id: String,
    pub color_scheme: ColorScheme,
    pub layout: LayoutVariant,
    pub typography: TypographyScale,
}

/// Unstyled placeholder used before any template has been chosen.
impl Default for StyleModel {
    fn default() -> Self {
        Self {
            template_id: String::new(),
            color_scheme: ColorScheme::default(),
            layout: LayoutVariant::default(),
            typography: TypographyScale::default(),
        }
    }
}

impl StyleModel {
    /// A fresh style seeded from the template's defaults.
    pub fn for_template(template: &Template) -> Self {
        Self {
            template_id: template.id.clone(),
            color_scheme: template.default_colors.clone(),
            layout: template.layout,
            typography: TypographyScale::default(),
        }
    }

    /// Switches template. Colors and layout are overwritten with the template's
    /// defaults, never merged; typography is kept.
    pub fn select_template(&mut self, template: &Template) {
        self.template_id = template.id.clone();
        self.color_scheme = template.default_colors.clone();
        self.layout = template.layout;
    }
}

fn parse_hex(token: &str) -> Option<(f32, f32, f32)> {
    let hex = token.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((
        channel(0)? as f32 / 255.0,
        channel(2)? as f32 / 255.0,
        channel(4)? as f32 / 255.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{StaticCatalog, TemplateCatalog};

    #[test]
    fn test_color_token_parse() {
        let (r, g, b) = ColorToken("#ff8000".into()).rgb();
        assert!((r - 1.0).abs() < 1e-6);
        assert!((g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn test_invalid_color_falls_back_to_black() {
        assert_eq!(ColorToken("teal".into()).rgb(), (0.0, 0.0, 0.0));
        assert_eq!(ColorToken("#12345".into()).rgb(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_select_template_overwrites_colors_and_layout() {
        let catalog = StaticCatalog::builtin();
        let hacker = catalog.get_template("hacker").unwrap();
        let operator = catalog.get_template("operator").unwrap();

        let mut style = StyleModel::for_template(&hacker);
        style.color_scheme = ColorScheme::from_hex(["#abcdef", "#abcdef", "#abcdef"]);
        style.typography = TypographyScale::Large;

        style.select_template(&operator);
        assert_eq!(style.template_id, "operator");
        assert_eq!(style.color_scheme, operator.default_colors);
        assert_eq!(style.layout, LayoutVariant::Sidebar);
        assert_eq!(style.typography, TypographyScale::Large);
    }
}
