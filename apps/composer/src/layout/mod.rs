// Layout primitives shared by the renderer and the export engine.
// All geometry is in PDF points (1/72 inch) at 100% scale.

pub mod font_metrics;
pub mod wrap;

use serde::{Deserialize, Serialize};

pub use font_metrics::{get_metrics, FontFace, FontFamily, FontMetricTable};
pub use wrap::wrap_text;

/// ISO A4 in points.
pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

/// Physical page geometry. The same values drive preview layout and PDF export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
}

impl PageGeometry {
    pub fn a4() -> Self {
        Self {
            width_pt: A4_WIDTH_PT,
            height_pt: A4_HEIGHT_PT,
            margin_pt: 48.0,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width_pt - 2.0 * self.margin_pt
    }

    /// Printable height available to content on a single page.
    pub fn printable_height(&self) -> f32 {
        self.height_pt - 2.0 * self.margin_pt
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}
