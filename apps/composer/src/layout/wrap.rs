//! Greedy word wrap against a font metric table.
//!
//! The renderer wraps every paragraph once, at 100% scale, and the export engine
//! draws exactly those lines. Nothing downstream re-wraps.

use crate::layout::font_metrics::{FontFace, FontMetricTable};

/// Splits `text` into lines no wider than `max_width_pt`.
///
/// Explicit newlines are hard breaks. A single word wider than the line is
/// placed on its own line rather than split. Empty input yields no lines.
pub fn wrap_text(
    text: &str,
    metrics: &FontMetricTable,
    face: FontFace,
    size_pt: f32,
    max_width_pt: f32,
) -> Vec<String> {
    let space_w = metrics.space_width(face, size_pt);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in paragraph.split_whitespace() {
            let word_w = metrics.measure_str(word, face, size_pt);
            if current.is_empty() {
                current.push_str(word);
                current_width = word_w;
            } else if current_width + space_w + word_w > max_width_pt {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_w;
            } else {
                current.push(' ');
                current.push_str(word);
                current_width += space_w + word_w;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}
