//! Static font-metric tables for the three PDF base-14 families used by templates.
//!
//! Widths are the AFM advance widths in 1/1000 em, so measurements agree with what
//! a PDF viewer draws for the same base font. Tables cover ASCII 0x20..=0x7E
//! (95 printable characters). Index = (char as usize) - 32.
//! Anything outside ASCII falls back to `average_width`.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Families and faces
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Helvetica.
    Sans,
    /// Times.
    Serif,
    /// Courier.
    Mono,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFace {
    Regular,
    Bold,
}

impl FontFamily {
    /// PostScript name of the base-14 font for this family and face.
    pub fn base_font(&self, face: FontFace) -> &'static str {
        match (self, face) {
            (FontFamily::Sans, FontFace::Regular) => "Helvetica",
            (FontFamily::Sans, FontFace::Bold) => "Helvetica-Bold",
            (FontFamily::Serif, FontFace::Regular) => "Times-Roman",
            (FontFamily::Serif, FontFace::Bold) => "Times-Bold",
            (FontFamily::Mono, FontFace::Regular) => "Courier",
            (FontFamily::Mono, FontFace::Bold) => "Courier-Bold",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Metric table
// ────────────────────────────────────────────────────────────────────────────

pub struct FontMetricTable {
    pub family: FontFamily,
    widths: [u16; 95],
    pub average_width: u16,
    /// Bold faces are measured as regular widths scaled by this factor.
    pub bold_factor: f32,
}

impl FontMetricTable {
    /// Width of `s` in points at `size_pt`.
    pub fn measure_str(&self, s: &str, face: FontFace, size_pt: f32) -> f32 {
        let units: u32 = s
            .chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32] as u32
                } else {
                    self.average_width as u32
                }
            })
            .sum();
        let factor = match face {
            FontFace::Regular => 1.0,
            FontFace::Bold => self.bold_factor,
        };
        units as f32 / 1000.0 * size_pt * factor
    }

    pub fn space_width(&self, face: FontFace, size_pt: f32) -> f32 {
        self.measure_str(" ", face, size_pt)
    }
}

pub fn get_metrics(family: FontFamily) -> &'static FontMetricTable {
    match family {
        FontFamily::Sans => &HELVETICA_TABLE,
        FontFamily::Serif => &TIMES_TABLE,
        FontFamily::Mono => &COURIER_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    family: FontFamily::Sans,
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A-M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N-Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a-m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n-z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
    ],
    average_width: 540,
    bold_factor: 1.07,
};

static TIMES_TABLE: FontMetricTable = FontMetricTable {
    family: FontFamily::Serif,
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
        // 0-9
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        // :    ;    <    =    >    ?    @
        278, 278, 564, 564, 564, 444, 921,
        // A-M
        722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
        // N-Z
        722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
        // [    \    ]    ^    _    `
        333, 278, 333, 469, 500, 333,
        // a-m
        444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
        // n-z
        500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
        // {    |    }    ~
        480, 200, 480, 541,
    ],
    average_width: 480,
    bold_factor: 1.05,
};

static COURIER_TABLE: FontMetricTable = FontMetricTable {
    family: FontFamily::Mono,
    widths: [600; 95],
    average_width: 600,
    bold_factor: 1.0,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courier_is_monospaced() {
        let m = get_metrics(FontFamily::Mono);
        assert!((m.measure_str("iiii", FontFace::Regular, 10.0) - 24.0).abs() < 1e-4);
        assert!((m.measure_str("WWWW", FontFace::Regular, 10.0) - 24.0).abs() < 1e-4);
    }

    #[test]
    fn test_helvetica_space_width() {
        let m = get_metrics(FontFamily::Sans);
        assert!((m.space_width(FontFace::Regular, 10.0) - 2.78).abs() < 1e-4);
    }

    #[test]
    fn test_bold_is_wider() {
        let m = get_metrics(FontFamily::Serif);
        let regular = m.measure_str("Experience", FontFace::Regular, 11.0);
        let bold = m.measure_str("Experience", FontFace::Bold, 11.0);
        assert!(bold > regular);
    }

    #[test]
    fn test_non_ascii_uses_average() {
        let m = get_metrics(FontFamily::Sans);
        let w = m.measure_str("é", FontFace::Regular, 1000.0);
        assert!((w - 540.0).abs() < 1e-2);
    }

    #[test]
    fn test_base_font_names() {
        assert_eq!(FontFamily::Serif.base_font(FontFace::Bold), "Times-Bold");
        assert_eq!(FontFamily::Sans.base_font(FontFace::Regular), "Helvetica");
    }
}
