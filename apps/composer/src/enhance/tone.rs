//! Tone calibration for rewrites: maps the requested tone to verb sets and
//! phrasing guidance that get embedded in the enhancement prompt.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Professional,
    Confident,
    Friendly,
    Concise,
}

/// Verb sets and phrasing calibrated to a tone.
#[derive(Debug, Clone, Serialize)]
pub struct ToneGuidance {
    pub strong_verbs: Vec<&'static str>,
    pub avoid: Vec<&'static str>,
    pub style_note: &'static str,
}

pub fn tone_guidance(tone: Tone) -> ToneGuidance {
    match tone {
        Tone::Professional => ToneGuidance {
            strong_verbs: vec!["Delivered", "Managed", "Implemented", "Coordinated", "Improved"],
            avoid: vec!["rockstar", "ninja", "passionate"],
            style_note: "Measured, formal register. Complete sentences in the summary.",
        },
        Tone::Confident => ToneGuidance {
            strong_verbs: vec!["Led", "Built", "Drove", "Launched", "Owned", "Scaled"],
            avoid: vec!["helped", "assisted", "tried to", "was involved in"],
            style_note: "Lead with outcomes. Active voice, strong verbs, no hedging.",
        },
        Tone::Friendly => ToneGuidance {
            strong_verbs: vec!["Partnered with", "Supported", "Created", "Shared", "Enabled"],
            avoid: vec!["leveraged", "synergy", "utilized"],
            style_note: "Warm and approachable while staying specific.",
        },
        Tone::Concise => ToneGuidance {
            strong_verbs: vec!["Built", "Cut", "Shipped", "Led", "Reduced"],
            avoid: vec!["in order to", "successfully", "various", "responsible for"],
            style_note: "Short lines. One idea per bullet. Drop filler words.",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_serde() {
        let tone: Tone = serde_json::from_str(r#""confident""#).unwrap();
        assert_eq!(tone, Tone::Confident);
        assert_eq!(serde_json::to_string(&Tone::Concise).unwrap(), r#""concise""#);
    }

    #[test]
    fn test_confident_avoids_weak_verbs() {
        let g = tone_guidance(Tone::Confident);
        assert!(g.avoid.contains(&"helped"));
        assert!(!g.strong_verbs.iter().any(|v| g.avoid.contains(v)));
    }

    #[test]
    fn test_every_tone_has_guidance() {
        for tone in [Tone::Professional, Tone::Confident, Tone::Friendly, Tone::Concise] {
            let g = tone_guidance(tone);
            assert!(!g.strong_verbs.is_empty());
            assert!(!g.style_note.is_empty());
        }
    }
}
