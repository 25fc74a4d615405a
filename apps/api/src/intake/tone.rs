//! Tone selection — a fixed three-way stylistic preset applied to the
//! optimization prompt.

use serde::{Deserialize, Serialize};

/// Stylistic preset influencing generated resume phrasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneSelection {
    #[default]
    Professional,
    Tech,
    Creative,
}

impl ToneSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToneSelection::Professional => "professional",
            ToneSelection::Tech => "tech",
            ToneSelection::Creative => "creative",
        }
    }

    /// Prompt instruction injected into the optimization template.
    pub fn instruction(&self) -> &'static str {
        match self {
            ToneSelection::Professional => {
                "Use a formal, corporate tone with traditional business language and \
                 focus on achievements and responsibilities."
            }
            ToneSelection::Tech => {
                "Use modern, technical language with industry-specific terminology, \
                 focus on technical achievements, and emphasize innovation and \
                 problem-solving."
            }
            ToneSelection::Creative => {
                "Use innovative, dynamic language that showcases creativity and a \
                 forward-thinking approach while maintaining professionalism."
            }
        }
    }

    /// Parses a form-field identifier. Unknown identifiers are rejected so a
    /// typo never silently falls back to a different voice.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "professional" => Some(ToneSelection::Professional),
            "tech" => Some(ToneSelection::Tech),
            "creative" => Some(ToneSelection::Creative),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_professional() {
        assert_eq!(ToneSelection::default(), ToneSelection::Professional);
    }

    #[test]
    fn test_parse_known_identifiers() {
        assert_eq!(
            ToneSelection::parse("professional"),
            Some(ToneSelection::Professional)
        );
        assert_eq!(ToneSelection::parse("tech"), Some(ToneSelection::Tech));
        assert_eq!(
            ToneSelection::parse("creative"),
            Some(ToneSelection::Creative)
        );
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        assert_eq!(ToneSelection::parse(" Tech "), Some(ToneSelection::Tech));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(ToneSelection::parse("casual"), None);
        assert_eq!(ToneSelection::parse(""), None);
    }

    #[test]
    fn test_serde_round_trip_lowercase() {
        let json = serde_json::to_string(&ToneSelection::Tech).unwrap();
        assert_eq!(json, r#""tech""#);
        let back: ToneSelection = serde_json::from_str(r#""creative""#).unwrap();
        assert_eq!(back, ToneSelection::Creative);
    }

    #[test]
    fn test_each_tone_has_distinct_instruction() {
        let p = ToneSelection::Professional.instruction();
        let t = ToneSelection::Tech.instruction();
        let c = ToneSelection::Creative.instruction();
        assert_ne!(p, t);
        assert_ne!(t, c);
        assert_ne!(p, c);
    }
}
