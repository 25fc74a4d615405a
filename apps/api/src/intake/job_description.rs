//! Job description input — free text or a URL pointing at a posting.
//!
//! Only the URL *detection* lives here. Fetching and extracting a posting
//! from a URL is an external capability with its own error taxonomy and is
//! never performed by this service.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

static URL_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// True iff the trimmed value matches `^https?://.+`. The heuristic is
/// non-fatal: if the pattern fails to build, the flag is simply false.
fn matches_url(value: &str) -> bool {
    URL_RE
        .get_or_init(|| Regex::new(r"^https?://.+").ok())
        .as_ref()
        .map(|re| re.is_match(value.trim()))
        .unwrap_or(false)
}

/// Free text or a URL pointing to a job posting, with the derived
/// "looks like a URL" flag recomputed on every change.
#[derive(Debug, Clone, Serialize)]
pub struct JobDescriptionInput {
    raw: String,
    looks_like_url: bool,
}

impl JobDescriptionInput {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let looks_like_url = matches_url(&raw);
        Self {
            raw,
            looks_like_url,
        }
    }

    /// The trimmed field value.
    pub fn text(&self) -> &str {
        self.raw.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }

    pub fn looks_like_url(&self) -> bool {
        self.looks_like_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_url_detected() {
        let jd = JobDescriptionInput::new("https://example.com/job/123");
        assert!(jd.looks_like_url());
    }

    #[test]
    fn test_http_url_detected() {
        assert!(JobDescriptionInput::new("http://jobs.example.org/456").looks_like_url());
    }

    #[test]
    fn test_plain_text_not_detected() {
        let jd = JobDescriptionInput::new("Senior Engineer, 5 years experience");
        assert!(!jd.looks_like_url());
    }

    #[test]
    fn test_detection_trims_whitespace() {
        assert!(JobDescriptionInput::new("  https://example.com/x \n").looks_like_url());
    }

    #[test]
    fn test_scheme_alone_is_not_a_url() {
        assert!(!JobDescriptionInput::new("https://").looks_like_url());
    }

    #[test]
    fn test_url_in_the_middle_is_not_detected() {
        assert!(!JobDescriptionInput::new("see https://example.com for details").looks_like_url());
    }

    #[test]
    fn test_empty_and_blank_inputs() {
        assert!(JobDescriptionInput::new("").is_empty());
        assert!(JobDescriptionInput::new("   \n\t").is_empty());
        assert!(!JobDescriptionInput::new("   \n\t").looks_like_url());
    }

    #[test]
    fn test_text_is_trimmed() {
        assert_eq!(JobDescriptionInput::new("  hello  ").text(), "hello");
    }
}
