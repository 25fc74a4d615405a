use serde::{Deserialize, Serialize};

use crate::intake::tone::ToneSelection;

/// One position on the optimized resume, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub period: String,
    pub description: String,
}

/// The optimized resume produced by a completed generation run.
/// Built atomically by the generating stage and immutable afterwards;
/// re-fetching a run returns the same value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResume {
    pub name: String,
    pub headline: String,
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<String>,
    pub education: String,
    /// ATS compatibility of the optimized text against the target JD, 0-100.
    pub ats_score: u32,
    pub improvements: Vec<String>,
    pub tone_applied: ToneSelection,
    /// Full optimized text as returned by the optimizer; the export and
    /// email layers consume the structured fields above.
    pub optimized_text: String,
}
