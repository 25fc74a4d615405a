//! Resume optimization — builds the tone-calibrated prompt, calls the
//! inference service, and falls back to a rule-based skeleton when the
//! service is unreachable.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ai_client::prompts::OPTIMIZATION_PROMPT_TEMPLATE;
use crate::ai_client::{AiClient, AiError};
use crate::errors::AppError;
use crate::intake::tone::ToneSelection;
use crate::pipeline::ats::extract_job_keywords;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMethod {
    Ai,
    Fallback,
}

/// Output of the optimizing stage.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationOutcome {
    pub optimized_text: String,
    pub improvements: Vec<String>,
    pub method: OptimizationMethod,
}

pub fn build_optimization_prompt(
    resume_text: &str,
    job_description: &str,
    tone: ToneSelection,
) -> String {
    OPTIMIZATION_PROMPT_TEMPLATE
        .replace("{tone_instruction}", tone.instruction())
        .replace("{tone}", tone.as_str())
        .replace("{job_description}", job_description)
        .replace("{resume_text}", resume_text)
}

/// Runs the optimization call. Connection-level failures degrade to the
/// rule-based fallback; API-level failures (bad request, empty output)
/// surface as errors so they are never silently papered over.
pub async fn optimize_resume(
    ai: &AiClient,
    resume_text: &str,
    job_description: &str,
    tone: ToneSelection,
) -> Result<OptimizationOutcome, AppError> {
    if !ai.is_available().await {
        warn!("Inference service not available, using fallback optimization");
        return Ok(fallback_outcome(resume_text, job_description, tone));
    }

    let prompt = build_optimization_prompt(resume_text, job_description, tone);

    match ai.generate(&prompt).await {
        Ok(optimized_text) => {
            let improvements = extract_improvements(resume_text, &optimized_text);
            info!(
                "AI optimization produced {} chars, {} improvements",
                optimized_text.len(),
                improvements.len()
            );
            Ok(OptimizationOutcome {
                optimized_text,
                improvements,
                method: OptimizationMethod::Ai,
            })
        }
        Err(e @ (AiError::Http(_) | AiError::Unavailable { .. })) => {
            warn!("Inference call failed ({e}), using fallback optimization");
            Ok(fallback_outcome(resume_text, job_description, tone))
        }
        Err(e) => Err(AppError::Ai(format!("Optimization call failed: {e}"))),
    }
}

fn fallback_outcome(
    resume_text: &str,
    job_description: &str,
    tone: ToneSelection,
) -> OptimizationOutcome {
    let optimized_text = fallback_optimization(resume_text, job_description, tone);
    let improvements = extract_improvements(resume_text, &optimized_text);
    OptimizationOutcome {
        optimized_text,
        improvements,
        method: OptimizationMethod::Fallback,
    }
}

/// Rule-based skeleton used when no inference service is reachable: the
/// standard section layout seeded with the JD's top keywords.
pub fn fallback_optimization(
    _resume_text: &str,
    job_description: &str,
    _tone: ToneSelection,
) -> String {
    let keywords = extract_job_keywords(job_description);

    let mut sections = vec![
        "**CONTACT INFORMATION**".to_string(),
        "[Add your contact details here]".to_string(),
        String::new(),
        "**PROFESSIONAL SUMMARY**".to_string(),
        "Results-driven professional with expertise in key areas relevant to this position."
            .to_string(),
        String::new(),
        "**PROFESSIONAL EXPERIENCE**".to_string(),
        "[Your work experience with quantified achievements]".to_string(),
        String::new(),
        "**KEY SKILLS**".to_string(),
    ];
    for keyword in keywords.iter().take(10) {
        sections.push(format!("• {}", title_case(keyword)));
    }
    sections.push(String::new());
    sections.push("**EDUCATION**".to_string());
    sections.push("[Your educational background]".to_string());

    sections.join("\n")
}

/// Compares original and optimized text and names the improvements made.
pub fn extract_improvements(original: &str, optimized: &str) -> Vec<String> {
    let mut improvements = Vec::new();

    if optimized.split_whitespace().count() as f64
        > original.split_whitespace().count() as f64 * 1.2
    {
        improvements.push("Enhanced content with relevant keywords".to_string());
    }

    let digits = |s: &str| s.chars().filter(|c| c.is_ascii_digit()).count();
    if digits(optimized) > digits(original) {
        improvements.push("Added quantified achievements and metrics".to_string());
    }

    let verb_count = |s: &str| {
        let lower = s.to_lowercase();
        super::ats::ACTION_VERBS
            .iter()
            .filter(|v| lower.contains(*v))
            .count()
    };
    if verb_count(optimized) > verb_count(original) {
        improvements.push("Enhanced with strong action verbs".to_string());
    }

    if optimized.contains("**PROFESSIONAL SUMMARY**") {
        improvements.push("Added compelling professional summary".to_string());
    }
    if optimized.contains("**KEY SKILLS**") {
        improvements.push("Organized skills section for better visibility".to_string());
    }

    if improvements.is_empty() {
        improvements.push("General ATS optimization applied".to_string());
    }
    improvements
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_fills_all_placeholders() {
        let prompt = build_optimization_prompt(
            "my resume text",
            "the job description",
            ToneSelection::Tech,
        );
        assert!(prompt.contains("my resume text"));
        assert!(prompt.contains("the job description"));
        assert!(prompt.contains("Match the tone specified: tech"));
        assert!(!prompt.contains("{tone_instruction}"));
        assert!(!prompt.contains("{resume_text}"));
        assert!(!prompt.contains("{job_description}"));
    }

    #[test]
    fn test_fallback_contains_standard_sections() {
        let out = fallback_optimization(
            "resume",
            "We need python and docker experience",
            ToneSelection::Professional,
        );
        assert!(out.contains("**PROFESSIONAL SUMMARY**"));
        assert!(out.contains("**KEY SKILLS**"));
        assert!(out.contains("**EDUCATION**"));
        assert!(out.contains("• Python"));
        assert!(out.contains("• Docker"));
    }

    #[test]
    fn test_fallback_caps_keywords_at_ten() {
        let jd = "python java rust docker kubernetes aws sql react angular vue \
                  mongodb redis kafka leadership communication";
        let out = fallback_optimization("resume", jd, ToneSelection::Professional);
        let bullets = out.lines().filter(|l| l.starts_with('•')).count();
        assert!(bullets <= 10, "expected at most 10 bullets, got {bullets}");
    }

    #[test]
    fn test_improvements_detect_summary_and_skills() {
        let improvements = extract_improvements(
            "old resume",
            "**PROFESSIONAL SUMMARY**\nGreat\n**KEY SKILLS**\n• Rust",
        );
        assert!(improvements.contains(&"Added compelling professional summary".to_string()));
        assert!(improvements
            .contains(&"Organized skills section for better visibility".to_string()));
    }

    #[test]
    fn test_improvements_detect_metrics_and_verbs() {
        let improvements = extract_improvements(
            "did some work",
            "Led migration, developed pipeline, increased revenue by 40%",
        );
        assert!(improvements.contains(&"Added quantified achievements and metrics".to_string()));
        assert!(improvements.contains(&"Enhanced with strong action verbs".to_string()));
    }

    #[test]
    fn test_improvements_never_empty() {
        let improvements = extract_improvements("same text", "same text");
        assert_eq!(improvements, vec!["General ATS optimization applied".to_string()]);
    }
}
