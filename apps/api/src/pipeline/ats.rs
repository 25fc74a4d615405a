#![allow(dead_code)]

//! ATS scoring — pluggable, trait-based scorer measuring a resume against a
//! job description.
//!
//! Default: `KeywordAtsScorer` (pure-Rust, fast, deterministic, fully
//! testable). `AppState` holds an `Arc<dyn AtsScorer>`, so a semantic
//! backend can be swapped in without touching handlers or the run driver.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const TECHNICAL_SKILLS: &[&str] = &[
    "javascript", "python", "java", "react", "node.js", "sql", "aws", "docker", "kubernetes",
    "git", "agile", "scrum", "machine learning", "data analysis", "html", "css", "typescript",
    "angular", "vue", "mongodb", "postgresql", "redis", "elasticsearch", "kafka", "microservices",
    "api", "rest", "graphql", "tensorflow", "pytorch", "pandas", "numpy", "scikit-learn",
    "jupyter", "jenkins", "terraform", "ansible", "linux", "bash", "powershell", "tableau",
    "power bi", "excel", "vba", "matlab", "spark", "hadoop", "rust",
];

pub const SOFT_SKILLS: &[&str] = &[
    "leadership", "communication", "teamwork", "problem solving", "project management",
    "collaboration", "time management", "adaptability", "creativity", "analytical",
    "critical thinking", "attention to detail", "multitasking", "mentoring", "negotiation",
    "presentation", "writing", "research", "organization", "customer service", "sales",
    "marketing", "strategy", "innovation",
];

pub const ACTION_VERBS: &[&str] = &[
    "led", "developed", "implemented", "increased", "improved", "managed", "created", "designed",
    "built", "launched", "optimized", "streamlined", "coordinated", "supervised", "trained",
    "mentored", "collaborated", "delivered", "achieved", "accomplished", "executed",
    "facilitated", "initiated", "organized", "planned",
];

// Category weights; must sum to 1.0.
const WEIGHT_KEYWORD: f64 = 0.30;
const WEIGHT_TECHNICAL: f64 = 0.25;
const WEIGHT_SOFT_SKILLS: f64 = 0.15;
const WEIGHT_EXPERIENCE: f64 = 0.15;
const WEIGHT_EDUCATION: f64 = 0.10;
const WEIGHT_ACTION_VERBS: f64 = 0.05;

static YEARS_RE: OnceLock<Option<Regex>> = OnceLock::new();
static CAPITALIZED_RE: OnceLock<Option<Regex>> = OnceLock::new();
static DIGIT_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn regex_of(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

// ────────────────────────────────────────────────────────────────────────────
// Output data models (shared across all scorer backends)
// ────────────────────────────────────────────────────────────────────────────

/// Severity band driving the score gauge color and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Good,
    Moderate,
    Poor,
}

impl ScoreTier {
    /// Band boundaries: ≥80 good, ≥60 moderate, else poor.
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            ScoreTier::Good
        } else if score >= 60 {
            ScoreTier::Moderate
        } else {
            ScoreTier::Poor
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ScoreTier::Good => "Excellent ATS compatibility",
            ScoreTier::Moderate => "Good compatibility, minor improvements needed",
            ScoreTier::Poor => "Poor compatibility, major optimization required",
        }
    }
}

/// Gauge fill proportion: `score / max`, clamped to [0, 1].
pub fn gauge_fill(score: u32, max_score: u32) -> f64 {
    if max_score == 0 {
        return 0.0;
    }
    (score as f64 / max_score as f64).clamp(0.0, 1.0)
}

/// A keyword-overlap category: how many of the JD's terms the resume covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    pub matched: Vec<String>,
    pub total: usize,
    pub percentage: f64,
}

impl CategoryScore {
    fn from_overlap(matched: Vec<String>, total: usize) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            (matched.len() as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
        };
        Self {
            matched,
            total,
            percentage,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceMatch {
    pub score: f64,
    pub job_years: u32,
    pub resume_years: u32,
    pub met: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationMatch {
    pub score: f64,
    pub required: Vec<String>,
    pub found: Vec<String>,
    pub met: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionVerbUsage {
    pub score: f64,
    pub found: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub overall: String,
    pub keywords: String,
    pub technical: String,
}

/// Full ATS compatibility report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsReport {
    pub overall_score: u32, // 0 – 100
    pub tier: ScoreTier,
    pub keyword: CategoryScore,
    pub technical: CategoryScore,
    pub soft_skills: CategoryScore,
    pub experience: ExperienceMatch,
    pub education: EducationMatch,
    pub action_verbs: ActionVerbUsage,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
    pub analysis: Analysis,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The ATS scorer seam. Implement this to swap backends without touching
/// the endpoints or the run driver.
#[async_trait]
pub trait AtsScorer: Send + Sync {
    async fn score(&self, resume_text: &str, job_description: &str)
        -> Result<AtsReport, AppError>;
}

/// Pure-Rust keyword-based scorer. No model call involved.
pub struct KeywordAtsScorer;

#[async_trait]
impl AtsScorer for KeywordAtsScorer {
    async fn score(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AtsReport, AppError> {
        Ok(compute_ats_report(resume_text, job_description))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core keyword algorithm
// ────────────────────────────────────────────────────────────────────────────

pub fn compute_ats_report(resume_text: &str, job_description: &str) -> AtsReport {
    let job_keywords = extract_job_keywords(job_description);
    let resume_keywords = extract_resume_keywords(resume_text);

    let keyword = overlap_of(&job_keywords, &resume_keywords);
    let technical = list_overlap(TECHNICAL_SKILLS, resume_text, job_description);
    let soft_skills = list_overlap(SOFT_SKILLS, resume_text, job_description);
    let experience = experience_match(resume_text, job_description);
    let education = education_match(resume_text, job_description);
    let action_verbs = action_verb_usage(resume_text);

    let weighted = keyword.percentage * WEIGHT_KEYWORD
        + technical.percentage * WEIGHT_TECHNICAL
        + soft_skills.percentage * WEIGHT_SOFT_SKILLS
        + experience.score * WEIGHT_EXPERIENCE
        + education.score * WEIGHT_EDUCATION
        + action_verbs.score * WEIGHT_ACTION_VERBS;
    let overall_score = weighted.round().clamp(0.0, 100.0) as u32;

    let missing_keywords: Vec<String> = job_keywords
        .iter()
        .filter(|kw| !resume_keywords.contains(kw))
        .cloned()
        .collect();
    let matched_keywords = keyword.matched.clone();

    let suggestions = build_suggestions(overall_score, &missing_keywords, resume_text);
    let analysis = build_analysis(overall_score, &keyword, &technical);

    AtsReport {
        overall_score,
        tier: ScoreTier::from_score(overall_score),
        keyword,
        technical,
        soft_skills,
        experience,
        education,
        action_verbs,
        matched_keywords,
        missing_keywords,
        suggestions,
        analysis,
    }
}

/// Keywords worth matching from a JD: known skill terms, capitalized
/// sequences (proper nouns, product names), and seniority markers.
pub fn extract_job_keywords(job_description: &str) -> Vec<String> {
    if job_description.is_empty() {
        return Vec::new();
    }
    let lower = job_description.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();

    for skill in TECHNICAL_SKILLS.iter().chain(SOFT_SKILLS.iter()) {
        if lower.contains(skill) {
            push_unique(&mut keywords, skill);
        }
    }

    if let Some(re) = regex_of(&CAPITALIZED_RE, r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b") {
        for m in re.find_iter(job_description) {
            let word = m.as_str().to_lowercase();
            if word.len() > 2 {
                push_unique(&mut keywords, &word);
            }
        }
    }

    if regex_of(&YEARS_RE, r"\d+\+?\s*years?")
        .map(|re| re.is_match(&lower))
        .unwrap_or(false)
    {
        push_unique(&mut keywords, "years experience");
    }
    for marker in ["senior", "junior", "lead"] {
        if lower.contains(marker) {
            push_unique(&mut keywords, marker);
        }
    }

    keywords
}

fn extract_resume_keywords(resume_text: &str) -> Vec<String> {
    if resume_text.is_empty() {
        return Vec::new();
    }
    let lower = resume_text.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();

    for term in TECHNICAL_SKILLS
        .iter()
        .chain(SOFT_SKILLS.iter())
        .chain(ACTION_VERBS.iter())
    {
        if lower.contains(term) {
            push_unique(&mut keywords, term);
        }
    }

    if let Some(re) = regex_of(&CAPITALIZED_RE, r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b") {
        for m in re.find_iter(resume_text) {
            let word = m.as_str().to_lowercase();
            if word.len() > 2 {
                push_unique(&mut keywords, &word);
            }
        }
    }

    // Seniority markers count on the resume side too, so "5 years" or
    // "Senior Engineer" in a resume satisfies the matching JD keyword.
    if regex_of(&YEARS_RE, r"\d+\+?\s*years?")
        .map(|re| re.is_match(&lower))
        .unwrap_or(false)
    {
        push_unique(&mut keywords, "years experience");
    }
    for marker in ["senior", "junior", "lead"] {
        if lower.contains(marker) {
            push_unique(&mut keywords, marker);
        }
    }

    keywords
}

fn overlap_of(job_keywords: &[String], resume_keywords: &[String]) -> CategoryScore {
    let matched: Vec<String> = job_keywords
        .iter()
        .filter(|kw| resume_keywords.contains(kw))
        .cloned()
        .collect();
    CategoryScore::from_overlap(matched, job_keywords.len())
}

fn list_overlap(list: &[&str], resume_text: &str, job_description: &str) -> CategoryScore {
    let job_lower = job_description.to_lowercase();
    let resume_lower = resume_text.to_lowercase();
    let in_job: Vec<&str> = list.iter().copied().filter(|s| job_lower.contains(s)).collect();
    let matched: Vec<String> = in_job
        .iter()
        .copied()
        .filter(|s| resume_lower.contains(s))
        .map(String::from)
        .collect();
    CategoryScore::from_overlap(matched, in_job.len())
}

fn experience_match(resume_text: &str, job_description: &str) -> ExperienceMatch {
    let job_years = extract_years(job_description);
    let resume_years = extract_years(resume_text);

    if job_years == 0 {
        // No stated requirement; neutral score.
        return ExperienceMatch {
            score: 50.0,
            job_years,
            resume_years,
            met: true,
        };
    }

    let score = if resume_years >= job_years {
        100.0
    } else if resume_years as f64 >= job_years as f64 * 0.8 {
        80.0
    } else if resume_years as f64 >= job_years as f64 * 0.6 {
        60.0
    } else {
        30.0
    };

    ExperienceMatch {
        score,
        job_years,
        resume_years,
        met: resume_years >= job_years,
    }
}

/// The largest "N years" figure mentioned in the text.
pub fn extract_years(text: &str) -> u32 {
    let re = match regex_of(&YEARS_RE, r"\d+\+?\s*years?") {
        Some(re) => re,
        None => return 0,
    };
    re.find_iter(&text.to_lowercase())
        .filter_map(|m| {
            m.as_str()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect::<String>()
                .parse::<u32>()
                .ok()
        })
        .max()
        .unwrap_or(0)
}

fn degrees_in(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found = Vec::new();
    if lower.contains("bachelor") {
        found.push("Bachelor's Degree".to_string());
    }
    if lower.contains("master") {
        found.push("Master's Degree".to_string());
    }
    if lower.contains("phd") || lower.contains("doctorate") {
        found.push("PhD".to_string());
    }
    if lower.contains("certification") || lower.contains("certified") {
        found.push("Certification".to_string());
    }
    found
}

fn education_match(resume_text: &str, job_description: &str) -> EducationMatch {
    let required = degrees_in(job_description);
    let found = degrees_in(resume_text);

    if required.is_empty() {
        return EducationMatch {
            score: 50.0,
            required,
            found,
            met: true,
        };
    }

    let met = required.iter().any(|r| found.contains(r));
    EducationMatch {
        score: if met { 100.0 } else { 30.0 },
        required,
        found,
        met,
    }
}

fn action_verb_usage(resume_text: &str) -> ActionVerbUsage {
    let lower = resume_text.to_lowercase();
    let found: Vec<String> = ACTION_VERBS
        .iter()
        .copied()
        .filter(|v| lower.contains(v))
        .map(String::from)
        .collect();
    ActionVerbUsage {
        // 10 points per verb, capped.
        score: (found.len() as f64 * 10.0).min(100.0),
        found,
    }
}

fn build_suggestions(
    overall_score: u32,
    missing_keywords: &[String],
    resume_text: &str,
) -> Vec<String> {
    let mut suggestions = Vec::new();

    if overall_score < 60 {
        suggestions.push("Add more relevant keywords from the job description".to_string());
    }

    if !missing_keywords.is_empty() {
        let top: Vec<&str> = missing_keywords.iter().take(5).map(String::as_str).collect();
        suggestions.push(format!("Consider adding these keywords: {}", top.join(", ")));
    }

    let has_numbers = regex_of(&DIGIT_RE, r"\d")
        .map(|re| re.is_match(resume_text))
        .unwrap_or(false);
    if !has_numbers {
        suggestions
            .push("Add quantified achievements with specific numbers and metrics".to_string());
    }

    let resume_lower = resume_text.to_lowercase();
    let verb_count = ACTION_VERBS.iter().filter(|v| resume_lower.contains(*v)).count();
    if verb_count < 3 {
        suggestions.push("Use more strong action verbs to describe your achievements".to_string());
    }

    if !["summary", "objective", "profile"]
        .iter()
        .any(|kw| resume_lower.contains(kw))
    {
        suggestions.push("Add a compelling professional summary section".to_string());
    }

    suggestions
}

fn build_analysis(overall_score: u32, keyword: &CategoryScore, technical: &CategoryScore) -> Analysis {
    let overall = if overall_score >= 80 {
        "Excellent ATS compatibility"
    } else if overall_score >= 60 {
        "Good compatibility, minor improvements needed"
    } else if overall_score >= 40 {
        "Fair compatibility, significant improvements needed"
    } else {
        "Poor compatibility, major optimization required"
    };

    let keywords = if keyword.percentage >= 70.0 {
        "Strong keyword match"
    } else if keyword.percentage >= 50.0 {
        "Moderate keyword match"
    } else {
        "Weak keyword match"
    };

    let technical = if technical.percentage >= 70.0 {
        "Strong technical skills match"
    } else if technical.percentage >= 50.0 {
        "Moderate technical skills match"
    } else {
        "Weak technical skills match"
    };

    Analysis {
        overall: overall.to_string(),
        keywords: keywords.to_string(),
        technical: technical.to_string(),
    }
}

fn push_unique(keywords: &mut Vec<String>, word: &str) {
    if !keywords.iter().any(|k| k == word) {
        keywords.push(word.to_string());
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const JD: &str = "Senior Rust Engineer\n\
        We need 5+ years experience with rust, docker and kubernetes.\n\
        Bachelor's degree required. Leadership and communication valued.";

    const STRONG_RESUME: &str = "Jane Doe\nSenior Engineer with 7 years experience.\n\
        Led and developed rust microservices, managed docker and kubernetes clusters,\n\
        improved throughput by 40%. Leadership, communication, mentoring.\n\
        Education: Bachelor of Science in Computer Science.";

    const WEAK_RESUME: &str = "I paint houses and walk dogs.";

    #[test]
    fn test_weights_sum_to_one() {
        let sum = WEIGHT_KEYWORD
            + WEIGHT_TECHNICAL
            + WEIGHT_SOFT_SKILLS
            + WEIGHT_EXPERIENCE
            + WEIGHT_EDUCATION
            + WEIGHT_ACTION_VERBS;
        assert!((sum - 1.0).abs() < f64::EPSILON, "weights sum to {sum}");
    }

    #[test]
    fn test_strong_resume_outscores_weak_resume() {
        let strong = compute_ats_report(STRONG_RESUME, JD);
        let weak = compute_ats_report(WEAK_RESUME, JD);
        assert!(
            strong.overall_score > weak.overall_score,
            "strong={} weak={}",
            strong.overall_score,
            weak.overall_score
        );
        assert!(strong.overall_score >= 60);
    }

    #[test]
    fn test_overall_score_bounded() {
        for report in [
            compute_ats_report(STRONG_RESUME, JD),
            compute_ats_report(WEAK_RESUME, JD),
            compute_ats_report("", ""),
        ] {
            assert!(report.overall_score <= 100);
        }
    }

    #[test]
    fn test_technical_overlap_counts_job_side_skills() {
        let report = compute_ats_report(STRONG_RESUME, JD);
        assert!(report.technical.matched.contains(&"rust".to_string()));
        assert!(report.technical.matched.contains(&"docker".to_string()));
        assert_eq!(report.technical.total, 3); // rust, docker, kubernetes
    }

    #[test]
    fn test_missing_keywords_absent_from_resume() {
        let report = compute_ats_report(WEAK_RESUME, JD);
        assert!(report.missing_keywords.contains(&"rust".to_string()));
        assert!(report
            .suggestions
            .iter()
            .any(|s| s.starts_with("Consider adding these keywords")));
    }

    #[test]
    fn test_experience_thresholds() {
        let meets = experience_match("I have 7 years of experience", "requires 5 years");
        assert_eq!(meets.score, 100.0);
        assert!(meets.met);

        let close = experience_match("4 years of experience", "requires 5 years");
        assert_eq!(close.score, 80.0);
        assert!(!close.met);

        let partial = experience_match("3 years of experience", "requires 5 years");
        assert_eq!(partial.score, 60.0);

        let short = experience_match("1 year of experience", "requires 5 years");
        assert_eq!(short.score, 30.0);
    }

    #[test]
    fn test_experience_neutral_without_requirement() {
        let m = experience_match("10 years of experience", "No years mentioned here");
        assert_eq!(m.score, 50.0);
        assert!(m.met);
    }

    #[test]
    fn test_extract_years_takes_maximum() {
        assert_eq!(extract_years("2 years here, then 6 years there"), 6);
        assert_eq!(extract_years("5+ years required"), 5);
        assert_eq!(extract_years("no experience numbers"), 0);
    }

    #[test]
    fn test_education_match_and_miss() {
        let hit = education_match("Bachelor of Arts", "Bachelor's degree required");
        assert_eq!(hit.score, 100.0);
        assert!(hit.met);

        let miss = education_match("High school diploma", "Master's degree required");
        assert_eq!(miss.score, 30.0);
        assert!(!miss.met);

        let neutral = education_match("Bachelor of Arts", "no requirements");
        assert_eq!(neutral.score, 50.0);
    }

    #[test]
    fn test_action_verbs_capped_at_100() {
        let text = ACTION_VERBS.join(" ");
        let usage = action_verb_usage(&text);
        assert_eq!(usage.score, 100.0);
        assert!(usage.found.len() >= 10);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ScoreTier::from_score(80), ScoreTier::Good);
        assert_eq!(ScoreTier::from_score(79), ScoreTier::Moderate);
        assert_eq!(ScoreTier::from_score(60), ScoreTier::Moderate);
        assert_eq!(ScoreTier::from_score(59), ScoreTier::Poor);
        assert_eq!(ScoreTier::from_score(0), ScoreTier::Poor);
        assert_eq!(ScoreTier::from_score(100), ScoreTier::Good);
    }

    #[test]
    fn test_gauge_fill_exact_endpoints() {
        assert_eq!(gauge_fill(100, 100), 1.0);
        assert_eq!(gauge_fill(0, 100), 0.0);
        assert_eq!(gauge_fill(50, 100), 0.5);
    }

    #[test]
    fn test_gauge_fill_clamped_and_zero_max() {
        assert_eq!(gauge_fill(150, 100), 1.0);
        assert_eq!(gauge_fill(10, 0), 0.0);
    }

    #[test]
    fn test_suggestions_for_unquantified_resume() {
        let report = compute_ats_report("Led teams. Developed things. Managed stuff.", JD);
        assert!(report
            .suggestions
            .iter()
            .any(|s| s.contains("quantified achievements")));
    }

    #[test]
    fn test_empty_jd_yields_empty_categories() {
        let report = compute_ats_report(STRONG_RESUME, "");
        assert_eq!(report.keyword.total, 0);
        assert_eq!(report.keyword.percentage, 0.0);
        assert_eq!(report.technical.total, 0);
    }

    #[test]
    fn test_analysis_tiers() {
        let a = build_analysis(
            85,
            &CategoryScore::from_overlap(vec!["rust".into()], 1),
            &CategoryScore::from_overlap(vec!["rust".into()], 1),
        );
        assert_eq!(a.overall, "Excellent ATS compatibility");
        assert_eq!(a.keywords, "Strong keyword match");

        let b = build_analysis(
            30,
            &CategoryScore::from_overlap(vec![], 4),
            &CategoryScore::from_overlap(vec![], 4),
        );
        assert_eq!(b.overall, "Poor compatibility, major optimization required");
        assert_eq!(b.keywords, "Weak keyword match");
    }

    #[tokio::test]
    async fn test_trait_object_scores() {
        let scorer: std::sync::Arc<dyn AtsScorer> = std::sync::Arc::new(KeywordAtsScorer);
        let report = scorer.score(STRONG_RESUME, JD).await.unwrap();
        assert!(report.overall_score > 0);
    }
}
