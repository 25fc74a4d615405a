//! Structure heuristics — turns cleaned resume/JD text into coarse outlines.
//!
//! These are hints for downstream stages, not a full parser: a line-oriented
//! section detector plus contact-info regexes. Anything they miss is filled
//! in from the optimizer's structured output instead.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
static PHONE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static YEARS_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn regex_of(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

const SECTION_KEYWORDS: &[(&str, &[&str])] = &[
    ("summary", &["summary", "objective", "profile", "about"]),
    (
        "experience",
        &["experience", "work history", "employment", "career"],
    ),
    ("education", &["education", "academic", "qualifications"]),
    (
        "skills",
        &["skills", "technical skills", "competencies", "abilities"],
    ),
];

/// Coarse structure extracted from a cleaned resume.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResumeOutline {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub sections: BTreeMap<String, String>,
}

/// Coarse structure extracted from a cleaned job description.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobOutline {
    pub title: String,
    pub skills: Vec<String>,
    pub experience_level: Option<String>,
}

pub fn outline_resume(text: &str) -> ResumeOutline {
    let mut outline = ResumeOutline {
        email: regex_of(
            &EMAIL_RE,
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
        )
        .and_then(|re| re.find(text))
        .map(|m| m.as_str().to_string()),
        phone: regex_of(
            &PHONE_RE,
            r"(\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}",
        )
        .and_then(|re| re.find(text))
        .map(|m| m.as_str().to_string()),
        ..Default::default()
    };

    let mut current_section: Option<&str> = None;
    let mut current_content: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(section) = section_header(line) {
            if let Some(prev) = current_section.take() {
                push_section(&mut outline.sections, prev, &current_content);
            }
            current_section = Some(section);
            current_content.clear();
            continue;
        }

        if current_section.is_some() {
            current_content.push(line);
        } else if outline.name.is_empty() && line.split_whitespace().count() <= 3 {
            // Short line before any section header is most likely the name.
            outline.name = line.to_string();
        }
    }
    if let Some(prev) = current_section {
        push_section(&mut outline.sections, prev, &current_content);
    }

    outline
}

pub fn outline_job(text: &str) -> JobOutline {
    let mut outline = JobOutline::default();

    // The title usually sits in the first few lines.
    for line in text.lines().take(5) {
        let lower = line.to_lowercase();
        if ["engineer", "developer", "manager", "analyst", "specialist", "scientist"]
            .iter()
            .any(|role| lower.contains(role))
        {
            outline.title = line.trim().to_string();
            break;
        }
    }

    let lower = text.to_lowercase();
    for skill in super::ats::TECHNICAL_SKILLS
        .iter()
        .chain(super::ats::SOFT_SKILLS.iter())
    {
        if lower.contains(skill) {
            outline.skills.push((*skill).to_string());
        }
    }

    outline.experience_level = detect_experience_level(&lower);
    outline
}

fn detect_experience_level(lower: &str) -> Option<String> {
    if let Some(m) = regex_of(&YEARS_RE, r"\d+\+?\s*years?").and_then(|re| re.find(lower)) {
        return Some(m.as_str().to_string());
    }
    for level in ["entry-level", "entry level", "senior", "junior", "mid-level", "lead"] {
        if lower.contains(level) {
            return Some(level.to_string());
        }
    }
    None
}

fn section_header(line: &str) -> Option<&'static str> {
    // Section headers are short; a keyword inside a long sentence is body text.
    if line.split_whitespace().count() > 5 {
        return None;
    }
    let lower = line.to_lowercase();
    for (section, keywords) in SECTION_KEYWORDS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return Some(section);
        }
    }
    None
}

fn push_section(sections: &mut BTreeMap<String, String>, name: &str, content: &[&str]) {
    if !content.is_empty() {
        sections.insert(name.to_string(), content.join("\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Doe\njane.doe@example.com (555) 123-4567\n\n\
Professional Summary\nBackend engineer with 7 years of experience.\n\n\
Work Experience\nSenior Engineer • Acme Corp • 2019-2024\n• Built services in Rust\n\n\
Education\nBS Computer Science, State University\n\n\
Skills\nRust, PostgreSQL, Docker";

    #[test]
    fn test_contact_info_extracted() {
        let outline = outline_resume(RESUME);
        assert_eq!(outline.email.as_deref(), Some("jane.doe@example.com"));
        assert_eq!(outline.phone.as_deref(), Some("(555) 123-4567"));
    }

    #[test]
    fn test_name_is_first_short_line() {
        assert_eq!(outline_resume(RESUME).name, "Jane Doe");
    }

    #[test]
    fn test_sections_detected() {
        let outline = outline_resume(RESUME);
        assert!(outline.sections["summary"].contains("Backend engineer"));
        assert!(outline.sections["experience"].contains("Acme Corp"));
        assert!(outline.sections["education"].contains("State University"));
        assert!(outline.sections["skills"].contains("Rust"));
    }

    #[test]
    fn test_long_line_with_keyword_is_not_a_header() {
        assert_eq!(
            section_header("I have experience building large distributed systems at scale"),
            None
        );
        assert_eq!(section_header("Work Experience"), Some("experience"));
    }

    #[test]
    fn test_job_title_from_first_lines() {
        let job = outline_job("Senior Rust Engineer\nAcme Corp\nWe need 5+ years experience");
        assert_eq!(job.title, "Senior Rust Engineer");
    }

    #[test]
    fn test_job_skills_and_level() {
        let job = outline_job(
            "Backend Developer\nMust know python, docker and kubernetes. Senior role, 5+ years.",
        );
        assert!(job.skills.contains(&"python".to_string()));
        assert!(job.skills.contains(&"docker".to_string()));
        assert_eq!(job.experience_level.as_deref(), Some("5+ years"));
    }

    #[test]
    fn test_empty_text_gives_empty_outline() {
        let outline = outline_resume("");
        assert!(outline.name.is_empty());
        assert!(outline.sections.is_empty());
        let job = outline_job("");
        assert!(job.title.is_empty());
        assert!(job.skills.is_empty());
    }
}
