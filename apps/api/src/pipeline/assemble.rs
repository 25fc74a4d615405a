//! Final assembly — turns the optimizer's sectioned text into the
//! structured `GeneratedResume` the preview, export, and email layers
//! consume. Built once, atomically; the result is immutable afterwards.

use std::collections::BTreeMap;

use crate::intake::tone::ToneSelection;
use crate::models::resume::{ExperienceEntry, GeneratedResume};
use crate::pipeline::ats::AtsReport;
use crate::pipeline::optimizer::OptimizationOutcome;
use crate::pipeline::structure::{JobOutline, ResumeOutline};

pub fn build_resume(
    outline: &ResumeOutline,
    job: &JobOutline,
    outcome: &OptimizationOutcome,
    report: &AtsReport,
    tone: ToneSelection,
) -> GeneratedResume {
    let sections = split_sections(&outcome.optimized_text);

    let name = sections
        .get("CONTACT INFORMATION")
        .and_then(|body| contact_name(body))
        .or_else(|| {
            if outline.name.is_empty() {
                None
            } else {
                Some(outline.name.clone())
            }
        })
        .unwrap_or_else(|| "Candidate".to_string());

    let experience = sections
        .get("PROFESSIONAL EXPERIENCE")
        .map(|body| parse_experience(body))
        .unwrap_or_default();

    let headline = if !job.title.is_empty() {
        job.title.clone()
    } else if let Some(first) = experience.first() {
        first.title.clone()
    } else {
        "Professional".to_string()
    };

    let summary = sections
        .get("PROFESSIONAL SUMMARY")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let skills = sections
        .get("KEY SKILLS")
        .map(|body| parse_skills(body))
        .unwrap_or_default();

    let education = sections
        .get("EDUCATION")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    GeneratedResume {
        name,
        headline,
        summary,
        experience,
        skills,
        education,
        ats_score: report.overall_score,
        improvements: outcome.improvements.clone(),
        tone_applied: tone,
        optimized_text: outcome.optimized_text.clone(),
    }
}

/// Splits `**HEADER**`-delimited output into header → body. Headers are
/// uppercased for lookup; unknown sections are carried along untouched.
fn split_sections(text: &str) -> BTreeMap<String, String> {
    let mut sections = BTreeMap::new();
    let mut current: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(header) = section_marker(trimmed) {
            if let Some(prev) = current.take() {
                sections.insert(prev, body.join("\n").trim().to_string());
            }
            current = Some(header);
            body.clear();
        } else if current.is_some() {
            body.push(line);
        }
    }
    if let Some(prev) = current {
        sections.insert(prev, body.join("\n").trim().to_string());
    }
    sections
}

fn section_marker(line: &str) -> Option<String> {
    let inner = line.strip_prefix("**")?.strip_suffix("**")?.trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_uppercase())
    }
}

/// Picks the name out of a contact block. Contact lines come back in
/// "Jane Doe | jane@x.com | NYC" shape; the name is the first segment that
/// is neither an address nor a number.
fn contact_name(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !is_placeholder(l))
        .flat_map(|l| l.split(['|', ',']))
        .map(str::trim)
        .find(|segment| {
            !segment.is_empty()
                && !segment.contains('@')
                && !segment.chars().any(|c| c.is_ascii_digit())
        })
        .map(str::to_string)
}

fn parse_experience(body: &str) -> Vec<ExperienceEntry> {
    let mut entries = Vec::new();

    for block in body.split("\n\n") {
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !is_placeholder(l))
            .collect();
        let Some((heading, rest)) = lines.split_first() else {
            continue;
        };

        let (title, company, period) = parse_heading(heading);
        let description = rest
            .iter()
            .map(|l| strip_bullet(l))
            .collect::<Vec<_>>()
            .join("\n");

        entries.push(ExperienceEntry {
            title,
            company,
            period,
            description,
        });
    }

    entries
}

/// Heading shapes seen in model output: "Title | Company | Dates" or
/// "Title, Company, Dates". Anything else keeps the whole line as the title.
fn parse_heading(heading: &str) -> (String, String, String) {
    let separator = if heading.contains('|') {
        Some('|')
    } else if heading.matches(',').count() >= 2 {
        Some(',')
    } else {
        None
    };

    match separator {
        Some(sep) => {
            let parts: Vec<&str> = heading.split(sep).map(str::trim).collect();
            (
                parts.first().copied().unwrap_or_default().to_string(),
                parts.get(1).copied().unwrap_or_default().to_string(),
                parts.get(2..).map(|p| p.join(", ")).unwrap_or_default(),
            )
        }
        None => (strip_bullet(heading), String::new(), String::new()),
    }
}

fn parse_skills(body: &str) -> Vec<String> {
    let mut skills = Vec::new();
    for line in body.lines() {
        let line = strip_bullet(line.trim());
        if line.is_empty() || is_placeholder(&line) {
            continue;
        }
        // A category line like "Languages: Rust, Python" contributes its items.
        let items = line.split_once(':').map(|(_, rest)| rest).unwrap_or(&line);
        for item in items.split(',') {
            let item = item.trim();
            if !item.is_empty() && !skills.iter().any(|s: &String| s.eq_ignore_ascii_case(item)) {
                skills.push(item.to_string());
            }
        }
    }
    skills
}

fn strip_bullet(line: &str) -> String {
    line.trim_start_matches(['•', '-', '*'])
        .trim()
        .to_string()
}

fn is_placeholder(line: &str) -> bool {
    line.starts_with('[') && line.ends_with(']')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ats::compute_ats_report;
    use crate::pipeline::optimizer::OptimizationMethod;

    const OPTIMIZED: &str = "**CONTACT INFORMATION**\n\
Jane Doe | jane@example.com | New York\n\n\
**PROFESSIONAL SUMMARY**\n\
Senior backend engineer with 7 years of experience shipping Rust services.\n\n\
**PROFESSIONAL EXPERIENCE**\n\
Senior Engineer | Acme Corp | 2019 - 2024\n\
• Led migration of 12 services to Rust\n\
• Increased throughput by 40%\n\n\
Engineer | Widgets Inc | 2016 - 2019\n\
• Built data pipeline processing 2M events/day\n\n\
**KEY SKILLS**\n\
• Languages: Rust, Python\n\
• Infrastructure: Docker, Kubernetes\n\n\
**EDUCATION**\n\
BS Computer Science, State University, 2016";

    fn outcome(text: &str) -> OptimizationOutcome {
        OptimizationOutcome {
            optimized_text: text.to_string(),
            improvements: vec!["Added compelling professional summary".to_string()],
            method: OptimizationMethod::Ai,
        }
    }

    fn build(text: &str) -> GeneratedResume {
        let outline = ResumeOutline {
            name: "Outline Name".to_string(),
            ..Default::default()
        };
        let job = JobOutline {
            title: "Senior Rust Engineer".to_string(),
            ..Default::default()
        };
        let report = compute_ats_report(text, "rust docker kubernetes");
        build_resume(&outline, &job, &outcome(text), &report, ToneSelection::Tech)
    }

    #[test]
    fn test_name_from_contact_section() {
        assert_eq!(build(OPTIMIZED).name, "Jane Doe");
    }

    #[test]
    fn test_headline_prefers_job_title() {
        assert_eq!(build(OPTIMIZED).headline, "Senior Rust Engineer");
    }

    #[test]
    fn test_summary_and_education_bodies() {
        let resume = build(OPTIMIZED);
        assert!(resume.summary.starts_with("Senior backend engineer"));
        assert!(resume.education.contains("State University"));
    }

    #[test]
    fn test_experience_entries_ordered_and_parsed() {
        let resume = build(OPTIMIZED);
        assert_eq!(resume.experience.len(), 2);
        let first = &resume.experience[0];
        assert_eq!(first.title, "Senior Engineer");
        assert_eq!(first.company, "Acme Corp");
        assert_eq!(first.period, "2019 - 2024");
        assert!(first.description.contains("Led migration"));
        assert_eq!(resume.experience[1].company, "Widgets Inc");
    }

    #[test]
    fn test_skills_flattened_from_categories() {
        let resume = build(OPTIMIZED);
        for skill in ["Rust", "Python", "Docker", "Kubernetes"] {
            assert!(
                resume.skills.iter().any(|s| s == skill),
                "missing {skill} in {:?}",
                resume.skills
            );
        }
    }

    #[test]
    fn test_comma_separated_heading() {
        let (title, company, period) = parse_heading("Engineer, Acme Corp, 2019 - 2024");
        assert_eq!(title, "Engineer");
        assert_eq!(company, "Acme Corp");
        assert_eq!(period, "2019 - 2024");
    }

    #[test]
    fn test_placeholder_sections_yield_empty_fields() {
        let text = "**PROFESSIONAL EXPERIENCE**\n[Your work experience with quantified achievements]\n\n**KEY SKILLS**\n[Skills here]";
        let resume = build(text);
        assert!(resume.experience.is_empty());
        assert!(resume.skills.is_empty());
    }

    #[test]
    fn test_name_falls_back_to_outline_then_default() {
        let text = "**PROFESSIONAL SUMMARY**\nA summary.";
        let resume = build(text);
        assert_eq!(resume.name, "Outline Name");

        let outline = ResumeOutline::default();
        let job = JobOutline::default();
        let report = compute_ats_report(text, "");
        let resume = build_resume(
            &outline,
            &job,
            &outcome(text),
            &report,
            ToneSelection::Professional,
        );
        assert_eq!(resume.name, "Candidate");
        assert_eq!(resume.headline, "Professional");
    }

    #[test]
    fn test_score_and_tone_carried() {
        let resume = build(OPTIMIZED);
        assert!(resume.ats_score <= 100);
        assert_eq!(resume.tone_applied, ToneSelection::Tech);
        assert_eq!(resume.optimized_text, OPTIMIZED);
    }
}
