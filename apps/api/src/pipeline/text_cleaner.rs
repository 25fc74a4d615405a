//! Text preprocessing for extracted resumes and pasted job descriptions.

use std::sync::OnceLock;

use regex::Regex;

const STOPWORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "a", "an", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "can", "must", "shall", "this", "that", "these",
    "those", "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
];

fn regex_of(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

static HTML_TAG_RE: OnceLock<Option<Regex>> = OnceLock::new();
static SPACE_RUN_RE: OnceLock<Option<Regex>> = OnceLock::new();
static BLANK_LINE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static WORD_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Cleans text extracted from a resume document: normalizes bullets and
/// whitespace runs, drops extraction artifacts, preserves line structure
/// (the section detector depends on it).
pub fn clean_resume_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut cleaned: String = text
        .chars()
        .map(|c| match c {
            '•' | '·' | '▪' | '▫' | '‣' | '⁃' => '•',
            c if allowed_char(c) => c,
            _ => ' ',
        })
        .collect();

    if let Some(re) = regex_of(&SPACE_RUN_RE, r"[ \t]+") {
        cleaned = re.replace_all(&cleaned, " ").into_owned();
    }
    if let Some(re) = regex_of(&BLANK_LINE_RE, r"\n\s*\n(\s*\n)+") {
        cleaned = re.replace_all(&cleaned, "\n\n").into_owned();
    }

    cleaned
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Cleans a pasted job description: strips HTML tags first (postings are
/// often copied from listing pages), then applies the same normalization.
pub fn clean_job_description(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let stripped = match regex_of(&HTML_TAG_RE, r"<[^>]+>") {
        Some(re) => re.replace_all(text, " ").into_owned(),
        None => text.to_string(),
    };
    clean_resume_text(&stripped)
}

/// Lowercased keywords of at least `min_length` characters, with stopwords
/// and bare numbers filtered out. Order of first occurrence is preserved.
pub fn extract_keywords(text: &str, min_length: usize) -> Vec<String> {
    let re = match regex_of(&WORD_RE, r"[A-Za-z][A-Za-z0-9.+#-]*") {
        Some(re) => re,
        None => return Vec::new(),
    };

    let mut keywords = Vec::new();
    for m in re.find_iter(&text.to_lowercase()) {
        let word = m.as_str();
        if word.len() >= min_length
            && !STOPWORDS.contains(&word)
            && !keywords.iter().any(|k| k == word)
        {
            keywords.push(word.to_string());
        }
    }
    keywords
}

fn allowed_char(c: char) -> bool {
    c.is_alphanumeric()
        || c.is_whitespace()
        || matches!(
            c,
            '.' | ','
                | ';'
                | ':'
                | '!'
                | '?'
                | '-'
                | '('
                | ')'
                | '['
                | ']'
                | '{'
                | '}'
                | '"'
                | '\''
                | '/'
                | '@'
                | '#'
                | '$'
                | '%'
                | '&'
                | '*'
                | '+'
                | '='
                | '<'
                | '>'
                | '|'
                | '\\'
                | '•'
        )
}
