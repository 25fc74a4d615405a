//! LaTeX rendering for the exported resume.

use crate::models::resume::GeneratedResume;

const DOCUMENT_TEMPLATE: &str = r#"\documentclass[11pt,a4paper]{article}
\usepackage[margin=1in]{geometry}
\usepackage[T1]{fontenc}
\usepackage{enumitem}
\usepackage{titlesec}
\titleformat{\section}{\large\bfseries}{}{0em}{}[\titlerule]
\setlist[itemize]{leftmargin=*,nosep}
\pagestyle{empty}
\begin{document}

\begin{center}
{\LARGE \textbf{{name}}}\\[2pt]
{\large {headline}}
\end{center}

{summary_block}{experience_block}{skills_block}{education_block}{watermark_block}
\end{document}
"#;

/// Escapes LaTeX special characters in user-supplied text.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '$' => out.push_str(r"\$"),
            '&' => out.push_str(r"\&"),
            '#' => out.push_str(r"\#"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '_' => out.push_str(r"\_"),
            '%' => out.push_str(r"\%"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '•' => out.push_str(r"--"),
            c => out.push(c),
        }
    }
    out
}

/// Renders the resume into a complete LaTeX document.
pub fn render_latex(resume: &GeneratedResume, include_watermark: bool) -> String {
    DOCUMENT_TEMPLATE
        .replace("{name}", &escape_latex(&resume.name))
        .replace("{headline}", &escape_latex(&resume.headline))
        .replace("{summary_block}", &summary_block(resume))
        .replace("{experience_block}", &experience_block(resume))
        .replace("{skills_block}", &skills_block(resume))
        .replace("{education_block}", &education_block(resume))
        .replace("{watermark_block}", watermark_block(include_watermark))
}

fn summary_block(resume: &GeneratedResume) -> String {
    if resume.summary.is_empty() {
        return String::new();
    }
    format!(
        "\\section{{Professional Summary}}\n{}\n\n",
        escape_latex(&resume.summary)
    )
}

fn experience_block(resume: &GeneratedResume) -> String {
    if resume.experience.is_empty() {
        return String::new();
    }
    let mut block = String::from("\\section{Professional Experience}\n");
    for entry in &resume.experience {
        block.push_str(&format!(
            "\\textbf{{{}}} \\hfill {}\\\\\n\\textit{{{}}}\n",
            escape_latex(&entry.title),
            escape_latex(&entry.period),
            escape_latex(&entry.company),
        ));
        let bullets: Vec<&str> = entry
            .description
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if !bullets.is_empty() {
            block.push_str("\\begin{itemize}\n");
            for bullet in bullets {
                block.push_str(&format!("\\item {}\n", escape_latex(bullet)));
            }
            block.push_str("\\end{itemize}\n");
        }
        block.push('\n');
    }
    block
}

fn skills_block(resume: &GeneratedResume) -> String {
    if resume.skills.is_empty() {
        return String::new();
    }
    let skills: Vec<String> = resume.skills.iter().map(|s| escape_latex(s)).collect();
    format!("\\section{{Key Skills}}\n{}\n\n", skills.join(" \\textbullet{} "))
}

fn education_block(resume: &GeneratedResume) -> String {
    if resume.education.is_empty() {
        return String::new();
    }
    format!(
        "\\section{{Education}}\n{}\n\n",
        escape_latex(&resume.education)
    )
}

fn watermark_block(include_watermark: bool) -> &'static str {
    if include_watermark {
        "\\vfill\n\\begin{center}\\tiny Generated with Rezoom\\end{center}\n"
    } else {
        ""
    }
}
