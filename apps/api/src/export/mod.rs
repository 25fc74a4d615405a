//! PDF export — renders LaTeX, compiles it with pdflatex in a scratch
//! directory, and persists the artifact in the service tmp dir where the
//! retention sweeper owns its lifetime.

pub mod handlers;
pub mod latex;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::GeneratedResume;

static FILENAME_RE: OnceLock<Option<Regex>> = OnceLock::new();

pub struct ExportedFile {
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Download names are fully service-generated; anything else (traversal
/// attempts included) is rejected before touching the filesystem.
pub fn is_safe_filename(filename: &str) -> bool {
    FILENAME_RE
        .get_or_init(|| Regex::new(r"^resume_[0-9a-f]{8}\.pdf$").ok())
        .as_ref()
        .map(|re| re.is_match(filename))
        .unwrap_or(false)
}

pub async fn export_pdf(
    tmp_dir: &str,
    resume: &GeneratedResume,
    include_watermark: bool,
) -> Result<ExportedFile, AppError> {
    let latex_source = latex::render_latex(resume, include_watermark);

    let build_dir = tempfile::tempdir()
        .map_err(|e| AppError::Export(format!("Failed to create build directory: {e}")))?;
    let tex_path = build_dir.path().join("resume.tex");
    tokio::fs::write(&tex_path, latex_source)
        .await
        .map_err(|e| AppError::Export(format!("Failed to write LaTeX source: {e}")))?;

    let output = tokio::process::Command::new("pdflatex")
        .arg("-interaction=nonstopmode")
        .arg("-halt-on-error")
        .arg("-output-directory")
        .arg(build_dir.path())
        .arg(&tex_path)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AppError::Export(
                    "pdflatex is not installed; PDF export is unavailable".to_string(),
                )
            } else {
                AppError::Export(format!("Failed to run pdflatex: {e}"))
            }
        })?;

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let tail: String = stdout
            .lines()
            .rev()
            .take(10)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join("\n");
        return Err(AppError::Export(format!("pdflatex failed:\n{tail}")));
    }

    let pdf_bytes = tokio::fs::read(build_dir.path().join("resume.pdf"))
        .await
        .map_err(|e| AppError::Export(format!("pdflatex produced no output: {e}")))?;

    let filename = format!("resume_{}.pdf", &Uuid::new_v4().simple().to_string()[..8]);
    tokio::fs::create_dir_all(tmp_dir)
        .await
        .map_err(|e| AppError::Export(format!("Failed to create tmp dir: {e}")))?;
    let path = Path::new(tmp_dir).join(&filename);
    tokio::fs::write(&path, &pdf_bytes)
        .await
        .map_err(|e| AppError::Export(format!("Failed to persist export: {e}")))?;

    info!("Exported {} ({} bytes)", filename, pdf_bytes.len());
    Ok(ExportedFile {
        filename,
        path,
        size: pdf_bytes.len() as u64,
    })
}

/// Loads a previously exported artifact by its service-generated filename.
pub async fn load_export(tmp_dir: &str, filename: &str) -> Result<Vec<u8>, AppError> {
    if !is_safe_filename(filename) {
        return Err(AppError::Validation("Invalid filename".to_string()));
    }
    match tokio::fs::read(Path::new(tmp_dir).join(filename)).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::NotFound(
            "File not found; it may have been cleaned up".to_string(),
        )),
        Err(e) => Err(AppError::Export(format!("Failed to read export: {e}"))),
    }
}
