//! Axum route handlers for the standalone parse and score endpoints.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::intake::document::{accept_first, DocumentKind, UploadedDocument};
use crate::intake::job_description::JobDescriptionInput;
use crate::pipeline::ats::AtsReport;
use crate::pipeline::structure::{JobOutline, ResumeOutline};
use crate::pipeline::{extract, structure, text_cleaner};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ParseResumeResponse {
    pub filename: String,
    pub kind: DocumentKind,
    pub file_size: usize,
    pub text: String,
    pub outline: ResumeOutline,
    pub word_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ParseJobDescriptionRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ParseJobDescriptionResponse {
    pub text: String,
    pub looks_like_url: bool,
    pub outline: JobOutline,
    pub keywords: Vec<String>,
    pub word_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub cv_text: String,
    pub job_description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/parse/resume
///
/// Extracts and cleans text from an uploaded resume without starting a run.
/// Only the first file part is used.
pub async fn handle_parse_resume(
    State(_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParseResumeResponse>, AppError> {
    let mut slot: Option<UploadedDocument> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if slot.is_some() {
            debug!("Ignoring additional file part; only the first is kept");
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        let document = UploadedDocument::new(&filename, content_type.as_deref(), bytes)?;
        accept_first(&mut slot, document);
    }

    let document =
        slot.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    let file_size = document.size();
    let kind = document.kind;
    let name = document.name.clone();

    let raw = tokio::task::spawn_blocking(move || extract::extract_text(&document))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;
    let text = text_cleaner::clean_resume_text(&raw);
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No text could be extracted from the uploaded document".to_string(),
        ));
    }
    let outline = structure::outline_resume(&text);
    let word_count = text.split_whitespace().count();

    Ok(Json(ParseResumeResponse {
        filename: name,
        kind,
        file_size,
        text,
        outline,
        word_count,
    }))
}

/// POST /api/v1/parse/job-description
///
/// Cleans a pasted job description and returns the derived URL flag plus a
/// coarse outline. No fetch is performed for URL inputs; retrieval is an
/// external capability.
pub async fn handle_parse_job_description(
    State(_state): State<AppState>,
    Json(request): Json<ParseJobDescriptionRequest>,
) -> Result<Json<ParseJobDescriptionResponse>, AppError> {
    let input = JobDescriptionInput::new(request.text);
    if input.is_empty() {
        return Err(AppError::Validation(
            "No job description provided".to_string(),
        ));
    }

    let text = text_cleaner::clean_job_description(input.text());
    let outline = structure::outline_job(&text);
    let keywords = text_cleaner::extract_keywords(&text, 3);
    let word_count = text.split_whitespace().count();

    Ok(Json(ParseJobDescriptionResponse {
        looks_like_url: input.looks_like_url(),
        text,
        outline,
        keywords,
        word_count,
    }))
}

/// POST /api/v1/score
///
/// ATS compatibility report for an arbitrary (resume text, JD text) pair.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<AtsReport>, AppError> {
    if request.cv_text.trim().is_empty() {
        return Err(AppError::Validation("CV text is required".to_string()));
    }
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Job description is required".to_string(),
        ));
    }

    let report = state
        .ats_scorer
        .score(&request.cv_text, &request.job_description)
        .await?;
    Ok(Json(report))
}
