//! Axum route handlers for PDF export and download.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::export;
use crate::models::resume::GeneratedResume;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub resume: GeneratedResume,
    #[serde(default = "default_watermark")]
    pub include_watermark: bool,
}

fn default_watermark() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub download_url: String,
    pub filename: String,
    pub file_size: u64,
}

/// POST /api/v1/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Json<ExportResponse>, AppError> {
    let exported = export::export_pdf(
        &state.config.tmp_dir,
        &request.resume,
        request.include_watermark,
    )
    .await?;

    Ok(Json(ExportResponse {
        download_url: format!("/api/v1/export/download/{}", exported.filename),
        filename: exported.filename,
        file_size: exported.size,
    }))
}

/// GET /api/v1/export/download/:filename
pub async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let bytes = export::load_export(&state.config.tmp_dir, &filename).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
