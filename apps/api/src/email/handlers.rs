//! Axum route handler for email delivery.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::email::{
    default_body, default_subject, is_plausible_address, EmailAttachment, Mailer, OutgoingEmail,
};
use crate::errors::AppError;
use crate::export;
use crate::models::resume::GeneratedResume;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub to_email: String,
    pub subject: Option<String>,
    pub message: Option<String>,
    /// Filename of an already-exported PDF to attach.
    pub attachment: Option<String>,
    /// Alternatively, a resume to export and attach in one step.
    pub resume: Option<GeneratedResume>,
}

#[derive(Debug, Serialize)]
pub struct EmailResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/v1/email/send
///
/// Sends the optimized resume to a recipient. The attachment is either an
/// existing export (by filename) or a fresh export of the supplied resume.
pub async fn handle_send_email(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<EmailResponse>, AppError> {
    if !is_plausible_address(&request.to_email) {
        return Err(AppError::Validation(
            "Valid email address is required".to_string(),
        ));
    }

    let smtp = state
        .config
        .smtp
        .clone()
        .ok_or_else(|| AppError::Email("Email delivery is not configured".to_string()))?;

    let attachment = match (&request.resume, &request.attachment) {
        (Some(resume), _) => {
            let exported = export::export_pdf(&state.config.tmp_dir, resume, true).await?;
            let bytes = tokio::fs::read(&exported.path)
                .await
                .map_err(|e| AppError::Export(format!("Failed to read export: {e}")))?;
            Some(EmailAttachment {
                filename: exported.filename,
                bytes,
            })
        }
        (None, Some(filename)) => Some(EmailAttachment {
            filename: filename.clone(),
            bytes: export::load_export(&state.config.tmp_dir, filename).await?,
        }),
        (None, None) => None,
    };

    let email = OutgoingEmail {
        to: request.to_email,
        subject: request.subject.unwrap_or_else(default_subject),
        html_body: request.message.unwrap_or_else(default_body),
        attachment,
    };

    let mailer = Mailer::new(smtp);
    tokio::task::spawn_blocking(move || mailer.send(email))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("email task failed: {e}")))??;

    Ok(Json(EmailResponse {
        success: true,
        message: "Email sent successfully".to_string(),
    }))
}
