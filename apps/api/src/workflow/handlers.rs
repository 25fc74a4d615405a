//! Axum route handlers for the generation run API.

use std::convert::Infallible;

use axum::{
    extract::{Multipart, Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde_json::{json, Value};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::document::{accept_first, UploadedDocument};
use crate::intake::job_description::JobDescriptionInput;
use crate::intake::tone::ToneSelection;
use crate::state::AppState;
use crate::workflow::registry::StartRun;
use crate::workflow::run::RunSnapshot;

/// Collected multipart fields for a run start. Unknown fields are ignored;
/// only the first file part is kept.
#[derive(Default)]
struct RunForm {
    document: Option<UploadedDocument>,
    ignored_files: usize,
    job_description: Option<String>,
    tone: Option<String>,
    session: Option<String>,
    user_email: Option<String>,
}

impl RunForm {
    fn into_start(self) -> Result<StartRun, AppError> {
        let document = self.document.ok_or_else(|| {
            AppError::Validation("Please select a resume file before generating".to_string())
        })?;

        let job_description = JobDescriptionInput::new(self.job_description.unwrap_or_default());
        if job_description.is_empty() {
            return Err(AppError::Validation(
                "Please provide both a resume file and a job description".to_string(),
            ));
        }

        let tone = match self.tone.as_deref().map(str::trim) {
            None | Some("") => ToneSelection::default(),
            Some(t) => ToneSelection::parse(t)
                .ok_or_else(|| AppError::Validation(format!("Unknown tone '{t}'")))?,
        };

        let session = match self.session.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(Uuid::parse_str(s).map_err(|_| {
                AppError::Validation("session must be a valid UUID".to_string())
            })?),
        };

        Ok(StartRun {
            document,
            job_description,
            tone,
            session,
            user_email: self.user_email.filter(|e| !e.trim().is_empty()),
        })
    }
}

/// POST /api/v1/runs
///
/// Starts a generation run from a multipart form: `file` (the resume),
/// `job_description`, optional `tone`, `session`, and `user_email`.
/// Responds with the initial snapshot (stage `parsing`, progress 0).
pub async fn handle_start_run(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RunSnapshot>, AppError> {
    let mut form = RunForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if form.document.is_some() {
                    form.ignored_files += 1;
                    continue;
                }
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                let document = UploadedDocument::new(&filename, content_type.as_deref(), bytes)?;
                accept_first(&mut form.document, document);
            }
            "job_description" => form.job_description = Some(read_text(field).await?),
            "tone" => form.tone = Some(read_text(field).await?),
            "session" => form.session = Some(read_text(field).await?),
            "user_email" => form.user_email = Some(read_text(field).await?),
            _ => {}
        }
    }

    if form.ignored_files > 0 {
        debug!(
            "Ignoring {} additional file part(s); only the first is kept",
            form.ignored_files
        );
    }

    let input = form.into_start()?;
    let snapshot = state.runs.start(state.run_context(), input)?;
    Ok(Json(snapshot))
}

/// GET /api/v1/runs/:id
///
/// Current snapshot of a run: stage, progress, and (once complete) the
/// immutable result. Safe to poll and re-fetch.
pub async fn handle_get_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<RunSnapshot>, AppError> {
    state
        .runs
        .snapshot(run_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Run {run_id} not found")))
}

/// GET /api/v1/runs/:id/events
///
/// Server-sent progress events. Emits the current snapshot immediately,
/// then one event per stage transition, and closes after the terminal
/// snapshot.
pub async fn handle_run_events(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let rx = state
        .runs
        .subscribe(run_id)
        .ok_or_else(|| AppError::NotFound(format!("Run {run_id} not found")))?;

    let mut terminal_seen = false;
    let stream = WatchStream::new(rx)
        .take_while(move |snapshot| {
            if terminal_seen {
                return false;
            }
            terminal_seen = snapshot.stage.is_terminal();
            true
        })
        .map(|snapshot| {
            let payload =
                serde_json::to_string(&snapshot).unwrap_or_else(|_| "{}".to_string());
            Ok::<Event, Infallible>(Event::default().event("progress").data(payload))
        });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// DELETE /api/v1/runs/:id
///
/// Requests cancellation of an in-flight run. Cancelling a terminal run is
/// a no-op.
pub async fn handle_cancel_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if state.runs.cancel(run_id) {
        Ok(Json(json!({ "canceled": true })))
    } else {
        Err(AppError::NotFound(format!("Run {run_id} not found")))
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form field: {e}")))
}
