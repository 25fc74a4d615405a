pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{activity, email, export, pipeline, workflow};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/api/v1/status", get(health::api_status_handler))
        .route("/api/v1/ai/health", get(health::ai_health_handler))
        // Parse / score API
        .route(
            "/api/v1/parse/resume",
            post(pipeline::handlers::handle_parse_resume),
        )
        .route(
            "/api/v1/parse/job-description",
            post(pipeline::handlers::handle_parse_job_description),
        )
        .route("/api/v1/score", post(pipeline::handlers::handle_score))
        // Generation run API
        .route("/api/v1/runs", post(workflow::handlers::handle_start_run))
        .route(
            "/api/v1/runs/:id",
            get(workflow::handlers::handle_get_run)
                .delete(workflow::handlers::handle_cancel_run),
        )
        .route(
            "/api/v1/runs/:id/events",
            get(workflow::handlers::handle_run_events),
        )
        // Export API
        .route(
            "/api/v1/export/pdf",
            post(export::handlers::handle_export_pdf),
        )
        .route(
            "/api/v1/export/download/:filename",
            get(export::handlers::handle_download),
        )
        // Email API
        .route(
            "/api/v1/email/send",
            post(email::handlers::handle_send_email),
        )
        // Activity API
        .route(
            "/api/v1/activity",
            post(activity::handlers::handle_log_activity),
        )
        .route(
            "/api/v1/activity/stats",
            get(activity::handlers::handle_activity_stats),
        )
        .with_state(state)
}
