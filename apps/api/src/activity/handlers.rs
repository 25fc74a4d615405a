//! Axum route handlers for the activity log.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::activity::{self, ActivityStats};
use crate::errors::AppError;
use crate::state::AppState;

const DEFAULT_WINDOW_DAYS: i64 = 30;
const MAX_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Deserialize)]
pub struct LogActivityRequest {
    pub email: String,
    pub job_title: String,
    pub ats_score: Option<i32>,
    #[serde(default = "default_action_type")]
    pub action_type: String,
}

fn default_action_type() -> String {
    "resume_generated".to_string()
}

#[derive(Debug, Serialize)]
pub struct LogActivityResponse {
    pub activity_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub days: Option<i64>,
}

/// POST /api/v1/activity
pub async fn handle_log_activity(
    State(state): State<AppState>,
    Json(request): Json<LogActivityRequest>,
) -> Result<Json<LogActivityResponse>, AppError> {
    validate_log_request(&request)?;

    let activity_id = activity::insert_activity(
        &state.db,
        request.email.trim(),
        request.job_title.trim(),
        request.ats_score,
        &request.action_type,
    )
    .await
    .map_err(AppError::Internal)?;

    Ok(Json(LogActivityResponse { activity_id }))
}

/// GET /api/v1/activity/stats?days=30
pub async fn handle_activity_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<ActivityStats>, AppError> {
    let days = clamp_window(params.days);
    let stats = activity::activity_stats(&state.db, days).await?;
    Ok(Json(stats))
}

fn validate_log_request(request: &LogActivityRequest) -> Result<(), AppError> {
    if !request.email.contains('@') {
        return Err(AppError::Validation("Valid email is required".to_string()));
    }
    if request.job_title.trim().is_empty() {
        return Err(AppError::Validation("Job title is required".to_string()));
    }
    if let Some(score) = request.ats_score {
        if !(0..=100).contains(&score) {
            return Err(AppError::Validation(
                "ATS score must be between 0 and 100".to_string(),
            ));
        }
    }
    Ok(())
}

fn clamp_window(days: Option<i64>) -> i64 {
    days.unwrap_or(DEFAULT_WINDOW_DAYS).clamp(1, MAX_WINDOW_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, job_title: &str, score: Option<i32>) -> LogActivityRequest {
        LogActivityRequest {
            email: email.to_string(),
            job_title: job_title.to_string(),
            ats_score: score,
            action_type: default_action_type(),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate_log_request(&request("jane@example.com", "Engineer", Some(82))).is_ok());
    }

    #[test]
    fn test_email_without_at_rejected() {
        assert!(validate_log_request(&request("janeexample.com", "Engineer", None)).is_err());
    }

    #[test]
    fn test_blank_job_title_rejected() {
        assert!(validate_log_request(&request("jane@example.com", "  ", None)).is_err());
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        assert!(validate_log_request(&request("jane@example.com", "Engineer", Some(101))).is_err());
        assert!(validate_log_request(&request("jane@example.com", "Engineer", Some(-1))).is_err());
    }

    #[test]
    fn test_window_clamped() {
        assert_eq!(clamp_window(None), DEFAULT_WINDOW_DAYS);
        assert_eq!(clamp_window(Some(0)), 1);
        assert_eq!(clamp_window(Some(9999)), MAX_WINDOW_DAYS);
        assert_eq!(clamp_window(Some(7)), 7);
    }

    #[test]
    fn test_action_type_defaults_in_deserialization() {
        let request: LogActivityRequest = serde_json::from_str(
            r#"{"email": "jane@example.com", "job_title": "Engineer"}"#,
        )
        .unwrap();
        assert_eq!(request.action_type, "resume_generated");
    }
}
