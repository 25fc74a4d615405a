use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityRow {
    pub id: i64,
    pub email: String,
    pub job_title: String,
    pub ats_score: Option<i32>,
    pub action_type: String,
    pub generated_at: DateTime<Utc>,
}
