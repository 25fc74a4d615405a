//! Activity log and resume cache persistence.

pub mod handlers;

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::activity::ActivityRow;

/// ATS score at or above this counts as a successful generation in stats.
const SUCCESS_SCORE: i32 = 60;

pub async fn insert_activity(
    pool: &PgPool,
    email: &str,
    job_title: &str,
    ats_score: Option<i32>,
    action_type: &str,
) -> anyhow::Result<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO user_activity (email, job_title, ats_score, action_type)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(job_title)
    .bind(ats_score)
    .bind(action_type)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_resume_cache(
    pool: &PgPool,
    user_email: Option<&str>,
    original_text: &str,
    optimized_text: &str,
    job_description: &str,
    tone: &str,
    ats_score: i32,
) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO resume_cache
            (id, user_email, original_text, optimized_text, job_description, tone, ats_score)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(user_email)
    .bind(original_text)
    .bind(optimized_text)
    .bind(job_description)
    .bind(tone)
    .bind(ats_score)
    .execute(pool)
    .await?;
    Ok(id)
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobTitleCount {
    pub job_title: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityStats {
    pub total_activities: i64,
    pub recent_activities: Vec<ActivityRow>,
    pub top_job_titles: Vec<JobTitleCount>,
    pub average_ats_score: f64,
    pub success_rate: f64,
}

pub async fn activity_stats(pool: &PgPool, days: i64) -> Result<ActivityStats, sqlx::Error> {
    let since = Utc::now() - Duration::days(days);

    let total_activities: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM user_activity WHERE generated_at >= $1")
            .bind(since)
            .fetch_one(pool)
            .await?;

    let recent_activities: Vec<ActivityRow> = sqlx::query_as(
        r#"
        SELECT id, email, job_title, ats_score, action_type, generated_at
        FROM user_activity
        WHERE generated_at >= $1
        ORDER BY generated_at DESC
        LIMIT 10
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    let top_job_titles: Vec<JobTitleCount> = sqlx::query_as(
        r#"
        SELECT job_title, COUNT(*) AS count
        FROM user_activity
        WHERE generated_at >= $1
        GROUP BY job_title
        ORDER BY count DESC
        LIMIT 5
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    let average_ats_score: Option<f64> = sqlx::query_scalar(
        r#"
        SELECT AVG(ats_score)::FLOAT8
        FROM user_activity
        WHERE generated_at >= $1 AND ats_score IS NOT NULL
        "#,
    )
    .bind(since)
    .fetch_one(pool)
    .await?;

    let (scored, succeeded): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE ats_score IS NOT NULL),
            COUNT(*) FILTER (WHERE ats_score >= $2)
        FROM user_activity
        WHERE generated_at >= $1
        "#,
    )
    .bind(since)
    .bind(SUCCESS_SCORE)
    .fetch_one(pool)
    .await?;

    Ok(ActivityStats {
        total_activities,
        recent_activities,
        top_job_titles,
        average_ats_score: average_ats_score.unwrap_or(0.0),
        success_rate: success_rate(succeeded, scored),
    })
}

fn success_rate(succeeded: i64, scored: i64) -> f64 {
    if scored <= 0 {
        0.0
    } else {
        succeeded as f64 / scored as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate_basic() {
        assert_eq!(success_rate(3, 4), 0.75);
        assert_eq!(success_rate(0, 4), 0.0);
        assert_eq!(success_rate(4, 4), 1.0);
    }

    #[test]
    fn test_success_rate_no_scored_rows() {
        assert_eq!(success_rate(0, 0), 0.0);
    }
}
