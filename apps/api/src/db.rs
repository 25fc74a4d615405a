use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the activity and cache tables if they do not exist yet.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_activity (
            id BIGSERIAL PRIMARY KEY,
            email TEXT NOT NULL,
            job_title TEXT NOT NULL,
            ats_score INTEGER,
            action_type TEXT NOT NULL DEFAULT 'resume_generated',
            generated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS resume_cache (
            id UUID PRIMARY KEY,
            user_email TEXT,
            original_text TEXT NOT NULL,
            optimized_text TEXT NOT NULL,
            job_description TEXT NOT NULL,
            tone TEXT NOT NULL,
            ats_score INTEGER NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema ready");
    Ok(())
}
