//! Retention sweeper — periodically removes exported files past their
//! retention window and prunes old activity/cache rows. Failures are logged
//! and never take the service down.

use std::path::Path;
use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);
const FILE_RETENTION: Duration = Duration::from_secs(60 * 60);
const ROW_RETENTION_DAYS: i32 = 90;

pub fn spawn(db: PgPool, tmp_dir: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match sweep_tmp_files(&tmp_dir, FILE_RETENTION).await {
                Ok(removed) if removed > 0 => debug!("Sweeper removed {removed} tmp file(s)"),
                Ok(_) => {}
                Err(e) => warn!("Tmp file sweep failed: {e}"),
            }
            if let Err(e) = sweep_rows(&db).await {
                warn!("Row sweep failed: {e}");
            }
        }
    })
}

/// Deletes regular files in `dir` whose modification time is older than
/// `retention`. A missing directory simply means nothing to sweep.
pub(crate) async fn sweep_tmp_files(dir: &str, retention: Duration) -> anyhow::Result<usize> {
    let path = Path::new(dir);
    if !path.exists() {
        return Ok(0);
    }

    let mut removed = 0usize;
    let mut entries = tokio::fs::read_dir(path).await?;
    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        let age = metadata
            .modified()
            .ok()
            .and_then(|m| m.elapsed().ok())
            .unwrap_or_default();
        if age > retention {
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove {:?}: {e}", entry.path()),
            }
        }
    }
    Ok(removed)
}

async fn sweep_rows(db: &PgPool) -> anyhow::Result<()> {
    let activity = sqlx::query(
        "DELETE FROM user_activity WHERE generated_at < now() - make_interval(days => $1)",
    )
    .bind(ROW_RETENTION_DAYS)
    .execute(db)
    .await?;

    let cache = sqlx::query(
        "DELETE FROM resume_cache WHERE created_at < now() - make_interval(days => $1)",
    )
    .bind(ROW_RETENTION_DAYS)
    .execute(db)
    .await?;

    let total = activity.rows_affected() + cache.rows_affected();
    if total > 0 {
        debug!("Sweeper pruned {total} database row(s)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_dir_sweeps_nothing() {
        let removed = sweep_tmp_files("/definitely/not/a/real/dir", FILE_RETENTION)
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn test_fresh_files_survive_retention_window() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("resume_0123abcd.pdf"), b"pdf")
            .await
            .unwrap();
        let removed = sweep_tmp_files(dir.path().to_str().unwrap(), FILE_RETENTION)
            .await
            .unwrap();
        assert_eq!(removed, 0);
        assert!(dir.path().join("resume_0123abcd.pdf").exists());
    }

    #[tokio::test]
    async fn test_zero_retention_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("resume_0123abcd.pdf"), b"pdf")
            .await
            .unwrap();
        let removed = sweep_tmp_files(dir.path().to_str().unwrap(), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(!dir.path().join("resume_0123abcd.pdf").exists());
    }

    #[tokio::test]
    async fn test_subdirectories_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join("nested")).await.unwrap();
        let removed = sweep_tmp_files(dir.path().to_str().unwrap(), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(removed, 0);
        assert!(dir.path().join("nested").exists());
    }
}
