//! Per-job status persistence.
//!
//! Each operation is an independent, idempotent point update on the
//! `videos` row keyed by job identifier. Last writer wins; safe because
//! only one worker processes a given identifier at a time.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// The status surface the orchestrator writes through.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Set the lifecycle label for a job.
    async fn set_status(&self, id: &str, status: &str) -> DbResult<()>;

    /// Record the original source URL for a job.
    async fn set_original_url(&self, id: &str, url: &str) -> DbResult<()>;

    /// Save the probed duration for a job.
    async fn save_duration(&self, id: &str, seconds: u64) -> DbResult<()>;
}

/// MySQL-backed status store.
#[derive(Clone)]
pub struct MySqlStatusStore {
    pool: MySqlPool,
}

impl MySqlStatusStore {
    /// Connect and verify the connection with a ping, so a bad DSN
    /// fails at startup rather than on the first job.
    pub async fn connect(dsn: &str) -> DbResult<Self> {
        if dsn.is_empty() {
            return Err(DbError::config_error("database DSN is empty"));
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .connect(dsn)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl StatusStore for MySqlStatusStore {
    async fn set_status(&self, id: &str, status: &str) -> DbResult<()> {
        sqlx::query("UPDATE videos SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!("Set status of {} to {}", id, status);
        Ok(())
    }

    async fn set_original_url(&self, id: &str, url: &str) -> DbResult<()> {
        sqlx::query("UPDATE videos SET original_url = ? WHERE id = ?")
            .bind(url)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn save_duration(&self, id: &str, seconds: u64) -> DbResult<()> {
        sqlx::query("UPDATE videos SET duration = ? WHERE id = ?")
            .bind(seconds)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires MySQL"]
    async fn test_status_round_trip() {
        dotenvy::dotenv().ok();

        let dsn = std::env::var("MYSQL_DSN").expect("MYSQL_DSN not set");
        let store = MySqlStatusStore::connect(&dsn).await.expect("connect");

        store.set_status("itest", "transcoded").await.expect("set_status");
        store
            .set_original_url("itest", "https://example.com/v.mp4")
            .await
            .expect("set_original_url");
        store.save_duration("itest", 120).await.expect("save_duration");
    }

    #[tokio::test]
    async fn test_empty_dsn_rejected() {
        assert!(matches!(
            MySqlStatusStore::connect("").await,
            Err(DbError::ConfigError(_))
        ));
    }
}
