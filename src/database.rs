use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{future::Future, time::Duration};

use crate::error::{AppError, Result};

pub async fn create_pool(database_url: &str) -> std::result::Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Runs a single store call under `timeout`. On expiry the call is dropped; whatever
/// the store already committed stays committed.
pub async fn with_deadline<T, F>(timeout: Duration, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => Err(AppError::Timeout(format!(
            "{} exceeded {}ms",
            operation,
            timeout.as_millis()
        ))),
    }
}

pub async fn ping(pool: &PgPool, timeout: Duration) -> Result<()> {
    with_deadline(timeout, "ping", async {
        sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deadline_passes_through_results() {
        let value = with_deadline(Duration::from_secs(1), "noop", async {
            Ok::<_, sqlx::Error>(7)
        })
        .await
        .unwrap();

        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn deadline_expiry_is_a_timeout_error() {
        let result = with_deadline(Duration::from_millis(10), "slow update", async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, sqlx::Error>(())
        })
        .await;

        assert!(matches!(
            result,
            Err(AppError::Timeout(ref msg)) if msg.starts_with("slow update")
        ));
    }
}
