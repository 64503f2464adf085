//! Database bootstrap: connect with retry, then run migrations.

use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::error::AppError;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_INTERVAL_MS: u64 = 1_000;

/// Connect to the database and bring the schema up to date.
///
/// Single entrypoint used by `main` and by any tooling that needs a ready
/// connection: pool setup, bounded connection retry, then `Migrator::up`.
pub async fn connect_db(database_url: &str) -> Result<DatabaseConnection, AppError> {
    let mut options = ConnectOptions::new(database_url.to_string());
    options
        .max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug);

    let conn = connect_with_retry(options).await?;

    Migrator::up(&conn, None)
        .await
        .map_err(|e| AppError::db(format!("migration failed: {e}")))?;

    let applied = migration::count_applied_migrations(&conn)
        .await
        .unwrap_or(0);
    info!(applied_migrations = applied, "database ready");

    Ok(conn)
}

async fn connect_with_retry(options: ConnectOptions) -> Result<DatabaseConnection, AppError> {
    let mut last_error = None;

    for attempt in 1..=CONNECT_ATTEMPTS {
        match Database::connect(options.clone()).await {
            Ok(conn) => {
                if attempt > 1 {
                    info!(attempts = attempt, "database connection retry succeeded");
                }
                return Ok(conn);
            }
            Err(e) => {
                last_error = Some(e);
                if attempt < CONNECT_ATTEMPTS {
                    warn!(
                        attempt,
                        max_attempts = CONNECT_ATTEMPTS,
                        interval_ms = CONNECT_RETRY_INTERVAL_MS,
                        "database connection failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(CONNECT_RETRY_INTERVAL_MS)).await;
                }
            }
        }
    }

    Err(AppError::db_unavailable(format!(
        "could not connect after {CONNECT_ATTEMPTS} attempts: {}",
        last_error.map(|e| e.to_string()).unwrap_or_default()
    )))
}
