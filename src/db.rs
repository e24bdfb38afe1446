//! Database connection management for Holocron.
//!
//! Characters live in SQLite (a file, or an in-memory database for tests and
//! demos) or in Postgres. The storage target is derived from the scheme of the
//! configured URL and decides how the SeaORM pool is sized.

use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::AppConfig;

const CONNECT_ATTEMPTS: u32 = 5;
const FIRST_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Errors raised while opening the character store.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Failed to connect to {target:?} database after {attempts} attempts: {source}")]
    ConnectionFailed {
        target: StorageTarget,
        attempts: u32,
        #[source]
        source: sea_orm::DbErr,
    },
    #[error("Invalid database configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Where the character table is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageTarget {
    SqliteFile,
    SqliteMemory,
    Postgres,
}

impl StorageTarget {
    /// Classifies a database URL. MySQL and other schemes are refused.
    pub fn from_url(url: &str) -> Result<Self, DatabaseError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DatabaseError::InvalidConfiguration {
                message: "Database URL cannot be empty".to_string(),
            });
        }

        if url.starts_with("sqlite:") {
            if url.contains(":memory:") || url.contains("mode=memory") {
                Ok(Self::SqliteMemory)
            } else {
                Ok(Self::SqliteFile)
            }
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else {
            // Only the scheme is reported so credentials never reach the logs.
            let scheme = url.split(':').next().unwrap_or_default();
            Err(DatabaseError::InvalidConfiguration {
                message: format!("unsupported database scheme '{scheme}', expected sqlite or postgres"),
            })
        }
    }
}

fn connect_options(cfg: &AppConfig) -> Result<(StorageTarget, ConnectOptions), DatabaseError> {
    let target = StorageTarget::from_url(&cfg.database_url)?;

    let mut options = ConnectOptions::new(cfg.database_url.trim());
    options
        .acquire_timeout(Duration::from_millis(cfg.db_acquire_timeout_ms))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    match target {
        // A second pooled connection would open its own empty database.
        StorageTarget::SqliteMemory => {
            if cfg.db_max_connections > 1 {
                tracing::debug!(
                    requested = cfg.db_max_connections,
                    "In-memory SQLite is limited to a single connection"
                );
            }
            options.max_connections(1).min_connections(1);
        }
        StorageTarget::SqliteFile | StorageTarget::Postgres => {
            options
                .max_connections(cfg.db_max_connections)
                .idle_timeout(Duration::from_secs(600))
                .max_lifetime(Duration::from_secs(1800));
        }
    }

    Ok((target, options))
}

/// Opens the connection pool described by `cfg`.
///
/// Connection failures are retried with exponential backoff before giving up.
///
/// ```no_run
/// use holocron::{config::AppConfig, db::init_pool};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let db = init_pool(&AppConfig::default()).await?;
///     holocron::db::migrate(&db).await?;
///     Ok(())
/// }
/// ```
pub async fn init_pool(cfg: &AppConfig) -> Result<DatabaseConnection> {
    let (target, options) = connect_options(cfg)?;
    let db = connect_with_retry(target, options).await?;
    tracing::info!(?target, "Database pool ready");
    Ok(db)
}

async fn connect_with_retry(
    target: StorageTarget,
    options: ConnectOptions,
) -> Result<DatabaseConnection, DatabaseError> {
    let mut delay = FIRST_RETRY_DELAY;
    let mut attempt = 1;

    loop {
        match Database::connect(options.clone()).await {
            Ok(db) => return Ok(db),
            Err(source) if attempt >= CONNECT_ATTEMPTS => {
                return Err(DatabaseError::ConnectionFailed {
                    target,
                    attempts: attempt,
                    source,
                });
            }
            Err(err) => {
                tracing::warn!(
                    ?target,
                    attempt,
                    error = %err,
                    retry_in = ?delay,
                    "Database connection failed, retrying"
                );
                sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
        }
    }
}

/// Applies every pending migration.
pub async fn migrate(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .context("Failed to apply database migrations")?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Pings the store; used by the readiness probe.
pub async fn health_check(db: &DatabaseConnection) -> Result<()> {
    db.ping().await.context("Database health check failed")
}
