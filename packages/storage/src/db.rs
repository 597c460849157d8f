// ABOUTME: Database connection management
// ABOUTME: Builds the shared SQLite pool with the pragmas every package relies on

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::{StorageError, StorageResult};

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    pub enable_wal: bool,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: procura_core::database_file(),
            enable_wal: true,
            max_connections: 10,
            busy_timeout_seconds: 30,
        }
    }
}

/// Open (creating if necessary) the SQLite database at the given path
pub async fn connect(config: &DbConfig) -> StorageResult<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = config.path.parent() {
        std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
    }

    debug!("Opening database at: {}", config.path.display());

    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(config.busy_timeout_seconds));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(StorageError::Sqlx)?;

    configure(&pool, config.enable_wal).await?;

    Ok(pool)
}

/// Open an in-memory database, used by tests
pub async fn connect_memory() -> StorageResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(StorageError::Sqlx)?;

    // A single connection keeps every query on the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(StorageError::Sqlx)?;

    configure(&pool, false).await?;

    Ok(pool)
}

async fn configure(pool: &SqlitePool, enable_wal: bool) -> StorageResult<()> {
    if enable_wal {
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(pool)
            .await
            .map_err(StorageError::Sqlx)?;
    }

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await
        .map_err(StorageError::Sqlx)?;

    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(pool)
        .await
        .map_err(StorageError::Sqlx)?;

    Ok(())
}

/// Convenience used by tests across the workspace: in-memory pool with schema applied
pub async fn connect_memory_initialized() -> StorageResult<SqlitePool> {
    let pool = connect_memory().await?;
    crate::schema::initialize(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_memory_and_initialize() {
        let pool = connect_memory_initialized().await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM demands")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
