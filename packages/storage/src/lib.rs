// ABOUTME: SQLite storage layer for Procura
// ABOUTME: Provides pool construction, schema initialization, and shared error types

use thiserror::Error;

pub mod db;
pub mod schema;

pub use db::{connect, connect_memory, DbConfig};
pub use schema::initialize;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
}

impl StorageError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
