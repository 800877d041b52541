// ABOUTME: Data layer and persistence for Lumora
// ABOUTME: SQLite pool construction, migrations, and the shared storage error taxonomy

pub mod db;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

pub use db::connect;
