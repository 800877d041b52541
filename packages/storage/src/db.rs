// ABOUTME: SQLite connection pool construction
// ABOUTME: Applies the connection settings every Lumora process relies on

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::debug;

use crate::StorageError;

/// Open (creating if missing) the SQLite database at `path`.
///
/// Foreign keys are enabled per connection; cascade deletes on articles and
/// users depend on it.
pub async fn connect(path: &Path) -> Result<SqlitePool, StorageError> {
    debug!("Connecting to database: {}", path.display());

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await
        .map_err(StorageError::Sqlx)?;

    Ok(pool)
}
