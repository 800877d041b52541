use std::env;
use std::path::PathBuf;

// Environment variable names understood by the worker and library bootstrap
pub const LUMORA_DB_PATH: &str = "LUMORA_DB_PATH";
pub const LUMORA_WORKERS: &str = "LUMORA_WORKERS";
pub const LUMORA_POLL_INTERVAL_MS: &str = "LUMORA_POLL_INTERVAL_MS";
pub const LUMORA_JOB_RETENTION_DAYS: &str = "LUMORA_JOB_RETENTION_DAYS";

/// Get the path to the Lumora directory (~/.lumora)
pub fn lumora_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".lumora")
    } else {
        // Fall back to dirs crate for normal usage
        dirs::home_dir()
            .expect("Unable to get home directory")
            .join(".lumora")
    }
}

/// Get the default database path (~/.lumora/lumora.db)
pub fn database_file() -> PathBuf {
    lumora_dir().join("lumora.db")
}
