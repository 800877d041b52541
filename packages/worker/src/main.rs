// ABOUTME: Background worker binary
// ABOUTME: Opens the database, then polls and executes queued jobs until interrupted

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use lumora_content::DbState;
use lumora_core::constants::{
    LUMORA_DB_PATH, LUMORA_JOB_RETENTION_DAYS, LUMORA_POLL_INTERVAL_MS, LUMORA_WORKERS,
};
use lumora_pipeline::{JobRunner, RunnerConfig, SqliteJobQueue};

#[derive(Parser)]
#[command(name = "lumora-worker")]
#[command(about = "Lumora background worker - runs membership resync and stats jobs")]
#[command(version)]
struct Cli {
    /// Database file (defaults to ~/.lumora/lumora.db)
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Maximum number of jobs executed concurrently
    #[arg(long)]
    workers: Option<usize>,

    /// Queue poll interval in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Days to keep finished job rows before cleanup
    #[arg(long)]
    retention_days: Option<i64>,
}

/// Flag > environment > built-in default.
fn env_override<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|value| value.parse().ok())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let defaults = RunnerConfig::default();

    let db_path = cli.db_path.or_else(|| env_override(LUMORA_DB_PATH));
    let config = RunnerConfig {
        max_concurrent: cli
            .workers
            .or_else(|| env_override(LUMORA_WORKERS))
            .unwrap_or(defaults.max_concurrent),
        poll_interval: cli
            .poll_interval_ms
            .or_else(|| env_override(LUMORA_POLL_INTERVAL_MS))
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval),
        retention_days: cli
            .retention_days
            .or_else(|| env_override(LUMORA_JOB_RETENTION_DAYS))
            .unwrap_or(defaults.retention_days),
    };

    let db = DbState::init_with_path(db_path).await?;
    let queue = Arc::new(SqliteJobQueue::new(db.pool.clone()));
    let runner = Arc::new(JobRunner::new(db.pool.clone(), queue, config));

    info!("Lumora worker ready");

    tokio::select! {
        _ = runner.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, stopping worker");
        }
    }

    Ok(())
}
