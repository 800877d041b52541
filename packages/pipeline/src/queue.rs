// ABOUTME: Durable job queue backed by the jobs table
// ABOUTME: Claims flip queued rows to running under a guard, so each row runs once at a time

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::debug;

use crate::jobs::{Job, JobRecord, JobStatus};
use lumora_core::generate_id;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Job payload error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Enqueue port. Storage-facing callers only ever push; claiming and
/// completion stay on the concrete queue the runner owns.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: Job) -> Result<String, QueueError>;
}

pub struct SqliteJobQueue {
    pool: SqlitePool,
}

impl SqliteJobQueue {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Claim up to `limit` due jobs, oldest scheduled first.
    ///
    /// Each candidate is flipped queued -> running with a status guard;
    /// rows another worker claimed in between are skipped.
    pub async fn claim_batch(&self, limit: i64) -> Result<Vec<JobRecord>, QueueError> {
        let now = Utc::now();

        let candidates = sqlx::query(
            r#"
            SELECT id FROM jobs
            WHERE status = ? AND scheduled_at <= ?
            ORDER BY scheduled_at, created_at
            LIMIT ?
            "#,
        )
        .bind(JobStatus::Queued)
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut claimed = Vec::new();
        for row in candidates {
            let job_id: String = row.try_get("id")?;

            let result = sqlx::query(
                r#"
                UPDATE jobs
                SET status = ?, attempts = attempts + 1, started_at = ?
                WHERE id = ? AND status = ?
                "#,
            )
            .bind(JobStatus::Running)
            .bind(now)
            .bind(&job_id)
            .bind(JobStatus::Queued)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 1 {
                claimed.push(self.get_job(&job_id).await?);
            }
        }

        Ok(claimed)
    }

    pub async fn mark_succeeded(&self, job_id: &str) -> Result<(), QueueError> {
        sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?, finished_at = ?, last_error = NULL
            WHERE id = ?
            "#,
        )
        .bind(JobStatus::Succeeded)
        .bind(Utc::now())
        .bind(job_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn mark_failed(&self, job_id: &str, error: &str) -> Result<(), QueueError> {
        sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?, finished_at = ?, last_error = ?
            WHERE id = ?
            "#,
        )
        .bind(JobStatus::Failed)
        .bind(Utc::now())
        .bind(error)
        .bind(job_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Put a running job back in the queue for a later attempt.
    pub async fn requeue(
        &self,
        job_id: &str,
        error: &str,
        not_before: DateTime<Utc>,
    ) -> Result<(), QueueError> {
        sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?, scheduled_at = ?, last_error = ?
            WHERE id = ?
            "#,
        )
        .bind(JobStatus::Queued)
        .bind(not_before)
        .bind(error)
        .bind(job_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete finished rows older than `days_to_keep` days.
    pub async fn cleanup_finished(&self, days_to_keep: i64) -> Result<u64, QueueError> {
        let result = sqlx::query(
            r#"
            DELETE FROM jobs
            WHERE status IN (?, ?)
            AND datetime(finished_at) < datetime('now', '-' || ? || ' days')
            "#,
        )
        .bind(JobStatus::Succeeded)
        .bind(JobStatus::Failed)
        .bind(days_to_keep)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn count_with_status(&self, status: JobStatus) -> Result<i64, QueueError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM jobs WHERE status = ?")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("count")?)
    }

    pub async fn get_job(&self, job_id: &str) -> Result<JobRecord, QueueError> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = ?")
            .bind(job_id)
            .fetch_one(&self.pool)
            .await?;

        row_to_record(&row)
    }
}

#[async_trait]
impl JobQueue for SqliteJobQueue {
    async fn enqueue(&self, job: Job) -> Result<String, QueueError> {
        let job_id = generate_id("job");
        let payload = serde_json::to_string(&job)?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO jobs (id, kind, payload, status, scheduled_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job_id)
        .bind(job.kind())
        .bind(&payload)
        .bind(JobStatus::Queued)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!("Enqueued job: {} ({})", job_id, job.kind());

        Ok(job_id)
    }
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<JobRecord, QueueError> {
    Ok(JobRecord {
        id: row.try_get("id")?,
        kind: row.try_get("kind")?,
        payload: row.try_get("payload")?,
        status: row.try_get("status")?,
        attempts: row.try_get("attempts")?,
        max_attempts: row.try_get("max_attempts")?,
        last_error: row.try_get("last_error")?,
        scheduled_at: row.try_get("scheduled_at")?,
        started_at: row.try_get("started_at")?,
        finished_at: row.try_get("finished_at")?,
        created_at: row.try_get("created_at")?,
    })
}
