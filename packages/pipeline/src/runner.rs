// ABOUTME: Background job runner
// ABOUTME: Polls the queue, executes claimed jobs concurrently, and applies retry policy

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::{interval, Instant};
use tracing::{debug, error, info, warn};

use crate::jobs::{Job, JobRecord};
use crate::queue::{JobQueue, QueueError, SqliteJobQueue};
use lumora_content::{
    ArticleStorage, AudienceError, CategoryKind, MembershipSynchronizer, RuleStorage, UserStorage,
};
use lumora_insights::MonthlyStatsEngine;
use lumora_storage::StorageError;

const RETRY_DELAY_SECS: i64 = 5;
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Audience(#[from] AudienceError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl JobError {
    /// The job's subject was deleted between enqueue and execution; there
    /// is nothing left to do.
    fn is_missing_subject(&self) -> bool {
        matches!(
            self,
            JobError::Storage(StorageError::NotFound(_))
                | JobError::Audience(AudienceError::Storage(StorageError::NotFound(_)))
        )
    }

    /// Deterministic failures retry into the same wall every time.
    fn is_permanent(&self) -> bool {
        matches!(
            self,
            JobError::Audience(AudienceError::UnsupportedComparison { .. })
        )
    }
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub max_concurrent: usize,
    pub poll_interval: Duration,
    pub retention_days: i64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            poll_interval: Duration::from_millis(500),
            retention_days: 7,
        }
    }
}

pub struct JobRunner {
    queue: Arc<SqliteJobQueue>,
    synchronizer: MembershipSynchronizer,
    articles: ArticleStorage,
    rules: RuleStorage,
    users: UserStorage,
    stats_engine: MonthlyStatsEngine,
    config: RunnerConfig,
}

impl JobRunner {
    pub fn new(pool: SqlitePool, queue: Arc<SqliteJobQueue>, config: RunnerConfig) -> Self {
        Self {
            queue,
            synchronizer: MembershipSynchronizer::new(pool.clone()),
            articles: ArticleStorage::new(pool.clone()),
            rules: RuleStorage::new(pool.clone()),
            users: UserStorage::new(pool.clone()),
            stats_engine: MonthlyStatsEngine::new(pool),
            config: RunnerConfig {
                max_concurrent: config.max_concurrent.max(1),
                ..config
            },
        }
    }

    /// Poll loop. Ticks claim and execute due jobs; finished rows are
    /// cleaned up hourly.
    pub async fn run(self: Arc<Self>) {
        info!(
            "Job runner started (poll interval: {:?}, max concurrent: {})",
            self.config.poll_interval, self.config.max_concurrent
        );

        let mut poll = interval(self.config.poll_interval);
        let mut last_cleanup = Instant::now();

        loop {
            poll.tick().await;

            if let Err(err) = self.clone().run_pending().await {
                error!("Job polling failed: {}", err);
            }

            if last_cleanup.elapsed() >= CLEANUP_INTERVAL {
                match self.queue.cleanup_finished(self.config.retention_days).await {
                    Ok(removed) if removed > 0 => debug!("Cleaned up {} finished jobs", removed),
                    Ok(_) => {}
                    Err(err) => error!("Job cleanup failed: {}", err),
                }
                last_cleanup = Instant::now();
            }
        }
    }

    /// Claim and execute due jobs until the queue is drained, including
    /// jobs enqueued by the ones just executed. Returns how many ran.
    pub async fn run_pending(self: Arc<Self>) -> Result<usize, QueueError> {
        let mut total = 0;

        loop {
            let batch = self
                .queue
                .claim_batch(self.config.max_concurrent as i64)
                .await?;
            if batch.is_empty() {
                break;
            }
            total += batch.len();

            let mut tasks = JoinSet::new();
            for record in batch {
                let runner = self.clone();
                tasks.spawn(async move { runner.execute(record).await });
            }
            while tasks.join_next().await.is_some() {}
        }

        Ok(total)
    }

    async fn execute(self: Arc<Self>, record: JobRecord) {
        let job = match record.job() {
            Ok(job) => job,
            Err(err) => {
                error!("Job {} has malformed payload: {}", record.id, err);
                if let Err(err) = self.queue.mark_failed(&record.id, "malformed payload").await {
                    error!("Failed to mark job {} failed: {}", record.id, err);
                }
                return;
            }
        };

        match self.execute_job(&job).await {
            Ok(()) => {
                debug!("Job {} ({}) succeeded", record.id, record.kind);
                if let Err(err) = self.queue.mark_succeeded(&record.id).await {
                    error!("Failed to mark job {} succeeded: {}", record.id, err);
                }
            }
            Err(err) => self.finish_failed(&record, err).await,
        }
    }

    async fn finish_failed(&self, record: &JobRecord, err: JobError) {
        let outcome = if err.is_missing_subject() {
            warn!("Job {} ({}) skipped: {}", record.id, record.kind, err);
            self.queue.mark_succeeded(&record.id).await
        } else if err.is_permanent() || record.attempts >= record.max_attempts {
            error!(
                "Job {} ({}) failed permanently after {} attempts: {}",
                record.id, record.kind, record.attempts, err
            );
            self.queue.mark_failed(&record.id, &err.to_string()).await
        } else {
            warn!(
                "Job {} ({}) attempt {} failed, will retry: {}",
                record.id, record.kind, record.attempts, err
            );
            let not_before = Utc::now() + chrono::Duration::seconds(RETRY_DELAY_SECS * record.attempts);
            self.queue
                .requeue(&record.id, &err.to_string(), not_before)
                .await
        };

        if let Err(queue_err) = outcome {
            error!("Failed to update job {} after error: {}", record.id, queue_err);
        }
    }

    async fn execute_job(&self, job: &Job) -> Result<(), JobError> {
        match job {
            Job::ResyncArticle { article_id } => {
                self.synchronizer.resync_article(article_id).await?;
                Ok(())
            }
            Job::ResyncForNewQuestionnaire { user_id } => {
                self.fan_out_questionnaire(user_id).await
            }
            Job::RecomputeMonthlyStats {
                user_id,
                year,
                month,
            } => {
                self.stats_engine.recompute(user_id, *year, *month).await?;
                Ok(())
            }
        }
    }

    /// One user's answers changed. Ruled articles need a full audience
    /// recomputation (enqueued per article); rule-less managed articles
    /// just need this user's row to exist.
    async fn fan_out_questionnaire(&self, user_id: &str) -> Result<(), JobError> {
        self.users.get_user(user_id).await?;

        let articles = self
            .articles
            .list_published_by_kinds(&[CategoryKind::CoreProgram, CategoryKind::Initial])
            .await?;

        let mut resyncs = 0usize;
        for article in &articles {
            let rule_count = self.rules.count_for_article(&article.id).await?;
            if rule_count > 0 {
                self.queue
                    .enqueue(Job::ResyncArticle {
                        article_id: article.id.clone(),
                    })
                    .await?;
                resyncs += 1;
            } else {
                self.synchronizer
                    .ensure_membership(user_id, &article.id)
                    .await?;
            }
        }

        debug!(
            "Questionnaire fan-out for user: {} ({} articles, {} resyncs enqueued)",
            user_id,
            articles.len(),
            resyncs
        );

        Ok(())
    }
}
