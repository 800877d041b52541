// ABOUTME: Change dispatcher mapping storage events to queued jobs
// ABOUTME: Pure mapping first, enqueue second; no database reads here

use std::sync::Arc;

use chrono::Datelike;
use tracing::debug;

use crate::jobs::Job;
use crate::queue::{JobQueue, QueueError};
use lumora_core::ChangeEvent;

/// Decide which job, if any, an event warrants. Kept a free function so the
/// mapping is testable without a queue.
pub fn job_for_event(event: &ChangeEvent) -> Option<Job> {
    match event {
        // Only the unpublished-to-published transition (which covers
        // creating an already-published article) changes an audience.
        // Unpublishing and field edits leave membership alone; the feed
        // filters on is_published.
        ChangeEvent::ArticleSaved {
            article_id,
            was_published,
            is_published,
            ..
        } => {
            if !*was_published && *is_published {
                Some(Job::ResyncArticle {
                    article_id: article_id.clone(),
                })
            } else {
                None
            }
        }

        // Cascade already removed rules and membership rows.
        ChangeEvent::ArticleDeleted { .. } => None,

        ChangeEvent::RuleSaved {
            article_id,
            article_published,
            ..
        }
        | ChangeEvent::RuleDeleted {
            article_id,
            article_published,
            ..
        } => {
            if *article_published {
                Some(Job::ResyncArticle {
                    article_id: article_id.clone(),
                })
            } else {
                None
            }
        }

        ChangeEvent::QuestionnaireSaved { user_id, .. } => {
            Some(Job::ResyncForNewQuestionnaire {
                user_id: user_id.clone(),
            })
        }

        ChangeEvent::ScanRecorded {
            user_id,
            captured_at,
            ..
        }
        | ChangeEvent::ScanDeleted {
            user_id,
            captured_at,
            ..
        } => Some(Job::RecomputeMonthlyStats {
            user_id: user_id.clone(),
            year: captured_at.year(),
            month: captured_at.month(),
        }),
    }
}

pub struct ChangeDispatcher {
    queue: Arc<dyn JobQueue>,
}

impl ChangeDispatcher {
    pub fn new(queue: Arc<dyn JobQueue>) -> Self {
        Self { queue }
    }

    /// Enqueue the job an event calls for. Returns the job id, or `None`
    /// for events that need no work.
    pub async fn dispatch(&self, event: &ChangeEvent) -> Result<Option<String>, QueueError> {
        let Some(job) = job_for_event(event) else {
            debug!("No job for event on subject: {}", event.subject_id());
            return Ok(None);
        };

        debug!(
            "Dispatching {} for subject: {}",
            job.kind(),
            event.subject_id()
        );

        let job_id = self.queue.enqueue(job).await?;
        Ok(Some(job_id))
    }
}
