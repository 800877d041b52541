// ABOUTME: Job type definitions
// ABOUTME: The tagged payload union plus the queue row it is stored in

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Work the runner knows how to execute. Serialized whole into the queue
/// row's payload column, tag included, so a row is self-describing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Job {
    /// Recompute one article's audience and reconcile membership rows.
    ResyncArticle { article_id: String },
    /// Fan a changed questionnaire out over managed published articles.
    ResyncForNewQuestionnaire { user_id: String },
    /// Rebuild one user's aggregate for one calendar month.
    RecomputeMonthlyStats {
        user_id: String,
        year: i32,
        month: u32,
    },
}

impl Job {
    pub fn kind(&self) -> &'static str {
        match self {
            Job::ResyncArticle { .. } => "resync_article",
            Job::ResyncForNewQuestionnaire { .. } => "resync_for_new_questionnaire",
            Job::RecomputeMonthlyStats { .. } => "recompute_monthly_stats",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

/// A queue row as stored. `payload` holds the serialized [`Job`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub kind: String,
    pub payload: String,
    pub status: JobStatus,
    pub attempts: i64,
    pub max_attempts: i64,
    pub last_error: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn job(&self) -> Result<Job, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }
}
