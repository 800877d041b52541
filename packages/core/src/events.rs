// ABOUTME: Change events emitted by storage mutation sites
// ABOUTME: Consumed by the pipeline dispatcher to schedule asynchronous recomputation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A mutation that may require asynchronous follow-up work.
///
/// Events are produced by the storage layer in the same transaction as the
/// write they describe, so fields like `was_published` reflect the row state
/// the mutation actually observed, not a later re-read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    ArticleSaved {
        article_id: String,
        created: bool,
        was_published: bool,
        is_published: bool,
    },
    ArticleDeleted {
        article_id: String,
    },
    RuleSaved {
        rule_id: String,
        article_id: String,
        article_published: bool,
    },
    RuleDeleted {
        rule_id: String,
        article_id: String,
        article_published: bool,
    },
    QuestionnaireSaved {
        user_id: String,
        created: bool,
    },
    ScanRecorded {
        scan_id: String,
        user_id: String,
        captured_at: DateTime<Utc>,
    },
    ScanDeleted {
        scan_id: String,
        user_id: String,
        captured_at: DateTime<Utc>,
    },
}

impl ChangeEvent {
    /// Entity id most useful for log correlation
    pub fn subject_id(&self) -> &str {
        match self {
            ChangeEvent::ArticleSaved { article_id, .. } => article_id,
            ChangeEvent::ArticleDeleted { article_id } => article_id,
            ChangeEvent::RuleSaved { article_id, .. } => article_id,
            ChangeEvent::RuleDeleted { article_id, .. } => article_id,
            ChangeEvent::QuestionnaireSaved { user_id, .. } => user_id,
            ChangeEvent::ScanRecorded { user_id, .. } => user_id,
            ChangeEvent::ScanDeleted { user_id, .. } => user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_round_trip() {
        let event = ChangeEvent::ArticleSaved {
            article_id: "art-1".to_string(),
            created: true,
            was_published: false,
            is_published: true,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"article_saved\""));

        let back: ChangeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_subject_id() {
        let event = ChangeEvent::QuestionnaireSaved {
            user_id: "usr-9".to_string(),
            created: false,
        };
        assert_eq!(event.subject_id(), "usr-9");
    }
}
