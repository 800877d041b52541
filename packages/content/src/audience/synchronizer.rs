// ABOUTME: Membership synchronizer reconciling stored rows with resolved audiences
// ABOUTME: Diff-based writes keep read state; a per-article lock serializes resyncs

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use super::resolver::{resolve_audience, AudienceError};
use crate::articles::ArticleStorage;
use crate::membership::MembershipStorage;
use crate::questionnaires::QuestionnaireStorage;
use crate::rules::RuleStorage;
use crate::users::UserStorage;

/// One async lock per article id; entries are never removed.
struct ArticleLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ArticleLocks {
    fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn acquire(&self, article_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(article_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// What a resync did, for logs and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub article_id: String,
    /// False when the article is unpublished or in an unmanaged category
    /// and membership was left untouched.
    pub synced: bool,
    pub target_size: usize,
    pub added: usize,
    pub removed: usize,
}

impl SyncOutcome {
    fn skipped(article_id: &str) -> Self {
        Self {
            article_id: article_id.to_string(),
            synced: false,
            target_size: 0,
            added: 0,
            removed: 0,
        }
    }
}

pub struct MembershipSynchronizer {
    articles: ArticleStorage,
    rules: RuleStorage,
    questionnaires: QuestionnaireStorage,
    users: UserStorage,
    memberships: MembershipStorage,
    locks: ArticleLocks,
}

impl MembershipSynchronizer {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            articles: ArticleStorage::new(pool.clone()),
            rules: RuleStorage::new(pool.clone()),
            questionnaires: QuestionnaireStorage::new(pool.clone()),
            users: UserStorage::new(pool.clone()),
            memberships: MembershipStorage::new(pool),
            locks: ArticleLocks::new(),
        }
    }

    /// Recompute the article's audience and reconcile membership rows.
    ///
    /// With rules present the audience is the resolver's output over all
    /// questionnaires; with none it is every user. Rows that survive the
    /// diff are never rewritten, so read state carries across resyncs.
    /// Only one resync runs per article at a time.
    pub async fn resync_article(&self, article_id: &str) -> Result<SyncOutcome, AudienceError> {
        let _guard = self.locks.acquire(article_id).await;

        let article = self.articles.get_article(article_id).await?;
        let kind = self.articles.category_kind(article_id).await?;

        if !kind.is_membership_managed() {
            debug!(
                "Skipping resync for article: {} (category kind {} is unmanaged)",
                article_id, kind
            );
            return Ok(SyncOutcome::skipped(article_id));
        }

        if !article.is_published {
            debug!("Skipping resync for unpublished article: {}", article_id);
            return Ok(SyncOutcome::skipped(article_id));
        }

        let rules = self.rules.list_rules(article_id).await?;

        let target: HashSet<String> = if rules.is_empty() {
            self.users.list_user_ids().await?.into_iter().collect()
        } else {
            let questionnaires = self.questionnaires.list_all().await?;
            resolve_audience(&rules, &questionnaires)?
        };

        let current = self.memberships.user_ids_for_article(article_id).await?;

        let mut to_remove: Vec<String> = current.difference(&target).cloned().collect();
        let mut to_add: Vec<String> = target.difference(&current).cloned().collect();
        to_remove.sort();
        to_add.sort();

        self.memberships
            .apply_diff(article_id, &to_remove, &to_add)
            .await?;

        info!(
            "Resynced article: {} (target: {}, added: {}, removed: {})",
            article_id,
            target.len(),
            to_add.len(),
            to_remove.len()
        );

        Ok(SyncOutcome {
            article_id: article_id.to_string(),
            synced: true,
            target_size: target.len(),
            added: to_add.len(),
            removed: to_remove.len(),
        })
    }

    /// Fast path for rule-less articles when one user's answers change: a
    /// single row insert instead of a full audience recomputation.
    pub async fn ensure_membership(
        &self,
        user_id: &str,
        article_id: &str,
    ) -> Result<bool, AudienceError> {
        let inserted = self.memberships.ensure(user_id, article_id).await?;
        if inserted {
            debug!(
                "Ensured membership for user: {} on article: {}",
                user_id, article_id
            );
        }
        Ok(inserted)
    }
}
