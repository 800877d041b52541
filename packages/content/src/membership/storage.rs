// ABOUTME: Membership storage layer using SQLite
// ABOUTME: Diff application never rewrites surviving rows, so read state is preserved

use std::collections::HashSet;

use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{Membership, VisibleArticle};
use lumora_core::generate_id;
use lumora_storage::StorageError;

// SQLite's default bind limit is 999; chunked IN-lists stay well under it.
const DIFF_CHUNK_SIZE: usize = 200;

pub struct MembershipStorage {
    pool: SqlitePool,
}

impl MembershipStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Current audience of an article.
    pub async fn user_ids_for_article(
        &self,
        article_id: &str,
    ) -> Result<HashSet<String>, StorageError> {
        let rows = sqlx::query("SELECT user_id FROM user_articles WHERE article_id = ?")
            .bind(article_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter()
            .map(|row| row.try_get("user_id").map_err(StorageError::Sqlx))
            .collect()
    }

    /// Apply a computed membership diff in one transaction.
    ///
    /// Removals drop rows outright. Additions use INSERT OR IGNORE so a row
    /// that appeared concurrently keeps its read state.
    pub async fn apply_diff(
        &self,
        article_id: &str,
        to_remove: &[String],
        to_add: &[String],
    ) -> Result<(), StorageError> {
        if to_remove.is_empty() && to_add.is_empty() {
            return Ok(());
        }

        debug!(
            "Applying membership diff for article: {} (+{} / -{})",
            article_id,
            to_add.len(),
            to_remove.len()
        );

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        for chunk in to_remove.chunks(DIFF_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let query_str = format!(
                "DELETE FROM user_articles WHERE article_id = ? AND user_id IN ({})",
                placeholders
            );

            let mut query = sqlx::query(&query_str).bind(article_id);
            for user_id in chunk {
                query = query.bind(user_id);
            }

            query.execute(&mut *tx).await.map_err(StorageError::Sqlx)?;
        }

        for user_id in to_add {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO user_articles (id, user_id, article_id)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(generate_id("mem"))
            .bind(user_id)
            .bind(article_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;
        }

        tx.commit().await.map_err(StorageError::Sqlx)?;

        Ok(())
    }

    /// Guarantee a membership row exists. Returns true when a row was
    /// actually inserted.
    pub async fn ensure(&self, user_id: &str, article_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO user_articles (id, user_id, article_id)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(generate_id("mem"))
        .bind(user_id)
        .bind(article_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() == 1)
    }

    /// Mark the user's copy of an article read. Idempotent: the first call
    /// sets `read_at`, later calls leave it alone.
    pub async fn mark_read(
        &self,
        user_id: &str,
        article_id: &str,
    ) -> Result<Membership, StorageError> {
        sqlx::query(
            r#"
            UPDATE user_articles
            SET is_read = 1, read_at = datetime('now', 'utc')
            WHERE user_id = ? AND article_id = ? AND is_read = 0
            "#,
        )
        .bind(user_id)
        .bind(article_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let row = sqlx::query("SELECT * FROM user_articles WHERE user_id = ? AND article_id = ?")
            .bind(user_id)
            .bind(article_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| {
                StorageError::NotFound(format!(
                    "Membership for user {} on article {}",
                    user_id, article_id
                ))
            })?;

        row_to_membership(&row)
    }

    /// The user's feed: published articles they hold a membership row for.
    pub async fn list_visible_articles(
        &self,
        user_id: &str,
    ) -> Result<Vec<VisibleArticle>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT a.id AS article_id, a.title, a.summary, a.category_id,
                   a.subcategory_id, a.period_id, a.published_at,
                   ua.is_read, ua.read_at
            FROM user_articles ua
            JOIN articles a ON a.id = ua.article_id
            WHERE ua.user_id = ? AND a.is_published = 1
            ORDER BY a.published_at DESC, a.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter()
            .map(|row| {
                Ok(VisibleArticle {
                    article_id: row.try_get("article_id")?,
                    title: row.try_get("title")?,
                    summary: row.try_get("summary")?,
                    category_id: row.try_get("category_id")?,
                    subcategory_id: row.try_get("subcategory_id")?,
                    period_id: row.try_get("period_id")?,
                    published_at: row.try_get("published_at")?,
                    is_read: row.try_get("is_read")?,
                    read_at: row.try_get("read_at")?,
                })
            })
            .collect()
    }

    pub async fn count_for_article(&self, article_id: &str) -> Result<i64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM user_articles WHERE article_id = ?")
            .bind(article_id)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.try_get("count").map_err(StorageError::Sqlx)
    }

    pub async fn list_for_article(&self, article_id: &str) -> Result<Vec<Membership>, StorageError> {
        let rows = sqlx::query("SELECT * FROM user_articles WHERE article_id = ? ORDER BY created_at")
            .bind(article_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_membership).collect()
    }
}

fn row_to_membership(row: &sqlx::sqlite::SqliteRow) -> Result<Membership, StorageError> {
    Ok(Membership {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        article_id: row.try_get("article_id")?,
        is_read: row.try_get("is_read")?,
        read_at: row.try_get("read_at")?,
        created_at: row.try_get("created_at")?,
    })
}
