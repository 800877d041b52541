// ABOUTME: Article storage layer using SQLite
// ABOUTME: Saves and deletes emit change events for the audience pipeline

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{Article, ArticleCreateInput, ArticleUpdateInput};
use crate::categories::CategoryKind;
use crate::validation::ValidationError;
use lumora_core::{generate_id, ChangeEvent};
use lumora_storage::StorageError;

pub struct ArticleStorage {
    pool: SqlitePool,
}

impl ArticleStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_article(
        &self,
        input: ArticleCreateInput,
    ) -> Result<(Article, ChangeEvent), StorageError> {
        if input.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }

        // Surfaces NotFound before the FK rejects the insert
        let category_exists = sqlx::query("SELECT id FROM categories WHERE id = ?")
            .bind(&input.category_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .is_some();
        if !category_exists {
            return Err(StorageError::NotFound(format!(
                "Category {}",
                input.category_id
            )));
        }

        if let Some(subcategory_id) = &input.subcategory_id {
            self.check_subcategory(subcategory_id, &input.category_id)
                .await?;
        }

        let article_id = generate_id("art");
        let is_published = input.is_published.unwrap_or(false);
        debug!(
            "Creating article: {} (published: {})",
            article_id, is_published
        );

        let published_at = is_published.then(Utc::now);

        let row = sqlx::query(
            r#"
            INSERT INTO articles (
                id, title, summary, body, category_id, subcategory_id,
                period_id, is_published, published_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&article_id)
        .bind(&input.title)
        .bind(&input.summary)
        .bind(&input.body)
        .bind(&input.category_id)
        .bind(&input.subcategory_id)
        .bind(&input.period_id)
        .bind(is_published)
        .bind(published_at)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let article = row_to_article(&row)?;
        let event = ChangeEvent::ArticleSaved {
            article_id: article.id.clone(),
            created: true,
            was_published: false,
            is_published,
        };

        Ok((article, event))
    }

    /// Apply a partial update. The emitted event carries the publish state
    /// before and after so the dispatcher can tell publish transitions from
    /// plain edits.
    pub async fn update_article(
        &self,
        article_id: &str,
        input: ArticleUpdateInput,
    ) -> Result<(Article, ChangeEvent), StorageError> {
        if let Some(title) = &input.title {
            if title.trim().is_empty() {
                return Err(ValidationError::EmptyTitle.into());
            }
        }

        let current = self.get_article(article_id).await?;
        let was_published = current.is_published;

        if let Some(subcategory_id) = &input.subcategory_id {
            self.check_subcategory(subcategory_id, &current.category_id)
                .await?;
        }

        debug!("Updating article: {}", article_id);

        let now = Utc::now();
        let becomes_published = input.is_published == Some(true) && !was_published;

        let mut updates = vec!["updated_at = ?"];
        let mut query_str = String::from("UPDATE articles SET ");

        if input.title.is_some() {
            updates.push("title = ?");
        }
        if input.summary.is_some() {
            updates.push("summary = ?");
        }
        if input.body.is_some() {
            updates.push("body = ?");
        }
        if input.subcategory_id.is_some() {
            updates.push("subcategory_id = ?");
        }
        if input.period_id.is_some() {
            updates.push("period_id = ?");
        }
        if input.is_published.is_some() {
            updates.push("is_published = ?");
        }
        if becomes_published {
            updates.push("published_at = ?");
        }

        query_str.push_str(&updates.join(", "));
        query_str.push_str(" WHERE id = ?");

        let mut query = sqlx::query(&query_str).bind(now);

        if let Some(title) = &input.title {
            query = query.bind(title);
        }
        if let Some(summary) = &input.summary {
            query = query.bind(summary);
        }
        if let Some(body) = &input.body {
            query = query.bind(body);
        }
        if let Some(subcategory_id) = &input.subcategory_id {
            query = query.bind(subcategory_id);
        }
        if let Some(period_id) = &input.period_id {
            query = query.bind(period_id);
        }
        if let Some(is_published) = input.is_published {
            query = query.bind(is_published);
        }
        if becomes_published {
            query = query.bind(now);
        }

        query
            .bind(article_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let article = self.get_article(article_id).await?;
        let event = ChangeEvent::ArticleSaved {
            article_id: article.id.clone(),
            created: false,
            was_published,
            is_published: article.is_published,
        };

        Ok((article, event))
    }

    /// Delete an article. Rules and membership rows go with it via cascade.
    pub async fn delete_article(&self, article_id: &str) -> Result<ChangeEvent, StorageError> {
        debug!("Deleting article: {}", article_id);

        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(article_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Article {}", article_id)));
        }

        Ok(ChangeEvent::ArticleDeleted {
            article_id: article_id.to_string(),
        })
    }

    pub async fn get_article(&self, article_id: &str) -> Result<Article, StorageError> {
        let row = sqlx::query("SELECT * FROM articles WHERE id = ?")
            .bind(article_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::NotFound(format!("Article {}", article_id)))?;

        row_to_article(&row)
    }

    /// The article's category kind, which decides whether membership is
    /// managed and rules are allowed.
    pub async fn category_kind(&self, article_id: &str) -> Result<CategoryKind, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT c.kind
            FROM articles a
            JOIN categories c ON c.id = a.category_id
            WHERE a.id = ?
            "#,
        )
        .bind(article_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?
        .ok_or_else(|| StorageError::NotFound(format!("Article {}", article_id)))?;

        row.try_get("kind").map_err(StorageError::Sqlx)
    }

    pub async fn list_articles(&self, category_id: &str) -> Result<Vec<Article>, StorageError> {
        let rows = sqlx::query("SELECT * FROM articles WHERE category_id = ? ORDER BY created_at")
            .bind(category_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_article).collect()
    }

    /// Published articles whose category kind is one of `kinds`.
    pub async fn list_published_by_kinds(
        &self,
        kinds: &[CategoryKind],
    ) -> Result<Vec<Article>, StorageError> {
        if kinds.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; kinds.len()].join(", ");
        let query_str = format!(
            r#"
            SELECT a.*
            FROM articles a
            JOIN categories c ON c.id = a.category_id
            WHERE a.is_published = 1 AND c.kind IN ({})
            ORDER BY a.created_at
            "#,
            placeholders
        );

        let mut query = sqlx::query(&query_str);
        for kind in kinds {
            query = query.bind(kind);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_article).collect()
    }

    async fn check_subcategory(
        &self,
        subcategory_id: &str,
        category_id: &str,
    ) -> Result<(), StorageError> {
        let row = sqlx::query("SELECT category_id FROM subcategories WHERE id = ?")
            .bind(subcategory_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::NotFound(format!("Subcategory {}", subcategory_id)))?;

        let parent: String = row.try_get("category_id")?;
        if parent != category_id {
            return Err(ValidationError::SubcategoryOutsideCategory {
                subcategory_id: subcategory_id.to_string(),
                category_id: category_id.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

fn row_to_article(row: &sqlx::sqlite::SqliteRow) -> Result<Article, StorageError> {
    Ok(Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        summary: row.try_get("summary")?,
        body: row.try_get("body")?,
        category_id: row.try_get("category_id")?,
        subcategory_id: row.try_get("subcategory_id")?,
        period_id: row.try_get("period_id")?,
        is_published: row.try_get("is_published")?,
        published_at: row.try_get("published_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
