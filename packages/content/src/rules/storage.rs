// ABOUTME: Targeting rule storage layer using SQLite
// ABOUTME: Validates rule placement invariants before any row is written

use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{Rule, RuleInput, RuleVariable};
use crate::categories::CategoryKind;
use crate::validation::ValidationError;
use lumora_core::{generate_id, ChangeEvent};
use lumora_storage::StorageError;

pub struct RuleStorage {
    pool: SqlitePool,
}

struct ArticleMeta {
    is_published: bool,
    kind: CategoryKind,
}

impl RuleStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Attach a rule to an article.
    ///
    /// Rejected unless the article sits in a core-program category, the
    /// operator fits the variable, and no second ordinal bound would exist
    /// for the same variable.
    pub async fn create_rule(
        &self,
        article_id: &str,
        input: RuleInput,
    ) -> Result<(Rule, ChangeEvent), StorageError> {
        let meta = self.fetch_article_meta(article_id).await?;
        self.validate_rule(article_id, &input, &meta, None).await?;

        let rule_id = generate_id("rule");
        debug!("Creating rule: {} on article: {}", rule_id, article_id);

        let value_json = serde_json::to_string(&input.value).map_err(StorageError::Json)?;

        let row = sqlx::query(
            r#"
            INSERT INTO content_rules (id, article_id, operator, value)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&rule_id)
        .bind(article_id)
        .bind(input.operator)
        .bind(&value_json)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let rule = row_to_rule(&row)?;
        let event = ChangeEvent::RuleSaved {
            rule_id: rule.id.clone(),
            article_id: article_id.to_string(),
            article_published: meta.is_published,
        };

        Ok((rule, event))
    }

    /// Replace a rule's operator and value, re-running the same validation
    /// as creation. Replacing an ordinal bound with another is allowed; the
    /// existing row is excluded from the duplicate check.
    pub async fn update_rule(
        &self,
        rule_id: &str,
        input: RuleInput,
    ) -> Result<(Rule, ChangeEvent), StorageError> {
        let existing = self.get_rule(rule_id).await?;
        let meta = self.fetch_article_meta(&existing.article_id).await?;
        self.validate_rule(&existing.article_id, &input, &meta, Some(rule_id))
            .await?;

        debug!("Updating rule: {}", rule_id);

        let value_json = serde_json::to_string(&input.value).map_err(StorageError::Json)?;

        let row = sqlx::query(
            r#"
            UPDATE content_rules
            SET operator = ?, value = ?, updated_at = datetime('now', 'utc')
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(input.operator)
        .bind(&value_json)
        .bind(rule_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let rule = row_to_rule(&row)?;
        let event = ChangeEvent::RuleSaved {
            rule_id: rule.id.clone(),
            article_id: rule.article_id.clone(),
            article_published: meta.is_published,
        };

        Ok((rule, event))
    }

    pub async fn delete_rule(&self, rule_id: &str) -> Result<ChangeEvent, StorageError> {
        let rule = self.get_rule(rule_id).await?;
        let meta = self.fetch_article_meta(&rule.article_id).await?;

        debug!("Deleting rule: {}", rule_id);

        sqlx::query("DELETE FROM content_rules WHERE id = ?")
            .bind(rule_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(ChangeEvent::RuleDeleted {
            rule_id: rule_id.to_string(),
            article_id: rule.article_id,
            article_published: meta.is_published,
        })
    }

    pub async fn get_rule(&self, rule_id: &str) -> Result<Rule, StorageError> {
        let row = sqlx::query("SELECT * FROM content_rules WHERE id = ?")
            .bind(rule_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::NotFound(format!("Rule {}", rule_id)))?;

        row_to_rule(&row)
    }

    pub async fn list_rules(&self, article_id: &str) -> Result<Vec<Rule>, StorageError> {
        let rows = sqlx::query("SELECT * FROM content_rules WHERE article_id = ? ORDER BY created_at")
            .bind(article_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_rule).collect()
    }

    pub async fn count_for_article(&self, article_id: &str) -> Result<i64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM content_rules WHERE article_id = ?")
            .bind(article_id)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.try_get("count").map_err(StorageError::Sqlx)
    }

    async fn fetch_article_meta(&self, article_id: &str) -> Result<ArticleMeta, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT a.is_published, c.kind
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

        Ok(ArticleMeta {
            is_published: row.try_get("is_published")?,
            kind: row.try_get("kind")?,
        })
    }

    async fn validate_rule(
        &self,
        article_id: &str,
        input: &RuleInput,
        meta: &ArticleMeta,
        exclude_rule_id: Option<&str>,
    ) -> Result<(), StorageError> {
        if !meta.kind.allows_rules() {
            return Err(ValidationError::RulesRequireCoreProgram(meta.kind).into());
        }

        let variable = input.value.variable();
        if input.operator.is_ordinal() {
            if variable != RuleVariable::Age {
                return Err(ValidationError::OrdinalOperatorNotAllowed(input.operator).into());
            }

            if self
                .has_ordinal_bound(article_id, variable, exclude_rule_id)
                .await?
            {
                return Err(ValidationError::DuplicateOrdinalBound(variable).into());
            }
        }

        Ok(())
    }

    /// Whether the article already has an ordinal rule on `variable`,
    /// ignoring `exclude_rule_id` (the rule being updated, if any).
    async fn has_ordinal_bound(
        &self,
        article_id: &str,
        variable: RuleVariable,
        exclude_rule_id: Option<&str>,
    ) -> Result<bool, StorageError> {
        let existing = self.list_rules(article_id).await?;

        Ok(existing.iter().any(|rule| {
            if Some(rule.id.as_str()) == exclude_rule_id {
                return false;
            }
            rule.operator.is_ordinal() && rule.value.variable() == variable
        }))
    }
}

fn row_to_rule(row: &sqlx::sqlite::SqliteRow) -> Result<Rule, StorageError> {
    let value_json: String = row.try_get("value")?;
    let value = serde_json::from_str(&value_json).map_err(StorageError::Json)?;

    Ok(Rule {
        id: row.try_get("id")?,
        article_id: row.try_get("article_id")?,
        operator: row.try_get("operator")?,
        value,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
