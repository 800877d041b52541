// ABOUTME: Taxonomy storage layer using SQLite
// ABOUTME: CRUD for categories, subcategories, and periods

use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{
    Category, CategoryCreateInput, Period, PeriodCreateInput, SubCategory,
    SubCategoryCreateInput,
};
use lumora_core::generate_id;
use lumora_storage::StorageError;

pub struct CategoryStorage {
    pool: SqlitePool,
}

impl CategoryStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // CATEGORY OPERATIONS
    // ========================================================================

    pub async fn create_category(
        &self,
        input: CategoryCreateInput,
    ) -> Result<Category, StorageError> {
        let category_id = generate_id("cat");
        debug!("Creating category: {} ({})", category_id, input.kind);

        let row = sqlx::query(
            r#"
            INSERT INTO categories (id, name, kind, position)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&category_id)
        .bind(&input.name)
        .bind(input.kind)
        .bind(input.position.unwrap_or(0))
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        row_to_category(&row)
    }

    pub async fn get_category(&self, category_id: &str) -> Result<Category, StorageError> {
        let row = sqlx::query("SELECT * FROM categories WHERE id = ?")
            .bind(category_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::NotFound(format!("Category {}", category_id)))?;

        row_to_category(&row)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let rows = sqlx::query("SELECT * FROM categories ORDER BY position, name")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_category).collect()
    }

    pub async fn delete_category(&self, category_id: &str) -> Result<(), StorageError> {
        debug!("Deleting category: {}", category_id);

        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(category_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Category {}", category_id)));
        }

        Ok(())
    }

    // ========================================================================
    // SUBCATEGORY OPERATIONS
    // ========================================================================

    pub async fn create_subcategory(
        &self,
        input: SubCategoryCreateInput,
    ) -> Result<SubCategory, StorageError> {
        // Surfaces NotFound before the FK rejects the insert
        self.get_category(&input.category_id).await?;

        let subcategory_id = generate_id("sub");
        debug!(
            "Creating subcategory: {} under {}",
            subcategory_id, input.category_id
        );

        let row = sqlx::query(
            r#"
            INSERT INTO subcategories (id, category_id, name, position)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&subcategory_id)
        .bind(&input.category_id)
        .bind(&input.name)
        .bind(input.position.unwrap_or(0))
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        row_to_subcategory(&row)
    }

    pub async fn get_subcategory(&self, subcategory_id: &str) -> Result<SubCategory, StorageError> {
        let row = sqlx::query("SELECT * FROM subcategories WHERE id = ?")
            .bind(subcategory_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::NotFound(format!("Subcategory {}", subcategory_id)))?;

        row_to_subcategory(&row)
    }

    pub async fn list_subcategories(
        &self,
        category_id: &str,
    ) -> Result<Vec<SubCategory>, StorageError> {
        let rows =
            sqlx::query("SELECT * FROM subcategories WHERE category_id = ? ORDER BY position, name")
                .bind(category_id)
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_subcategory).collect()
    }

    pub async fn delete_subcategory(&self, subcategory_id: &str) -> Result<(), StorageError> {
        debug!("Deleting subcategory: {}", subcategory_id);

        let result = sqlx::query("DELETE FROM subcategories WHERE id = ?")
            .bind(subcategory_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!(
                "Subcategory {}",
                subcategory_id
            )));
        }

        Ok(())
    }

    // ========================================================================
    // PERIOD OPERATIONS
    // ========================================================================

    pub async fn create_period(&self, input: PeriodCreateInput) -> Result<Period, StorageError> {
        let period_id = generate_id("per");
        debug!("Creating period: {}", period_id);

        let row = sqlx::query(
            r#"
            INSERT INTO periods (id, name, position)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&period_id)
        .bind(&input.name)
        .bind(input.position.unwrap_or(0))
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        row_to_period(&row)
    }

    pub async fn get_period(&self, period_id: &str) -> Result<Period, StorageError> {
        let row = sqlx::query("SELECT * FROM periods WHERE id = ?")
            .bind(period_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::NotFound(format!("Period {}", period_id)))?;

        row_to_period(&row)
    }

    pub async fn list_periods(&self) -> Result<Vec<Period>, StorageError> {
        let rows = sqlx::query("SELECT * FROM periods ORDER BY position, name")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_period).collect()
    }

    pub async fn delete_period(&self, period_id: &str) -> Result<(), StorageError> {
        debug!("Deleting period: {}", period_id);

        let result = sqlx::query("DELETE FROM periods WHERE id = ?")
            .bind(period_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Period {}", period_id)));
        }

        Ok(())
    }
}

fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Result<Category, StorageError> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        kind: row.try_get("kind")?,
        position: row.try_get("position")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_subcategory(row: &sqlx::sqlite::SqliteRow) -> Result<SubCategory, StorageError> {
    Ok(SubCategory {
        id: row.try_get("id")?,
        category_id: row.try_get("category_id")?,
        name: row.try_get("name")?,
        position: row.try_get("position")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_period(row: &sqlx::sqlite::SqliteRow) -> Result<Period, StorageError> {
    Ok(Period {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        position: row.try_get("position")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
