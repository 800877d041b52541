// ABOUTME: User storage layer using SQLite
// ABOUTME: Handles CRUD operations for app user accounts

use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{User, UserCreateInput};
use lumora_core::generate_id;
use lumora_storage::StorageError;

pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, input: UserCreateInput) -> Result<User, StorageError> {
        let user_id = generate_id("usr");
        debug!("Creating user: {}", user_id);

        let row = sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&user_id)
        .bind(&input.email)
        .bind(&input.display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        row_to_user(&row)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, StorageError> {
        debug!("Fetching user: {}", user_id);

        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::NotFound(format!("User {}", user_id)))?;

        row_to_user(&row)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_user).collect()
    }

    /// Ids of every account, for audience recomputation against the whole user base.
    pub async fn list_user_ids(&self) -> Result<Vec<String>, StorageError> {
        let rows = sqlx::query("SELECT id FROM users")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter()
            .map(|row| row.try_get("id").map_err(StorageError::Sqlx))
            .collect()
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), StorageError> {
        debug!("Deleting user: {}", user_id);

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("User {}", user_id)));
        }

        Ok(())
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, StorageError> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
