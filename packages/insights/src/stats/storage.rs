// ABOUTME: Monthly stat storage layer using SQLite
// ABOUTME: Upsert keyed on (user, month); rows are replaceable derived data

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{MonthlyAggregates, MonthlyStat};
use lumora_core::generate_id;
use lumora_storage::StorageError;

pub struct StatStorage {
    pool: SqlitePool,
}

impl StatStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(
        &self,
        user_id: &str,
        month: &str,
        aggregates: &MonthlyAggregates,
    ) -> Result<MonthlyStat, StorageError> {
        debug!("Upserting monthly stat for user: {} month: {}", user_id, month);

        let row = sqlx::query(
            r#"
            INSERT INTO monthly_stats (
                id, user_id, month, scan_count, avg_hydration, avg_clarity,
                avg_texture, avg_overall, best_overall, delta_overall, computed_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, month) DO UPDATE SET
                scan_count = excluded.scan_count,
                avg_hydration = excluded.avg_hydration,
                avg_clarity = excluded.avg_clarity,
                avg_texture = excluded.avg_texture,
                avg_overall = excluded.avg_overall,
                best_overall = excluded.best_overall,
                delta_overall = excluded.delta_overall,
                computed_at = excluded.computed_at
            RETURNING *
            "#,
        )
        .bind(generate_id("stat"))
        .bind(user_id)
        .bind(month)
        .bind(aggregates.scan_count)
        .bind(aggregates.avg_hydration)
        .bind(aggregates.avg_clarity)
        .bind(aggregates.avg_texture)
        .bind(aggregates.avg_overall)
        .bind(aggregates.best_overall)
        .bind(aggregates.delta_overall)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        row_to_stat(&row)
    }

    pub async fn get_for_month(
        &self,
        user_id: &str,
        month: &str,
    ) -> Result<Option<MonthlyStat>, StorageError> {
        let row = sqlx::query("SELECT * FROM monthly_stats WHERE user_id = ? AND month = ?")
            .bind(user_id)
            .bind(month)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_stat).transpose()
    }

    /// Drop the row for a month. Returns true when a row existed.
    pub async fn delete_for_month(
        &self,
        user_id: &str,
        month: &str,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM monthly_stats WHERE user_id = ? AND month = ?")
            .bind(user_id)
            .bind(month)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<MonthlyStat>, StorageError> {
        let rows = sqlx::query("SELECT * FROM monthly_stats WHERE user_id = ? ORDER BY month")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_stat).collect()
    }
}

fn row_to_stat(row: &sqlx::sqlite::SqliteRow) -> Result<MonthlyStat, StorageError> {
    Ok(MonthlyStat {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        month: row.try_get("month")?,
        scan_count: row.try_get("scan_count")?,
        avg_hydration: row.try_get("avg_hydration")?,
        avg_clarity: row.try_get("avg_clarity")?,
        avg_texture: row.try_get("avg_texture")?,
        avg_overall: row.try_get("avg_overall")?,
        best_overall: row.try_get("best_overall")?,
        delta_overall: row.try_get("delta_overall")?,
        computed_at: row.try_get("computed_at")?,
    })
}
