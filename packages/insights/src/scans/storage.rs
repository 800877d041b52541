// ABOUTME: Face scan storage layer using SQLite
// ABOUTME: Recording and deleting scans emit change events for stats recomputation

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{FaceScan, ScanInput};
use crate::months;
use lumora_core::{generate_id, ChangeEvent};
use lumora_storage::StorageError;

pub struct ScanStorage {
    pool: SqlitePool,
}

impl ScanStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a device scan.
    ///
    /// Emits `ScanRecorded` so the dispatcher can schedule a monthly stats
    /// recomputation for the captured month.
    pub async fn record_scan(
        &self,
        user_id: &str,
        input: ScanInput,
    ) -> Result<(FaceScan, ChangeEvent), StorageError> {
        let user_exists = sqlx::query("SELECT id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .is_some();

        if !user_exists {
            return Err(StorageError::NotFound(format!("User {}", user_id)));
        }

        for (name, score) in [
            ("hydration", input.hydration_score),
            ("clarity", input.clarity_score),
            ("texture", input.texture_score),
            ("overall", input.overall_score),
        ] {
            if !(0.0..=100.0).contains(&score) {
                return Err(StorageError::Validation(format!(
                    "{} score {} is outside 0-100",
                    name, score
                )));
            }
        }

        let scan_id = generate_id("scan");
        let captured_at = input.captured_at.unwrap_or_else(Utc::now);
        debug!("Recording scan: {} for user: {}", scan_id, user_id);

        let row = sqlx::query(
            r#"
            INSERT INTO face_scans (
                id, user_id, captured_at, hydration_score, clarity_score,
                texture_score, overall_score, image_key
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&scan_id)
        .bind(user_id)
        .bind(captured_at)
        .bind(input.hydration_score)
        .bind(input.clarity_score)
        .bind(input.texture_score)
        .bind(input.overall_score)
        .bind(&input.image_key)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let scan = row_to_scan(&row)?;
        let event = ChangeEvent::ScanRecorded {
            scan_id: scan.id.clone(),
            user_id: user_id.to_string(),
            captured_at,
        };

        Ok((scan, event))
    }

    pub async fn get_scan(&self, scan_id: &str) -> Result<FaceScan, StorageError> {
        let row = sqlx::query("SELECT * FROM face_scans WHERE id = ?")
            .bind(scan_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::NotFound(format!("Scan {}", scan_id)))?;

        row_to_scan(&row)
    }

    /// Remove a scan, emitting `ScanDeleted` so the affected month gets
    /// recomputed.
    pub async fn delete_scan(&self, scan_id: &str) -> Result<ChangeEvent, StorageError> {
        let scan = self.get_scan(scan_id).await?;

        debug!("Deleting scan: {}", scan_id);

        sqlx::query("DELETE FROM face_scans WHERE id = ?")
            .bind(scan_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(ChangeEvent::ScanDeleted {
            scan_id: scan.id,
            user_id: scan.user_id,
            captured_at: scan.captured_at,
        })
    }

    /// Scans captured by the user within the given calendar month.
    pub async fn list_for_user_month(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<FaceScan>, StorageError> {
        let (start, end) = months::bounds(year, month)?;

        let rows = sqlx::query(
            r#"
            SELECT * FROM face_scans
            WHERE user_id = ? AND captured_at >= ? AND captured_at < ?
            ORDER BY captured_at
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_scan).collect()
    }

    /// The user's most recent scans, newest first.
    pub async fn list_recent(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<FaceScan>, StorageError> {
        let rows = sqlx::query(
            "SELECT * FROM face_scans WHERE user_id = ? ORDER BY captured_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_scan).collect()
    }
}

fn row_to_scan(row: &sqlx::sqlite::SqliteRow) -> Result<FaceScan, StorageError> {
    Ok(FaceScan {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        captured_at: row.try_get("captured_at")?,
        hydration_score: row.try_get("hydration_score")?,
        clarity_score: row.try_get("clarity_score")?,
        texture_score: row.try_get("texture_score")?,
        overall_score: row.try_get("overall_score")?,
        image_key: row.try_get("image_key")?,
        created_at: row.try_get("created_at")?,
    })
}
