// ABOUTME: Monthly stats recomputation engine
// ABOUTME: Rebuilds one (user, month) aggregate from scratch; no incremental state

use sqlx::SqlitePool;
use tracing::{debug, info};

use super::storage::StatStorage;
use super::types::{MonthlyAggregates, MonthlyStat};
use crate::months;
use crate::scans::{FaceScan, ScanStorage};
use lumora_storage::StorageError;

pub struct MonthlyStatsEngine {
    pool: SqlitePool,
    scans: ScanStorage,
    stats: StatStorage,
}

impl MonthlyStatsEngine {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            scans: ScanStorage::new(pool.clone()),
            stats: StatStorage::new(pool.clone()),
            pool,
        }
    }

    /// Recompute the user's aggregate for one calendar month.
    ///
    /// The row is rebuilt entirely from the month's scans; with no scans
    /// left the row is deleted and `None` returned. The delta compares
    /// against the previous month's stored row, so recomputations should
    /// run in capture order when backfilling.
    pub async fn recompute(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Option<MonthlyStat>, StorageError> {
        let user_exists = sqlx::query("SELECT id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .is_some();

        if !user_exists {
            return Err(StorageError::NotFound(format!("User {}", user_id)));
        }

        let month_key = months::key(year, month);
        let scans = self.scans.list_for_user_month(user_id, year, month).await?;

        if scans.is_empty() {
            let removed = self.stats.delete_for_month(user_id, &month_key).await?;
            if removed {
                debug!(
                    "Removed monthly stat for user: {} month: {} (no scans remain)",
                    user_id, month_key
                );
            }
            return Ok(None);
        }

        let mut aggregates = aggregate(&scans);

        let (prev_year, prev_month) = months::previous(year, month);
        let previous = self
            .stats
            .get_for_month(user_id, &months::key(prev_year, prev_month))
            .await?;
        aggregates.delta_overall = match (aggregates.avg_overall, previous.and_then(|p| p.avg_overall)) {
            (Some(current), Some(prior)) => Some(current - prior),
            _ => None,
        };

        let stat = self.stats.upsert(user_id, &month_key, &aggregates).await?;

        info!(
            "Recomputed monthly stat for user: {} month: {} (scans: {})",
            user_id, month_key, stat.scan_count
        );

        Ok(Some(stat))
    }
}

fn aggregate(scans: &[FaceScan]) -> MonthlyAggregates {
    let count = scans.len() as f64;
    let mean = |extract: fn(&FaceScan) -> f64| -> Option<f64> {
        Some(scans.iter().map(extract).sum::<f64>() / count)
    };

    MonthlyAggregates {
        scan_count: scans.len() as i64,
        avg_hydration: mean(|s| s.hydration_score),
        avg_clarity: mean(|s| s.clarity_score),
        avg_texture: mean(|s| s.texture_score),
        avg_overall: mean(|s| s.overall_score),
        best_overall: scans
            .iter()
            .map(|s| s.overall_score)
            .fold(None, |best, score| {
                Some(best.map_or(score, |b: f64| b.max(score)))
            }),
        delta_overall: None,
    }
}
