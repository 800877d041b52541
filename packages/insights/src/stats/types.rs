// ABOUTME: Monthly stat type definitions
// ABOUTME: One aggregate row per user per month, fully derived from scans

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyStat {
    pub id: String,
    pub user_id: String,
    /// Month key, e.g. "2026-03".
    pub month: String,
    pub scan_count: i64,
    pub avg_hydration: Option<f64>,
    pub avg_clarity: Option<f64>,
    pub avg_texture: Option<f64>,
    pub avg_overall: Option<f64>,
    pub best_overall: Option<f64>,
    /// Average overall score minus the previous month's, when that month
    /// has a stat row.
    pub delta_overall: Option<f64>,
    pub computed_at: DateTime<Utc>,
}

/// Aggregate values computed by the engine before persistence.
#[derive(Debug, Clone, Default)]
pub struct MonthlyAggregates {
    pub scan_count: i64,
    pub avg_hydration: Option<f64>,
    pub avg_clarity: Option<f64>,
    pub avg_texture: Option<f64>,
    pub avg_overall: Option<f64>,
    pub best_overall: Option<f64>,
    pub delta_overall: Option<f64>,
}
