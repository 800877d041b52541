// ABOUTME: Face scan type definitions
// ABOUTME: Scores arrive pre-computed from the device, 0-100 each

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceScan {
    pub id: String,
    pub user_id: String,
    pub captured_at: DateTime<Utc>,
    pub hydration_score: f64,
    pub clarity_score: f64,
    pub texture_score: f64,
    pub overall_score: f64,
    /// Object-store key of the source image, when the client uploaded one.
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanInput {
    /// Defaults to the ingestion time when the device omits it.
    pub captured_at: Option<DateTime<Utc>>,
    pub hydration_score: f64,
    pub clarity_score: f64,
    pub texture_score: f64,
    pub overall_score: f64,
    pub image_key: Option<String>,
}
