// ABOUTME: Calendar month helpers shared by scan queries and stats aggregation
// ABOUTME: Month keys are "YYYY-MM" strings; bounds are half-open UTC ranges

use chrono::{DateTime, TimeZone, Utc};

use lumora_storage::StorageError;

/// The canonical key for a calendar month, e.g. "2026-03".
pub fn key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Half-open UTC range `[start of month, start of next month)`.
pub fn bounds(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>), StorageError> {
    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| StorageError::Validation(format!("invalid month {}-{}", year, month)))?;

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| {
            StorageError::Validation(format!("invalid month {}-{}", next_year, next_month))
        })?;

    Ok((start, end))
}

/// The month immediately before `(year, month)`.
pub fn previous(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}
