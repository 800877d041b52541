// ABOUTME: Face scan history and monthly progress stats for Lumora
// ABOUTME: Scan ingestion emits change events; the stats engine aggregates per calendar month

pub mod months;
pub mod scans;
pub mod stats;

pub use scans::{FaceScan, ScanInput, ScanStorage};
pub use stats::{MonthlyStat, MonthlyStatsEngine, StatStorage};
