// ABOUTME: Monthly stats module
// ABOUTME: Derived aggregates over a user's scans, one row per calendar month

pub mod engine;
pub mod storage;
pub mod types;

pub use engine::*;
pub use storage::*;
pub use types::*;
