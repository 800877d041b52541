// ABOUTME: User account module
// ABOUTME: Provides types and storage for app user accounts

pub mod storage;
pub mod types;

pub use storage::*;
pub use types::*;
