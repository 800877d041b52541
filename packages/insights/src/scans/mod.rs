// ABOUTME: Face scan module
// ABOUTME: Types and storage for device-captured skin scores

pub mod storage;
pub mod types;

pub use storage::*;
pub use types::*;
