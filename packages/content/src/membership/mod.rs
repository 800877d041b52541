// ABOUTME: Membership module
// ABOUTME: Per-user article rows with read tracking, the resolver's output surface

pub mod storage;
pub mod types;

pub use storage::*;
pub use types::*;
