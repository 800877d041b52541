// ABOUTME: Targeting rule module
// ABOUTME: Rules attach to core-program articles and gate who sees them

pub mod storage;
pub mod types;

pub use storage::*;
pub use types::*;
