// ABOUTME: Article module
// ABOUTME: The content items users read, published into categories

pub mod storage;
pub mod types;

pub use storage::*;
pub use types::*;
