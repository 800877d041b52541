// ABOUTME: Content taxonomy module
// ABOUTME: Categories, subcategories, and program periods that articles hang off

pub mod storage;
pub mod types;

pub use storage::*;
pub use types::*;
