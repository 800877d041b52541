// ABOUTME: Core types and utilities for Lumora
// ABOUTME: Foundational package providing shared vocabulary across all Lumora packages

pub mod constants;
pub mod events;
pub mod utils;

// Re-export main types
pub use events::ChangeEvent;

// Re-export constants
pub use constants::{database_file, lumora_dir};

// Re-export utilities
pub use utils::generate_id;
