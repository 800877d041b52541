// ABOUTME: Onboarding questionnaire module
// ABOUTME: The per-user profile that targeting rules are evaluated against

pub mod storage;
pub mod types;

pub use storage::*;
pub use types::*;
