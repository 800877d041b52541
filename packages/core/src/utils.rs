// ABOUTME: Shared utility functions for Lumora
// ABOUTME: Prefixed entity id generation

/// Generate a unique entity id with a type prefix, e.g. `art-V1StGXR8_Z5jdHi6B-myT`
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, nanoid::nanoid!())
}
