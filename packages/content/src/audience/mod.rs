// ABOUTME: Audience resolution module
// ABOUTME: Pure rule evaluation plus the synchronizer that reconciles membership rows

pub mod resolver;
pub mod synchronizer;

pub use resolver::*;
pub use synchronizer::*;
