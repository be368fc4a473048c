//! Core utilities and types shared across all statusdeck crates

pub mod error_builder;
pub mod extract;
pub mod problem;
pub mod types;

pub use error_builder::*;
pub use extract::ApiJson;
pub use problem::{ErrorBody, Problem};
pub use types::*;

// Re-export external dependencies
pub use chrono;
pub use serde;
pub use serde_json;
