//! Server configuration for statusdeck

mod config;
pub mod modes;

use thiserror::Error;

pub use config::{
    ServerConfig, DEFAULT_ADDRESS, DEFAULT_BROADCAST_CAPACITY, DEFAULT_DATABASE_URL,
    DEFAULT_USER_EMAIL, DEFAULT_USER_ID,
};
pub use modes::{AccessMode, Environment, IdentityMode, ServiceStatusStrategy};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Invalid {field} '{value}', expected {expected}")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, value: &str, expected: &str) -> Self {
        ConfigError::InvalidValue {
            field,
            value: value.to_string(),
            expected: format!("one of: {expected}"),
        }
    }
}
