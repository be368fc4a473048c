use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::modes::{AccessMode, Environment, IdentityMode, ServiceStatusStrategy};
use crate::ConfigError;

pub const DEFAULT_ADDRESS: &str = "0.0.0.0:3001";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://statusdeck.db?mode=rwc";
pub const DEFAULT_USER_ID: &str = "test_user_123";
pub const DEFAULT_USER_EMAIL: &str = "test@example.com";
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    // Required fields
    pub address: String,
    pub database_url: String,

    pub environment: Environment,

    // Identity and access
    pub identity_mode: IdentityMode,
    pub fixed_user_id: String,
    pub fixed_user_email: Option<String>,
    pub access_mode: AccessMode,

    pub status_strategy: ServiceStatusStrategy,

    // HTTP surface
    pub cors_origin: Option<String>,
    pub static_dir: Option<PathBuf>,

    /// Events buffered per WebSocket subscriber before it is reported as lagging.
    pub broadcast_capacity: usize,

    // Connection pool settings (all optional with defaults)
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub connect_timeout_secs: Option<u64>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            environment: Environment::default(),
            identity_mode: IdentityMode::default(),
            fixed_user_id: DEFAULT_USER_ID.to_string(),
            fixed_user_email: Some(DEFAULT_USER_EMAIL.to_string()),
            access_mode: AccessMode::default(),
            status_strategy: ServiceStatusStrategy::default(),
            cors_origin: None,
            static_dir: None,
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
            max_connections: None,
            min_connections: None,
            connect_timeout_secs: None,
            acquire_timeout_secs: None,
            idle_timeout_secs: None,
        }
    }
}

impl ServerConfig {
    /// Create a new configuration with minimal parameters
    pub fn new(address: String, database_url: String) -> Result<Self, ConfigError> {
        let config = Self {
            address,
            database_url,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the values that cannot be checked by their types alone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Missing("database_url"));
        }
        if self.fixed_user_id.trim().is_empty() {
            return Err(ConfigError::Missing("fixed_user_id"));
        }
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "broadcast_capacity",
                value: "0".to_string(),
                expected: "a positive number".to_string(),
            });
        }
        if let (Some(min), Some(max)) = (self.min_connections, self.max_connections) {
            if min > max {
                return Err(ConfigError::InvalidValue {
                    field: "min_connections",
                    value: min.to_string(),
                    expected: format!("at most max_connections ({max})"),
                });
            }
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(self.address.clone()))
    }

    pub fn is_sqlite(&self) -> bool {
        self.database_url.starts_with("sqlite:")
    }

    // Pool getters with defaults. SQLite gets a single writer connection.
    pub fn get_max_connections(&self) -> u32 {
        self.max_connections
            .unwrap_or(if self.is_sqlite() { 1 } else { 20 })
    }

    pub fn get_min_connections(&self) -> u32 {
        self.min_connections
            .unwrap_or(1)
            .min(self.get_max_connections())
    }

    pub fn get_connect_timeout_secs(&self) -> u64 {
        self.connect_timeout_secs.unwrap_or(30)
    }

    pub fn get_acquire_timeout_secs(&self) -> u64 {
        self.acquire_timeout_secs.unwrap_or(30)
    }

    pub fn get_idle_timeout_secs(&self) -> u64 {
        self.idle_timeout_secs.unwrap_or(600)
    }
}
