//! Runtime switches selected by configuration

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::ConfigError;

/// Deployment environment. Controls whether internal error details reach clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::invalid("environment", other, "development, production")),
        }
    }
}

/// Where the caller identity comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityMode {
    /// Every request runs as the configured user.
    #[default]
    Fixed,
    /// Identity is read from `x-user-id` / `x-user-email` set by a trusted proxy.
    Header,
}

impl IdentityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityMode::Fixed => "fixed",
            IdentityMode::Header => "header",
        }
    }
}

impl Display for IdentityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IdentityMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(IdentityMode::Fixed),
            "header" => Ok(IdentityMode::Header),
            other => Err(ConfigError::invalid("identity mode", other, "fixed, header")),
        }
    }
}

/// Which organization access policy guards scoped routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    #[default]
    Open,
    Membership,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Open => "open",
            AccessMode::Membership => "membership",
        }
    }
}

impl Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(AccessMode::Open),
            "membership" => Ok(AccessMode::Membership),
            other => Err(ConfigError::invalid("access mode", other, "open, membership")),
        }
    }
}

/// How incident actions feed back into the owning service's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceStatusStrategy {
    /// The latest incident action overwrites the service status.
    #[default]
    LatestEvent,
    /// The service status follows the worst impact among its open incidents.
    RecomputeOpenIncidents,
}

impl ServiceStatusStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatusStrategy::LatestEvent => "latest-event",
            ServiceStatusStrategy::RecomputeOpenIncidents => "recompute-open-incidents",
        }
    }
}

impl Display for ServiceStatusStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServiceStatusStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "latest-event" | "latest" => Ok(ServiceStatusStrategy::LatestEvent),
            "recompute-open-incidents" | "recompute" => {
                Ok(ServiceStatusStrategy::RecomputeOpenIncidents)
            }
            other => Err(ConfigError::invalid(
                "service status strategy",
                other,
                "latest-event, recompute-open-incidents",
            )),
        }
    }
}
