//! Database connection management

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use statusdeck_config::ServerConfig;
use statusdeck_migrations::{Migrator, MigratorTrait};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub type DbConnection = DatabaseConnection;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    Connect(#[source] DbErr),

    #[error("Failed to apply migrations: {0}")]
    Migration(#[source] DbErr),
}

/// Connection pool sizing and timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

impl PoolSettings {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            max_connections: config.get_max_connections(),
            min_connections: config.get_min_connections(),
            connect_timeout: Duration::from_secs(config.get_connect_timeout_secs()),
            acquire_timeout: Duration::from_secs(config.get_acquire_timeout_secs()),
            idle_timeout: Duration::from_secs(config.get_idle_timeout_secs()),
        }
    }
}

/// Connect with default pool settings and bring the schema up to date.
pub async fn establish_connection(database_url: &str) -> Result<Arc<DbConnection>, DatabaseError> {
    establish_connection_with(database_url, &PoolSettings::default()).await
}

pub async fn establish_connection_with(
    database_url: &str,
    settings: &PoolSettings,
) -> Result<Arc<DbConnection>, DatabaseError> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .connect_timeout(settings.connect_timeout)
        .acquire_timeout(settings.acquire_timeout)
        .idle_timeout(settings.idle_timeout);

    debug!(
        max_connections = settings.max_connections,
        min_connections = settings.min_connections,
        "Opening database pool"
    );

    let db = Database::connect(opt)
        .await
        .map_err(DatabaseError::Connect)?;

    // Run migrations
    Migrator::up(&db, None)
        .await
        .map_err(DatabaseError::Migration)?;

    info!(backend = ?db.get_database_backend(), "Database ready");

    Ok(Arc::new(db))
}
