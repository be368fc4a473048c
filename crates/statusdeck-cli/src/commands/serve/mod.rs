mod app;
mod shutdown;

use clap::Args;
use statusdeck_auth::access_policy_for;
use statusdeck_config::{
    AccessMode, Environment, IdentityMode, ServerConfig, ServiceStatusStrategy, DEFAULT_ADDRESS,
    DEFAULT_BROADCAST_CAPACITY, DEFAULT_DATABASE_URL, DEFAULT_USER_EMAIL, DEFAULT_USER_ID,
};
use statusdeck_database::{establish_connection_with, PoolSettings};
use statusdeck_realtime::EventHub;
use statusdeck_status_page::StatusPageState;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

pub use app::build_application;
pub use shutdown::shutdown_signal;

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the server to
    #[arg(long, default_value = DEFAULT_ADDRESS, env = "STATUSDECK_ADDRESS")]
    pub address: String,

    /// Database connection URL (sqlite:// or postgres://)
    #[arg(long, default_value = DEFAULT_DATABASE_URL, env = "STATUSDECK_DATABASE_URL")]
    pub database_url: String,

    /// Runtime environment: development, production
    #[arg(long, default_value = "development", env = "STATUSDECK_ENV")]
    pub environment: Environment,

    /// Where request identity comes from: fixed, header
    #[arg(long, default_value = "fixed", env = "STATUSDECK_IDENTITY_MODE")]
    pub identity_mode: IdentityMode,

    /// User id every request runs as in fixed identity mode
    #[arg(long, default_value = DEFAULT_USER_ID, env = "STATUSDECK_USER_ID")]
    pub user_id: String,

    /// Email of the fixed user
    #[arg(long, default_value = DEFAULT_USER_EMAIL, env = "STATUSDECK_USER_EMAIL")]
    pub user_email: String,

    /// Organization access policy: open, membership
    #[arg(long, default_value = "open", env = "STATUSDECK_ACCESS_MODE")]
    pub access_mode: AccessMode,

    /// How incidents drive service status: latest-event, recompute-open-incidents
    #[arg(long, default_value = "latest-event", env = "STATUSDECK_STATUS_STRATEGY")]
    pub status_strategy: ServiceStatusStrategy,

    /// Frontend origin allowed by CORS
    #[arg(long, env = "STATUSDECK_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Directory with a pre-built frontend to serve under /
    #[arg(long, env = "STATUSDECK_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Events buffered per WebSocket subscriber
    #[arg(long, default_value_t = DEFAULT_BROADCAST_CAPACITY, env = "STATUSDECK_BROADCAST_CAPACITY")]
    pub broadcast_capacity: usize,

    /// Maximum pooled database connections
    #[arg(long, env = "STATUSDECK_DB_MAX_CONNECTIONS")]
    pub max_connections: Option<u32>,

    /// Minimum pooled database connections
    #[arg(long, env = "STATUSDECK_DB_MIN_CONNECTIONS")]
    pub min_connections: Option<u32>,
}

impl ServeCommand {
    pub fn into_config(self) -> anyhow::Result<ServerConfig> {
        let user_email = Some(self.user_email.trim().to_string()).filter(|e| !e.is_empty());

        let config = ServerConfig {
            address: self.address,
            database_url: self.database_url,
            environment: self.environment,
            identity_mode: self.identity_mode,
            fixed_user_id: self.user_id,
            fixed_user_email: user_email,
            access_mode: self.access_mode,
            status_strategy: self.status_strategy,
            cors_origin: self.cors_origin,
            static_dir: self.static_dir,
            broadcast_capacity: self.broadcast_capacity,
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            ..ServerConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn execute(self) -> anyhow::Result<()> {
        let config = self.into_config()?;

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(run(config))
    }
}

async fn run(config: ServerConfig) -> anyhow::Result<()> {
    debug!("Initializing database connection...");
    let db = establish_connection_with(&config.database_url, &PoolSettings::from_config(&config))
        .await?;

    let hub = EventHub::new(config.broadcast_capacity);
    let policy = access_policy_for(config.access_mode, db.clone());
    info!(
        environment = %config.environment,
        identity_mode = %config.identity_mode,
        access_policy = policy.name(),
        status_strategy = %config.status_strategy,
        "Configured status page"
    );

    let state = Arc::new(StatusPageState::new(
        db.clone(),
        hub,
        policy,
        config.status_strategy,
    ));
    let app = build_application(state, &config)?;

    let listener = TcpListener::bind(config.socket_addr()?).await?;
    info!("statusdeck listening on {}", config.address);
    info!("WebSocket endpoint available at ws://{}/ws", config.address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing database connections");
    if let Ok(db) = Arc::try_unwrap(db) {
        if let Err(e) = db.close().await {
            tracing::warn!("Error closing database connection: {}", e);
        }
    }
    info!("Graceful shutdown completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        serve: ServeCommand,
    }

    #[test]
    fn test_defaults_build_valid_config() {
        let cli = TestCli::try_parse_from(["statusdeck"]).unwrap();
        let config = cli.serve.into_config().unwrap();

        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.identity_mode, IdentityMode::Fixed);
        assert_eq!(config.access_mode, AccessMode::Open);
        assert_eq!(config.status_strategy, ServiceStatusStrategy::LatestEvent);
        assert_eq!(config.fixed_user_id, DEFAULT_USER_ID);
        assert_eq!(config.fixed_user_email.as_deref(), Some(DEFAULT_USER_EMAIL));
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = TestCli::try_parse_from([
            "statusdeck",
            "--environment",
            "production",
            "--access-mode",
            "membership",
            "--status-strategy",
            "recompute",
            "--user-email",
            "",
        ])
        .unwrap();
        let config = cli.serve.into_config().unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.access_mode, AccessMode::Membership);
        assert_eq!(
            config.status_strategy,
            ServiceStatusStrategy::RecomputeOpenIncidents
        );
        assert!(config.fixed_user_email.is_none());
    }

    #[test]
    fn test_invalid_mode_is_rejected() {
        assert!(TestCli::try_parse_from(["statusdeck", "--access-mode", "everyone"]).is_err());
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let cli = TestCli::try_parse_from(["statusdeck", "--address", "not-an-address"]).unwrap();
        assert!(cli.serve.into_config().is_err());
    }
}
