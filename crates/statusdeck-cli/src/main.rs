//! statusdeck CLI - status page server and maintenance commands

mod commands;

use clap::{Parser, Subcommand};
use commands::{SeedCommand, ServeCommand};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "STATUSDECK_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "STATUSDECK_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API and WebSocket server
    Serve(ServeCommand),
    /// Load demo data into the database
    Seed(SeedCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = cli.log_level.clone();

    // RUST_LOG wins when set; otherwise our crates log at the requested
    // level and noisy dependencies at warn.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .map_err(|e| anyhow::anyhow!("Invalid RUST_LOG environment variable: {}", e))?
    } else {
        tracing_subscriber::EnvFilter::try_new(format!(
            "statusdeck={level},\
             statusdeck_auth={level},\
             statusdeck_config={level},\
             statusdeck_core={level},\
             statusdeck_database={level},\
             statusdeck_entities={level},\
             statusdeck_migrations={level},\
             statusdeck_realtime={level},\
             statusdeck_status_page={level},\
             tower_http={level},\
             sqlx=warn,\
             sea_orm=warn,\
             sea_orm_migration=warn,\
             h2=warn,\
             tower=warn,\
             hyper=warn,\
             tungstenite=warn",
            level = log_level
        ))
        .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", log_level, e))?
    };

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global default subscriber: {}", e))?;

    match cli.command {
        Commands::Serve(serve_cmd) => serve_cmd.execute(),
        Commands::Seed(seed_cmd) => seed_cmd.execute(),
    }
}
