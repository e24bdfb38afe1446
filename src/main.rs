//! # Holocron Main Entry Point
//!
//! This is the main entry point for the Holocron service.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use holocron::{
    config::ConfigLoader,
    db,
    server::{AppState, run_server},
    telemetry,
};

/// Holocron - character archive with CRUD, upsert and paging
#[derive(Parser)]
#[command(name = "holocron")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Run the HTTP API (default)
    Serve,

    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = Arc::new(ConfigLoader::new().load().context("loading configuration")?);
    telemetry::init_tracing(&config).context("initializing telemetry")?;

    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(configuration = %redacted_json, "Loaded configuration");
    }
    tracing::info!(profile = %config.profile, "Starting holocron");

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => db::migrate(&db).await,
        Command::Serve => {
            if config.run_migrations {
                db::migrate(&db).await?;
            }

            let state = AppState::build(config.clone(), db).context("building services")?;
            run_server(config, state).await
        }
    }
}
