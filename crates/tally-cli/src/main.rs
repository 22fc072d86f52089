//! Tally CLI - Household asset tracker
//!
//! Usage:
//!   tally init                 Initialize database
//!   tally serve --port 3000    Start web server
//!   tally forecast --user 1    Predict year-end assets
//!   tally records --user 1     List recent asset records

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            cors_origin,
        } => commands::cmd_serve(&cli.db, &host, port, cors_origin, cli.no_encrypt).await,
        Commands::Forecast { user } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_forecast(&db, user)
        }
        Commands::Records { user, limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_records(&db, user, limit)
        }
    }
}
