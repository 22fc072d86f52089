//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Household asset tracker and year-end forecaster
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Self-hosted asset tracker with year-end forecasting", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set TALLY_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable; none = same-origin only)
        #[arg(long)]
        cors_origin: Vec<String>,
    },

    /// Predict year-end assets
    Forecast {
        /// Forecast a single user instead of the whole household
        #[arg(short, long)]
        user: Option<i64>,
    },

    /// List recent asset records
    Records {
        /// User to list records for
        #[arg(short, long, default_value = "1")]
        user: i64,

        /// Maximum records to show
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },
}
