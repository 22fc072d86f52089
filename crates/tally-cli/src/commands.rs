//! CLI command implementations
//!
//! Commands are small wrappers over `tally-core`:
//! - `cmd_init` - Create the database and schema
//! - `cmd_serve` - Start the web server
//! - `cmd_forecast` - Print a year-end forecast
//! - `cmd_records` - Print recent asset records

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::db::DB_KEY_ENV;
use tally_core::{Database, Forecaster, Scope, SystemClock};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path.to_str().context("Database path must be UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED ({})", DB_KEY_ENV);
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Start the API: tally serve");
    println!("  2. Check the forecast: tally forecast");

    Ok(())
}

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    cors_origins: Vec<String>,
    no_encrypt: bool,
) -> Result<()> {
    println!("🚀 Starting Tally web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if !cors_origins.is_empty() {
        println!("   CORS origins: {}", cors_origins.join(", "));
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let config = tally_server::ServerConfig {
        allowed_origins: cors_origins,
    };

    tally_server::serve(db, host, port, config).await?;

    Ok(())
}

pub fn cmd_forecast(db: &Database, user: Option<i64>) -> Result<()> {
    let scope = match user {
        Some(user_id) => Scope::User(user_id),
        None => Scope::All,
    };

    let clock = SystemClock;
    let forecast = Forecaster::new(db, &clock).predict_year_end(scope)?;

    match user {
        Some(user_id) => println!("📈 Year-end forecast for user {}", user_id),
        None => println!("📈 Year-end forecast (whole household)"),
    }
    println!("   ─────────────────────────────");
    println!(
        "   Current assets:    {:>14}",
        forecast.current_total_assets.round_dp(2)
    );
    println!(
        "   Monthly income:    {:>14}",
        forecast.monthly_income.round_dp(2)
    );
    println!(
        "   Daily expense:     {:>14}",
        forecast.daily_expense.round_dp(2)
    );
    println!(
        "   Expected income:   {:>14}",
        forecast.expected_income.round_dp(2)
    );
    println!(
        "   Expected expense:  {:>14}",
        forecast.expected_expense.round_dp(2)
    );
    println!(
        "   Interest income:   {:>14}",
        forecast.interest_income.round_dp(2)
    );
    println!("   ─────────────────────────────");
    println!(
        "   Predicted year-end: {:>13}",
        forecast.predicted_year_end_assets.round_dp(2)
    );

    Ok(())
}

pub fn cmd_records(db: &Database, user: i64, limit: i64) -> Result<()> {
    let records = db.recent_asset_records(user, limit)?;

    if records.is_empty() {
        println!("No asset records for user {}", user);
        return Ok(());
    }

    println!("💰 Asset records for user {} ({} shown)", user, records.len());
    println!(
        "   {:>5}  {:<12}  {:>12}  {:<10}  {}",
        "ID", "TYPE", "AMOUNT", "DATE", "OWNER"
    );
    for record in &records {
        println!(
            "   {:>5}  {:<12}  {:>12}  {:<10}  {}",
            record.id,
            record.record_type.as_str(),
            record.amount.round_dp(2),
            record.record_date,
            record.owner
        );
    }

    Ok(())
}
