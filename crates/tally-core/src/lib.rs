//! Tally Core Library
//!
//! Shared functionality for the Tally household asset tracker:
//! - Database access and migrations
//! - Asset ledger and expense CRUD with write validation
//! - Aggregate queries (totals, salary income, investment records)
//! - Year-end asset forecast engine

pub mod clock;
pub mod db;
pub mod error;
pub mod forecast;
pub mod models;

pub use clock::{Clock, FixedClock, SystemClock};
pub use db::Database;
pub use error::{Error, Result};
pub use forecast::Forecaster;
pub use models::{
    AssetForecast, AssetRecord, Expense, NewAssetRecord, NewExpense, RecordType, Scope,
};
