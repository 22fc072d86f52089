//! HTTP request handlers organized by domain

pub mod asset_records;
pub mod expenses;
pub mod health;

// Re-export all handlers for use in router
pub use asset_records::*;
pub use expenses::*;
pub use health::*;
