//! intake-server - aggregator webhook ingestion for the restaurant POS
//!
//! Turns loosely-shaped third-party delivery orders into canonical orders
//! and kitchen tickets.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod intake;
pub mod logger;
pub mod state;
pub mod store;

pub use config::Config;
pub use state::AppState;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
