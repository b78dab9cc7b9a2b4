//! Shared types for the order-intake platform
//!
//! Canonical order / kitchen ticket models and the unified error system used
//! by every HTTP surface.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
