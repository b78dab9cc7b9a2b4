//! Restaurant Model

use serde::{Deserialize, Serialize};

/// Restaurant catalog entry (`restaurants/{id}`)
///
/// Only read by the intake path to check that a referenced restaurant exists.
/// Catalog administration lives elsewhere, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(default)]
    pub name: Option<String>,
    /// Configured tax rate for POS-created orders. Aggregator orders ignore it.
    #[serde(default)]
    pub tax_rate: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}
