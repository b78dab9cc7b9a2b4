//! Kitchen display ticket model
//!
//! Stored under `restaurants/{restaurant_id}/kds_orders/{order_id}`, sharing
//! its id with the order it was projected from. Carries no pricing.

use super::order::OrderType;
use serde::{Deserialize, Serialize};

/// Per-item preparation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KdsItemStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Served,
}

/// Kitchen-facing projection of an order item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KdsItem {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: f64,
    /// Modifier names only
    pub modifiers: Vec<String>,
    pub notes: Option<String>,
    /// Assigned by kitchen routing
    pub station: Option<String>,
    #[serde(default)]
    pub status: KdsItemStatus,
    pub status_updated_at: Option<String>,
}

/// Kitchen display ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KdsTicket {
    pub order_id: String,
    pub restaurant_id: String,
    pub order_number: String,
    pub order_type: OrderType,
    pub items: Vec<KdsItem>,
    pub customer_name: Option<String>,
    pub table_number: Option<String>,
    pub special_instructions: Option<String>,
    pub priority: String,
    pub is_on_hold: bool,
    pub estimated_prep_minutes: f64,
    pub created_at: String,
    /// Null until fulfilment completes
    pub completed_at: Option<String>,
}
