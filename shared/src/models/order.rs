//! Order Model
//!
//! Canonical, aggregator-agnostic order as stored under
//! `restaurants/{restaurant_id}/orders/{id}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Order fulfilment type
///
/// Aggregators may send any string; unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderType {
    DineIn,
    Takeaway,
    #[default]
    Delivery,
    Other(String),
}

impl OrderType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::DineIn => "dine-in",
            Self::Takeaway => "takeaway",
            Self::Delivery => "delivery",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for OrderType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "dine-in" => Self::DineIn,
            "takeaway" => Self::Takeaway,
            "delivery" => Self::Delivery,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for OrderType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<OrderType> for String {
    fn from(value: OrderType) -> Self {
        match value {
            OrderType::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Modifier applied to an order item (extra cheese, no onion, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub group_name: String,
    pub name: String,
    /// May be negative or zero
    pub price_adjustment: f64,
}

/// Order line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Menu item reference, `"external"` when the aggregator sent none
    pub menu_item_id: String,
    pub name: String,
    pub quantity: f64,
    /// Price in currency unit
    pub unit_price: f64,
    pub notes: Option<String>,
    pub modifiers: Vec<Modifier>,
    pub is_combo: bool,
    /// Only set when `is_combo`
    pub combo_id: Option<String>,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub restaurant_id: String,
    /// Actor that created the order (`aggregator_webhook` for webhook intake)
    pub employee_id: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub order_number: String,
    pub payment_method: String,
    /// Lifecycle state, transitioned by order management downstream
    pub status: String,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub discount_amount: f64,
    /// `max(0, subtotal - discount_amount + tax_amount)`
    pub total: f64,
    pub discount_id: Option<Value>,
    pub discount_name: Option<Value>,
    pub fbr_invoice_number: Option<Value>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    /// Origin tag: `pos` or the aggregator name
    pub source: String,
    /// Raw aggregator payload kept for audit
    pub external_payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    /// RFC 3339, immutable
    pub created_at: String,
}
