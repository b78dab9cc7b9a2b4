//! Top-level webhook field resolution
//!
//! Same policy as the item normalizer: each field has an alias list and a
//! default, and resolution never fails. Items are normalized separately.

use serde_json::Value;
use shared::models::OrderType;

use super::normalizer::{
    coerce_nullable_string, coerce_number, coerce_optional_string, coerce_string, first_present,
    is_truthy,
};

pub const DEFAULT_SOURCE: &str = "aggregator";
pub const DEFAULT_ORDER_TYPE: &str = "delivery";
pub const DEFAULT_PAYMENT_METHOD: &str = "cash";
pub const DEFAULT_STATUS: &str = "pending";
pub const DEFAULT_PRIORITY: &str = "normal";
pub const DEFAULT_PREP_MINUTES: f64 = 15.0;

const RESTAURANT_ID: &[&str] = &["restaurantId", "restaurant_id"];
const ORDER_TYPE: &[&str] = &["orderType", "order_type"];
const ORDER_NUMBER: &[&str] = &["orderNumber", "order_number"];
const TAX_AMOUNT: &[&str] = &["tax_amount", "taxAmount"];
const DISCOUNT_AMOUNT: &[&str] = &["discount_amount", "discountAmount"];
const PAYMENT_METHOD: &[&str] = &["payment_method", "paymentMethod"];
const CUSTOMER_NAME: &[&str] = &["customer_name", "customerName"];
const CUSTOMER_PHONE: &[&str] = &["customer_phone", "customerPhone"];
const TABLE_NUMBER: &[&str] = &["table_number", "tableNumber"];
const SPECIAL_INSTRUCTIONS: &[&str] = &["special_instructions", "specialInstructions"];
const IS_ON_HOLD: &[&str] = &["is_on_hold", "isOnHold"];
const PREP_MINUTES: &[&str] = &["estimated_prep_minutes", "estimatedPrepMinutes"];
const EXTERNAL_ORDER_ID: &[&str] = &[
    "external_order_id",
    "externalOrderId",
    "aggregator_order_id",
    "aggregatorOrderId",
];

/// Resolved top-level webhook fields
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookPayload {
    /// Lowercased origin tag
    pub source: String,
    /// `None` when absent or empty
    pub restaurant_id: Option<String>,
    pub order_type: OrderType,
    /// `None` means derive from the generated order id
    pub order_number: Option<String>,
    pub tax_amount: f64,
    pub discount_amount: f64,
    pub payment_method: String,
    pub status: String,
    pub discount_id: Option<Value>,
    pub discount_name: Option<Value>,
    pub fbr_invoice_number: Option<Value>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub table_number: Option<String>,
    pub special_instructions: Option<String>,
    pub priority: String,
    pub is_on_hold: bool,
    pub estimated_prep_minutes: f64,
    pub external_payload: Option<Value>,
    /// Aggregator-side order id, the deduplication handle
    pub external_order_id: Option<String>,
}

fn verbatim(body: &Value, field: &str) -> Option<Value> {
    body.get(field).filter(|v| !v.is_null()).cloned()
}

impl WebhookPayload {
    /// Resolve every top-level field of `body`
    ///
    /// `source_header` is the fallback origin tag when the body has none.
    pub fn resolve(body: &Value, source_header: Option<&str>) -> Self {
        let source = match body.get("source").filter(|v| !v.is_null()) {
            Some(v) => coerce_string(Some(v), DEFAULT_SOURCE),
            None => source_header
                .filter(|h| !h.is_empty())
                .unwrap_or(DEFAULT_SOURCE)
                .to_string(),
        }
        .to_lowercase();

        let restaurant_id = Some(coerce_string(first_present(body, RESTAURANT_ID), ""))
            .filter(|id| !id.is_empty());

        Self {
            source,
            restaurant_id,
            order_type: OrderType::from(coerce_string(
                first_present(body, ORDER_TYPE),
                DEFAULT_ORDER_TYPE,
            )),
            order_number: coerce_nullable_string(first_present(body, ORDER_NUMBER)),
            tax_amount: coerce_number(first_present(body, TAX_AMOUNT), 0.0),
            discount_amount: coerce_number(first_present(body, DISCOUNT_AMOUNT), 0.0),
            payment_method: coerce_string(first_present(body, PAYMENT_METHOD), DEFAULT_PAYMENT_METHOD),
            status: coerce_string(body.get("status"), DEFAULT_STATUS),
            discount_id: verbatim(body, "discount_id"),
            discount_name: verbatim(body, "discount_name"),
            fbr_invoice_number: verbatim(body, "fbr_invoice_number"),
            customer_name: coerce_nullable_string(first_present(body, CUSTOMER_NAME)),
            customer_phone: coerce_nullable_string(first_present(body, CUSTOMER_PHONE)),
            table_number: coerce_nullable_string(first_present(body, TABLE_NUMBER)),
            special_instructions: coerce_nullable_string(first_present(body, SPECIAL_INSTRUCTIONS)),
            priority: coerce_string(body.get("priority"), DEFAULT_PRIORITY),
            is_on_hold: is_truthy(first_present(body, IS_ON_HOLD)),
            estimated_prep_minutes: coerce_number(
                first_present(body, PREP_MINUTES),
                DEFAULT_PREP_MINUTES,
            ),
            external_payload: verbatim(body, "external_payload"),
            external_order_id: coerce_optional_string(first_present(body, EXTERNAL_ORDER_ID)),
        }
    }

    /// `source:external_order_id`, when the aggregator sent an order id
    pub fn idempotency_key(&self) -> Option<String> {
        self.external_order_id
            .as_ref()
            .map(|ext| format!("{}:{}", self.source, ext))
    }

    /// Explicit order number, or the first 8 characters of the order id uppercased
    pub fn order_number_for(&self, order_id: &str) -> String {
        self.order_number
            .clone()
            .unwrap_or_else(|| order_id.chars().take(8).collect::<String>().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_on_empty_body() {
        let p = WebhookPayload::resolve(&json!({}), None);
        assert_eq!(p.source, "aggregator");
        assert_eq!(p.restaurant_id, None);
        assert_eq!(p.order_type, OrderType::Delivery);
        assert_eq!(p.order_number, None);
        assert_eq!(p.tax_amount, 0.0);
        assert_eq!(p.discount_amount, 0.0);
        assert_eq!(p.payment_method, "cash");
        assert_eq!(p.status, "pending");
        assert_eq!(p.priority, "normal");
        assert!(!p.is_on_hold);
        assert_eq!(p.estimated_prep_minutes, 15.0);
        assert_eq!(p.customer_name, None);
        assert_eq!(p.external_payload, None);
        assert_eq!(p.idempotency_key(), None);
    }

    #[test]
    fn test_camel_and_snake_aliases() {
        let camel = WebhookPayload::resolve(
            &json!({
                "restaurantId": "R1", "orderType": "takeaway", "orderNumber": "A-17",
                "taxAmount": 5, "discountAmount": "2.5", "paymentMethod": "card",
                "customerName": "Ana", "customerPhone": "555", "tableNumber": 4,
                "specialInstructions": "ring bell", "isOnHold": true,
                "estimatedPrepMinutes": 25
            }),
            None,
        );
        let snake = WebhookPayload::resolve(
            &json!({
                "restaurant_id": "R1", "order_type": "takeaway", "order_number": "A-17",
                "tax_amount": 5, "discount_amount": 2.5, "payment_method": "card",
                "customer_name": "Ana", "customer_phone": "555", "table_number": "4",
                "special_instructions": "ring bell", "is_on_hold": 1,
                "estimated_prep_minutes": "25"
            }),
            None,
        );
        assert_eq!(camel, snake);
        assert_eq!(camel.restaurant_id.as_deref(), Some("R1"));
        assert_eq!(camel.order_type, OrderType::Takeaway);
        assert_eq!(camel.discount_amount, 2.5);
        assert_eq!(camel.table_number.as_deref(), Some("4"));
        assert!(camel.is_on_hold);
    }

    #[test]
    fn test_restaurant_id_empty_or_null_is_missing() {
        assert_eq!(
            WebhookPayload::resolve(&json!({"restaurantId": ""}), None).restaurant_id,
            None
        );
        assert_eq!(
            WebhookPayload::resolve(&json!({"restaurantId": null}), None).restaurant_id,
            None
        );
        // snake_case fallback when the camelCase alias is null
        assert_eq!(
            WebhookPayload::resolve(&json!({"restaurantId": null, "restaurant_id": "R2"}), None)
                .restaurant_id
                .as_deref(),
            Some("R2")
        );
        assert_eq!(
            WebhookPayload::resolve(&json!({"restaurant_id": 42}), None)
                .restaurant_id
                .as_deref(),
            Some("42")
        );
    }

    #[test]
    fn test_source_precedence_and_lowercase() {
        let p = WebhookPayload::resolve(&json!({"source": "UberEats"}), Some("glovo"));
        assert_eq!(p.source, "ubereats");
        let p = WebhookPayload::resolve(&json!({}), Some("Glovo"));
        assert_eq!(p.source, "glovo");
        let p = WebhookPayload::resolve(&json!({}), Some(""));
        assert_eq!(p.source, "aggregator");
    }

    #[test]
    fn test_non_numeric_money_fields_resolve_to_zero() {
        let p = WebhookPayload::resolve(
            &json!({"tax_amount": "n/a", "discount_amount": {"value": 3}}),
            None,
        );
        assert_eq!(p.tax_amount, 0.0);
        assert_eq!(p.discount_amount, 0.0);
    }

    #[test]
    fn test_unknown_order_type_kept_verbatim() {
        let p = WebhookPayload::resolve(&json!({"order_type": "curbside"}), None);
        assert_eq!(p.order_type, OrderType::Other("curbside".to_string()));
    }

    #[test]
    fn test_verbatim_audit_fields() {
        let p = WebhookPayload::resolve(
            &json!({
                "discount_id": 9, "discount_name": "HAPPY",
                "fbr_invoice_number": null,
                "external_payload": {"raw": [1, 2, 3]}
            }),
            None,
        );
        assert_eq!(p.discount_id, Some(json!(9)));
        assert_eq!(p.discount_name, Some(json!("HAPPY")));
        assert_eq!(p.fbr_invoice_number, None);
        assert_eq!(p.external_payload, Some(json!({"raw": [1, 2, 3]})));
    }

    #[test]
    fn test_idempotency_key_from_any_external_alias() {
        for alias in [
            "external_order_id",
            "externalOrderId",
            "aggregator_order_id",
            "aggregatorOrderId",
        ] {
            let p = WebhookPayload::resolve(&json!({"source": "Glovo", alias: "G-1"}), None);
            assert_eq!(p.idempotency_key().as_deref(), Some("glovo:G-1"), "{alias}");
        }
        let p = WebhookPayload::resolve(&json!({"external_order_id": ""}), None);
        assert_eq!(p.idempotency_key(), None);
    }

    #[test]
    fn test_order_number_fallback() {
        let p = WebhookPayload::resolve(&json!({}), None);
        assert_eq!(
            p.order_number_for("3f2a9c1e-aaaa-bbbb-cccc-000000000000"),
            "3F2A9C1E"
        );
        let p = WebhookPayload::resolve(&json!({"order_number": 1001}), None);
        assert_eq!(p.order_number_for("3f2a9c1e"), "1001");
    }
}
