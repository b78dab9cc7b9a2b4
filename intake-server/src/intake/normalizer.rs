//! Field Normalizer
//!
//! Maps loosely-typed aggregator item records onto canonical [`OrderItem`] and
//! [`Modifier`] values. Aggregators only differ in which field names they fill
//! in, so every field is optional and resolves through an alias list to a
//! fixed default. Nothing here can fail.
//!
//! | Field | Aliases | Default |
//! |-------|---------|---------|
//! | `menu_item_id` | `menu_item_id`, `sku`, `id` | `"external"` |
//! | `name` | `name`, `title` | `"Item"` |
//! | `quantity` | `quantity` | `1` |
//! | `unit_price` | `unit_price`, `price` | `0` |
//! | `notes` | `notes` (truthy) | null |
//! | `is_combo` | `is_combo` (truthiness) | `false` |
//! | `combo_id` | `combo_id` (truthy, only when `is_combo`) | null |
//! | modifier `group_name` | `group`, `group_name` | `"Modifier"` |
//! | modifier `name` | `name`, `title` | `""` |
//! | modifier `price_adjustment` | `price_adjustment`, `price` | `0` |

use serde_json::Value;
use shared::models::{Modifier, OrderItem};

const MENU_ITEM_ID: &[&str] = &["menu_item_id", "sku", "id"];
const ITEM_NAME: &[&str] = &["name", "title"];
const QUANTITY: &[&str] = &["quantity"];
const UNIT_PRICE: &[&str] = &["unit_price", "price"];

const MODIFIER_GROUP: &[&str] = &["group", "group_name"];
const MODIFIER_NAME: &[&str] = &["name", "title"];
const PRICE_ADJUSTMENT: &[&str] = &["price_adjustment", "price"];

pub const DEFAULT_MENU_ITEM_ID: &str = "external";
pub const DEFAULT_ITEM_NAME: &str = "Item";
pub const DEFAULT_QUANTITY: f64 = 1.0;
pub const DEFAULT_UNIT_PRICE: f64 = 0.0;
pub const DEFAULT_MODIFIER_GROUP: &str = "Modifier";

// ========== Default resolution ==========

/// First alias whose value exists and is not `null`
///
/// Non-object inputs have no fields.
pub fn first_present<'a>(obj: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    let map = obj.as_object()?;
    aliases
        .iter()
        .filter_map(|alias| map.get(*alias))
        .find(|v| !v.is_null())
}

/// Numeric coercion with a fallback
///
/// Numbers pass through unchanged (negative and fractional included). Strings
/// that trim to a finite number are parsed. Everything else takes `default`.
pub fn coerce_number(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(default)
}

/// String coercion with a fallback
///
/// Scalars use their display form, arrays and objects their compact JSON.
pub fn coerce_string(value: Option<&Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// False for missing, `null`, `false`, `0` and `""`
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// `Some` only for truthy values
pub fn coerce_optional_string(value: Option<&Value>) -> Option<String> {
    is_truthy(value).then(|| coerce_string(value, ""))
}

/// `Some` for any present, non-null value, empty strings included
pub fn coerce_nullable_string(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        v => Some(coerce_string(v, "")),
    }
}

// ========== Item mapping ==========

/// Normalize the `items` field of a payload
///
/// Anything but an array yields no items.
pub fn normalize_items(items: Option<&Value>) -> Vec<OrderItem> {
    match items {
        Some(Value::Array(entries)) => entries.iter().map(normalize_item).collect(),
        _ => Vec::new(),
    }
}

pub fn normalize_item(item: &Value) -> OrderItem {
    let is_combo = is_truthy(item.get("is_combo"));
    OrderItem {
        menu_item_id: coerce_string(first_present(item, MENU_ITEM_ID), DEFAULT_MENU_ITEM_ID),
        name: coerce_string(first_present(item, ITEM_NAME), DEFAULT_ITEM_NAME),
        quantity: coerce_number(first_present(item, QUANTITY), DEFAULT_QUANTITY),
        unit_price: coerce_number(first_present(item, UNIT_PRICE), DEFAULT_UNIT_PRICE),
        notes: coerce_optional_string(item.get("notes")),
        modifiers: normalize_modifiers(item.get("modifiers")),
        is_combo,
        combo_id: if is_combo {
            coerce_optional_string(item.get("combo_id"))
        } else {
            None
        },
    }
}

pub fn normalize_modifiers(modifiers: Option<&Value>) -> Vec<Modifier> {
    match modifiers {
        Some(Value::Array(entries)) => entries.iter().map(normalize_modifier).collect(),
        _ => Vec::new(),
    }
}

pub fn normalize_modifier(modifier: &Value) -> Modifier {
    Modifier {
        group_name: coerce_string(first_present(modifier, MODIFIER_GROUP), DEFAULT_MODIFIER_GROUP),
        name: coerce_string(first_present(modifier, MODIFIER_NAME), ""),
        price_adjustment: coerce_number(first_present(modifier, PRICE_ADJUSTMENT), 0.0),
    }
}
