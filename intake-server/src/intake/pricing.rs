//! Pricing Calculator
//!
//! `subtotal = Σ unit_price × quantity`, `total = max(0, subtotal - discount + tax)`.
//!
//! Tax and discount are taken as the aggregator reports them. The restaurant's
//! configured tax rate, which POS-created orders use, is never applied here.
//!
//! Arithmetic runs on `Decimal` without rounding to currency precision, so the
//! stored subtotal is the exact sum of the reported line figures. Operations
//! saturate instead of overflowing on absurd aggregator input.

use rust_decimal::prelude::*;
use shared::models::OrderItem;

/// Monetary figures of one order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub discount_amount: f64,
    pub total: f64,
}

/// Convert f64 to Decimal for calculation
///
/// Finite values beyond Decimal's range saturate to `Decimal::MAX`/`MIN` by
/// sign. NaN and infinities never reach here from the normalizer; they map to zero.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    if let Some(d) = Decimal::from_f64(value) {
        return d;
    }
    if value.is_finite() {
        tracing::warn!(value = ?value, "Monetary figure beyond Decimal range, saturating");
        return if value.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        };
    }
    tracing::error!(value = ?value, "Unrepresentable f64 in monetary calculation, defaulting to zero");
    Decimal::ZERO
}

/// Convert Decimal back to f64 for storage
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value.normalize().to_f64().unwrap_or_default()
}

pub fn line_total(item: &OrderItem) -> Decimal {
    to_decimal(item.unit_price).saturating_mul(to_decimal(item.quantity))
}

pub fn subtotal(items: &[OrderItem]) -> Decimal {
    items
        .iter()
        .map(line_total)
        .fold(Decimal::ZERO, |acc, line| acc.saturating_add(line))
}

/// Combine normalized items with the aggregator's tax and discount figures
pub fn calculate(items: &[OrderItem], tax_amount: f64, discount_amount: f64) -> Totals {
    let subtotal = subtotal(items);
    let tax = to_decimal(tax_amount);
    let discount = to_decimal(discount_amount);
    let total = subtotal
        .saturating_sub(discount)
        .saturating_add(tax)
        .max(Decimal::ZERO);

    Totals {
        subtotal: to_f64(subtotal),
        tax_amount: to_f64(tax),
        discount_amount: to_f64(discount),
        total: to_f64(total),
    }
}
