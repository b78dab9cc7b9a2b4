//! Ticket Projector
//!
//! Derives the kitchen ticket from a freshly built order. Pricing is dropped
//! and modifiers collapse to their names. The projection happens once at
//! creation; later order edits are not mirrored.

use shared::models::{KdsItem, KdsItemStatus, KdsTicket, Order, OrderItem};

use super::payload::WebhookPayload;

pub fn project_item(item: &OrderItem) -> KdsItem {
    KdsItem {
        menu_item_id: item.menu_item_id.clone(),
        name: item.name.clone(),
        quantity: item.quantity,
        modifiers: item
            .modifiers
            .iter()
            .filter(|m| !m.name.is_empty())
            .map(|m| m.name.clone())
            .collect(),
        notes: item.notes.clone(),
        station: None,
        status: KdsItemStatus::Pending,
        status_updated_at: None,
    }
}

pub fn project_items(items: &[OrderItem]) -> Vec<KdsItem> {
    items.iter().map(project_item).collect()
}

/// Build the ticket for `order`, taking kitchen-only fields from the payload
pub fn project_ticket(order: &Order, payload: &WebhookPayload) -> KdsTicket {
    KdsTicket {
        order_id: order.id.clone(),
        restaurant_id: order.restaurant_id.clone(),
        order_number: order.order_number.clone(),
        order_type: order.order_type.clone(),
        items: project_items(&order.items),
        customer_name: order.customer_name.clone(),
        table_number: payload.table_number.clone(),
        special_instructions: payload.special_instructions.clone(),
        priority: payload.priority.clone(),
        is_on_hold: payload.is_on_hold,
        estimated_prep_minutes: payload.estimated_prep_minutes,
        created_at: order.created_at.clone(),
        completed_at: None,
    }
}
