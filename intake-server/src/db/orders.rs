//! Order ledger documents

use shared::models::Order;

use crate::store::{DocumentKey, DocumentStore, StoreResult};

pub fn collection(restaurant_id: &str) -> String {
    format!("restaurants/{restaurant_id}/orders")
}

pub fn key(restaurant_id: &str, order_id: &str) -> DocumentKey {
    DocumentKey::new(collection(restaurant_id), order_id)
}

/// Full-document write, replaying the same order is harmless
pub async fn put(store: &dyn DocumentStore, order: &Order) -> StoreResult<()> {
    store
        .set(&key(&order.restaurant_id, &order.id), serde_json::to_value(order)?)
        .await
}

/// Write only when missing. Returns `true` when this call created it.
pub async fn insert_if_absent(store: &dyn DocumentStore, order: &Order) -> StoreResult<bool> {
    store
        .create(&key(&order.restaurant_id, &order.id), serde_json::to_value(order)?)
        .await
}

pub async fn exists(
    store: &dyn DocumentStore,
    restaurant_id: &str,
    order_id: &str,
) -> StoreResult<bool> {
    Ok(store.get(&key(restaurant_id, order_id)).await?.is_some())
}

pub async fn find(
    store: &dyn DocumentStore,
    restaurant_id: &str,
    order_id: &str,
) -> StoreResult<Option<Order>> {
    match store.get(&key(restaurant_id, order_id)).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

pub async fn list(store: &dyn DocumentStore, restaurant_id: &str) -> StoreResult<Vec<Order>> {
    store
        .list(&collection(restaurant_id))
        .await?
        .into_iter()
        .map(|(_, doc)| serde_json::from_value(doc).map_err(Into::into))
        .collect()
}
