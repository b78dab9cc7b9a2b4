//! Kitchen display ticket documents

use shared::models::KdsTicket;

use crate::store::{DocumentKey, DocumentStore, StoreResult};

pub fn collection(restaurant_id: &str) -> String {
    format!("restaurants/{restaurant_id}/kds_orders")
}

pub fn key(restaurant_id: &str, order_id: &str) -> DocumentKey {
    DocumentKey::new(collection(restaurant_id), order_id)
}

pub async fn put(store: &dyn DocumentStore, ticket: &KdsTicket) -> StoreResult<()> {
    store
        .set(
            &key(&ticket.restaurant_id, &ticket.order_id),
            serde_json::to_value(ticket)?,
        )
        .await
}

/// Write only when missing. Returns `true` when this call created it.
pub async fn insert_if_absent(store: &dyn DocumentStore, ticket: &KdsTicket) -> StoreResult<bool> {
    store
        .create(&key(&ticket.restaurant_id, &ticket.order_id), serde_json::to_value(ticket)?)
        .await
}

pub async fn find(
    store: &dyn DocumentStore,
    restaurant_id: &str,
    order_id: &str,
) -> StoreResult<Option<KdsTicket>> {
    match store.get(&key(restaurant_id, order_id)).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

pub async fn list(store: &dyn DocumentStore, restaurant_id: &str) -> StoreResult<Vec<KdsTicket>> {
    store
        .list(&collection(restaurant_id))
        .await?
        .into_iter()
        .map(|(_, doc)| serde_json::from_value(doc).map_err(Into::into))
        .collect()
}
