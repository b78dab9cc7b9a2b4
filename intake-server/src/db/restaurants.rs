//! Restaurant catalog lookups

use shared::models::Restaurant;

use crate::store::{DocumentKey, DocumentStore, StoreResult};

pub const COLLECTION: &str = "restaurants";

pub fn key(restaurant_id: &str) -> DocumentKey {
    DocumentKey::new(COLLECTION, restaurant_id)
}

pub async fn find(store: &dyn DocumentStore, restaurant_id: &str) -> StoreResult<Option<Restaurant>> {
    match store.get(&key(restaurant_id)).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

/// Existence check only, the document shape is not validated
pub async fn exists(store: &dyn DocumentStore, restaurant_id: &str) -> StoreResult<bool> {
    Ok(store.get(&key(restaurant_id)).await?.is_some())
}

pub async fn upsert(
    store: &dyn DocumentStore,
    restaurant_id: &str,
    restaurant: &Restaurant,
) -> StoreResult<()> {
    store
        .set(&key(restaurant_id), serde_json::to_value(restaurant)?)
        .await
}
