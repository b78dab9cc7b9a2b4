//! Ingestion outbox
//!
//! Written before the order/ticket pair and deleted once both landed. An
//! entry that outlives its request is replayed by the reconciler.

use serde::{Deserialize, Serialize};
use shared::models::{KdsTicket, Order};

use crate::store::{DocumentKey, DocumentStore, StoreResult};

pub const COLLECTION: &str = "ingest_outbox";

/// Pending order/ticket pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub order_id: String,
    pub restaurant_id: String,
    pub order: Order,
    pub ticket: KdsTicket,
    /// Idempotency key claimed for this delivery, if any
    #[serde(default)]
    pub idempotency_key: Option<String>,
    /// Unix millis
    pub created_at: i64,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub last_error: Option<String>,
}

impl OutboxEntry {
    pub fn new(order: Order, ticket: KdsTicket, created_at: i64) -> Self {
        Self {
            order_id: order.id.clone(),
            restaurant_id: order.restaurant_id.clone(),
            idempotency_key: order.idempotency_key.clone(),
            order,
            ticket,
            created_at,
            attempts: 0,
            last_error: None,
        }
    }
}

pub fn key(order_id: &str) -> DocumentKey {
    DocumentKey::new(COLLECTION, order_id)
}

pub async fn put(store: &dyn DocumentStore, entry: &OutboxEntry) -> StoreResult<()> {
    store
        .set(&key(&entry.order_id), serde_json::to_value(entry)?)
        .await
}

pub async fn remove(store: &dyn DocumentStore, order_id: &str) -> StoreResult<()> {
    store.delete(&key(order_id)).await
}

/// Result of reading the outbox collection
#[derive(Debug, Default)]
pub struct OutboxScan {
    /// Decodable entries, ordered by order id
    pub entries: Vec<OutboxEntry>,
    /// `(id, error)` for documents that no longer decode as an entry
    pub malformed: Vec<(String, String)>,
}

/// Read every entry. A document that fails to decode is reported, not fatal.
pub async fn scan(store: &dyn DocumentStore) -> StoreResult<OutboxScan> {
    let mut scan = OutboxScan::default();
    for (id, doc) in store.list(COLLECTION).await? {
        match serde_json::from_value(doc) {
            Ok(entry) => scan.entries.push(entry),
            Err(e) => scan.malformed.push((id, e.to_string())),
        }
    }
    Ok(scan)
}

/// Decodable pending entries, ordered by order id
pub async fn pending(store: &dyn DocumentStore) -> StoreResult<Vec<OutboxEntry>> {
    Ok(scan(store).await?.entries)
}

pub async fn exists(store: &dyn DocumentStore, order_id: &str) -> StoreResult<bool> {
    Ok(store.get(&key(order_id)).await?.is_some())
}

/// Record a failed replay on the entry
pub async fn mark_failed(
    store: &dyn DocumentStore,
    entry: &OutboxEntry,
    error: &str,
) -> StoreResult<()> {
    let mut updated = entry.clone();
    updated.attempts += 1;
    updated.last_error = Some(error.to_string());
    put(store, &updated).await
}
