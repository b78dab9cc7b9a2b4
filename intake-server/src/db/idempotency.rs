//! Aggregator delivery deduplication keys
//!
//! One document per `source:external_order_id`, claimed with an atomic
//! create-if-absent before anything else is written.

use serde::{Deserialize, Serialize};

use crate::store::{DocumentKey, DocumentStore, StoreError, StoreResult};

/// Claimed idempotency key, pointing at the order it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub order_id: String,
    pub source: String,
    pub external_order_id: String,
    pub created_at: String,
    /// Unix millis of the claim. Records without it count as old.
    #[serde(default)]
    pub claimed_at: i64,
}

/// Result of trying to claim a key
#[derive(Debug, Clone, PartialEq)]
pub enum Claim {
    /// This delivery owns the key
    Claimed,
    /// An earlier delivery already owns it
    Existing(IdempotencyRecord),
}

pub fn collection(restaurant_id: &str) -> String {
    format!("restaurants/{restaurant_id}/idempotency_keys")
}

pub fn key(restaurant_id: &str, idempotency_key: &str) -> DocumentKey {
    DocumentKey::new(collection(restaurant_id), idempotency_key)
}

/// Attempts before giving up on a key that keeps changing hands
const CLAIM_ATTEMPTS: usize = 3;

pub async fn claim(
    store: &dyn DocumentStore,
    restaurant_id: &str,
    idempotency_key: &str,
    record: &IdempotencyRecord,
) -> StoreResult<Claim> {
    let doc_key = key(restaurant_id, idempotency_key);
    for _ in 0..CLAIM_ATTEMPTS {
        if store.create(&doc_key, serde_json::to_value(record)?).await? {
            return Ok(Claim::Claimed);
        }
        // Released between our create and get: the owner failed, try again
        if let Some(doc) = store.get(&doc_key).await? {
            return Ok(Claim::Existing(serde_json::from_value(doc)?));
        }
    }
    Err(StoreError::Unavailable(format!(
        "idempotency key {doc_key} kept changing hands"
    )))
}

/// Give the key back so the aggregator's retry can proceed
pub async fn release(
    store: &dyn DocumentStore,
    restaurant_id: &str,
    idempotency_key: &str,
) -> StoreResult<()> {
    store.delete(&key(restaurant_id, idempotency_key)).await
}
