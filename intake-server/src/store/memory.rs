//! In-memory document store (tests and `STORE_BACKEND=memory`)

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use super::{DocumentKey, DocumentStore, StoreResult};

/// Collections keyed by path, documents ordered by id
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents across every collection
    pub fn len(&self) -> usize {
        self.collections.iter().map(|c| c.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, key: &DocumentKey) -> StoreResult<Option<Value>> {
        Ok(self
            .collections
            .get(&key.collection)
            .and_then(|c| c.get(&key.id).cloned()))
    }

    async fn set(&self, key: &DocumentKey, doc: Value) -> StoreResult<()> {
        self.collections
            .entry(key.collection.clone())
            .or_default()
            .insert(key.id.clone(), doc);
        Ok(())
    }

    async fn create(&self, key: &DocumentKey, doc: Value) -> StoreResult<bool> {
        // The shard lock is held for the whole check-and-insert
        let mut collection = self.collections.entry(key.collection.clone()).or_default();
        match collection.entry(key.id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(doc);
                Ok(true)
            }
            Entry::Occupied(_) => Ok(false),
        }
    }

    async fn delete(&self, key: &DocumentKey) -> StoreResult<()> {
        if let Some(mut collection) = self.collections.get_mut(&key.collection) {
            collection.remove(&key.id);
        }
        Ok(())
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<(String, Value)>> {
        Ok(self
            .collections
            .get(collection)
            .map(|c| c.iter().map(|(id, doc)| (id.clone(), doc.clone())).collect())
            .unwrap_or_default())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
