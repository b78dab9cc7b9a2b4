//! Document store abstraction
//!
//! JSON documents addressed by `(collection, id)`, where a collection is a
//! slash-separated path such as `restaurants/R1/orders`. Every operation is
//! atomic on its own document; there is no multi-document transaction.

mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{Config, StoreBackend};

/// Address of a single document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub collection: String,
    pub id: String,
}

impl DocumentKey {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-document key/value store of JSON documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, key: &DocumentKey) -> StoreResult<Option<Value>>;

    /// Full-document replace
    async fn set(&self, key: &DocumentKey, doc: Value) -> StoreResult<()>;

    /// Insert only if absent. Returns `true` when this call inserted.
    async fn create(&self, key: &DocumentKey, doc: Value) -> StoreResult<bool>;

    /// Removing a missing document is not an error
    async fn delete(&self, key: &DocumentKey) -> StoreResult<()>;

    /// All documents of one collection as `(id, document)`, ordered by id
    async fn list(&self, collection: &str) -> StoreResult<Vec<(String, Value)>>;

    fn backend_name(&self) -> &'static str;
}

/// Open the store selected by configuration
pub fn open(config: &Config) -> StoreResult<Arc<dyn DocumentStore>> {
    match config.store_backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::Redb => {
            if let Some(parent) = config.store_path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Unavailable(format!("cannot create {}: {e}", parent.display()))
                })?;
            }
            Ok(Arc::new(RedbStore::open(&config.store_path)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Behaviour every backend must share
    pub(crate) async fn exercise_contract(store: &dyn DocumentStore) {
        let key = DocumentKey::new("restaurants/R1/orders", "o-1");
        assert_eq!(store.get(&key).await.unwrap(), None);

        store.set(&key, json!({"total": 10})).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(json!({"total": 10})));

        // set replaces, never merges
        store.set(&key, json!({"status": "pending"})).await.unwrap();
        assert_eq!(
            store.get(&key).await.unwrap(),
            Some(json!({"status": "pending"}))
        );

        // create is insert-if-absent
        assert!(!store.create(&key, json!({"other": true})).await.unwrap());
        assert_eq!(
            store.get(&key).await.unwrap(),
            Some(json!({"status": "pending"}))
        );
        let fresh = DocumentKey::new("restaurants/R1/orders", "o-0");
        assert!(store.create(&fresh, json!({"n": 0})).await.unwrap());

        // list is scoped to one collection and ordered by id
        let nested = DocumentKey::new("restaurants/R1/orders/o-1/notes", "n-1");
        store.set(&nested, json!({})).await.unwrap();
        let sibling = DocumentKey::new("restaurants/R10/orders", "o-9");
        store.set(&sibling, json!({})).await.unwrap();

        let listed = store.list("restaurants/R1/orders").await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["o-0", "o-1"]);

        store.delete(&key).await.unwrap();
        store.delete(&key).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), None);
        assert!(store.list("restaurants/R2/orders").await.unwrap().is_empty());
    }

    #[test]
    fn test_document_key_display() {
        let key = DocumentKey::new("restaurants/R1/kds_orders", "abc");
        assert_eq!(key.to_string(), "restaurants/R1/kds_orders/abc");
    }

    #[tokio::test]
    async fn test_open_memory_backend() {
        let store = open(&Config::for_tests()).unwrap();
        assert_eq!(store.backend_name(), "memory");
        exercise_contract(store.as_ref()).await;
    }

    #[tokio::test]
    async fn test_open_redb_backend_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::for_tests();
        config.store_backend = StoreBackend::Redb;
        config.store_path = dir.path().join("nested").join("intake.redb");

        let store = open(&config).unwrap();
        assert_eq!(store.backend_name(), "redb");
        assert!(config.store_path.exists());
    }
}
