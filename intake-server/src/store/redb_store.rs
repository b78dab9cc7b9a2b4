//! redb-backed document store
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `documents` | `"<collection>\x1f<id>"` | JSON document |
//!
//! The unit separator sorts below every printable character, so one collection
//! is a contiguous key range that never includes nested or sibling collections.
//!
//! Note: redb operations are synchronous; each call is its own write transaction.

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use super::{DocumentKey, DocumentStore, StoreResult};

/// Table for all documents: key = collection + separator + id, value = JSON bytes
const DOCUMENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");

const SEPARATOR: char = '\u{1f}';
/// First character after [`SEPARATOR`], exclusive upper bound of a collection range
const SEPARATOR_END: char = '\u{20}';

fn storage_key(key: &DocumentKey) -> String {
    format!("{}{SEPARATOR}{}", key.collection, key.id)
}

/// Document store backed by redb
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StoreResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DOCUMENTS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait]
impl DocumentStore for RedbStore {
    async fn get(&self, key: &DocumentKey) -> StoreResult<Option<Value>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS_TABLE)?;
        match table.get(storage_key(key).as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &DocumentKey, doc: Value) -> StoreResult<()> {
        let bytes = serde_json::to_vec(&doc)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(DOCUMENTS_TABLE)?;
            table.insert(storage_key(key).as_str(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    async fn create(&self, key: &DocumentKey, doc: Value) -> StoreResult<bool> {
        let bytes = serde_json::to_vec(&doc)?;
        let k = storage_key(key);
        let txn = self.db.begin_write()?;
        let inserted = {
            let mut table = txn.open_table(DOCUMENTS_TABLE)?;
            let exists = table.get(k.as_str())?.is_some();
            if !exists {
                table.insert(k.as_str(), bytes.as_slice())?;
            }
            !exists
        };
        if inserted {
            txn.commit()?;
        } else {
            txn.abort()?;
        }
        Ok(inserted)
    }

    async fn delete(&self, key: &DocumentKey) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(DOCUMENTS_TABLE)?;
            table.remove(storage_key(key).as_str())?;
        }
        txn.commit()?;
        Ok(())
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<(String, Value)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS_TABLE)?;

        let start = format!("{collection}{SEPARATOR}");
        let end = format!("{collection}{SEPARATOR_END}");
        let prefix_len = start.len();

        let mut docs = Vec::new();
        for result in table.range(start.as_str()..end.as_str())? {
            let (key, value) = result?;
            let id = key.value()[prefix_len..].to_string();
            docs.push((id, serde_json::from_slice(value.value())?));
        }
        Ok(docs)
    }

    fn backend_name(&self) -> &'static str {
        "redb"
    }
}
