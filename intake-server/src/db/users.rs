//! User profiles, read by the access gate

use shared::models::UserProfile;

use crate::store::{DocumentKey, DocumentStore, StoreResult};

pub const COLLECTION: &str = "users";

pub fn key(uid: &str) -> DocumentKey {
    DocumentKey::new(COLLECTION, uid)
}

pub async fn find(store: &dyn DocumentStore, uid: &str) -> StoreResult<Option<UserProfile>> {
    match store.get(&key(uid)).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

pub async fn upsert(store: &dyn DocumentStore, uid: &str, profile: &UserProfile) -> StoreResult<()> {
    store.set(&key(uid), serde_json::to_value(profile)?).await
}
