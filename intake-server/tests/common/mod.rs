//! Shared harness for router-level tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tower::ServiceExt;

use intake_server::api::create_router;
use intake_server::db::{restaurants, users};
use intake_server::store::{DocumentKey, DocumentStore, MemoryStore, StoreError, StoreResult};
use intake_server::{AppState, Config};
use shared::models::{Restaurant, Role, UserProfile};

/// Memory store that fails writes to chosen collections
#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    failing: RwLock<Vec<String>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `set`/`create` on every collection ending with `suffix`
    pub fn fail_writes_to(&self, suffix: &str) {
        self.failing.write().unwrap().push(suffix.to_string());
    }

    pub fn heal(&self) {
        self.failing.write().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    fn check(&self, key: &DocumentKey) -> StoreResult<()> {
        let failing = self.failing.read().unwrap();
        if failing.iter().any(|s| key.collection.ends_with(s.as_str())) {
            return Err(StoreError::Unavailable(format!("injected failure writing {key}")));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn get(&self, key: &DocumentKey) -> StoreResult<Option<Value>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &DocumentKey, doc: Value) -> StoreResult<()> {
        self.check(key)?;
        self.inner.set(key, doc).await
    }

    async fn create(&self, key: &DocumentKey, doc: Value) -> StoreResult<bool> {
        self.check(key)?;
        self.inner.create(key, doc).await
    }

    async fn delete(&self, key: &DocumentKey) -> StoreResult<()> {
        self.inner.delete(key).await
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<(String, Value)>> {
        self.inner.list(collection).await
    }

    fn backend_name(&self) -> &'static str {
        "faulty-memory"
    }
}

pub struct TestApp {
    pub store: Arc<FaultyStore>,
    pub state: AppState,
}

impl TestApp {
    /// App over a fresh store with restaurant `R1` seeded
    pub async fn new() -> Self {
        Self::with_config(Config::for_tests()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let store = Arc::new(FaultyStore::new());
        restaurants::upsert(store.as_ref(), "R1", &Restaurant::default())
            .await
            .unwrap();
        let state = AppState::with_store(config, store.clone());
        Self { store, state }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    pub async fn add_user(&self, uid: &str, role: Role, restaurant_id: Option<&str>) {
        let profile = UserProfile {
            email: Some(format!("{uid}@example.com")),
            name: None,
            restaurant_id: restaurant_id.map(str::to_string),
            role_name: role,
        };
        users::upsert(self.store.as_ref(), uid, &profile).await.unwrap();
    }

    pub fn token(&self, uid: &str) -> String {
        intake_server::auth::create_token(uid, &self.state.config.jwt_secret).unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(req).await;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn send_raw(&self, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    pub async fn post_webhook(&self, body: &Value) -> (StatusCode, Value) {
        self.send(webhook_request(body.to_string(), &[])).await
    }
}

pub fn webhook_request(body: impl Into<Body>, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhooks/aggregator")
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(body.into()).unwrap()
}

pub fn get_with_token(uri: &str, token: Option<&str>) -> Request<Body> {
    authed("GET", uri, token)
}

pub fn authed(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}
