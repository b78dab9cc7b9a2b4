//! Application state shared by every handler

use std::sync::Arc;

use crate::auth::{AccessGate, StoreAccessGate};
use crate::config::Config;
use crate::intake::reconciler::Reconciler;
use crate::intake::service::IngestionService;
use crate::store::{self, DocumentStore, StoreResult};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DocumentStore>,
    /// Caller → role resolution for privileged routes
    pub access_gate: Arc<dyn AccessGate>,
    pub ingestion: IngestionService,
    pub reconciler: Reconciler,
}

impl AppState {
    /// Open the configured store and wire services over it
    pub fn new(config: Config) -> StoreResult<Self> {
        let store = store::open(&config)?;
        Ok(Self::with_store(config, store))
    }

    /// Wire services over an existing store
    pub fn with_store(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        let access_gate: Arc<dyn AccessGate> = Arc::new(StoreAccessGate::new(store.clone()));
        Self::with_parts(config, store, access_gate)
    }

    pub fn with_parts(
        config: Config,
        store: Arc<dyn DocumentStore>,
        access_gate: Arc<dyn AccessGate>,
    ) -> Self {
        let reconciler = Reconciler::new(
            store.clone(),
            config.reconcile_interval,
            config.reconcile_min_age,
        );
        Self {
            ingestion: IngestionService::new(store.clone()),
            reconciler,
            access_gate,
            store,
            config: Arc::new(config),
        }
    }
}
