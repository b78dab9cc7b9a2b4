//! Reconciler - replays outbox entries left behind by failed dual writes
//!
//! An entry older than the configured minimum age belongs to a request that
//! is no longer in flight. Replay only creates documents that are missing, so
//! an order already touched by downstream order management is never reset.

use serde::Serialize;
use shared::util::now_millis;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::db::outbox::{self, OutboxEntry};
use crate::db::{kds_tickets, orders};
use crate::store::{DocumentStore, StoreResult};

/// Outcome of one reconcile pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub replayed: usize,
    pub failed: usize,
    /// Too young, possibly still being written by its request
    pub skipped: usize,
}

#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn DocumentStore>,
    interval: Duration,
    min_age: Duration,
}

impl Reconciler {
    pub fn new(store: Arc<dyn DocumentStore>, interval: Duration, min_age: Duration) -> Self {
        Self {
            store,
            interval,
            min_age,
        }
    }

    /// Periodic loop until `shutdown` fires
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            min_age_secs = self.min_age.as_secs(),
            "Reconciler started"
        );

        let mut scan_interval = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Reconciler shutting down");
                    break;
                }
                _ = scan_interval.tick() => {
                    match self.run_once().await {
                        Ok(report) if report.replayed + report.failed > 0 => {
                            tracing::info!(?report, "Reconcile pass finished");
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!(error = %e, "Failed to read ingest outbox"),
                    }
                }
            }
        }
    }

    /// One pass over the outbox
    pub async fn run_once(&self) -> StoreResult<ReconcileReport> {
        let store = self.store.as_ref();
        let scan = outbox::scan(store).await?;
        let mut report = ReconcileReport::default();

        for (id, error) in &scan.malformed {
            report.failed += 1;
            tracing::error!(outbox_id = %id, error = %error, "Undecodable outbox entry, left for manual repair");
        }
        if scan.entries.is_empty() {
            return Ok(report);
        }

        let now = now_millis();
        let min_age_ms = i64::try_from(self.min_age.as_millis()).unwrap_or(i64::MAX);

        for entry in scan.entries {
            if now.saturating_sub(entry.created_at) < min_age_ms {
                report.skipped += 1;
                continue;
            }

            match self.replay(&entry).await {
                Ok(()) => {
                    report.replayed += 1;
                    tracing::info!(
                        order_id = %entry.order_id,
                        restaurant_id = %entry.restaurant_id,
                        attempts = entry.attempts,
                        "Outbox entry replayed"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        order_id = %entry.order_id,
                        attempts = entry.attempts + 1,
                        error = %e,
                        "Outbox replay failed"
                    );
                    if let Err(mark_err) = outbox::mark_failed(store, &entry, &e.to_string()).await {
                        tracing::error!(order_id = %entry.order_id, error = %mark_err, "Failed to record replay failure");
                    }
                }
            }
        }

        Ok(report)
    }

    async fn replay(&self, entry: &OutboxEntry) -> StoreResult<()> {
        let store = self.store.as_ref();
        let (order_res, ticket_res) = tokio::join!(
            orders::insert_if_absent(store, &entry.order),
            kds_tickets::insert_if_absent(store, &entry.ticket)
        );
        let created_order = order_res?;
        let created_ticket = ticket_res?;
        tracing::debug!(
            order_id = %entry.order_id,
            created_order,
            created_ticket,
            "Replayed order/ticket pair"
        );
        outbox::remove(store, &entry.order_id).await
    }
}
