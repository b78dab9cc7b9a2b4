//! Ingestion Handler
//!
//! `Authenticating → Validating → Normalizing → Pricing → Persisting → Responding`.
//! Authentication and method checks happen in the HTTP layer; this service
//! runs the remaining phases over an already-parsed body.
//!
//! Persisting writes an outbox entry first, then the order and the ticket
//! concurrently. If either write fails the entry stays behind and the
//! [`Reconciler`](super::reconciler::Reconciler) completes the pair later.

use serde::Serialize;
use serde_json::Value;
use shared::error::AppError;
use shared::models::{KdsTicket, Order};
use shared::util::{now_millis, now_rfc3339};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::payload::WebhookPayload;
use super::{kds, normalizer, pricing};
use crate::db::idempotency::{self, Claim, IdempotencyRecord};
use crate::db::outbox::{self, OutboxEntry};
use crate::db::{kds_tickets, orders, restaurants};
use crate::error::ServiceResult;
use crate::store::{DocumentStore, StoreResult};

/// Actor recorded on orders created by the webhook
pub const WEBHOOK_EMPLOYEE_ID: &str = "aggregator_webhook";

/// Phases of one ingestion request, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPhase {
    Authenticating,
    Validating,
    Normalizing,
    Pricing,
    Persisting,
    Responding,
}

impl IngestPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authenticating => "authenticating",
            Self::Validating => "validating",
            Self::Normalizing => "normalizing",
            Self::Pricing => "pricing",
            Self::Persisting => "persisting",
            Self::Responding => "responding",
        }
    }
}

/// Successful ingestion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestOutcome {
    pub order_id: String,
    /// The delivery repeated an earlier one and nothing was written
    pub duplicate: bool,
}

/// A claim this old whose order never reached the store or the outbox
/// belongs to a delivery that died between claiming and writing
pub const DEFAULT_STALE_CLAIM_AFTER: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct IngestionService {
    store: Arc<dyn DocumentStore>,
    stale_claim_after: Duration,
}

impl IngestionService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            stale_claim_after: DEFAULT_STALE_CLAIM_AFTER,
        }
    }

    pub fn with_stale_claim_after(mut self, after: Duration) -> Self {
        self.stale_claim_after = after;
        self
    }

    pub async fn ingest(&self, body: &Value, source_header: Option<&str>) -> ServiceResult<IngestOutcome> {
        let store = self.store.as_ref();

        enter(IngestPhase::Validating);
        let payload = WebhookPayload::resolve(body, source_header);
        let restaurant_id = payload.restaurant_id.clone().ok_or_else(|| {
            AppError::required_field("restaurantId", "restaurantId is required in payload.")
        })?;
        if !restaurants::exists(store, &restaurant_id).await? {
            return Err(AppError::restaurant_not_found(&restaurant_id).into());
        }

        let order_id = Uuid::new_v4().to_string();
        let created_at = now_rfc3339();

        let idempotency_key = payload.idempotency_key();
        if let (Some(key), Some(external_order_id)) = (&idempotency_key, &payload.external_order_id) {
            let record = IdempotencyRecord {
                order_id: order_id.clone(),
                source: payload.source.clone(),
                external_order_id: external_order_id.clone(),
                created_at: created_at.clone(),
                claimed_at: now_millis(),
            };
            if let Claim::Existing(existing) = self.claim_key(&restaurant_id, key, &record).await? {
                tracing::info!(
                    order_id = %existing.order_id,
                    restaurant_id = %restaurant_id,
                    idempotency_key = %key,
                    "Duplicate aggregator delivery, returning original order"
                );
                return Ok(IngestOutcome {
                    order_id: existing.order_id,
                    duplicate: true,
                });
            }
        }

        enter(IngestPhase::Normalizing);
        let items = normalizer::normalize_items(body.get("items"));

        enter(IngestPhase::Pricing);
        let totals = pricing::calculate(&items, payload.tax_amount, payload.discount_amount);

        let order = Order {
            order_number: payload.order_number_for(&order_id),
            id: order_id,
            restaurant_id,
            employee_id: WEBHOOK_EMPLOYEE_ID.to_string(),
            order_type: payload.order_type.clone(),
            payment_method: payload.payment_method.clone(),
            status: payload.status.clone(),
            items,
            subtotal: totals.subtotal,
            tax_amount: totals.tax_amount,
            discount_amount: totals.discount_amount,
            total: totals.total,
            discount_id: payload.discount_id.clone(),
            discount_name: payload.discount_name.clone(),
            fbr_invoice_number: payload.fbr_invoice_number.clone(),
            customer_name: payload.customer_name.clone(),
            customer_phone: payload.customer_phone.clone(),
            source: payload.source.clone(),
            external_payload: payload.external_payload.clone(),
            external_order_id: payload.external_order_id.clone(),
            idempotency_key,
            created_at,
        };
        let ticket = kds::project_ticket(&order, &payload);

        enter(IngestPhase::Persisting);
        self.persist(&order, &ticket).await?;

        enter(IngestPhase::Responding);
        tracing::info!(
            order_id = %order.id,
            restaurant_id = %order.restaurant_id,
            source = %order.source,
            items = order.items.len(),
            total = order.total,
            "Aggregator order ingested"
        );
        Ok(IngestOutcome {
            order_id: order.id,
            duplicate: false,
        })
    }

    /// Claim `key`, taking it over when the current holder is stale
    async fn claim_key(
        &self,
        restaurant_id: &str,
        key: &str,
        record: &IdempotencyRecord,
    ) -> StoreResult<Claim> {
        let store = self.store.as_ref();
        let existing = match idempotency::claim(store, restaurant_id, key, record).await? {
            Claim::Claimed => return Ok(Claim::Claimed),
            Claim::Existing(existing) => existing,
        };
        if !self.is_stale(restaurant_id, &existing).await? {
            return Ok(Claim::Existing(existing));
        }

        tracing::warn!(
            stale_order_id = %existing.order_id,
            restaurant_id = %restaurant_id,
            idempotency_key = %key,
            "Idempotency key points at an order that was never written, reclaiming"
        );
        idempotency::release(store, restaurant_id, key).await?;
        idempotency::claim(store, restaurant_id, key, record).await
    }

    async fn is_stale(&self, restaurant_id: &str, existing: &IdempotencyRecord) -> StoreResult<bool> {
        let stale_ms = i64::try_from(self.stale_claim_after.as_millis()).unwrap_or(i64::MAX);
        if now_millis().saturating_sub(existing.claimed_at) < stale_ms {
            return Ok(false);
        }
        let store = self.store.as_ref();
        if orders::exists(store, restaurant_id, &existing.order_id).await? {
            return Ok(false);
        }
        Ok(!outbox::exists(store, &existing.order_id).await?)
    }

    async fn persist(&self, order: &Order, ticket: &KdsTicket) -> ServiceResult<()> {
        let store = self.store.as_ref();

        let entry = OutboxEntry::new(order.clone(), ticket.clone(), now_millis());
        if let Err(e) = outbox::put(store, &entry).await {
            if let Some(key) = &order.idempotency_key {
                if let Err(release_err) = idempotency::release(store, &order.restaurant_id, key).await {
                    tracing::warn!(idempotency_key = %key, error = %release_err, "Failed to release idempotency key");
                }
            }
            return Err(e.into());
        }

        write_pair(store, order, ticket).await?;

        if let Err(e) = outbox::remove(store, &order.id).await {
            tracing::warn!(order_id = %order.id, error = %e, "Failed to clear outbox entry, reconciler will retire it");
        }
        Ok(())
    }
}

fn enter(phase: IngestPhase) {
    tracing::debug!(phase = phase.as_str(), "Ingestion phase");
}

/// Write order and ticket concurrently. Both writes are always attempted.
async fn write_pair(store: &dyn DocumentStore, order: &Order, ticket: &KdsTicket) -> StoreResult<()> {
    let (order_res, ticket_res) = tokio::join!(
        orders::put(store, order),
        kds_tickets::put(store, ticket)
    );
    match (order_res, ticket_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Err(order_err), Err(ticket_err)) => {
            tracing::error!(order_id = %order.id, error = %ticket_err, "Ticket write failed");
            Err(order_err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;
    use shared::error::ErrorCode;
    use shared::models::{KdsItemStatus, Restaurant};

    async fn service_with_restaurant(rid: &str) -> (IngestionService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        restaurants::upsert(store.as_ref(), rid, &Restaurant::default())
            .await
            .unwrap();
        (IngestionService::new(store.clone()), store)
    }

    fn app_error(result: ServiceResult<IngestOutcome>) -> AppError {
        match result {
            Ok(outcome) => panic!("expected failure, got {outcome:?}"),
            Err(e) => e.into(),
        }
    }

    #[tokio::test]
    async fn test_burger_end_to_end() {
        let (service, store) = service_with_restaurant("R1").await;
        let body = json!({
            "restaurantId": "R1",
            "items": [{"sku": "X1", "title": "Burger", "price": 450, "quantity": 2}],
            "tax_amount": 153
        });

        let outcome = service.ingest(&body, None).await.unwrap();
        assert!(!outcome.duplicate);

        let order = orders::find(store.as_ref(), "R1", &outcome.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.subtotal, 900.0);
        assert_eq!(order.total, 1053.0);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].menu_item_id, "X1");
        assert_eq!(order.items[0].name, "Burger");
        assert_eq!(order.items[0].unit_price, 450.0);
        assert_eq!(order.items[0].quantity, 2.0);
        assert_eq!(order.employee_id, WEBHOOK_EMPLOYEE_ID);
        assert_eq!(order.source, "aggregator");
        assert_eq!(order.order_number, outcome.order_id[..8].to_uppercase());

        let ticket = kds_tickets::find(store.as_ref(), "R1", &outcome.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ticket.items.len(), 1);
        assert_eq!(ticket.items[0].name, "Burger");
        assert_eq!(ticket.items[0].quantity, 2.0);
        assert_eq!(ticket.items[0].status, KdsItemStatus::Pending);
        assert_eq!(ticket.order_number, order.order_number);

        assert!(outbox::pending(store.as_ref()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_restaurant_id_writes_nothing() {
        let (service, store) = service_with_restaurant("R1").await;
        let before = store.len();

        let err = app_error(service.ingest(&json!({"items": []}), None).await);
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert!(err.is_client_error());
        assert_eq!(store.len(), before);
    }

    #[tokio::test]
    async fn test_unknown_restaurant_writes_nothing() {
        let (service, store) = service_with_restaurant("R1").await;
        let before = store.len();

        let err = app_error(
            service
                .ingest(&json!({"restaurantId": "nope", "external_order_id": "E1"}), None)
                .await,
        );
        assert_eq!(err.code, ErrorCode::RestaurantNotFound);
        assert_eq!(store.len(), before);
    }

    #[tokio::test]
    async fn test_repeat_with_external_id_is_deduplicated() {
        let (service, store) = service_with_restaurant("R1").await;
        let body = json!({
            "restaurantId": "R1",
            "source": "UberEats",
            "external_order_id": "UE-100",
            "items": [{"sku": "X1", "price": 10}]
        });

        let first = service.ingest(&body, None).await.unwrap();
        let second = service.ingest(&body, None).await.unwrap();
        assert!(!first.duplicate);
        assert!(second.duplicate);
        assert_eq!(first.order_id, second.order_id);
        assert_eq!(orders::list(store.as_ref(), "R1").await.unwrap().len(), 1);
        assert_eq!(kds_tickets::list(store.as_ref(), "R1").await.unwrap().len(), 1);

        let order = orders::find(store.as_ref(), "R1", &first.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.idempotency_key.as_deref(), Some("ubereats:UE-100"));
        assert_eq!(order.external_order_id.as_deref(), Some("UE-100"));
    }

    #[tokio::test]
    async fn test_same_external_id_from_other_source_is_distinct() {
        let (service, store) = service_with_restaurant("R1").await;
        let a = json!({"restaurantId": "R1", "source": "glovo", "external_order_id": "1"});
        let b = json!({"restaurantId": "R1", "source": "ubereats", "external_order_id": "1"});

        let first = service.ingest(&a, None).await.unwrap();
        let second = service.ingest(&b, None).await.unwrap();
        assert_ne!(first.order_id, second.order_id);
        assert_eq!(orders::list(store.as_ref(), "R1").await.unwrap().len(), 2);
    }

    /// Known limitation: without an aggregator order id there is nothing to
    /// deduplicate on, so a retried delivery creates a second order.
    #[tokio::test]
    async fn test_repeat_without_external_id_creates_two_orders() {
        let (service, store) = service_with_restaurant("R1").await;
        let body = json!({"restaurantId": "R1", "items": [{"sku": "X1", "price": 10}]});

        let first = service.ingest(&body, None).await.unwrap();
        let second = service.ingest(&body, None).await.unwrap();
        assert_ne!(first.order_id, second.order_id);
        assert!(!second.duplicate);
        assert_eq!(orders::list(store.as_ref(), "R1").await.unwrap().len(), 2);
        assert_eq!(kds_tickets::list(store.as_ref(), "R1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_source_header_fallback() {
        let (service, store) = service_with_restaurant("R1").await;
        let outcome = service
            .ingest(&json!({"restaurantId": "R1"}), Some("Deliveroo"))
            .await
            .unwrap();
        let order = orders::find(store.as_ref(), "R1", &outcome.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.source, "deliveroo");
        assert!(order.items.is_empty());
        assert_eq!(order.total, 0.0);
    }

    fn abandoned_claim(order_id: &str, claimed_at: i64) -> IdempotencyRecord {
        IdempotencyRecord {
            order_id: order_id.to_string(),
            source: "glovo".to_string(),
            external_order_id: "G-9".to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            claimed_at,
        }
    }

    #[tokio::test]
    async fn test_abandoned_claim_is_taken_over() {
        let (service, store) = service_with_restaurant("R1").await;
        let claim = idempotency::claim(store.as_ref(), "R1", "glovo:G-9", &abandoned_claim("ghost", 0))
            .await
            .unwrap();
        assert_eq!(claim, Claim::Claimed);

        let body = json!({"restaurantId": "R1", "source": "glovo", "external_order_id": "G-9"});
        let outcome = service.ingest(&body, None).await.unwrap();
        assert!(!outcome.duplicate);
        assert_ne!(outcome.order_id, "ghost");
        assert!(orders::find(store.as_ref(), "R1", &outcome.order_id).await.unwrap().is_some());

        let again = service.ingest(&body, None).await.unwrap();
        assert!(again.duplicate);
        assert_eq!(again.order_id, outcome.order_id);
    }

    #[tokio::test]
    async fn test_fresh_claim_without_order_is_respected() {
        let (service, store) = service_with_restaurant("R1").await;
        idempotency::claim(
            store.as_ref(),
            "R1",
            "glovo:G-9",
            &abandoned_claim("in-flight", now_millis()),
        )
        .await
        .unwrap();

        let body = json!({"restaurantId": "R1", "source": "glovo", "external_order_id": "G-9"});
        let outcome = service.ingest(&body, None).await.unwrap();
        assert!(outcome.duplicate);
        assert_eq!(outcome.order_id, "in-flight");
    }

    #[tokio::test]
    async fn test_old_claim_with_pending_outbox_is_respected() {
        let (service, store) = service_with_restaurant("R1").await;
        let body = json!({"restaurantId": "R1", "source": "glovo", "external_order_id": "G-9"});
        let first = service.ingest(&body, None).await.unwrap();

        // order lost, outbox still holds it for the reconciler
        let order = orders::find(store.as_ref(), "R1", &first.order_id).await.unwrap().unwrap();
        let ticket = kds_tickets::find(store.as_ref(), "R1", &first.order_id).await.unwrap().unwrap();
        outbox::put(store.as_ref(), &OutboxEntry::new(order, ticket, 0)).await.unwrap();
        store.delete(&orders::key("R1", &first.order_id)).await.unwrap();

        let service = service.with_stale_claim_after(Duration::ZERO);
        let again = service.ingest(&body, None).await.unwrap();
        assert!(again.duplicate);
        assert_eq!(again.order_id, first.order_id);
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(IngestPhase::Authenticating.as_str(), "authenticating");
        assert_eq!(IngestPhase::Persisting.as_str(), "persisting");
    }
}
