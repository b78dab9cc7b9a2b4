//! HTTP routes
//!
//! | Route | Auth |
//! |---|---|
//! | `GET /health` | public |
//! | `ANY /webhooks/aggregator` | shared secret (when configured) |
//! | `GET /api/restaurants/{rid}/orders/{order_id}` | bearer token, restaurant access |
//! | `GET /api/restaurants/{rid}/kds-tickets/{order_id}` | bearer token, restaurant access |
//! | `POST /api/admin/reconcile` | bearer token, super admin |

pub mod admin;
pub mod aggregator_webhook;
pub mod health;
pub mod logging;
pub mod orders;

use axum::routing::{any, get, post};
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Privileged API (JWT authenticated)
    let api = Router::new()
        .route(
            "/api/restaurants/{restaurant_id}/orders/{order_id}",
            get(orders::get_order),
        )
        .route(
            "/api/restaurants/{restaurant_id}/kds-tickets/{order_id}",
            get(orders::get_kds_ticket),
        )
        .route("/api/admin/reconcile", post(admin::reconcile))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Aggregator webhook (shared secret checked in the handler, raw body)
    let webhook = Router::new().route(
        "/webhooks/aggregator",
        any(aggregator_webhook::handle_webhook),
    );

    Router::new()
        .route("/health", get(health::health_check))
        .merge(webhook)
        .merge(api)
        .layer(middleware::from_fn(logging::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
