//! Privileged order and kitchen ticket lookups
//!
//! Requires a bearer token whose profile may read the restaurant.

use axum::extract::{Extension, Path, State};
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{KdsTicket, Order};

use crate::auth::{CallerIdentity, require_restaurant_access};
use crate::db::{kds_tickets, orders};
use crate::error::ServiceError;
use crate::state::AppState;

/// GET /api/restaurants/{restaurant_id}/orders/{order_id}
pub async fn get_order(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path((restaurant_id, order_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<Order>> {
    require_restaurant_access(state.access_gate.as_ref(), &caller, &restaurant_id).await?;

    let order = orders::find(state.store.as_ref(), &restaurant_id, &order_id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| {
            AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id.as_str())
        })?;
    Ok(ApiResponse::success(order))
}

/// GET /api/restaurants/{restaurant_id}/kds-tickets/{order_id}
pub async fn get_kds_ticket(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path((restaurant_id, order_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<KdsTicket>> {
    require_restaurant_access(state.access_gate.as_ref(), &caller, &restaurant_id).await?;

    let ticket = kds_tickets::find(state.store.as_ref(), &restaurant_id, &order_id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| {
            AppError::new(ErrorCode::KdsTicketNotFound).with_detail("order_id", order_id.as_str())
        })?;
    Ok(ApiResponse::success(ticket))
}
