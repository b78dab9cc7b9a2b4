//! Operator endpoints

use axum::extract::{Extension, State};
use shared::error::{ApiResponse, AppResult};

use crate::auth::{CallerIdentity, require_super_admin};
use crate::error::ServiceError;
use crate::intake::ReconcileReport;
use crate::state::AppState;

/// POST /api/admin/reconcile - run one outbox pass now
pub async fn reconcile(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> AppResult<ApiResponse<ReconcileReport>> {
    require_super_admin(state.access_gate.as_ref(), &caller).await?;

    let report = state
        .reconciler
        .run_once()
        .await
        .map_err(ServiceError::from)?;
    tracing::info!(uid = %caller.uid, ?report, "Manual reconcile pass");
    Ok(ApiResponse::success(report))
}
