//! Access Gate
//!
//! Resolves an authenticated caller to a profile and role. Injected into
//! [`AppState`](crate::state::AppState) as a trait object so the privileged
//! routes do not depend on where profiles live.

use async_trait::async_trait;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Role, UserProfile};
use std::sync::Arc;

use super::jwt::CallerIdentity;
use crate::db::users;
use crate::error::ServiceError;
use crate::store::DocumentStore;

#[async_trait]
pub trait AccessGate: Send + Sync {
    async fn resolve_profile(&self, caller: &CallerIdentity) -> AppResult<UserProfile>;

    async fn resolve_role(&self, caller: &CallerIdentity) -> AppResult<Role> {
        Ok(self.resolve_profile(caller).await?.role_name)
    }
}

/// Reads profiles from `users/{uid}`
pub struct StoreAccessGate {
    store: Arc<dyn DocumentStore>,
}

impl StoreAccessGate {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AccessGate for StoreAccessGate {
    async fn resolve_profile(&self, caller: &CallerIdentity) -> AppResult<UserProfile> {
        users::find(self.store.as_ref(), &caller.uid)
            .await
            .map_err(|e| AppError::from(ServiceError::from(e)))?
            .ok_or_else(|| AppError::permission_denied("User profile missing."))
    }
}

pub async fn require_super_admin(gate: &dyn AccessGate, caller: &CallerIdentity) -> AppResult<()> {
    let role = gate.resolve_role(caller).await?;
    if role.is_super_admin() {
        return Ok(());
    }
    tracing::warn!(uid = %caller.uid, role = role.as_str(), "Super admin required");
    Err(AppError::with_message(ErrorCode::RoleRequired, "Super admin role required.")
        .with_detail("role", role.as_str()))
}

pub async fn require_restaurant_access(
    gate: &dyn AccessGate,
    caller: &CallerIdentity,
    restaurant_id: &str,
) -> AppResult<()> {
    let profile = gate.resolve_profile(caller).await?;
    if profile
        .role_name
        .can_read_restaurant(restaurant_id, profile.restaurant_id.as_deref())
    {
        return Ok(());
    }
    tracing::warn!(
        uid = %caller.uid,
        role = profile.role_name.as_str(),
        restaurant_id = %restaurant_id,
        "Restaurant access denied"
    );
    Err(AppError::permission_denied("No access to this restaurant.")
        .with_detail("restaurant_id", restaurant_id))
}
