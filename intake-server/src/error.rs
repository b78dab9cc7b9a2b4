//! Service-layer error type
//!
//! `ServiceError` bridges store errors (`StoreError`) and the API-layer error
//! (`AppError`), so services can use `?` on both.

use axum::response::IntoResponse;
use shared::error::AppError;

use crate::store::StoreError;

/// - `Store`: document store failure, surfaced with its message
/// - `App`: business-rule error, passed through to the client
#[derive(Debug)]
pub enum ServiceError {
    Store(StoreError),
    App(AppError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Store(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Store(store_err) => {
                tracing::error!(error = %store_err, "Document store error");
                AppError::store(store_err.to_string())
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn test_store_error_message_is_kept() {
        let err = ServiceError::from(StoreError::Unavailable("disk detached".into()));
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::StoreError);
        assert_eq!(app.message, "Store unavailable: disk detached");
    }

    #[test]
    fn test_app_error_passes_through() {
        let err = ServiceError::from(AppError::restaurant_not_found("R9"));
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::RestaurantNotFound);
    }
}
