//! Aggregator webhook
//!
//! ANY /webhooks/aggregator. Raw body so the shared secret is checked before
//! anything is parsed.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value, json};
use shared::error::{AppError, ErrorCode};

use crate::auth::verify_webhook_secret;
use crate::state::AppState;

/// Optional origin tag when the body carries no `source`
pub const SOURCE_HEADER: &str = "x-aggregator-source";

pub async fn handle_webhook(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            ErrorCode::MethodNotAllowed.message(),
        )
            .into_response();
    }

    match ingest(&state, &headers, &body).await {
        Ok(response) => response,
        Err(err) => failure(err),
    }
}

async fn ingest(state: &AppState, headers: &HeaderMap, body: &Bytes) -> Result<Response, AppError> {
    verify_webhook_secret(
        state.config.webhook_secret.as_deref(),
        &state.config.webhook_secret_header,
        headers,
    )?;

    let payload = parse_body(body)?;
    let source_header = headers.get(SOURCE_HEADER).and_then(|v| v.to_str().ok());

    let outcome = state.ingestion.ingest(&payload, source_header).await?;

    let mut body = json!({ "ok": true, "orderId": outcome.order_id });
    if outcome.duplicate {
        body["duplicate"] = Value::Bool(true);
    }
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Empty and non-object bodies count as `{}`
fn parse_body(body: &[u8]) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidFormat, format!("Malformed JSON body: {e}"))
    })?;
    Ok(match value {
        Value::Object(_) => value,
        _ => Value::Object(Map::new()),
    })
}

fn failure(err: AppError) -> Response {
    if err.is_client_error() {
        tracing::warn!(code = %err.code, error = %err.message, "Aggregator webhook rejected");
    } else {
        tracing::error!(code = %err.code, error = %err.message, "Aggregator webhook failed");
    }
    let body = json!({
        "ok": false,
        "error": err.message,
        "code": err.code.code(),
    });
    (err.http_status(), Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_empty_object() {
        assert_eq!(parse_body(b"").unwrap(), json!({}));
        assert_eq!(parse_body(b"  \n").unwrap(), json!({}));
    }

    #[test]
    fn test_non_object_body_is_empty_object() {
        assert_eq!(parse_body(b"[1,2]").unwrap(), json!({}));
        assert_eq!(parse_body(b"\"hi\"").unwrap(), json!({}));
        assert_eq!(parse_body(b"null").unwrap(), json!({}));
    }

    #[test]
    fn test_malformed_body_is_invalid_format() {
        let err = parse_body(b"{\"restaurantId\":").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_failure_body_shape() {
        let response = failure(AppError::restaurant_not_found("R9"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
