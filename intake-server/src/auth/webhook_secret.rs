//! Aggregator shared-secret check

use http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use shared::error::{AppError, ErrorCode};

/// Check the configured shared secret against the request headers
///
/// `expected = None` (or empty) disables the check.
pub fn verify_webhook_secret(
    expected: Option<&str>,
    header_name: &str,
    headers: &HeaderMap,
) -> Result<(), AppError> {
    let Some(expected) = expected.filter(|s| !s.is_empty()) else {
        return Ok(());
    };

    let provided = headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if secrets_match(expected, provided) {
        Ok(())
    } else {
        tracing::warn!(header = header_name, present = !provided.is_empty(), "Webhook secret rejected");
        Err(AppError::new(ErrorCode::WebhookSecretInvalid))
    }
}

type HmacSha256 = Hmac<Sha256>;

fn keyed_mac(secret: &str, message: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(message.as_bytes());
    Some(mac)
}

/// Constant-time comparison via `hmac::verify_slice`, keyed with the secret
fn secrets_match(expected: &str, provided: &str) -> bool {
    let Some(expected_mac) = keyed_mac(expected, expected) else {
        return false;
    };
    let tag = expected_mac.finalize().into_bytes();
    keyed_mac(expected, provided).is_some_and(|mac| mac.verify_slice(&tag).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(value: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(v) = value {
            map.insert("x-webhook-secret", HeaderValue::from_str(v).unwrap());
        }
        map
    }

    #[test]
    fn test_unconfigured_secret_disables_check() {
        assert!(verify_webhook_secret(None, "x-webhook-secret", &headers(None)).is_ok());
        assert!(verify_webhook_secret(Some(""), "x-webhook-secret", &headers(None)).is_ok());
    }

    #[test]
    fn test_matching_secret_passes() {
        assert!(verify_webhook_secret(Some("s3cret"), "x-webhook-secret", &headers(Some("s3cret"))).is_ok());
    }

    #[test]
    fn test_missing_or_wrong_secret_is_denied() {
        for h in [None, Some("wrong"), Some("s3cret ")] {
            let err = verify_webhook_secret(Some("s3cret"), "x-webhook-secret", &headers(h)).unwrap_err();
            assert_eq!(err.code, ErrorCode::WebhookSecretInvalid);
            assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);
        }
    }

    #[test]
    fn test_secret_comparison() {
        assert!(secrets_match("abc", "abc"));
        assert!(!secrets_match("abc", "abd"));
        assert!(!secrets_match("abc", ""));
    }
}
