//! Intake server configuration
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `ENVIRONMENT` | `development` | development / staging / production |
//! | `HTTP_PORT` | `8080` | listen port |
//! | `STORE_BACKEND` | `redb` | `redb` or `memory` |
//! | `STORE_PATH` | `data/intake.redb` | redb file |
//! | `AGGREGATOR_WEBHOOK_SECRET` | unset | shared secret, unset disables the check |
//! | `WEBHOOK_SECRET_HEADER` | `x-webhook-secret` | header carrying the secret |
//! | `JWT_SECRET` | dev value | HS256 key for privileged callers |
//! | `RECONCILE_INTERVAL_SECS` | `30` | outbox scan period |
//! | `RECONCILE_MIN_AGE_SECS` | `10` | outbox entries younger than this are skipped |
//! | `LOG_LEVEL` | `info` | default log filter |
//! | `LOG_DIR` | unset | daily rolling log directory |

use std::path::PathBuf;
use std::time::Duration;

use crate::BoxError;

/// Which [`DocumentStore`](crate::store::DocumentStore) backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redb,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redb => "redb",
            Self::Memory => "memory",
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = BoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redb" => Ok(Self::Redb),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown STORE_BACKEND: {other}").into()),
        }
    }
}

/// Intake server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    pub http_port: u16,
    pub store_backend: StoreBackend,
    pub store_path: PathBuf,
    /// Aggregator shared secret; `None` disables the webhook secret check
    pub webhook_secret: Option<String>,
    /// Header name (lowercase) carrying the shared secret
    pub webhook_secret_header: String,
    /// JWT secret for privileged API callers
    pub jwt_secret: String,
    pub reconcile_interval: Duration,
    pub reconcile_min_age: Duration,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let store_backend = match std::env::var("STORE_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => StoreBackend::Redb,
        };

        Ok(Self {
            http_port: Self::env_or("HTTP_PORT", 8080),
            store_backend,
            store_path: std::env::var("STORE_PATH")
                .unwrap_or_else(|_| "data/intake.redb".into())
                .into(),
            webhook_secret: std::env::var("AGGREGATOR_WEBHOOK_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            webhook_secret_header: std::env::var("WEBHOOK_SECRET_HEADER")
                .unwrap_or_else(|_| "x-webhook-secret".into())
                .to_ascii_lowercase(),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            reconcile_interval: Duration::from_secs(Self::env_or("RECONCILE_INTERVAL_SECS", 30)),
            reconcile_min_age: Duration::from_secs(Self::env_or("RECONCILE_MIN_AGE_SECS", 10)),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            environment,
        })
    }

    /// Development config on the in-memory store, with no webhook secret
    pub fn for_tests() -> Self {
        Self {
            environment: "development".into(),
            http_port: 0,
            store_backend: StoreBackend::Memory,
            store_path: PathBuf::new(),
            webhook_secret: None,
            webhook_secret_header: "x-webhook-secret".into(),
            jwt_secret: "test-jwt-secret".into(),
            reconcile_interval: Duration::from_secs(30),
            reconcile_min_age: Duration::ZERO,
            log_level: "debug".into(),
            log_dir: None,
        }
    }

    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }
}
