//! Caller authentication and authorization
//!
//! - [`webhook_secret`]: shared-secret check for aggregator deliveries
//! - [`jwt`]: bearer token middleware for privileged API callers
//! - [`access_gate`]: caller → profile/role resolution

pub mod access_gate;
pub mod jwt;
pub mod webhook_secret;

pub use access_gate::{
    AccessGate, StoreAccessGate, require_restaurant_access, require_super_admin,
};
pub use jwt::{CallerIdentity, Claims, create_token, require_auth};
pub use webhook_secret::verify_webhook_secret;
