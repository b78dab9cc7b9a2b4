//! Data models
//!
//! Documents as persisted in the document store and returned by the API.

pub mod kds;
pub mod order;
pub mod restaurant;
pub mod role;

// Re-exports
pub use kds::*;
pub use order::*;
pub use restaurant::*;
pub use role::*;
