//! Aggregator order intake
//!
//! Pure stages ([`normalizer`], [`pricing`], [`kds`], [`payload`]) plus the
//! stateful [`service`] that persists their output and the [`reconciler`]
//! that repairs interrupted writes.

pub mod kds;
pub mod normalizer;
pub mod payload;
pub mod pricing;
pub mod reconciler;
pub mod service;

pub use reconciler::{ReconcileReport, Reconciler};
pub use service::{IngestOutcome, IngestionService};
