//! Typed document access
//!
//! | Collection | Id | Document |
//! |------------|----|----------|
//! | `restaurants` | restaurant id | [`Restaurant`](shared::models::Restaurant) |
//! | `restaurants/{rid}/orders` | order id | [`Order`](shared::models::Order) |
//! | `restaurants/{rid}/kds_orders` | order id | [`KdsTicket`](shared::models::KdsTicket) |
//! | `restaurants/{rid}/idempotency_keys` | `source:external_id` | [`idempotency::IdempotencyRecord`] |
//! | `ingest_outbox` | order id | [`outbox::OutboxEntry`] |
//! | `users` | uid | [`UserProfile`](shared::models::UserProfile) |

pub mod idempotency;
pub mod kds_tickets;
pub mod orders;
pub mod outbox;
pub mod restaurants;
pub mod users;
