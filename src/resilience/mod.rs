//! Resilience helpers.
//!
//! Only the startup connection is retried; components themselves never
//! retry (one request per routing call, one attempt per `open`).

pub mod backoff;

pub use backoff::Backoff;
