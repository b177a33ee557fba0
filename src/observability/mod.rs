//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (logging.rs installs the subscriber, stderr)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → log aggregation
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! User-facing status lines are not logs; see `health::reporter`.

pub mod logging;
pub mod metrics;
