//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown receiver + interval ticker
//!     → monitor.rs: probe connection (reopen if degraded)
//!     → routing gate (optional): write only when the control is On
//!     → record.rs: INSERT one record, SELECT the most recent N
//!     → reporter.rs: one status line per tick
//! ```
//!
//! # Design Decisions
//! - Ticks never overlap; a tick finishes before shutdown is observed
//! - A failed write marks the tick unhealthy; the loop keeps going
//! - Schema bootstrap failures are fatal

pub mod monitor;
pub mod record;
pub mod reporter;

pub use monitor::{HealthCheckLoop, LoopExit, LoopReport, TickOutcome};
pub use record::{HealthCheckRecord, HealthStatus};
pub use reporter::{ConsoleReporter, StatusKind, StatusLine, StatusSink};
