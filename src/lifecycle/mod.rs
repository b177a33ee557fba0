//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build collaborators → Connect → Initialize schema
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop scheduling ticks → Close connection → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then credentials, then store, then schema
//! - In-flight writes complete before shutdown proceeds

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{bootstrap, Collaborators, StartupError};
