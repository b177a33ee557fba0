//! Routing control subsystem.
//!
//! # Data Flow
//! ```text
//! caller (health loop, routing-ctl)
//!     → client.rs (active endpoint, fail-soft contract)
//!     → transport.rs (Get/UpdateRoutingControlState over one cluster endpoint)
//!     → remote routing control service (single-writer authority)
//! ```
//!
//! # Design Decisions
//! - Remote state is never cached locally
//! - Reads that fail are `Unknown`, writes that fail are `false`
//! - Endpoint failover is manual (`select_endpoint`)

pub mod client;
pub mod transport;
pub mod types;

pub use client::RoutingControlClient;
pub use transport::{ArcClusterTransport, RoutingControlTransport};
pub use types::{ClusterEndpoint, RoutingControlState, RoutingError, RoutingResult};
