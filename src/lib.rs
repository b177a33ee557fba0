//! Multi-region failover coordinator library

pub mod config;
pub mod credentials;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod store;

pub use config::CoordinatorConfig;
pub use health::HealthCheckLoop;
pub use lifecycle::Shutdown;
pub use routing::RoutingControlClient;
pub use store::ConnectionManager;
