//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the coordinator.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the failover coordinator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Region label written into health records and used to scope AWS clients.
    pub region: String,

    /// Where database credentials come from.
    pub secrets: SecretsConfig,

    /// Transactional store settings.
    pub store: StoreConfig,

    /// Routing control (ARC) settings.
    pub routing: RoutingConfig,

    /// Health check loop settings.
    pub health_check: HealthCheckConfig,

    /// Startup connection policy.
    pub startup: StartupConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            secrets: SecretsConfig::default(),
            store: StoreConfig::default(),
            routing: RoutingConfig::default(),
            health_check: HealthCheckConfig::default(),
            startup: StartupConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Backing store for the credential secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretBackend {
    /// AWS Secrets Manager.
    Aws,
    /// JSON document held in an environment variable.
    Env,
}

/// Secret lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Secret identifier (name or ARN).
    pub secret_name: String,

    /// Which backend resolves the secret.
    pub backend: SecretBackend,

    /// Environment variable read by the `env` backend.
    pub env_var: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            secret_name: "arc-demo/database/credentials".to_string(),
            backend: SecretBackend::Aws,
            env_var: "FAILOVER_DB_SECRET_JSON".to_string(),
        }
    }
}

/// Relational engine behind the connection manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreDriver {
    Postgres,
    Sqlite,
}

/// TLS negotiation mode for PostgreSQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    Disable,
    Prefer,
    Require,
}

/// Transactional store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store driver.
    pub driver: StoreDriver,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// TLS mode (PostgreSQL only).
    pub ssl_mode: SslMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            driver: StoreDriver::Postgres,
            connect_timeout_secs: 5,
            ssl_mode: SslMode::Prefer,
        }
    }
}

/// Routing control configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutingConfig {
    /// Routing control ARN. Empty disables routing checks.
    pub control_arn: String,

    /// Redundant cluster endpoint URLs, in preference order.
    pub cluster_endpoints: Vec<String>,

    /// Index of the endpoint used as the active transport.
    pub endpoint_index: usize,
}

impl RoutingConfig {
    /// Routing checks run only when a control and at least one endpoint are set.
    pub fn is_enabled(&self) -> bool {
        !self.control_arn.is_empty() && !self.cluster_endpoints.is_empty()
    }
}

/// Health check loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Interval between ticks in seconds.
    pub interval_secs: u64,

    /// Number of recent records read back after each write.
    pub recent_limit: u32,

    /// Skip the write unless the routing control reports `On`.
    pub require_active: bool,

    /// Table holding health records.
    pub table: String,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            recent_limit: 5,
            require_active: true,
            table: "health_check".to_string(),
        }
    }
}

/// Startup connection policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StartupConfig {
    /// Attempts at the initial connection before giving up.
    pub connect_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            connect_attempts: 1,
            base_delay_ms: 500,
            max_delay_ms: 5000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
