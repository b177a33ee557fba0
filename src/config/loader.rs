//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{CoordinatorConfig, StoreDriver};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable names read by [`apply_env_overrides`].
pub const ENV_SECRET_NAME: &str = "DB_SECRET_NAME";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_CONTROL_ARN: &str = "ROUTING_CONTROL_ARN";
pub const ENV_CLUSTER_ENDPOINTS: &str = "CLUSTER_ENDPOINTS";
pub const ENV_INTERVAL_SECS: &str = "HEALTH_CHECK_INTERVAL_SECS";
pub const ENV_STORE_DRIVER: &str = "STORE_DRIVER";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { name: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { name, value } => {
                write!(f, "Invalid value for {}: '{}'", name, value)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML configuration file without validating it.
pub fn read_config_file(path: &Path) -> Result<CoordinatorConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Build the effective configuration: defaults, then the optional file,
/// then environment variables. The result is validated.
pub fn load_config(path: Option<&Path>) -> Result<CoordinatorConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => CoordinatorConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values onto `config`.
///
/// `lookup` abstracts the environment so callers can supply a fixed map.
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(config: &mut CoordinatorConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(ENV_SECRET_NAME) {
        config.secrets.secret_name = v;
    }
    if let Some(v) = get(ENV_REGION) {
        config.region = v;
    }
    if let Some(v) = get(ENV_CONTROL_ARN) {
        config.routing.control_arn = v;
    }
    if let Some(v) = get(ENV_CLUSTER_ENDPOINTS) {
        config.routing.cluster_endpoints = split_endpoints(&v);
    }
    if let Some(v) = get(ENV_INTERVAL_SECS) {
        config.health_check.interval_secs = v.trim().parse().map_err(|_| ConfigError::Env {
            name: ENV_INTERVAL_SECS,
            value: v.clone(),
        })?;
    }
    if let Some(v) = get(ENV_STORE_DRIVER) {
        config.store.driver = match v.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => StoreDriver::Postgres,
            "sqlite" => StoreDriver::Sqlite,
            _ => return Err(ConfigError::Env { name: ENV_STORE_DRIVER, value: v }),
        };
    }
    if let Some(v) = get(ENV_LOG_LEVEL) {
        config.observability.log_level = v;
    }

    Ok(())
}

/// Split a comma-separated endpoint list, dropping blank entries.
pub fn split_endpoints(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
