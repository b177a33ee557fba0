//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, attempts >= 1)
//! - Check routing endpoints parse and the selected index exists
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CoordinatorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::CoordinatorConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("region must not be empty")]
    EmptyRegion,

    #[error("secrets.secret_name must not be empty")]
    EmptySecretName,

    #[error("invalid cluster endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("routing.endpoint_index {index} out of range for {count} endpoint(s)")]
    EndpointIndexOutOfRange { index: usize, count: usize },

    #[error("routing.control_arn is set but no cluster endpoints are configured")]
    MissingEndpoints,

    #[error("health_check.table '{0}' is not a plain SQL identifier")]
    InvalidTable(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &CoordinatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.region.trim().is_empty() {
        errors.push(ValidationError::EmptyRegion);
    }
    if config.secrets.secret_name.trim().is_empty() {
        errors.push(ValidationError::EmptySecretName);
    }
    if config.store.connect_timeout_secs == 0 {
        errors.push(ValidationError::NotPositive { field: "store.connect_timeout_secs" });
    }
    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::NotPositive { field: "health_check.interval_secs" });
    }
    if config.health_check.recent_limit == 0 {
        errors.push(ValidationError::NotPositive { field: "health_check.recent_limit" });
    }
    if config.startup.connect_attempts == 0 {
        errors.push(ValidationError::NotPositive { field: "startup.connect_attempts" });
    }
    if !is_identifier(&config.health_check.table) {
        errors.push(ValidationError::InvalidTable(config.health_check.table.clone()));
    }

    let routing = &config.routing;
    for endpoint in &routing.cluster_endpoints {
        if let Err(e) = url::Url::parse(endpoint) {
            errors.push(ValidationError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            });
        }
    }
    if !routing.control_arn.is_empty() && routing.cluster_endpoints.is_empty() {
        errors.push(ValidationError::MissingEndpoints);
    }
    let count = routing.cluster_endpoints.len();
    if count > 0 && routing.endpoint_index >= count {
        errors.push(ValidationError::EndpointIndexOutOfRange {
            index: routing.endpoint_index,
            count,
        });
    }

    let observability = &config.observability;
    let address = &observability.metrics_address;
    if observability.metrics_enabled && address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&CoordinatorConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = CoordinatorConfig::default();
        config.health_check.interval_secs = 0;
        config.startup.connect_attempts = 0;
        config.health_check.table = "health; DROP TABLE x".to_string();
        config.routing.control_arn = "arn:control".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::MissingEndpoints));
        assert!(errors.contains(&ValidationError::NotPositive {
            field: "health_check.interval_secs"
        }));
    }

    #[test]
    fn test_endpoint_checks() {
        let mut config = CoordinatorConfig::default();
        config.routing.cluster_endpoints = vec![
            "https://host-a.example.com/v1".to_string(),
            "not a url".to_string(),
        ];
        config.routing.endpoint_index = 2;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::InvalidEndpoint { .. }));
        assert_eq!(
            errors[1],
            ValidationError::EndpointIndexOutOfRange { index: 2, count: 2 }
        );
    }

    #[test]
    fn test_identifier() {
        assert!(is_identifier("health_check"));
        assert!(is_identifier("_t1"));
        assert!(!is_identifier("1t"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
    }
}
