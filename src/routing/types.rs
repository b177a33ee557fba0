//! Routing control types and error definitions.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Observed state of a routing control.
///
/// `Unknown` means the state could not be read; it is never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingControlState {
    On,
    Off,
    Unknown,
}

impl RoutingControlState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingControlState::On => "On",
            RoutingControlState::Off => "Off",
            RoutingControlState::Unknown => "Unknown",
        }
    }

    /// Gauge encoding: 1 On, 0 Off, -1 Unknown.
    pub fn as_gauge(&self) -> f64 {
        match self {
            RoutingControlState::On => 1.0,
            RoutingControlState::Off => 0.0,
            RoutingControlState::Unknown => -1.0,
        }
    }
}

impl fmt::Display for RoutingControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutingControlState {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(RoutingControlState::On),
            "off" => Ok(RoutingControlState::Off),
            _ => Err(RoutingError::UnexpectedState(s.to_string())),
        }
    }
}

/// Errors raised below the routing client's public contract.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// The cluster endpoint could not be reached or rejected the call.
    #[error("transport error: {0}")]
    Transport(String),

    /// An endpoint string is not a usable URL.
    #[error("invalid cluster endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// The client was built without endpoints.
    #[error("at least one cluster endpoint is required")]
    NoEndpoints,

    /// Manual failover to an index that does not exist.
    #[error("endpoint index {index} out of range for {count} endpoint(s)")]
    EndpointIndex { index: usize, count: usize },

    /// The remote service returned a state this client does not model.
    #[error("unexpected routing control state '{0}'")]
    UnexpectedState(String),
}

/// Result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;

/// One redundant address of the routing control cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterEndpoint {
    url: url::Url,
}

impl ClusterEndpoint {
    pub fn parse(raw: &str) -> RoutingResult<Self> {
        let url = url::Url::parse(raw.trim()).map_err(|e| RoutingError::InvalidEndpoint {
            endpoint: raw.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { url })
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for ClusterEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_parsing() {
        assert_eq!("On".parse::<RoutingControlState>().unwrap(), RoutingControlState::On);
        assert_eq!(" off ".parse::<RoutingControlState>().unwrap(), RoutingControlState::Off);
        assert!("unknown".parse::<RoutingControlState>().is_err());
    }

    #[test]
    fn test_endpoint_parse() {
        let endpoint =
            ClusterEndpoint::parse("https://host-aaaa.us-east-1.example.com/v1").unwrap();
        assert_eq!(endpoint.url().host_str(), Some("host-aaaa.us-east-1.example.com"));
        assert!(matches!(
            ClusterEndpoint::parse("host without scheme"),
            Err(RoutingError::InvalidEndpoint { .. })
        ));
    }
}
