//! Wire transport to the routing control cluster.
//!
//! # Responsibilities
//! - Issue `GetRoutingControlState` / `UpdateRoutingControlState` against one endpoint
//! - Map remote states and errors into local types
//!
//! # Design Decisions
//! - One SDK client per endpoint URL, built on first use
//! - Exactly one request per call, no retries at this layer

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_route53recoverycluster::types::RoutingControlState as WireState;
use aws_sdk_route53recoverycluster::Client as ClusterClient;

use crate::routing::types::{ClusterEndpoint, RoutingControlState, RoutingError, RoutingResult};

/// Request/response pair of the routing control data plane.
#[async_trait]
pub trait RoutingControlTransport: Send + Sync {
    async fn get_state(
        &self,
        endpoint: &ClusterEndpoint,
        control_arn: &str,
    ) -> RoutingResult<RoutingControlState>;

    async fn update_state(
        &self,
        endpoint: &ClusterEndpoint,
        control_arn: &str,
        state: RoutingControlState,
    ) -> RoutingResult<()>;
}

/// Route 53 Application Recovery Controller cluster transport.
pub struct ArcClusterTransport {
    sdk_config: aws_config::SdkConfig,
    clients: Mutex<HashMap<String, ClusterClient>>,
}

impl ArcClusterTransport {
    /// Load AWS configuration from the environment for `region`.
    pub async fn new(region: &str) -> Self {
        let sdk_config = aws_config::from_env()
            .region(aws_sdk_route53recoverycluster::config::Region::new(region.to_string()))
            .load()
            .await;
        Self::from_sdk_config(sdk_config)
    }

    pub fn from_sdk_config(sdk_config: aws_config::SdkConfig) -> Self {
        Self {
            sdk_config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn client_for(&self, endpoint: &ClusterEndpoint) -> ClusterClient {
        let mut clients = self.clients.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        clients
            .entry(endpoint.as_str().to_string())
            .or_insert_with(|| {
                let config = aws_sdk_route53recoverycluster::config::Builder::from(&self.sdk_config)
                    .endpoint_url(endpoint.as_str())
                    .build();
                tracing::debug!(endpoint = %endpoint, "Created routing control cluster client");
                ClusterClient::from_conf(config)
            })
            .clone()
    }
}

#[async_trait]
impl RoutingControlTransport for ArcClusterTransport {
    async fn get_state(
        &self,
        endpoint: &ClusterEndpoint,
        control_arn: &str,
    ) -> RoutingResult<RoutingControlState> {
        let output = self
            .client_for(endpoint)
            .get_routing_control_state()
            .routing_control_arn(control_arn)
            .send()
            .await
            .map_err(|e| {
                RoutingError::Transport(
                    aws_sdk_route53recoverycluster::error::DisplayErrorContext(&e).to_string(),
                )
            })?;

        match output.routing_control_state() {
            WireState::On => Ok(RoutingControlState::On),
            WireState::Off => Ok(RoutingControlState::Off),
            other => Err(RoutingError::UnexpectedState(other.as_str().to_string())),
        }
    }

    async fn update_state(
        &self,
        endpoint: &ClusterEndpoint,
        control_arn: &str,
        state: RoutingControlState,
    ) -> RoutingResult<()> {
        let wire = match state {
            RoutingControlState::On => WireState::On,
            RoutingControlState::Off => WireState::Off,
            RoutingControlState::Unknown => {
                return Err(RoutingError::UnexpectedState(state.as_str().to_string()))
            }
        };

        self.client_for(endpoint)
            .update_routing_control_state()
            .routing_control_arn(control_arn)
            .routing_control_state(wire)
            .send()
            .await
            .map_err(|e| {
                RoutingError::Transport(
                    aws_sdk_route53recoverycluster::error::DisplayErrorContext(&e).to_string(),
                )
            })?;
        Ok(())
    }
}

impl std::fmt::Debug for ArcClusterTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self.clients.lock().map(|c| c.len()).unwrap_or_default();
        f.debug_struct("ArcClusterTransport")
            .field("region", &self.sdk_config.region())
            .field("cached_clients", &cached)
            .finish()
    }
}
