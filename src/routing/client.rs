//! Routing control client.
//!
//! # Responsibilities
//! - Read and write the binary state of a named routing control
//! - Keep the ordered list of redundant cluster endpoints
//! - Turn every remote failure into a contract value (`Unknown` / `false`)
//!
//! # Design Decisions
//! - The active endpoint is the first one unless switched explicitly
//! - No automatic endpoint failover, no retries, no local caching of state
//! - The remote service arbitrates; this client never second-guesses it

use std::sync::Arc;

use crate::observability::metrics;
use crate::routing::transport::RoutingControlTransport;
use crate::routing::types::{ClusterEndpoint, RoutingControlState, RoutingError, RoutingResult};

/// Thin client over one active cluster endpoint.
pub struct RoutingControlClient {
    endpoints: Vec<ClusterEndpoint>,
    active: usize,
    transport: Arc<dyn RoutingControlTransport>,
}

impl RoutingControlClient {
    /// Create a client. At least one endpoint is required; the first is active.
    pub fn new<S: AsRef<str>>(
        endpoints: &[S],
        transport: Arc<dyn RoutingControlTransport>,
    ) -> RoutingResult<Self> {
        if endpoints.is_empty() {
            return Err(RoutingError::NoEndpoints);
        }
        let endpoints = endpoints
            .iter()
            .map(|e| ClusterEndpoint::parse(e.as_ref()))
            .collect::<RoutingResult<Vec<_>>>()?;

        tracing::info!(
            endpoint = %endpoints[0],
            endpoint_count = endpoints.len(),
            "Routing control client initialized"
        );

        Ok(Self {
            endpoints,
            active: 0,
            transport,
        })
    }

    /// Read the state of `control_arn`.
    ///
    /// Any remote failure yields [`RoutingControlState::Unknown`].
    pub async fn get_state(&self, control_arn: &str) -> RoutingControlState {
        let endpoint = self.active_endpoint();
        let state = match self.transport.get_state(endpoint, control_arn).await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    control_arn = %control_arn,
                    endpoint = %endpoint,
                    error = %e,
                    "Error getting routing control state"
                );
                RoutingControlState::Unknown
            }
        };
        metrics::record_routing_state(control_arn, state);
        state
    }

    /// Request `desired` for `control_arn`. One request per call.
    ///
    /// Returns true only when the remote service accepted the update.
    pub async fn set_state(&self, control_arn: &str, desired: RoutingControlState) -> bool {
        let endpoint = self.active_endpoint();
        match self.transport.update_state(endpoint, control_arn, desired).await {
            Ok(()) => {
                tracing::info!(
                    control_arn = %control_arn,
                    state = %desired,
                    endpoint = %endpoint,
                    "Updated routing control"
                );
                metrics::record_routing_update(true);
                true
            }
            Err(e) => {
                tracing::error!(
                    control_arn = %control_arn,
                    state = %desired,
                    endpoint = %endpoint,
                    error = %e,
                    "Failed to update routing control"
                );
                metrics::record_routing_update(false);
                false
            }
        }
    }

    /// Switch the active transport to another configured endpoint.
    pub fn select_endpoint(&mut self, index: usize) -> RoutingResult<()> {
        if index >= self.endpoints.len() {
            return Err(RoutingError::EndpointIndex {
                index,
                count: self.endpoints.len(),
            });
        }
        if index != self.active {
            tracing::warn!(
                from = %self.endpoints[self.active],
                to = %self.endpoints[index],
                "Switching routing control endpoint"
            );
            self.active = index;
        }
        Ok(())
    }

    pub fn active_endpoint(&self) -> &ClusterEndpoint {
        &self.endpoints[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn endpoints(&self) -> &[ClusterEndpoint] {
        &self.endpoints
    }
}

impl std::fmt::Debug for RoutingControlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingControlClient")
            .field("endpoints", &self.endpoints)
            .field("active", &self.active)
            .finish()
    }
}
