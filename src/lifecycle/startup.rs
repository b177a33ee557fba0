//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the credential source, store connector and routing transport from config
//! - Open the initial connection (with optional backoff between attempts)
//! - Bootstrap the record table
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and maps to a non-zero exit
//! - Subsystems initialize in order, not concurrently
//! - A shutdown signal during connect attempts or backoff aborts startup

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::config::{CoordinatorConfig, SecretBackend};
use crate::credentials::{
    CredentialResolver, EnvSecretSource, SecretSource, SecretsManagerSource,
};
use crate::health::{HealthCheckLoop, StatusSink};
use crate::resilience::Backoff;
use crate::routing::{
    ArcClusterTransport, RoutingControlClient, RoutingControlTransport, RoutingError,
};
use crate::store::{connector_for, ConnectionManager, StoreConnector, StoreError};

/// Fatal errors raised before the first tick.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Credentials could not be resolved.
    #[error("credential unavailable: {0}")]
    Credentials(StoreError),

    /// The store could not be reached within the allowed attempts.
    #[error("failed to connect to database after {attempts} attempt(s): {last}")]
    Connect { attempts: u32, last: StoreError },

    /// Schema bootstrap failed.
    #[error("schema initialization failed: {0}")]
    Schema(StoreError),

    /// Routing control client could not be built.
    #[error("routing control setup failed: {0}")]
    Routing(#[from] RoutingError),

    /// Shutdown was requested before startup finished.
    #[error("shutdown requested during startup")]
    Interrupted,
}

/// Collaborators the coordinator talks to.
pub struct Collaborators {
    pub secrets: Arc<dyn SecretSource>,
    pub connector: Arc<dyn StoreConnector>,
    pub routing: Option<Arc<dyn RoutingControlTransport>>,
}

impl Collaborators {
    /// Build the production collaborators described by `config`.
    pub async fn from_config(config: &CoordinatorConfig) -> Self {
        let secrets: Arc<dyn SecretSource> = match config.secrets.backend {
            SecretBackend::Aws => Arc::new(SecretsManagerSource::new(&config.region).await),
            SecretBackend::Env => Arc::new(EnvSecretSource::new(config.secrets.env_var.clone())),
        };

        let routing: Option<Arc<dyn RoutingControlTransport>> = if config.routing.is_enabled() {
            Some(Arc::new(ArcClusterTransport::new(&config.region).await))
        } else {
            None
        };

        Self {
            secrets,
            connector: connector_for(&config.store),
            routing,
        }
    }
}

/// Connect, attach routing and initialize the schema.
///
/// Returns [`StartupError::Interrupted`] if `shutdown` fires while connecting.
pub async fn bootstrap<S: StatusSink>(
    config: &CoordinatorConfig,
    collaborators: Collaborators,
    sink: S,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<HealthCheckLoop<S>, StartupError> {
    let resolver =
        CredentialResolver::new(collaborators.secrets, config.secrets.secret_name.clone());
    let mut manager = ConnectionManager::new(
        resolver,
        collaborators.connector,
        Duration::from_secs(config.store.connect_timeout_secs),
    );

    connect_with_backoff(&mut manager, config, &mut shutdown).await?;

    let mut health_loop = HealthCheckLoop::new(
        manager,
        config.region.clone(),
        config.health_check.clone(),
        sink,
    );

    if let Some(transport) = collaborators.routing {
        match routing_client(config, transport) {
            Ok(client) => {
                health_loop = health_loop.with_routing(client, config.routing.control_arn.clone());
            }
            Err(e) => {
                health_loop.manager_mut().close().await;
                return Err(StartupError::Routing(e));
            }
        }
    }

    if let Err(e) = health_loop.initialize_schema().await {
        health_loop.manager_mut().close().await;
        return Err(StartupError::Schema(e));
    }

    Ok(health_loop)
}

fn routing_client(
    config: &CoordinatorConfig,
    transport: Arc<dyn RoutingControlTransport>,
) -> Result<RoutingControlClient, RoutingError> {
    let mut client = RoutingControlClient::new(&config.routing.cluster_endpoints, transport)?;
    client.select_endpoint(config.routing.endpoint_index)?;
    Ok(client)
}

async fn connect_with_backoff(
    manager: &mut ConnectionManager,
    config: &CoordinatorConfig,
    shutdown: &mut broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    let backoff = Backoff::from_config(&config.startup);
    let attempts = config.startup.connect_attempts.max(1);

    let mut attempt = 1;
    loop {
        let opened = tokio::select! {
            biased;
            _ = requested(shutdown) => return Err(StartupError::Interrupted),
            opened = manager.try_open() => opened,
        };

        match opened {
            Ok(()) => return Ok(()),
            Err(e @ StoreError::Credentials(_)) if attempt >= attempts => {
                return Err(StartupError::Credentials(e));
            }
            Err(e) if attempt >= attempts => {
                return Err(StartupError::Connect { attempts, last: e });
            }
            Err(e) => {
                let delay = backoff.delay(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts = attempts,
                    delay = ?delay,
                    error = %e,
                    "Connection attempt failed, retrying"
                );
                tokio::select! {
                    biased;
                    _ = requested(shutdown) => return Err(StartupError::Interrupted),
                    _ = tokio::time::sleep(delay) => {}
                }
                attempt += 1;
            }
        }
    }
}

/// Resolves once shutdown is signalled. A closed channel never resolves.
async fn requested(shutdown: &mut broadcast::Receiver<()>) {
    match shutdown.recv().await {
        Ok(()) | Err(RecvError::Lagged(_)) => {}
        Err(RecvError::Closed) => std::future::pending::<()>().await,
    }
}
