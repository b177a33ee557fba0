//! Health check loop.
//!
//! # Responsibilities
//! - Bootstrap the record table once before the first tick
//! - Probe the connection and reopen it when it stopped answering
//! - Consult the routing control before writing (when attached)
//! - Write one record per tick and read back the most recent ones
//! - Stop on the shutdown signal and close the connection

use std::time::Duration;

use chrono::Local;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::record::{create_table_sql, insert_sql, recent_sql, HealthCheckRecord};
use crate::health::reporter::{StatusLine, StatusSink};
use crate::observability::metrics;
use crate::routing::{RoutingControlClient, RoutingControlState};
use crate::store::{ConnectionHealth, ConnectionManager, StoreResult};

/// Shortest tick period; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Outcome of a single tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Record written; `recent` holds the read-back (may be empty if the read failed).
    Healthy { recent: Vec<HealthCheckRecord> },
    /// Nothing written because the store failed or could not be reached.
    Unhealthy { reason: String },
    /// Nothing written because this region is not confirmed active.
    Standby { state: RoutingControlState },
}

impl TickOutcome {
    fn label(&self) -> &'static str {
        match self {
            TickOutcome::Healthy { .. } => "healthy",
            TickOutcome::Unhealthy { .. } => "unhealthy",
            TickOutcome::Standby { .. } => "standby",
        }
    }
}

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    GracefulShutdown,
}

/// Summary returned when the loop stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopReport {
    pub ticks: u64,
    pub healthy: u64,
    pub unhealthy: u64,
    pub standby: u64,
    pub exit: LoopExit,
}

impl LoopReport {
    fn new() -> Self {
        Self {
            ticks: 0,
            healthy: 0,
            unhealthy: 0,
            standby: 0,
            exit: LoopExit::GracefulShutdown,
        }
    }

    fn record(&mut self, outcome: &TickOutcome) {
        self.ticks += 1;
        match outcome {
            TickOutcome::Healthy { .. } => self.healthy += 1,
            TickOutcome::Unhealthy { .. } => self.unhealthy += 1,
            TickOutcome::Standby { .. } => self.standby += 1,
        }
    }
}

struct RoutingGate {
    client: RoutingControlClient,
    control_arn: String,
}

/// Periodically records a health fact for one region.
pub struct HealthCheckLoop<S: StatusSink> {
    manager: ConnectionManager,
    region: String,
    config: HealthCheckConfig,
    routing: Option<RoutingGate>,
    sink: S,
}

impl<S: StatusSink> HealthCheckLoop<S> {
    pub fn new(
        manager: ConnectionManager,
        region: impl Into<String>,
        config: HealthCheckConfig,
        sink: S,
    ) -> Self {
        Self {
            manager,
            region: region.into(),
            config,
            routing: None,
            sink,
        }
    }

    /// Gate writes on `control_arn` being `On`.
    pub fn with_routing(
        mut self,
        client: RoutingControlClient,
        control_arn: impl Into<String>,
    ) -> Self {
        self.routing = Some(RoutingGate {
            client,
            control_arn: control_arn.into(),
        });
        self
    }

    /// Create the record table if absent and insert the seed record.
    ///
    /// Runs once before the first tick; an error here is fatal to the caller.
    pub async fn initialize_schema(&mut self) -> StoreResult<()> {
        tracing::info!(table = %self.config.table, "Initializing database");
        let ddl = create_table_sql(self.manager.dialect(), &self.config.table);
        self.manager.execute(&ddl).await?;

        let seed = HealthCheckRecord::seed(&self.region, Local::now());
        self.manager.execute(&insert_sql(&self.config.table, &seed)).await?;

        tracing::info!(table = %self.config.table, "Database initialized");
        Ok(())
    }

    /// Run ticks every `interval` until `shutdown` fires, then close the connection.
    ///
    /// A tick in progress always completes before shutdown is observed.
    /// Periods below one millisecond are raised to one millisecond.
    pub async fn run(
        &mut self,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> LoopReport {
        let interval = interval.max(MIN_INTERVAL);
        tracing::info!(
            region = %self.region,
            interval_secs = interval.as_secs_f64(),
            routing = self.routing.is_some(),
            "Health check loop starting"
        );

        let mut report = LoopReport::new();
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Health check loop received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    let outcome = self.tick().await;
                    report.record(&outcome);
                }
            }
        }

        self.manager.close().await;
        tracing::info!(ticks = report.ticks, exit = ?report.exit, "Graceful shutdown");
        self.sink.shutdown(&report);
        report
    }

    /// Perform one health check and report it.
    pub async fn tick(&mut self) -> TickOutcome {
        let outcome = self.check().await;

        let line = match &outcome {
            TickOutcome::Healthy { .. } => {
                StatusLine::success(format!("Health check logged for {}", self.region))
            }
            TickOutcome::Unhealthy { reason } => {
                StatusLine::failure(format!("Health check failed for {}: {}", self.region, reason))
            }
            TickOutcome::Standby { state } => StatusLine::info(format!(
                "Standby: routing control is {} for {}, skipping write",
                state, self.region
            )),
        };
        self.sink.status(&line);
        if let TickOutcome::Healthy { recent } = &outcome {
            if !recent.is_empty() {
                self.sink.recent(recent);
            }
        }

        metrics::record_health_check(&self.region, outcome.label());
        outcome
    }

    async fn check(&mut self) -> TickOutcome {
        if let Err(reason) = self.ensure_connected().await {
            return TickOutcome::Unhealthy { reason };
        }

        if self.config.require_active {
            if let Some(gate) = &self.routing {
                let state = gate.client.get_state(&gate.control_arn).await;
                if state != RoutingControlState::On {
                    return TickOutcome::Standby { state };
                }
            }
        }

        let record = HealthCheckRecord::healthy_at(&self.region, Local::now());
        if let Err(e) = self.manager.execute(&insert_sql(&self.config.table, &record)).await {
            return TickOutcome::Unhealthy { reason: e.to_string() };
        }

        let recent = match self
            .manager
            .execute(&recent_sql(&self.config.table, self.config.recent_limit))
            .await
        {
            Ok(rows) => rows.iter().filter_map(HealthCheckRecord::from_row).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read recent health checks");
                Vec::new()
            }
        };
        TickOutcome::Healthy { recent }
    }

    /// Probe the connection; reopen once if it is degraded or closed.
    async fn ensure_connected(&mut self) -> Result<(), String> {
        match self.manager.probe().await {
            ConnectionHealth::Connected => return Ok(()),
            ConnectionHealth::Degraded(reason) => {
                tracing::warn!(reason = %reason, "Connection degraded, reconnecting");
                self.manager.close().await;
            }
            ConnectionHealth::Closed => {
                tracing::warn!("Connection closed, reconnecting");
            }
        }

        if self.manager.open().await {
            Ok(())
        } else {
            Err("reconnect required".to_string())
        }
    }

    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ConnectionManager {
        &mut self.manager
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}
