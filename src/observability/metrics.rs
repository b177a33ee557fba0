//! Metrics collection and exposition.
//!
//! # Metrics
//! - `failover_health_checks_total` (counter): ticks by region and status
//! - `failover_statements_total` (counter): statements by kind and outcome
//! - `failover_statement_duration_seconds` (histogram): store round-trip latency
//! - `failover_routing_control_state` (gauge): 1=On, 0=Off, -1=Unknown
//! - `failover_routing_control_updates_total` (counter): updates by outcome
//! - `failover_store_connected` (gauge): 1=open, 0=closed
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::RoutingControlState;

/// Install the Prometheus recorder with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_health_check(region: &str, status: &'static str) {
    counter!(
        "failover_health_checks_total",
        "region" => region.to_string(),
        "status" => status
    )
    .increment(1);
}

pub fn record_statement(kind: &'static str, ok: bool, start: Instant) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("failover_statements_total", "kind" => kind, "outcome" => outcome).increment(1);
    histogram!("failover_statement_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_routing_state(control_arn: &str, state: RoutingControlState) {
    gauge!("failover_routing_control_state", "control" => control_arn.to_string())
        .set(state.as_gauge());
}

pub fn record_routing_update(accepted: bool) {
    let outcome = if accepted { "accepted" } else { "failed" };
    counter!("failover_routing_control_updates_total", "outcome" => outcome).increment(1);
}

pub fn record_store_connected(connected: bool) {
    gauge!("failover_store_connected").set(if connected { 1.0 } else { 0.0 });
}
