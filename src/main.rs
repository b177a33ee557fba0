//! Multi-region failover coordinator
//!
//! Keeps a regional deployment's view of the shared transactional store
//! fresh and records periodic health facts there, gated on the region's
//! routing control being switched on.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────┐
//!                  │               FAILOVER COORDINATOR               │
//!                  │                                                  │
//!  Secret backend  │  ┌─────────────┐    ┌───────────────────┐        │
//!  ────────────────┼─▶│ credentials │───▶│ store::manager    │◀───────┼──── Database
//!                  │  │  resolver   │    │ (one connection)  │        │
//!                  │  └─────────────┘    └─────────┬─────────┘        │
//!                  │                                │                  │
//!                  │                                ▼                  │
//!  Routing cluster │  ┌─────────────┐    ┌───────────────────┐        │
//!  ────────────────┼─▶│  routing    │───▶│ health::monitor   │────────┼──▶ status lines
//!                  │  │  client     │    │ (tick loop)       │        │
//!                  │  └─────────────┘    └───────────────────┘        │
//!                  │                                                  │
//!                  │  config · lifecycle · observability · resilience │
//!                  └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use failover_coordinator::config::load_config;
use failover_coordinator::health::ConsoleReporter;
use failover_coordinator::lifecycle::{bootstrap, signals, Collaborators, Shutdown, StartupError};
use failover_coordinator::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "failover-coordinator")]
#[command(about = "Regional health recorder for multi-region failover", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds between health checks (overrides config)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Region label written to each record (overrides config)
    #[arg(short, long)]
    region: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(region) = cli.region.filter(|r| !r.trim().is_empty()) {
        config.region = region;
    }
    if let Some(interval) = cli.interval.filter(|i| *i > 0) {
        config.health_check.interval_secs = interval;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("failover-coordinator v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        region = %config.region,
        secret = %config.secrets.secret_name,
        driver = ?config.store.driver,
        routing = config.routing.is_enabled(),
        interval_secs = config.health_check.interval_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let startup_rx = shutdown.subscribe();
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(signals::wait_for_shutdown_signal(shutdown));

    let collaborators = Collaborators::from_config(&config).await;
    let mut health_loop =
        match bootstrap(&config, collaborators, ConsoleReporter, startup_rx).await {
            Ok(health_loop) => health_loop,
            Err(StartupError::Interrupted) => {
                tracing::info!("Shutdown requested before startup completed");
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                tracing::error!(error = %e, "Startup failed");
                eprintln!("✗ {}", e);
                return ExitCode::FAILURE;
            }
        };
    println!("✓ Connected to database");

    let interval = Duration::from_secs(config.health_check.interval_secs);
    let report = health_loop.run(interval, shutdown_rx).await;

    tracing::info!(ticks = report.ticks, exit = ?report.exit, "Shutdown complete");
    ExitCode::SUCCESS
}
