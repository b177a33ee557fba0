use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use failover_coordinator::config::load_config;
use failover_coordinator::observability::logging;
use failover_coordinator::routing::{ArcClusterTransport, RoutingControlClient, RoutingControlState};

/// Exit code when the remote service did not accept an update or the state is unreadable.
const EXIT_REJECTED: u8 = 2;

#[derive(Parser)]
#[command(name = "routing-ctl")]
#[command(about = "Read or flip a routing control for manual failover", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Routing control ARN (defaults to ROUTING_CONTROL_ARN)
    #[arg(long)]
    control_arn: Option<String>,

    /// Cluster endpoint to talk to, by position in the configured list
    #[arg(long)]
    endpoint_index: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current state of the routing control
    Get,
    /// Request a new state for the routing control
    Set {
        /// on | off
        state: RoutingControlState,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init_logging(&config.observability.log_level);

    if let Some(arn) = cli.control_arn {
        config.routing.control_arn = arn;
    }
    if config.routing.control_arn.trim().is_empty() {
        eprintln!("Error: no routing control ARN given (use --control-arn or ROUTING_CONTROL_ARN)");
        return ExitCode::FAILURE;
    }

    let transport = Arc::new(ArcClusterTransport::new(&config.region).await);
    let mut client = match RoutingControlClient::new(&config.routing.cluster_endpoints, transport) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let index = cli.endpoint_index.unwrap_or(config.routing.endpoint_index);
    if let Err(e) = client.select_endpoint(index) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let arn = config.routing.control_arn.as_str();
    match cli.command {
        Commands::Get => {
            let state = client.get_state(arn).await;
            println!("{} = {} (via {})", arn, state, client.active_endpoint());
            if state == RoutingControlState::Unknown {
                return ExitCode::from(EXIT_REJECTED);
            }
        }
        Commands::Set { state } => {
            if client.set_state(arn, state).await {
                println!("✓ {} set to {}", arn, state);
            } else {
                eprintln!("✗ Failed to set {} to {}", arn, state);
                return ExitCode::from(EXIT_REJECTED);
            }
        }
    }

    ExitCode::SUCCESS
}
