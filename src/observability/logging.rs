//! Structured logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default directive used when neither `RUST_LOG` nor a configured level applies.
pub const DEFAULT_DIRECTIVE: &str = "failover_coordinator=info";

/// Build the filter: `RUST_LOG` wins, then the configured level.
pub fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = if log_level.trim().is_empty() {
            DEFAULT_DIRECTIVE.to_string()
        } else {
            format!("failover_coordinator={}", log_level.trim())
        };
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
    })
}

/// Install the global tracing subscriber. Call once, from the binary.
pub fn init_logging(log_level: &str) {
    let installed = tracing_subscriber::registry()
        .with(build_filter(log_level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
