//! Logging setup

use crate::error::WellnessError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`. Output goes to stderr so
/// it never mixes with command output on stdout.
pub fn init_logging(default_level: &str) -> Result<(), WellnessError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| WellnessError::Config(format!("invalid log filter: {}", e)))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| WellnessError::Config(format!("logging already initialised: {}", e)))
}
