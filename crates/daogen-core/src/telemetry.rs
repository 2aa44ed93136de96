//! Logging initialisation.
//!
//! The generator is a batch tool, so only a `tracing` subscriber with an
//! environment filter and a console layer is installed.

#[cfg(feature = "logging")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::DaogenResult;
use serde::{Deserialize, Serialize};

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,

    /// Include the event target (module path) in each line.
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

fn default_filter() -> String {
    "info,daogen=debug".to_string()
}

fn default_with_target() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
            with_target: default_with_target(),
        }
    }
}

/// Installs the global `tracing` subscriber.
///
/// Fails if a global subscriber is already installed.
#[cfg(feature = "logging")]
pub fn init_logging(config: &LoggingConfig) -> DaogenResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(config.with_target))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(config.with_target))
            .try_init()
    };

    installed.map_err(|e| crate::DaogenError::internal(format!("Failed to install logger: {e}")))
}

/// Placeholder for when the logging feature is disabled.
#[cfg(not(feature = "logging"))]
pub fn init_logging(_config: &LoggingConfig) -> DaogenResult<()> {
    Ok(())
}
