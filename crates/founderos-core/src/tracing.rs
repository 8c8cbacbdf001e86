//! Tracing setup for founderos.
//!
//! One place to install the global subscriber for the CLI.
//!
//! ```ignore
//! use founderos_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::cli())?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// How much the CLI logs to stderr.
///
/// Output is always compact and untimed; `RUST_LOG` takes precedence over
/// `default_level`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for the founderos crates when `RUST_LOG` is not set
    pub default_level: Level,
    /// Whether to include file/line information in logs
    pub include_location: bool,
    /// Whether to include target (module path) in logs
    pub include_target: bool,
}

impl TracingConfig {
    /// Quiet CLI defaults: warnings only, no target or location.
    #[must_use]
    pub fn cli() -> Self {
        Self {
            default_level: Level::WARN,
            include_location: false,
            include_target: false,
        }
    }

    /// CLI with `--debug`: everything from `debug` up, with source locations.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            include_target: true,
        }
    }

    /// Filter directive used when `RUST_LOG` is unset.
    ///
    /// Targets are matched by prefix, so this covers every `founderos_*` crate.
    pub fn default_directive(&self) -> String {
        format!("founderos={}", self.default_level).to_lowercase()
    }
}

/// Installs the global subscriber described by `config`.
///
/// Call once at start-up.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set or if
/// the default directive cannot be parsed.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.default_directive())?,
    };

    let layer = fmt::layer()
        .compact()
        .without_time()
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_target(config.include_target);

    let subscriber = tracing_subscriber::registry().with(env_filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
