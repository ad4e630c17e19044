//! Log output for the `scrivener` binary.
//!
//! Events are written to stderr so that stdout carries only command results.
//! The subscriber is installed at most once per process.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use scrivener_config::{Config, LogFormat};
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Failures while installing the log subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// `log_filter` is not a valid `tracing` directive list.
    #[error("log filter '{filter}' is invalid: {message}")]
    InvalidFilter {
        /// The rejected expression.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Something else already owns the global subscriber.
    #[error("a global log subscriber is already installed: {0}")]
    AlreadyInstalled(#[source] SetGlobalDefaultError),
}

/// Installs the global subscriber described by `config`.
///
/// Only the first successful call has an effect; a failed call installs
/// nothing and may be retried.
///
/// # Errors
///
/// Fails when the filter does not parse or another subscriber is already
/// installed.
pub fn initialise(config: &Config) -> Result<(), TelemetryError> {
    INSTALLED.get_or_try_init(|| install(config)).map(|&()| ())
}

fn install(config: &Config) -> Result<(), TelemetryError> {
    let filter = parse_filter(config.log_filter())?;
    let timer = UtcTime::rfc_3339();
    let events = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(timer);

    let registry = Registry::default().with(filter);
    let installed = match config.log_format() {
        LogFormat::Json => {
            let subscriber = registry.with(events.json().flatten_event(true));
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Compact => tracing::subscriber::set_global_default(registry.with(events.compact())),
    };
    installed.map_err(TelemetryError::AlreadyInstalled)
}

fn parse_filter(filter: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(filter).map_err(|error| TelemetryError::InvalidFilter {
        filter: filter.to_owned(),
        message: error.to_string(),
    })
}
