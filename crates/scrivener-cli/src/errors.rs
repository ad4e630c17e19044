//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use scrivener_config::ConfigError;
use scrivener_edit::EditError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to read {origin}: {source}")]
    ReadInput { origin: String, source: io::Error },
    #[error("failed to parse {origin}: {source}")]
    ParseInput {
        origin: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}
