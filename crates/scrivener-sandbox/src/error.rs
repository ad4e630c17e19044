//! Domain errors raised by the path sandbox.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Reasons a path was refused by the sandbox.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The canonical path lies outside every allowed root.
    #[error("access to {path} is not allowed")]
    PathNotAllowed { path: PathBuf },

    /// Canonicalisation of the requested path failed.
    #[error("failed to canonicalise {path}: {source}")]
    CanonicalisationFailed { path: PathBuf, source: io::Error },
}

impl SandboxError {
    /// Path the caller originally supplied.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::PathNotAllowed { path } | Self::CanonicalisationFailed { path, .. } => path,
        }
    }
}
