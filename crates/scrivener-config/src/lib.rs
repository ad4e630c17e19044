//! Shared configuration for the Scrivener editing tools.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, then an
//! optional configuration file (`--config-path`), then `SCRIVENER_*`
//! environment variables, then command-line flags. The resolved [`Config`] is
//! a plain value handed to the sandbox and the edit engine; nothing in the
//! workspace keeps a process-wide copy.

mod defaults;
mod logging;

use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_ALLOWED_DIRECTORIES, DEFAULT_FILE_READ_LINE_LIMIT, DEFAULT_LOG_FILTER, default_allowed_directories,
    default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration resolved from every layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SCRIVENER")]
pub struct Config {
    /// Roots under which file operations are permitted.
    ///
    /// Entries from every layer are appended. When no layer supplies a root
    /// the [`DEFAULT_ALLOWED_DIRECTORIES`] apply.
    #[serde(default)]
    pub allowed_directories: Vec<PathBuf>,
    /// `tracing` filter expression (for example `scrivener_edit=debug`).
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log events.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Lines one `read-file` call returns before truncating its output.
    #[ortho_config(default = DEFAULT_FILE_READ_LINE_LIMIT)]
    pub file_read_line_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_directories: Vec::new(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            file_read_line_limit: DEFAULT_FILE_READ_LINE_LIMIT,
        }
    }
}

impl Config {
    /// Roots the sandbox should be built from.
    #[must_use]
    pub fn allowed_directories(&self) -> Vec<PathBuf> {
        if self.allowed_directories.is_empty() {
            default_allowed_directories()
        } else {
            self.allowed_directories.clone()
        }
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Line limit for file reads.
    #[must_use]
    pub const fn file_read_line_limit(&self) -> usize {
        self.file_read_line_limit
    }

    /// Returns a copy with `directory` added to the allow-list.
    ///
    /// Adding a root that is already present is a no-op.
    #[must_use]
    pub fn with_allowed_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        if !self.allowed_directories.contains(&directory) {
            self.allowed_directories.push(directory);
        }
        self
    }

    /// Returns a copy with `directory` removed from the allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownDirectory`] when the root is not listed.
    pub fn without_allowed_directory(mut self, directory: &Path) -> Result<Self, ConfigError> {
        let before = self.allowed_directories.len();
        self.allowed_directories.retain(|entry| entry != directory);
        if self.allowed_directories.len() == before {
            return Err(ConfigError::UnknownDirectory {
                path: directory.to_path_buf(),
            });
        }
        Ok(self)
    }

    /// Checks the resolved allow-list before it is used to build a sandbox.
    ///
    /// # Errors
    ///
    /// Fails when the effective allow-list is empty or holds a relative root,
    /// or when the read line limit is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_read_line_limit == 0 {
            return Err(ConfigError::ZeroReadLineLimit);
        }
        let roots = self.allowed_directories();
        if roots.is_empty() {
            return Err(ConfigError::EmptyAllowList);
        }
        match roots.into_iter().find(|root| !root.is_absolute()) {
            Some(path) => Err(ConfigError::RelativeDirectory { path }),
            None => Ok(()),
        }
    }
}

/// Problems with a resolved configuration value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No allow-list root is configured.
    #[error("the allowed directory list is empty")]
    EmptyAllowList,
    /// An allow-list root is relative and would depend on the working directory.
    #[error("allowed directory '{path}' must be an absolute path")]
    RelativeDirectory { path: PathBuf },
    /// A read line limit of zero would truncate every read to nothing.
    #[error("file_read_line_limit must be at least 1")]
    ZeroReadLineLimit,
    /// A removal named a root that is not on the allow-list.
    #[error("directory '{path}' is not in the allowed directory list")]
    UnknownDirectory { path: PathBuf },
}
