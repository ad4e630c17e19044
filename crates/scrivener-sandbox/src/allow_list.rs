//! Allow-list definition and builder helpers.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use scrivener_config::Config;
use tracing::warn;

use crate::sandbox::SANDBOX_TARGET;

/// Root directories under which file access is permitted.
///
/// Roots are recorded as given and canonicalised on first use. A root that
/// cannot be canonicalised (missing directory, dangling link) is dropped
/// with a warning rather than failing every later check.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    directories: Vec<PathBuf>,
    canonical: OnceLock<BTreeSet<PathBuf>>,
}

impl AllowList {
    /// Creates an empty allow-list. An empty list denies everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the allow-list described by the resolved configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        config
            .allowed_directories()
            .into_iter()
            .fold(Self::new(), Self::allow_directory)
    }

    /// Grants access to `path` and everything beneath it.
    #[must_use]
    pub fn allow_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.directories.push(path.into());
        self.canonical = OnceLock::new();
        self
    }

    /// Roots exactly as they were supplied.
    #[must_use]
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Canonical forms of every root that resolved.
    pub(crate) fn canonical_roots(&self) -> &BTreeSet<PathBuf> {
        self.canonical.get_or_init(|| {
            let mut roots = BTreeSet::new();
            for directory in &self.directories {
                match fs::canonicalize(directory) {
                    Ok(root) => {
                        roots.insert(root);
                    }
                    Err(error) => warn!(
                        target: SANDBOX_TARGET,
                        root = %directory.display(),
                        %error,
                        "skipping allowed directory that cannot be resolved"
                    ),
                }
            }
            roots
        })
    }
}
