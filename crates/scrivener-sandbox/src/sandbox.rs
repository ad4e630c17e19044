//! Canonical containment checks.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::allow_list::AllowList;
use crate::error::SandboxError;

/// Tracing target for sandbox decisions.
pub const SANDBOX_TARGET: &str = "scrivener_sandbox";

/// Decides whether filesystem paths fall inside the configured allow-list.
#[derive(Debug, Clone, Default)]
pub struct PathSandbox {
    allow_list: AllowList,
}

impl PathSandbox {
    /// Creates a sandbox enforcing `allow_list`.
    #[must_use]
    pub fn new(allow_list: AllowList) -> Self {
        Self { allow_list }
    }

    /// Returns true when `path` resolves inside an allowed root.
    #[must_use]
    pub fn is_allowed(&self, path: &Path) -> bool {
        self.check(path).is_ok()
    }

    /// Resolves `path` and returns its canonical form when it is allowed.
    ///
    /// The canonical path equals an allowed root or descends from one. The
    /// comparison works on path components, so sibling directories sharing a
    /// textual prefix with a root are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::PathNotAllowed`] when the path resolves, or
    /// would resolve, outside every root. Returns
    /// [`SandboxError::CanonicalisationFailed`] only for a path inside a root
    /// that cannot be resolved, such as a missing file. Whether something
    /// exists outside the roots is never revealed.
    pub fn check(&self, path: &Path) -> Result<PathBuf, SandboxError> {
        match fs::canonicalize(path) {
            Ok(canonical) => self.admit(path, canonical),
            Err(source) => match resolve_missing(path) {
                Some(resolved) if self.contains(&resolved) => {
                    Err(SandboxError::CanonicalisationFailed {
                        path: path.to_path_buf(),
                        source,
                    })
                }
                _ => Err(refuse(path, None)),
            },
        }
    }

    /// Resolves a path that may not exist yet, such as a file about to be
    /// created.
    ///
    /// The deepest existing ancestor is canonicalised and the missing
    /// components are appended to it. Missing components may not contain
    /// `..`.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::PathNotAllowed`] when the resolved path lies
    /// outside every root or cannot be resolved at all. A dangling symbolic
    /// link is refused, since writing through it would land wherever it
    /// points.
    pub fn check_target(&self, path: &Path) -> Result<PathBuf, SandboxError> {
        match fs::canonicalize(path) {
            Ok(canonical) => self.admit(path, canonical),
            Err(_) if fs::symlink_metadata(path).is_ok() => Err(refuse(path, None)),
            Err(_) => match resolve_missing(path) {
                Some(resolved) => self.admit(path, resolved),
                None => Err(refuse(path, None)),
            },
        }
    }

    fn admit(&self, path: &Path, resolved: PathBuf) -> Result<PathBuf, SandboxError> {
        if self.contains(&resolved) {
            Ok(resolved)
        } else {
            Err(refuse(path, Some(&resolved)))
        }
    }

    fn contains(&self, resolved: &Path) -> bool {
        self.allow_list
            .canonical_roots()
            .iter()
            .any(|root| resolved.starts_with(root))
    }

    /// Returns true when `canonical` is one of the allowed roots itself.
    #[must_use]
    pub fn is_root(&self, canonical: &Path) -> bool {
        self.allow_list.canonical_roots().contains(canonical)
    }

    /// The allow-list this sandbox enforces.
    #[must_use]
    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }
}

/// Canonicalises the deepest existing ancestor of `path` and appends the
/// components below it.
///
/// Returns `None` when no ancestor resolves or a missing component is not a
/// plain name.
fn resolve_missing(path: &Path) -> Option<PathBuf> {
    let absolute = std::path::absolute(path).ok()?;
    let mut missing = Vec::new();
    let mut ancestor = absolute.as_path();
    loop {
        if let Ok(base) = fs::canonicalize(ancestor) {
            return Some(missing.iter().rev().fold(base, |resolved, name| resolved.join(name)));
        }
        missing.push(ancestor.file_name()?);
        ancestor = ancestor.parent()?;
    }
}

fn refuse(path: &Path, resolved: Option<&Path>) -> SandboxError {
    debug!(
        target: SANDBOX_TARGET,
        requested = %path.display(),
        resolved = ?resolved,
        "path rejected by allow-list"
    );
    SandboxError::PathNotAllowed {
        path: path.to_path_buf(),
    }
}
