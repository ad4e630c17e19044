//! Timestamped backup copies.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::error::EditError;
use crate::store::ContentStore;

/// Tracing target for backup events.
pub const BACKUP_TARGET: &str = "scrivener_edit::backup";

/// Source of the timestamp embedded in backup names.
pub trait Clock: Send + Sync {
    /// Whole seconds since the Unix epoch.
    fn unix_seconds(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn unix_seconds(&self) -> u64 {
        self.0
    }
}

/// Copies files aside before they are rewritten.
///
/// A backup of `P` is written to `P.backup.<unix seconds>` with the exact
/// bytes `P` held. Backups are never overwritten and never removed.
#[derive(Clone, Copy)]
pub struct BackupManager<'a> {
    store: &'a dyn ContentStore,
    clock: &'a dyn Clock,
}

impl<'a> BackupManager<'a> {
    /// Creates a manager writing through `store`.
    #[must_use]
    pub fn new(store: &'a dyn ContentStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Name the next backup of `path` would take.
    #[must_use]
    pub fn backup_path(&self, path: &Path) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(format!(".backup.{}", self.clock.unix_seconds()));
        PathBuf::from(name)
    }

    /// Copies `path` to its backup location and returns that location.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::BackupFailed`] if the source cannot be read or the
    /// backup file already exists or cannot be written.
    pub fn create(&self, path: &Path) -> Result<PathBuf, EditError> {
        let contents = self
            .store
            .read(path)
            .map_err(|err| EditError::backup_failed(path.to_path_buf(), &err))?;
        let target = self.backup_path(path);
        self.store
            .create_new(&target, &contents)
            .map_err(|err| EditError::backup_failed(path.to_path_buf(), &err))?;
        info!(
            target: BACKUP_TARGET,
            file = %path.display(),
            backup = %target.display(),
            bytes = contents.len(),
            "backup created"
        );
        Ok(target)
    }
}

impl std::fmt::Debug for BackupManager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupManager").finish_non_exhaustive()
    }
}
