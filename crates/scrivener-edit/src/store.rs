//! Storage seam for file content.
//!
//! The engine performs every read and write through [`ContentStore`], so tests
//! can substitute stores that fail at chosen points.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Reads and writes whole files.
pub trait ContentStore: Send + Sync {
    /// Returns the file's bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replaces the file's content.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Creates a file that must not already exist.
    fn create_new(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// Store backed by the local filesystem.
///
/// Writes go to a temporary file beside the target which is then renamed over
/// it, so readers never see a partially written file. The target's
/// permissions are carried over to the replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskStore;

impl ContentStore for DiskStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
        temp_file.write_all(contents)?;
        temp_file.as_file().sync_all()?;
        if let Ok(metadata) = fs::metadata(path) {
            temp_file.as_file().set_permissions(metadata.permissions())?;
        }
        temp_file.persist(path).map_err(|err| err.error)?;
        Ok(())
    }

    fn create_new(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        file.write_all(contents)?;
        file.sync_all()
    }
}
