//! Shared fixtures for engine tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use mockall::mock;
use scrivener_sandbox::{AllowList, PathSandbox};
use tempfile::TempDir;

use crate::backup::FixedClock;
use crate::store::{ContentStore, DiskStore};

/// Timestamp every test backup carries.
pub(crate) const BACKUP_SECONDS: u64 = 1_700_000_000;

/// Clock used by engine tests.
pub(crate) const CLOCK: FixedClock = FixedClock(BACKUP_SECONDS);

mock! {
    pub Store {}
    impl ContentStore for Store {
        fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
        fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
        fn create_new(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
    }
}

/// Temporary layout with one allowed root and one directory outside it.
///
/// ```text
/// <tmp>/work/      allowed
/// <tmp>/outside/   denied
/// ```
pub(crate) struct Workspace {
    _temp_dir: TempDir,
    root: PathBuf,
    outside: PathBuf,
    sandbox: PathSandbox,
}

impl Workspace {
    pub(crate) fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let base = fs::canonicalize(temp_dir.path()).expect("canonicalise temp dir");
        let root = base.join("work");
        let outside = base.join("outside");
        fs::create_dir_all(&root).expect("create work dir");
        fs::create_dir_all(&outside).expect("create outside dir");
        let sandbox = PathSandbox::new(AllowList::new().allow_directory(&root));
        Self {
            _temp_dir: temp_dir,
            root,
            outside,
            sandbox,
        }
    }

    pub(crate) const fn sandbox(&self) -> &PathSandbox {
        &self.sandbox
    }

    /// Path of `name` inside the allowed root.
    pub(crate) fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Creates `name` inside the allowed root.
    pub(crate) fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    /// Path of `name` outside the allowed root.
    pub(crate) fn outside_path(&self, name: &str) -> PathBuf {
        self.outside.join(name)
    }

    /// Creates `name` outside the allowed root.
    pub(crate) fn write_outside(&self, name: &str, content: &str) -> PathBuf {
        let path = self.outside_path(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    pub(crate) fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).expect("read fixture")
    }

    /// Where the test clock puts the backup of `name`.
    pub(crate) fn backup_path(&self, name: &str) -> PathBuf {
        self.path(&format!("{name}.backup.{BACKUP_SECONDS}"))
    }

    /// Names of every backup in the allowed root.
    pub(crate) fn backups(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.root)
            .expect("list work dir")
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.contains(".backup."))
            .collect();
        names.sort();
        names
    }
}

/// Disk store whose writes to one file fail.
///
/// Records every path it wrote, in order, including rollback writes.
pub(crate) struct FailingWrites {
    fail_on: PathBuf,
    written: Mutex<Vec<PathBuf>>,
}

impl FailingWrites {
    pub(crate) fn new(fail_on: PathBuf) -> Self {
        Self {
            fail_on,
            written: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn written(&self) -> Vec<PathBuf> {
        self.written.lock().expect("written lock").clone()
    }
}

impl ContentStore for FailingWrites {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        DiskStore.read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if path == self.fail_on {
            return Err(io::Error::other("disk full"));
        }
        self.written
            .lock()
            .expect("written lock")
            .push(path.to_path_buf());
        DiskStore.write(path, contents)
    }

    fn create_new(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        DiskStore.create_new(path, contents)
    }
}
