//! Shared fixtures for sandbox tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::allow_list::AllowList;
use crate::error::SandboxError;
use crate::sandbox::PathSandbox;

/// Temporary layout with one allowed root and neighbouring directories.
///
/// ```text
/// <tmp>/data/notes.txt        allowed
/// <tmp>/data/sub/nested.txt   allowed
/// <tmp>/data-evil/notes.txt   sibling sharing a textual prefix
/// <tmp>/outside/secret.txt    outside the root
/// ```
pub struct SandboxWorld {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub sandbox: PathSandbox,
    pub checked: Option<Result<PathBuf, SandboxError>>,
}

impl SandboxWorld {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to allocate temporary directory");
        let root = temp_dir.path().join("data");
        write_fixture(&root.join("notes.txt"), "allowed");
        write_fixture(&root.join("sub").join("nested.txt"), "nested");
        write_fixture(&temp_dir.path().join("data-evil").join("notes.txt"), "evil");
        write_fixture(&temp_dir.path().join("outside").join("secret.txt"), "secret");

        let sandbox = PathSandbox::new(AllowList::new().allow_directory(&root));
        Self {
            temp_dir,
            root,
            sandbox,
            checked: None,
        }
    }

    /// Resolves a path relative to the temporary directory.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    pub fn check(&mut self, relative: &str) {
        let path = self.path(relative);
        self.checked = Some(self.sandbox.check(&path));
    }
}

pub fn write_fixture(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|error| panic!("failed to create {parent:?}: {error}"));
    }
    fs::write(path, contents)
        .unwrap_or_else(|error| panic!("failed to write fixture {path:?}: {error}"));
}
