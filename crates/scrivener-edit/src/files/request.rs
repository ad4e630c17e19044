//! Request types for the file tools.
//!
//! Like the edit requests these deserialise from JSON, and omitted fields take
//! the documented defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const fn enabled() -> bool {
    true
}

const fn first_line() -> usize {
    1
}

const fn unbounded_depth() -> i64 {
    -1
}

fn default_permissions() -> String {
    String::from("0755")
}

fn any_file() -> String {
    String::from("*")
}

/// Reads a file as text, optionally a window of its lines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReadFileRequest {
    /// File to read.
    pub path: PathBuf,
    /// First line returned (one-based). Defaults to `1`.
    #[serde(default = "first_line")]
    pub offset: usize,
    /// Number of lines returned; zero means through the end of the file.
    #[serde(default)]
    pub length: usize,
    /// Prefix each line with its number. Defaults to `false`.
    #[serde(default)]
    pub show_line_numbers: bool,
}

impl ReadFileRequest {
    /// Reads the whole file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: first_line(),
            length: 0,
            show_line_numbers: false,
        }
    }
}

/// Writes or appends text, creating the file and its parents as needed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WriteFileRequest {
    /// File to write.
    pub path: PathBuf,
    /// Text to write.
    pub content: String,
    /// Add to the end of the file instead of replacing it. Defaults to `false`.
    #[serde(default)]
    pub append: bool,
    /// Copy an existing file aside first. Defaults to `false`.
    #[serde(default)]
    pub create_backup: bool,
}

impl WriteFileRequest {
    /// Replaces the file's content without a backup.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            append: false,
            create_backup: false,
        }
    }
}

/// Creates a directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreateDirectoryRequest {
    /// Directory to create.
    pub path: PathBuf,
    /// Create missing parents too. Defaults to `true`.
    #[serde(default = "enabled")]
    pub create_parents: bool,
    /// Octal permission bits, applied on Unix. Defaults to `"0755"`.
    #[serde(default = "default_permissions")]
    pub permissions: String,
}

impl CreateDirectoryRequest {
    /// Creates the directory and its parents with mode `0755`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_parents: true,
            permissions: default_permissions(),
        }
    }
}

/// Lists a directory's entries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListDirectoryRequest {
    /// Directory to list.
    pub path: PathBuf,
    /// Show entries whose names start with a dot. Defaults to `false`.
    #[serde(default)]
    pub include_hidden: bool,
    /// Descend into subdirectories. Defaults to `false`.
    #[serde(default)]
    pub recursive: bool,
}

impl ListDirectoryRequest {
    /// Lists the visible entries directly inside `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            include_hidden: false,
            recursive: false,
        }
    }
}

/// Finds entries whose names match a glob or contain a substring.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchFilesRequest {
    /// Directory searched.
    pub directory: PathBuf,
    /// Glob, or plain text the name must contain.
    pub pattern: String,
    /// Defaults to `false`.
    #[serde(default)]
    pub case_sensitive: bool,
    /// Report matching directories as well as files. Defaults to `false`.
    #[serde(default)]
    pub include_directories: bool,
    /// Levels below `directory` to descend; zero searches only its direct
    /// entries and a negative value is unbounded. Defaults to `-1`.
    #[serde(default = "unbounded_depth")]
    pub max_depth: i64,
}

impl SearchFilesRequest {
    /// Searches every level for files, ignoring case.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            pattern: pattern.into(),
            case_sensitive: false,
            include_directories: false,
            max_depth: unbounded_depth(),
        }
    }

    /// Depth limit, or `None` when unbounded.
    #[must_use]
    pub fn depth_limit(&self) -> Option<usize> {
        usize::try_from(self.max_depth).ok()
    }
}

/// Describes one file or directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileInfoRequest {
    /// Entry to describe.
    pub path: PathBuf,
}

impl FileInfoRequest {
    /// Describes `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Copies or moves a file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TransferRequest {
    /// Existing file.
    pub source: PathBuf,
    /// Where the file goes. Missing parent directories are created.
    pub destination: PathBuf,
    /// Replace an existing destination. Defaults to `false`.
    #[serde(default)]
    pub overwrite: bool,
}

impl TransferRequest {
    /// Transfers without overwriting.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            overwrite: false,
        }
    }
}

/// Deletes a file or directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeleteFileRequest {
    /// Entry to delete.
    pub path: PathBuf,
    /// Delete a non-empty directory with its contents. Defaults to `false`.
    #[serde(default)]
    pub recursive: bool,
    /// Copy a file aside before deleting it. Directories are never backed up.
    /// Defaults to `false`.
    #[serde(default)]
    pub create_backup: bool,
}

impl DeleteFileRequest {
    /// Deletes a file or empty directory without a backup.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recursive: false,
            create_backup: false,
        }
    }
}

/// Searches the text files under a directory for a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FindInFilesRequest {
    /// Directory searched, recursively.
    pub directory: PathBuf,
    /// Text to find. Must not be empty.
    pub pattern: String,
    /// Glob the file name must match. Defaults to `"*"`.
    #[serde(default = "any_file")]
    pub file_pattern: String,
    /// Defaults to `false`.
    #[serde(default)]
    pub case_sensitive: bool,
    /// Lines shown on each side of a match. Defaults to `0`.
    #[serde(default)]
    pub context_lines: usize,
}

impl FindInFilesRequest {
    /// Searches every text file, ignoring case, without context.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            pattern: pattern.into(),
            file_pattern: any_file(),
            case_sensitive: false,
            context_lines: 0,
        }
    }
}
