//! Error types for the edit engine.
//!
//! Every failure carries enough context to name the file, and where one is
//! involved the operation, that caused it. [`EditError::class`] groups
//! variants so callers can distinguish policy refusals, bad input, and I/O.

use std::path::PathBuf;

use scrivener_sandbox::SandboxError;
use thiserror::Error;

use crate::buffer::RangeError;

/// A problem with the operations of one request, found before any write.
///
/// Operation and insertion numbers are one-based positions in the request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Line numbers are not positive or the range is inverted.
    #[error(
        "operation {operation}: invalid line range {start_line}-{end_line} \
         (line numbers must be positive and start_line must not exceed end_line)"
    )]
    InvalidRange {
        operation: usize,
        start_line: usize,
        end_line: usize,
    },

    /// The range reaches past the last line.
    #[error("operation {operation}: lines {start_line}-{end_line} exceed file length ({line_count} lines)")]
    OutOfBounds {
        operation: usize,
        start_line: usize,
        end_line: usize,
        line_count: usize,
    },

    /// Two operations share at least one line.
    #[error("operations {first} and {second} overlap")]
    OverlappingOperations { first: usize, second: usize },

    /// An insertion anchor is not an existing line.
    #[error("insertion {insertion}: line {line} is outside the file ({line_count} lines)")]
    InvalidInsertion {
        insertion: usize,
        line: usize,
        line_count: usize,
    },
}

impl ValidationError {
    /// Classifies a range that did not fit while applying an operation.
    pub(crate) const fn from_range(operation: usize, error: RangeError) -> Self {
        if error.start == 0 || error.end < error.start {
            Self::InvalidRange {
                operation,
                start_line: error.start,
                end_line: error.end,
            }
        } else {
            Self::OutOfBounds {
                operation,
                start_line: error.start,
                end_line: error.end,
                line_count: error.line_count,
            }
        }
    }
}

/// Broad category of an [`EditError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The sandbox refused the path.
    Policy,
    /// The request itself is malformed.
    Validation,
    /// Reading, backing up, or writing failed.
    Io,
}

/// Errors surfaced by the edit engine.
#[derive(Debug, Error)]
pub enum EditError {
    /// The sandbox refused the path.
    #[error("access to path {path} is not allowed")]
    PathNotAllowed {
        /// Path as supplied by the caller.
        path: PathBuf,
    },

    /// The file could not be resolved or read as UTF-8 text.
    #[error("file {path} is not accessible: {message}")]
    FileUnreadable {
        /// Path to the file.
        path: PathBuf,
        /// Description of the underlying failure.
        message: String,
    },

    /// The request's operations failed validation.
    #[error("invalid operations in file {path}: {source}")]
    Validation {
        /// Path to the file.
        path: PathBuf,
        /// The first problem found.
        #[source]
        source: ValidationError,
    },

    /// The backup copy could not be written.
    #[error("failed to create backup for {path}: {message}")]
    BackupFailed {
        /// Path to the file being backed up.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The edited content could not be written.
    #[error("failed to write file {path}: {message}")]
    WriteFailed {
        /// Path to the file.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// A per-operation write failed in non-atomic mode.
    #[error("failed to write file {path} at operation {operation}: {message}")]
    OperationWriteFailed {
        /// Path to the file.
        path: PathBuf,
        /// One-based position of the operation in the request.
        operation: usize,
        /// Description of the I/O error.
        message: String,
    },

    /// A replacement was requested with nothing to find.
    #[error("find text cannot be empty")]
    EmptyPattern,

    /// The find pattern does not compile.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Compiler diagnostic.
        message: String,
    },

    /// A glob does not compile.
    #[error("invalid file pattern '{pattern}': {message}")]
    InvalidGlob {
        /// The rejected glob.
        pattern: String,
        /// Compiler diagnostic.
        message: String,
    },

    /// Directory permissions are not an octal mode.
    #[error("invalid permissions '{value}': expected an octal mode such as 0755")]
    InvalidPermissions {
        /// The rejected value.
        value: String,
    },

    /// A copy or move would replace an existing entry without `overwrite`.
    #[error("destination {path} exists and overwrite is false")]
    DestinationExists {
        /// The existing destination.
        path: PathBuf,
    },

    /// An allowed root may not be deleted or moved.
    #[error("refusing to remove allowed directory {path}")]
    RootProtected {
        /// Path as supplied by the caller.
        path: PathBuf,
    },

    /// A filesystem call made by a file tool failed.
    #[error("failed to {action} {path}: {message}")]
    FileOperationFailed {
        /// What was being attempted, such as `list` or `delete`.
        action: &'static str,
        /// Path as supplied by the caller.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// An atomic batch stopped at one file and left every file unchanged.
    #[error("batch aborted at file {file}: {source}")]
    BatchAborted {
        /// One-based position of the failing file in the batch.
        file: usize,
        /// What went wrong with that file.
        #[source]
        source: Box<EditError>,
    },
}

impl EditError {
    /// Creates a read error.
    pub fn file_unreadable(path: PathBuf, error: &std::io::Error) -> Self {
        Self::FileUnreadable {
            path,
            message: error.to_string(),
        }
    }

    /// Creates a backup error.
    pub fn backup_failed(path: PathBuf, error: &std::io::Error) -> Self {
        Self::BackupFailed {
            path,
            message: error.to_string(),
        }
    }

    /// Creates a write error.
    pub fn write_failed(path: PathBuf, error: &std::io::Error) -> Self {
        Self::WriteFailed {
            path,
            message: error.to_string(),
        }
    }

    /// Creates a file tool error.
    pub fn file_operation(action: &'static str, path: PathBuf, error: &std::io::Error) -> Self {
        Self::FileOperationFailed {
            action,
            path,
            message: error.to_string(),
        }
    }

    /// Wraps a validation failure with its file.
    pub fn validation(path: PathBuf, source: ValidationError) -> Self {
        Self::Validation { path, source }
    }

    /// Maps a sandbox refusal, keeping the caller's spelling of the path.
    ///
    /// The sandbox only reports canonicalisation failures for paths inside a
    /// root, so those surface as [`EditError::FileUnreadable`].
    pub fn from_sandbox(requested: PathBuf, error: SandboxError) -> Self {
        match error {
            SandboxError::PathNotAllowed { .. } => Self::PathNotAllowed { path: requested },
            SandboxError::CanonicalisationFailed { source, .. } => {
                Self::file_unreadable(requested, &source)
            }
        }
    }

    /// Broad category of this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::PathNotAllowed { .. } | Self::RootProtected { .. } => ErrorClass::Policy,
            Self::Validation { .. }
            | Self::EmptyPattern
            | Self::InvalidPattern { .. }
            | Self::InvalidGlob { .. }
            | Self::InvalidPermissions { .. }
            | Self::DestinationExists { .. } => ErrorClass::Validation,
            Self::FileUnreadable { .. }
            | Self::BackupFailed { .. }
            | Self::WriteFailed { .. }
            | Self::OperationWriteFailed { .. }
            | Self::FileOperationFailed { .. } => ErrorClass::Io,
            Self::BatchAborted { source, .. } => source.class(),
        }
    }
}
