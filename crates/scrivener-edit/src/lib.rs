//! Line-addressed file editing inside a path sandbox.
//!
//! The [`EditEngine`] accepts requests that replace inclusive line ranges,
//! insert text beside existing lines, or find and replace text. Each request
//! is validated in full before any file is touched, may take a timestamped
//! backup, and is written back through a [`ContentStore`].
//!
//! [`FileTools`] covers whole-file work under the same sandbox: reading,
//! writing, copying, moving, deleting, listing, and searching.
//!
//! ```no_run
//! use scrivener_edit::{DiskStore, EditEngine, EditFileRequest, EditOperation, SystemClock};
//! use scrivener_sandbox::{AllowList, PathSandbox};
//!
//! let sandbox = PathSandbox::new(AllowList::new().allow_directory("/tmp"));
//! let engine = EditEngine::new(&sandbox, &DiskStore, &SystemClock);
//! let request = EditFileRequest::new(
//!     "/tmp/notes.txt",
//!     vec![EditOperation::new(2, 3, "replacement\nlines")],
//! );
//! let message = engine.edit_file(&request)?;
//! println!("{message}");
//! # Ok::<(), scrivener_edit::EditError>(())
//! ```

mod backup;
mod buffer;
mod engine;
mod error;
mod files;
mod operation;
mod preview;
mod schedule;
mod store;
mod validate;

#[cfg(test)]
mod tests;

pub use backup::{BACKUP_TARGET, BackupManager, Clock, FixedClock, SystemClock};
pub use buffer::{LINE_SEPARATOR, LineBuffer, RangeError, normalize, split_lines};
pub use engine::{
    BatchFailure, BatchReport, ENGINE_TARGET, EditEngine, EditState, FileOutcome,
};
pub use error::{EditError, ErrorClass, ValidationError};
pub use files::{
    CreateDirectoryRequest, DEFAULT_READ_LINE_LIMIT, DeleteFileRequest, FILES_TARGET,
    FileInfoRequest, FileTools, FindInFilesRequest, ListDirectoryRequest, NO_MATCHES,
    ReadFileRequest, SearchFilesRequest, TRUNCATION_NOTICE, TransferRequest, WriteFileRequest,
    format_bytes, is_text_file,
};
pub use operation::{
    BatchEditRequest, EditBlockRequest, EditFileRequest, EditOperation, FileEditRequest,
    InsertTextRequest, ReplaceTextRequest, TextInsertion,
};
pub use preview::{character_diff, render_operations};
pub use schedule::{
    application_order, apply_insertions, apply_insertions_in_sequence, apply_operation,
    apply_operations,
};
pub use store::{ContentStore, DiskStore};
pub use validate::{check_range, validate_insertions, validate_operations};
