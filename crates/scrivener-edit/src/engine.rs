//! The edit engine: drives one request through validation, backup, application,
//! and writing.
//!
//! Every request follows the same states, `validating`, `backing_up`,
//! `applying`, `writing`, and ends `done` or `failed`. Transitions are logged
//! under [`ENGINE_TARGET`] inside a span per request.

mod batch;
mod insert;
mod replace;


use std::path::{Path, PathBuf};

use scrivener_sandbox::PathSandbox;
use tracing::{debug, info_span, warn};

pub use self::batch::{BatchFailure, BatchReport, FileOutcome};
use crate::backup::{BackupManager, Clock};
use crate::buffer::LineBuffer;
use crate::error::{EditError, ValidationError};
use crate::operation::{EditBlockRequest, EditFileRequest};
use crate::preview::{character_diff, render_operations};
use crate::schedule::{application_order, apply_operation, apply_operations};
use crate::store::ContentStore;
use crate::validate::{check_range, validate_operations};

/// Tracing target for engine state transitions.
pub const ENGINE_TARGET: &str = "scrivener_edit::engine";

/// Stages a request passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum EditState {
    /// Checking ranges, overlaps, or insertion anchors.
    Validating,
    /// Copying the original content aside.
    BackingUp,
    /// Splicing the buffer in memory.
    Applying,
    /// Persisting the edited content.
    Writing,
    /// The request completed.
    Done,
    /// The request stopped on an error.
    Failed,
}

/// A file read through the sandbox, ready to edit.
#[derive(Debug, Clone)]
pub(crate) struct Document {
    /// Path as the caller spelled it, used in messages.
    pub(crate) requested: PathBuf,
    /// Canonical path, used for I/O.
    pub(crate) canonical: PathBuf,
    /// Content exactly as read.
    pub(crate) original: String,
    /// The content split into lines.
    pub(crate) buffer: LineBuffer,
}

impl Document {
    pub(crate) fn validation(&self, source: ValidationError) -> EditError {
        EditError::validation(self.requested.clone(), source)
    }
}

/// Applies line-addressed edits to files inside a sandbox.
///
/// The engine holds no state between requests. Each request reads its files
/// afresh, edits them in memory, and writes them back through the
/// [`ContentStore`].
pub struct EditEngine<'a> {
    sandbox: &'a PathSandbox,
    store: &'a dyn ContentStore,
    backups: BackupManager<'a>,
}

impl<'a> EditEngine<'a> {
    /// Creates an engine over the given collaborators.
    #[must_use]
    pub fn new(
        sandbox: &'a PathSandbox,
        store: &'a dyn ContentStore,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            sandbox,
            store,
            backups: BackupManager::new(store, clock),
        }
    }

    /// Applies `request.operations` to one file.
    ///
    /// With `show_preview` the rendered preview is returned and nothing is
    /// written. The preview lists operations in request order, not in the
    /// bottom-up order they are applied in. In atomic mode the file is written once; otherwise it is
    /// written after each operation, bottom-up, and a failure leaves earlier
    /// writes in place.
    ///
    /// # Errors
    ///
    /// Returns an [`EditError`] naming the file, and the operation where one
    /// is at fault.
    pub fn edit_file(&self, request: &EditFileRequest) -> Result<String, EditError> {
        let span = info_span!(
            target: ENGINE_TARGET,
            "edit_file",
            file = %request.path.display(),
            operations = request.operations.len(),
            atomic = request.atomic,
        );
        let _entered = span.enter();
        finish(self.run_edit_file(request))
    }

    fn run_edit_file(&self, request: &EditFileRequest) -> Result<String, EditError> {
        let document = self.open(&request.path)?;
        if request.validate_operations {
            transition(EditState::Validating);
            validate_operations(&document.buffer, &request.operations)
                .map_err(|source| document.validation(source))?;
        }

        if request.show_preview {
            let preview = render_operations(&document.buffer, &request.operations);
            return Ok(format!(
                "Preview of changes for {}:\n{preview}",
                request.path.display()
            ));
        }

        if request.operations.is_empty() {
            return Ok(applied_message(0, &request.path));
        }

        if request.create_backup {
            self.backup(&document)?;
        }

        if request.atomic {
            transition(EditState::Applying);
            let edited = apply_operations(&document.buffer, &request.operations)
                .map_err(|source| document.validation(source))?;
            self.write(&document, &edited)?;
        } else {
            let mut current = document.buffer.clone();
            for index in application_order(&request.operations) {
                transition(EditState::Applying);
                current = apply_operation(&current, index + 1, &request.operations[index])
                    .map_err(|source| document.validation(source))?;
                transition(EditState::Writing);
                self.store
                    .write(&document.canonical, current.serialize().as_bytes())
                    .map_err(|err| EditError::OperationWriteFailed {
                        path: document.requested.clone(),
                        operation: index + 1,
                        message: err.to_string(),
                    })?;
            }
        }

        Ok(applied_message(request.operations.len(), &request.path))
    }

    /// Replaces one inclusive block of lines.
    ///
    /// # Errors
    ///
    /// Returns an [`EditError`] if the path is refused, the range does not fit
    /// the file, or the backup or write fails.
    pub fn edit_block(&self, request: &EditBlockRequest) -> Result<String, EditError> {
        let span = info_span!(
            target: ENGINE_TARGET,
            "edit_block",
            file = %request.path.display(),
            start_line = request.start_line,
            end_line = request.end_line,
        );
        let _entered = span.enter();
        finish(self.run_edit_block(request))
    }

    fn run_edit_block(&self, request: &EditBlockRequest) -> Result<String, EditError> {
        let document = self.open(&request.path)?;
        transition(EditState::Validating);
        check_range(
            1,
            request.start_line,
            request.end_line,
            document.buffer.line_count(),
        )
        .map_err(|source| document.validation(source))?;

        if request.create_backup {
            self.backup(&document)?;
        }

        transition(EditState::Applying);
        let operation = request.operation();
        let edited = apply_operation(&document.buffer, 1, &operation)
            .map_err(|source| document.validation(source))?;
        self.write(&document, &edited)?;

        let mut message = format!(
            "Successfully edited lines {}-{} in {}",
            request.start_line,
            request.end_line,
            request.path.display()
        );
        if request.show_diff {
            let original = document
                .buffer
                .slice(request.start_line, request.end_line)
                .map_err(|error| document.validation(ValidationError::from_range(1, error)))?
                .join("\n");
            let replacement = operation.replacement_lines().join("\n");
            message.push_str("\n\nDiff:\n");
            message.push_str(&character_diff(&original, &replacement));
        }
        Ok(message)
    }

    /// Resolves `requested` through the sandbox and reads it as UTF-8 text.
    pub(crate) fn open(&self, requested: &Path) -> Result<Document, EditError> {
        let canonical = self
            .sandbox
            .check(requested)
            .map_err(|err| EditError::from_sandbox(requested.to_path_buf(), err))?;
        let bytes = self
            .store
            .read(&canonical)
            .map_err(|err| EditError::file_unreadable(requested.to_path_buf(), &err))?;
        let original = String::from_utf8(bytes).map_err(|err| EditError::FileUnreadable {
            path: requested.to_path_buf(),
            message: format!("content is not valid UTF-8: {err}"),
        })?;
        let buffer = LineBuffer::load(&original);
        debug!(
            target: ENGINE_TARGET,
            file = %canonical.display(),
            lines = buffer.line_count(),
            "file loaded"
        );
        Ok(Document {
            requested: requested.to_path_buf(),
            canonical,
            original,
            buffer,
        })
    }

    pub(crate) fn backup(&self, document: &Document) -> Result<PathBuf, EditError> {
        transition(EditState::BackingUp);
        self.backups.create(&document.canonical)
    }

    pub(crate) fn write(&self, document: &Document, edited: &LineBuffer) -> Result<(), EditError> {
        transition(EditState::Writing);
        self.write_text(document, &edited.serialize())
    }

    pub(crate) fn write_text(&self, document: &Document, text: &str) -> Result<(), EditError> {
        self.store
            .write(&document.canonical, text.as_bytes())
            .map_err(|err| EditError::write_failed(document.requested.clone(), &err))
    }

    pub(crate) fn store(&self) -> &dyn ContentStore {
        self.store
    }
}

impl std::fmt::Debug for EditEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditEngine")
            .field("sandbox", &self.sandbox)
            .finish_non_exhaustive()
    }
}

fn applied_message(count: usize, path: &Path) -> String {
    format!(
        "Successfully applied {count} operations to {}",
        path.display()
    )
}

pub(crate) fn transition(state: EditState) {
    debug!(target: ENGINE_TARGET, state = %state, "state transition");
}

/// Logs the terminal state of a request.
pub(crate) fn finish<T>(result: Result<T, EditError>) -> Result<T, EditError> {
    match &result {
        Ok(_) => transition(EditState::Done),
        Err(error) => warn!(
            target: ENGINE_TARGET,
            state = %EditState::Failed,
            class = ?error.class(),
            error = %error,
            "edit failed"
        ),
    }
    result
}
