//! Multi-file batches.
//!
//! Atomic batches stage every file's new content in memory, take the requested
//! backups, and only then write, restoring already-written files if a later
//! write fails. Non-atomic batches process files one at a time in request
//! order and collect per-file failures into a [`BatchReport`].

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{info, info_span, warn};

use super::{Document, ENGINE_TARGET, EditEngine, EditState, finish, transition};
use crate::buffer::LineBuffer;
use crate::error::EditError;
use crate::operation::{BatchEditRequest, FileEditRequest};
use crate::preview::render_operations;
use crate::schedule::apply_operations;
use crate::validate::validate_operations;

/// What happened to one file of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file was rewritten.
    Applied {
        /// Path as requested.
        path: PathBuf,
        /// Number of operations applied.
        operations: usize,
    },
    /// Dry run: the file was left untouched.
    Previewed {
        /// Path as requested.
        path: PathBuf,
        /// Rendered preview of the file's operations.
        preview: String,
    },
}

impl FileOutcome {
    /// Path as requested.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Applied { path, .. } | Self::Previewed { path, .. } => path,
        }
    }
}

/// A file that failed within a non-atomic batch.
#[derive(Debug)]
pub struct BatchFailure {
    file: usize,
    error: EditError,
}

impl BatchFailure {
    /// One-based position of the file in the batch.
    #[must_use]
    pub const fn file(&self) -> usize {
        self.file
    }

    /// The failure.
    #[must_use]
    pub const fn error(&self) -> &EditError {
        &self.error
    }
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file {}: {}", self.file, self.error)
    }
}

/// Result of a batch, in request order.
#[derive(Debug, Default)]
pub struct BatchReport {
    dry_run: bool,
    outcomes: Vec<FileOutcome>,
    failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Whether the batch was a dry run.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Files that were written or previewed.
    #[must_use]
    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    /// Files that failed.
    #[must_use]
    pub fn failures(&self) -> &[BatchFailure] {
        &self.failures
    }

    /// True when no file failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            writeln!(f, "DRY RUN - Preview of changes:")?;
            writeln!(f)?;
        }
        for outcome in &self.outcomes {
            match outcome {
                FileOutcome::Applied { path, operations } => writeln!(
                    f,
                    "Successfully applied {operations} operations to {}",
                    path.display()
                )?,
                FileOutcome::Previewed { path, preview } => {
                    writeln!(f, "Preview for {}:", path.display())?;
                    write!(f, "{preview}")?;
                }
            }
        }
        if !self.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Errors encountered:")?;
            for failure in &self.failures {
                writeln!(f, "- {failure}")?;
            }
        }
        Ok(())
    }
}

/// New content for one distinct file of an atomic batch.
struct Staged {
    /// One-based position of the first batch entry naming this file.
    file: usize,
    document: Document,
    edited: LineBuffer,
    backup: bool,
}

impl EditEngine<'_> {
    /// Applies a batch of per-file edits.
    ///
    /// Atomic batches either write every file or leave every file as it was;
    /// their first failure aborts the batch as [`EditError::BatchAborted`].
    /// Non-atomic batches always return a report, with failures listed in
    /// request order. When `validate_all` finds a failing entry and
    /// `continue_on_error` is unset, the report lists every failing entry and
    /// no file is touched. Dry runs never write and never back up.
    ///
    /// When several entries name the same file, each entry's operations are
    /// addressed against the content left by the entries before it.
    ///
    /// # Errors
    ///
    /// Only atomic batches return errors.
    pub fn edit_multiple_files(&self, batch: &BatchEditRequest) -> Result<BatchReport, EditError> {
        let span = info_span!(
            target: ENGINE_TARGET,
            "edit_multiple_files",
            files = batch.files.len(),
            atomic = batch.atomic,
            dry_run = batch.dry_run,
        );
        let _entered = span.enter();
        if batch.atomic {
            finish(self.run_atomic(batch))
        } else {
            Ok(self.run_sequential(batch))
        }
    }

    fn run_atomic(&self, batch: &BatchEditRequest) -> Result<BatchReport, EditError> {
        let mut report = BatchReport {
            dry_run: batch.dry_run,
            ..BatchReport::default()
        };
        let mut staged: Vec<Staged> = Vec::new();

        for (index, file) in batch.files.iter().enumerate() {
            let number = index + 1;
            let mut document = self.open(&file.path).map_err(|err| aborted(number, err))?;
            let existing = staged
                .iter()
                .position(|entry| entry.document.canonical == document.canonical);
            if let Some(position) = existing {
                document.buffer = staged[position].edited.clone();
            }

            transition(EditState::Validating);
            validate_operations(&document.buffer, &file.operations)
                .map_err(|source| aborted(number, document.validation(source)))?;
            transition(EditState::Applying);
            let edited = apply_operations(&document.buffer, &file.operations)
                .map_err(|source| aborted(number, document.validation(source)))?;

            report.outcomes.push(if batch.dry_run {
                FileOutcome::Previewed {
                    path: file.path.clone(),
                    preview: render_operations(&document.buffer, &file.operations),
                }
            } else {
                FileOutcome::Applied {
                    path: file.path.clone(),
                    operations: file.operations.len(),
                }
            });

            match existing {
                Some(position) => {
                    let entry = &mut staged[position];
                    entry.edited = edited;
                    entry.backup |= file.create_backup;
                }
                None => staged.push(Staged {
                    file: number,
                    document,
                    edited,
                    backup: file.create_backup,
                }),
            }
        }

        if batch.dry_run {
            return Ok(report);
        }

        for entry in staged.iter().filter(|entry| entry.backup) {
            self.backup(&entry.document)
                .map_err(|err| aborted(entry.file, err))?;
        }

        for (position, entry) in staged.iter().enumerate() {
            if let Err(err) = self.write(&entry.document, &entry.edited) {
                self.rollback(&staged[..position]);
                return Err(aborted(entry.file, err));
            }
        }

        info!(
            target: ENGINE_TARGET,
            files = staged.len(),
            "atomic batch committed"
        );
        Ok(report)
    }

    /// Restores committed files to the content they held before the batch.
    ///
    /// Best effort: a file that cannot be restored is logged and skipped.
    fn rollback(&self, committed: &[Staged]) {
        for entry in committed.iter().rev() {
            let path = &entry.document.canonical;
            match self.store().write(path, entry.document.original.as_bytes()) {
                Ok(()) => info!(target: ENGINE_TARGET, file = %path.display(), "write rolled back"),
                Err(err) => warn!(
                    target: ENGINE_TARGET,
                    file = %path.display(),
                    error = %err,
                    "rollback failed; file left with batch content"
                ),
            }
        }
    }

    fn run_sequential(&self, batch: &BatchEditRequest) -> BatchReport {
        let mut report = BatchReport {
            dry_run: batch.dry_run,
            ..BatchReport::default()
        };
        let mut prechecked = if batch.validate_all {
            self.precheck(&batch.files)
        } else {
            Vec::new()
        };
        if !batch.continue_on_error && prechecked.iter().any(Option::is_some) {
            report.failures = prechecked
                .into_iter()
                .enumerate()
                .filter_map(|(index, failure)| {
                    failure.map(|error| BatchFailure {
                        file: index + 1,
                        error,
                    })
                })
                .collect();
            warn!(
                target: ENGINE_TARGET,
                failures = report.failures.len(),
                "up-front validation failed; no file was edited"
            );
            return report;
        }

        for (index, file) in batch.files.iter().enumerate() {
            let span = info_span!(
                target: ENGINE_TARGET,
                "batch_file",
                file = index + 1,
                path = %file.path.display(),
            );
            let _entered = span.enter();
            let earlier_failure = prechecked.get_mut(index).and_then(Option::take);
            let result = match earlier_failure {
                Some(error) => Err(error),
                None => self.process(file, batch.dry_run),
            };
            match finish(result) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(error) => {
                    report.failures.push(BatchFailure {
                        file: index + 1,
                        error,
                    });
                    if !batch.continue_on_error {
                        break;
                    }
                }
            }
        }
        report
    }

    /// Validates every entry before any is processed.
    ///
    /// Entries naming a file already checked are validated against that
    /// file's content after the earlier entries, as they will be when
    /// processed. A failed entry leaves the content unchanged for later ones.
    fn precheck(&self, files: &[FileEditRequest]) -> Vec<Option<EditError>> {
        let mut edited: Vec<(PathBuf, LineBuffer)> = Vec::new();
        let mut failures = Vec::with_capacity(files.len());
        for file in files {
            let checked = self.open(&file.path).and_then(|mut document| {
                let existing = edited
                    .iter()
                    .position(|(path, _)| *path == document.canonical);
                if let Some(position) = existing {
                    document.buffer = edited[position].1.clone();
                }
                transition(EditState::Validating);
                let buffer = validate_operations(&document.buffer, &file.operations)
                    .and_then(|()| apply_operations(&document.buffer, &file.operations))
                    .map_err(|source| document.validation(source))?;
                match existing {
                    Some(position) => edited[position].1 = buffer,
                    None => edited.push((document.canonical, buffer)),
                }
                Ok(())
            });
            failures.push(checked.err());
        }
        failures
    }

    /// Opens and validates one batch entry.
    fn prepare(&self, file: &FileEditRequest) -> Result<Document, EditError> {
        let document = self.open(&file.path)?;
        transition(EditState::Validating);
        validate_operations(&document.buffer, &file.operations)
            .map_err(|source| document.validation(source))?;
        Ok(document)
    }

    fn process(&self, file: &FileEditRequest, dry_run: bool) -> Result<FileOutcome, EditError> {
        let document = self.prepare(file)?;
        if dry_run {
            return Ok(FileOutcome::Previewed {
                path: file.path.clone(),
                preview: render_operations(&document.buffer, &file.operations),
            });
        }
        if file.create_backup {
            self.backup(&document)?;
        }
        transition(EditState::Applying);
        let edited = apply_operations(&document.buffer, &file.operations)
            .map_err(|source| document.validation(source))?;
        self.write(&document, &edited)?;
        Ok(FileOutcome::Applied {
            path: file.path.clone(),
            operations: file.operations.len(),
        })
    }
}

fn aborted(file: usize, source: EditError) -> EditError {
    EditError::BatchAborted {
        file,
        source: Box::new(source),
    }
}
