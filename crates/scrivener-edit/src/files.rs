//! File tools: reading, writing, and managing files inside the sandbox.
//!
//! Every tool resolves its paths through the [`PathSandbox`] before the
//! filesystem is touched. Entries that must exist go through
//! [`PathSandbox::check`]; entries a tool may create go through
//! [`PathSandbox::check_target`]. File content moves through the same
//! [`ContentStore`] as edits, and backups take the same
//! `P.backup.<seconds>` names.

mod format;
mod request;
mod walk;

#[cfg(test)]
mod tests;

use std::fs;
use std::path::{Path, PathBuf};

use scrivener_sandbox::PathSandbox;
use tracing::{debug, info, info_span, warn};

pub use self::format::{format_bytes, is_text_file};
use self::format::{mode_string, rfc3339};
pub use self::walk::NO_MATCHES;
pub use self::request::{
    CreateDirectoryRequest, DeleteFileRequest, FileInfoRequest, FindInFilesRequest,
    ListDirectoryRequest, ReadFileRequest, SearchFilesRequest, TransferRequest, WriteFileRequest,
};
use crate::backup::{BackupManager, Clock};
use crate::buffer::split_lines;
use crate::error::EditError;
use crate::store::ContentStore;

/// Tracing target for file tool events.
pub const FILES_TARGET: &str = "scrivener_edit::files";

/// Lines [`FileTools::read_file`] returns before truncating.
pub const DEFAULT_READ_LINE_LIMIT: usize = 1000;

/// Final line of a read that hit the line limit.
pub const TRUNCATION_NOTICE: &str = "... (truncated due to line limit)";

/// Whole-file operations confined to a [`PathSandbox`].
pub struct FileTools<'a> {
    sandbox: &'a PathSandbox,
    store: &'a dyn ContentStore,
    backups: BackupManager<'a>,
    read_line_limit: usize,
}

impl<'a> FileTools<'a> {
    /// Creates the tools over the given collaborators.
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
            read_line_limit: DEFAULT_READ_LINE_LIMIT,
        }
    }

    /// Caps the number of lines a single read returns.
    #[must_use]
    pub const fn with_read_line_limit(mut self, limit: usize) -> Self {
        self.read_line_limit = limit;
        self
    }

    /// Returns a file's text, or the window of lines the request selects.
    ///
    /// Lines are split as the editor splits them. A window starting past the
    /// end is empty. More lines than the read limit are cut and followed by
    /// [`TRUNCATION_NOTICE`].
    ///
    /// # Errors
    ///
    /// Fails when the path is refused or the file is not readable UTF-8.
    pub fn read_file(&self, request: &ReadFileRequest) -> Result<String, EditError> {
        let span = info_span!(target: FILES_TARGET, "read_file", file = %request.path.display());
        let _entered = span.enter();
        finish(self.run_read_file(request))
    }

    fn run_read_file(&self, request: &ReadFileRequest) -> Result<String, EditError> {
        let canonical = self.resolve(&request.path)?;
        let text = self.read_text(&request.path, &canonical)?;
        let skipped = request.offset.saturating_sub(1);
        let wanted = if request.length == 0 {
            usize::MAX
        } else {
            request.length
        };
        let mut window: Vec<String> = split_lines(&text)
            .into_iter()
            .skip(skipped)
            .take(wanted)
            .take(self.read_line_limit.saturating_add(1))
            .collect();
        let truncated = window.len() > self.read_line_limit;
        window.truncate(self.read_line_limit);

        if request.show_line_numbers {
            for (line, number) in window.iter_mut().zip(skipped + 1..) {
                *line = format!("{number}: {line}");
            }
        }
        if truncated {
            window.push(String::from(TRUNCATION_NOTICE));
        }
        debug!(target: FILES_TARGET, lines = window.len(), truncated, "file read");
        Ok(window.join("\n"))
    }

    /// Writes or appends text, creating missing parent directories.
    ///
    /// # Errors
    ///
    /// Fails when the path is refused, or the backup, directory creation, or
    /// write fails.
    pub fn write_file(&self, request: &WriteFileRequest) -> Result<String, EditError> {
        let span = info_span!(
            target: FILES_TARGET,
            "write_file",
            file = %request.path.display(),
            append = request.append,
        );
        let _entered = span.enter();
        finish(self.run_write_file(request))
    }

    fn run_write_file(&self, request: &WriteFileRequest) -> Result<String, EditError> {
        let target = self.resolve_target(&request.path)?;
        let exists = target.is_file();
        if request.create_backup && exists {
            self.backups.create(&target)?;
        }
        ensure_parent(&request.path, &target)?;

        let mut contents = if request.append && exists {
            self.store
                .read(&target)
                .map_err(|err| EditError::file_unreadable(request.path.clone(), &err))?
        } else {
            Vec::new()
        };
        contents.extend_from_slice(request.content.as_bytes());
        self.store
            .write(&target, &contents)
            .map_err(|err| EditError::write_failed(request.path.clone(), &err))?;
        info!(
            target: FILES_TARGET,
            file = %target.display(),
            bytes = contents.len(),
            "file written"
        );

        let verb = if request.append { "appended" } else { "written" };
        Ok(format!(
            "Content successfully {verb} to {}",
            request.path.display()
        ))
    }

    /// Creates a directory, and its parents when requested.
    ///
    /// # Errors
    ///
    /// Fails when the path is refused, the permissions are not octal, or the
    /// directory cannot be created.
    pub fn create_directory(&self, request: &CreateDirectoryRequest) -> Result<String, EditError> {
        let span = info_span!(
            target: FILES_TARGET,
            "create_directory",
            directory = %request.path.display(),
        );
        let _entered = span.enter();
        finish(self.run_create_directory(request))
    }

    fn run_create_directory(&self, request: &CreateDirectoryRequest) -> Result<String, EditError> {
        let mode = parse_permissions(&request.permissions)?;
        let target = self.resolve_target(&request.path)?;
        let mut builder = fs::DirBuilder::new();
        builder.recursive(request.create_parents);
        apply_mode(&mut builder, mode);
        builder.create(&target).map_err(|err| {
            EditError::file_operation("create directory", request.path.clone(), &err)
        })?;
        info!(target: FILES_TARGET, directory = %target.display(), "directory created");
        Ok(format!("Directory created: {}", request.path.display()))
    }

    /// Describes a file or directory: size, mode, modification time, and
    /// for files whether they are text.
    ///
    /// # Errors
    ///
    /// Fails when the path is refused or cannot be inspected.
    pub fn get_file_info(&self, request: &FileInfoRequest) -> Result<String, EditError> {
        let span = info_span!(target: FILES_TARGET, "get_file_info", file = %request.path.display());
        let _entered = span.enter();
        finish(self.run_get_file_info(request))
    }

    fn run_get_file_info(&self, request: &FileInfoRequest) -> Result<String, EditError> {
        let canonical = self.resolve(&request.path)?;
        let metadata = fs::metadata(&canonical)
            .map_err(|err| EditError::file_operation("inspect", request.path.clone(), &err))?;
        let name = canonical.file_name().map_or_else(
            || canonical.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        let modified = metadata
            .modified()
            .map_or_else(|_| String::from("unknown"), rfc3339);

        let mut lines = vec![
            format!("Name: {name}"),
            format!("Size: {} ({} bytes)", format_bytes(metadata.len()), metadata.len()),
            format!("Mode: {}", mode_string(&metadata)),
            format!("Modified: {modified}"),
            format!("Is Directory: {}", metadata.is_dir()),
        ];
        if !metadata.is_dir() {
            lines.push(format!("Is Text File: {}", is_text_file(&canonical)));
        }
        Ok(lines.join("\n"))
    }

    /// Copies a file's bytes to a new location.
    ///
    /// # Errors
    ///
    /// Fails when either path is refused, the source cannot be read, or the
    /// destination exists without `overwrite`.
    pub fn copy_file(&self, request: &TransferRequest) -> Result<String, EditError> {
        let span = info_span!(
            target: FILES_TARGET,
            "copy_file",
            source = %request.source.display(),
            destination = %request.destination.display(),
        );
        let _entered = span.enter();
        finish(self.run_copy_file(request))
    }

    fn run_copy_file(&self, request: &TransferRequest) -> Result<String, EditError> {
        let source = self.resolve(&request.source)?;
        let destination = self.resolve_target(&request.destination)?;
        let bytes = self
            .store
            .read(&source)
            .map_err(|err| EditError::file_unreadable(request.source.clone(), &err))?;
        prepare_destination(request, &destination)?;
        self.store
            .write(&destination, &bytes)
            .map_err(|err| EditError::write_failed(request.destination.clone(), &err))?;
        info!(
            target: FILES_TARGET,
            source = %source.display(),
            destination = %destination.display(),
            bytes = bytes.len(),
            "file copied"
        );
        Ok(format!(
            "File copied from {} to {}",
            request.source.display(),
            request.destination.display()
        ))
    }

    /// Moves a file or directory.
    ///
    /// # Errors
    ///
    /// Fails when either path is refused, the source is an allowed root, the
    /// destination exists without `overwrite`, or the rename fails.
    pub fn move_file(&self, request: &TransferRequest) -> Result<String, EditError> {
        let span = info_span!(
            target: FILES_TARGET,
            "move_file",
            source = %request.source.display(),
            destination = %request.destination.display(),
        );
        let _entered = span.enter();
        finish(self.run_move_file(request))
    }

    fn run_move_file(&self, request: &TransferRequest) -> Result<String, EditError> {
        let source = self.resolve(&request.source)?;
        self.protect_root(&request.source, &source)?;
        let destination = self.resolve_target(&request.destination)?;
        prepare_destination(request, &destination)?;
        fs::rename(&source, &destination)
            .map_err(|err| EditError::file_operation("move", request.source.clone(), &err))?;
        info!(
            target: FILES_TARGET,
            source = %source.display(),
            destination = %destination.display(),
            "file moved"
        );
        Ok(format!(
            "File moved from {} to {}",
            request.source.display(),
            request.destination.display()
        ))
    }

    /// Deletes a file, or a directory when it is empty or `recursive` is set.
    ///
    /// # Errors
    ///
    /// Fails when the path is refused or is an allowed root, or the backup or
    /// removal fails.
    pub fn delete_file(&self, request: &DeleteFileRequest) -> Result<String, EditError> {
        let span = info_span!(
            target: FILES_TARGET,
            "delete_file",
            file = %request.path.display(),
            recursive = request.recursive,
        );
        let _entered = span.enter();
        finish(self.run_delete_file(request))
    }

    fn run_delete_file(&self, request: &DeleteFileRequest) -> Result<String, EditError> {
        let target = self.resolve(&request.path)?;
        self.protect_root(&request.path, &target)?;
        let failure =
            |err: std::io::Error| EditError::file_operation("delete", request.path.clone(), &err);

        if target.is_dir() {
            if request.recursive {
                fs::remove_dir_all(&target).map_err(failure)?;
            } else {
                fs::remove_dir(&target).map_err(failure)?;
            }
        } else {
            if request.create_backup {
                self.backups.create(&target)?;
            }
            fs::remove_file(&target).map_err(failure)?;
        }
        info!(target: FILES_TARGET, file = %target.display(), "entry deleted");
        Ok(format!("Deleted: {}", request.path.display()))
    }

    fn resolve(&self, requested: &Path) -> Result<PathBuf, EditError> {
        self.sandbox
            .check(requested)
            .map_err(|err| EditError::from_sandbox(requested.to_path_buf(), err))
    }

    fn resolve_target(&self, requested: &Path) -> Result<PathBuf, EditError> {
        self.sandbox
            .check_target(requested)
            .map_err(|err| EditError::from_sandbox(requested.to_path_buf(), err))
    }

    fn protect_root(&self, requested: &Path, canonical: &Path) -> Result<(), EditError> {
        if self.sandbox.is_root(canonical) {
            return Err(EditError::RootProtected {
                path: requested.to_path_buf(),
            });
        }
        Ok(())
    }

    fn read_text(&self, requested: &Path, canonical: &Path) -> Result<String, EditError> {
        let bytes = self
            .store
            .read(canonical)
            .map_err(|err| EditError::file_unreadable(requested.to_path_buf(), &err))?;
        String::from_utf8(bytes).map_err(|err| EditError::FileUnreadable {
            path: requested.to_path_buf(),
            message: format!("content is not valid UTF-8: {err}"),
        })
    }
}

impl std::fmt::Debug for FileTools<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTools")
            .field("sandbox", &self.sandbox)
            .field("read_line_limit", &self.read_line_limit)
            .finish_non_exhaustive()
    }
}

fn ensure_parent(requested: &Path, target: &Path) -> Result<(), EditError> {
    match target.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(|err| {
            EditError::file_operation("create parent directory for", requested.to_path_buf(), &err)
        }),
        None => Ok(()),
    }
}

fn prepare_destination(request: &TransferRequest, destination: &Path) -> Result<(), EditError> {
    if !request.overwrite && fs::symlink_metadata(destination).is_ok() {
        return Err(EditError::DestinationExists {
            path: request.destination.clone(),
        });
    }
    ensure_parent(&request.destination, destination)
}

/// Parses an octal mode such as `0755` or `0o700`.
fn parse_permissions(value: &str) -> Result<u32, EditError> {
    let digits = value.strip_prefix("0o").unwrap_or(value);
    u32::from_str_radix(digits, 8)
        .ok()
        .filter(|mode| *mode <= 0o7777)
        .ok_or_else(|| EditError::InvalidPermissions {
            value: value.to_owned(),
        })
}

#[cfg(unix)]
fn apply_mode(builder: &mut fs::DirBuilder, mode: u32) {
    use std::os::unix::fs::DirBuilderExt;
    builder.mode(mode);
}

#[cfg(not(unix))]
const fn apply_mode(_builder: &mut fs::DirBuilder, _mode: u32) {}

/// Logs the outcome of a file tool call.
fn finish<T>(result: Result<T, EditError>) -> Result<T, EditError> {
    if let Err(error) = &result {
        warn!(
            target: FILES_TARGET,
            class = ?error.class(),
            error = %error,
            "file tool failed"
        );
    }
    result
}
