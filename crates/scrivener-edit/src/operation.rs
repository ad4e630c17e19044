//! Request types accepted by the edit engine.
//!
//! Every request deserialises from JSON. Omitted flags take the defaults
//! documented on each field, which lean towards the safe choice: backups on,
//! validation on, atomic application on.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::buffer::split_lines;

const fn enabled() -> bool {
    true
}

const fn unlimited() -> i64 {
    -1
}

/// Replaces lines `start_line..=end_line` (one-based, inclusive) with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EditOperation {
    /// First replaced line.
    pub start_line: usize,
    /// Last replaced line.
    pub end_line: usize,
    /// Replacement text, split on normalised line separators.
    #[serde(alias = "replacement_text")]
    pub replacement: String,
    /// Free-form label shown in previews.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EditOperation {
    /// Creates an operation without a description.
    #[must_use]
    pub fn new(start_line: usize, end_line: usize, replacement: impl Into<String>) -> Self {
        Self {
            start_line,
            end_line,
            replacement: replacement.into(),
            description: None,
        }
    }

    /// Attaches a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replacement text as lines.
    ///
    /// Empty replacement text yields a single empty line.
    #[must_use]
    pub fn replacement_lines(&self) -> Vec<String> {
        split_lines(&self.replacement)
    }
}

/// Inserts `content` before or after one existing line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TextInsertion {
    /// Anchor line (one-based).
    pub line: usize,
    /// Inserted text, split on normalised line separators.
    #[serde(alias = "text")]
    pub content: String,
    /// Insert before the anchor instead of after it.
    #[serde(default)]
    pub before: bool,
}

impl TextInsertion {
    /// Inserts after `line`.
    #[must_use]
    pub fn after(line: usize, content: impl Into<String>) -> Self {
        Self {
            line,
            content: content.into(),
            before: false,
        }
    }

    /// Inserts before `line`.
    #[must_use]
    pub fn before(line: usize, content: impl Into<String>) -> Self {
        Self {
            line,
            content: content.into(),
            before: true,
        }
    }

    /// Zero-based gap the content lands in: gap `n` sits after line `n`.
    #[must_use]
    pub const fn insertion_point(&self) -> usize {
        if self.before {
            self.line.saturating_sub(1)
        } else {
            self.line
        }
    }

    /// Inserted text as lines.
    #[must_use]
    pub fn content_lines(&self) -> Vec<String> {
        split_lines(&self.content)
    }
}

/// Line edits for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EditFileRequest {
    /// File to edit.
    pub path: PathBuf,
    /// Operations, all addressed against the file as read.
    pub operations: Vec<EditOperation>,
    /// Copy the file aside before writing. Defaults to `true`.
    #[serde(default = "enabled")]
    pub create_backup: bool,
    /// Reject malformed or overlapping operations before touching the file.
    /// Defaults to `true`.
    #[serde(default = "enabled")]
    pub validate_operations: bool,
    /// Render a preview instead of writing. Defaults to `false`.
    #[serde(default)]
    pub show_preview: bool,
    /// Write once after applying every operation. Defaults to `true`.
    #[serde(default = "enabled")]
    pub atomic: bool,
}

impl EditFileRequest {
    /// Creates a request with default flags.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, operations: Vec<EditOperation>) -> Self {
        Self {
            path: path.into(),
            operations,
            create_backup: true,
            validate_operations: true,
            show_preview: false,
            atomic: true,
        }
    }
}

/// Replaces one contiguous block of lines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EditBlockRequest {
    /// File to edit.
    pub path: PathBuf,
    /// First replaced line.
    pub start_line: usize,
    /// Last replaced line.
    pub end_line: usize,
    /// Replacement text.
    #[serde(alias = "new_content")]
    pub replacement: String,
    /// Append an original/replacement comparison to the result. Defaults to `true`.
    #[serde(default = "enabled")]
    pub show_diff: bool,
    /// Defaults to `true`.
    #[serde(default = "enabled")]
    pub create_backup: bool,
}

impl EditBlockRequest {
    /// Creates a request with default flags.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        start_line: usize,
        end_line: usize,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            start_line,
            end_line,
            replacement: replacement.into(),
            show_diff: true,
            create_backup: true,
        }
    }

    /// The block edit expressed as a general operation.
    #[must_use]
    pub fn operation(&self) -> EditOperation {
        EditOperation::new(self.start_line, self.end_line, self.replacement.clone())
    }
}

/// One entry of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileEditRequest {
    /// File to edit.
    pub path: PathBuf,
    /// Operations for this file.
    pub operations: Vec<EditOperation>,
    /// Defaults to `false` for batch entries.
    #[serde(default)]
    pub create_backup: bool,
}

impl FileEditRequest {
    /// Creates an entry without a backup.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, operations: Vec<EditOperation>) -> Self {
        Self {
            path: path.into(),
            operations,
            create_backup: false,
        }
    }

    /// Requests a backup before this file is written.
    #[must_use]
    pub const fn with_backup(mut self) -> Self {
        self.create_backup = true;
        self
    }
}

/// Line edits across several files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BatchEditRequest {
    /// Files in processing order.
    pub files: Vec<FileEditRequest>,
    /// All files are written or none are. Defaults to `true`.
    #[serde(default = "enabled")]
    pub atomic: bool,
    /// Report previews without writing. Defaults to `false`.
    #[serde(default)]
    pub dry_run: bool,
    /// Keep going after a file fails in non-atomic mode. Defaults to `false`.
    #[serde(default)]
    pub continue_on_error: bool,
    /// Validate every file before processing any of them. Defaults to `true`.
    #[serde(default = "enabled")]
    pub validate_all: bool,
}

impl BatchEditRequest {
    /// Creates an atomic, validated batch.
    #[must_use]
    pub const fn new(files: Vec<FileEditRequest>) -> Self {
        Self {
            files,
            atomic: true,
            dry_run: false,
            continue_on_error: false,
            validate_all: true,
        }
    }
}

/// Inserts text around existing lines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InsertTextRequest {
    /// File to edit.
    pub path: PathBuf,
    /// Insertions to apply.
    pub insertions: Vec<TextInsertion>,
    /// Defaults to `true`.
    #[serde(default = "enabled")]
    pub create_backup: bool,
    /// Address every insertion against the original line numbers.
    /// When `false`, each insertion sees the lines added by earlier ones.
    /// Defaults to `true`.
    #[serde(default = "enabled")]
    pub adjust_line_numbers: bool,
}

impl InsertTextRequest {
    /// Creates a request with default flags.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, insertions: Vec<TextInsertion>) -> Self {
        Self {
            path: path.into(),
            insertions,
            create_backup: true,
            adjust_line_numbers: true,
        }
    }
}

/// Find-and-replace over a whole file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReplaceTextRequest {
    /// File to edit.
    pub path: PathBuf,
    /// Text or pattern to find. Must not be empty.
    #[serde(alias = "find_text")]
    pub find: String,
    /// Replacement. Group references such as `$1` expand only in regex mode.
    #[serde(alias = "replace_text")]
    pub replace: String,
    /// Treat `find` as a regular expression. Defaults to `false`.
    #[serde(default)]
    pub regex: bool,
    /// Defaults to `true`.
    #[serde(default = "enabled")]
    pub case_sensitive: bool,
    /// Only match whole words. Defaults to `false`.
    #[serde(default)]
    pub whole_word: bool,
    /// Upper bound on replacements; zero or negative means unlimited.
    #[serde(default = "unlimited")]
    pub max_replacements: i64,
    /// Defaults to `true`.
    #[serde(default = "enabled")]
    pub create_backup: bool,
}

impl ReplaceTextRequest {
    /// Creates a literal, case-sensitive, unlimited replacement.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        find: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            find: find.into(),
            replace: replace.into(),
            regex: false,
            case_sensitive: true,
            whole_word: false,
            max_replacements: unlimited(),
            create_backup: true,
        }
    }

    /// Replacement limit, or `None` when unlimited.
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        usize::try_from(self.max_replacements)
            .ok()
            .filter(|limit| *limit > 0)
    }
}
