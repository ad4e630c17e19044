//! CLI argument definitions for the Scrivener line editor.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Line-addressed file editing inside allowed directories.
#[derive(Parser, Debug)]
#[command(
    name = "scrivener",
    version,
    disable_help_subcommand = true,
    after_help = "Configuration flags (--config-path, --allowed-directories, --log-filter, \
                  --log-format, --file-read-line-limit) must precede the command."
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Editing and file commands.
#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Applies a JSON list of line operations to one file.
    Edit(EditArgs),
    /// Replaces one block of lines.
    EditBlock(EditBlockArgs),
    /// Applies a JSON batch of per-file operations.
    Batch(BatchArgs),
    /// Inserts text before or after existing lines.
    Insert(InsertArgs),
    /// Finds and replaces text throughout a file.
    Replace(ReplaceArgs),
    /// Prints a file, or a window of its lines.
    ReadFile(ReadFileArgs),
    /// Writes or appends text; the content comes from `--content` or stdin.
    WriteFile(WriteFileArgs),
    /// Creates a directory.
    CreateDirectory(CreateDirectoryArgs),
    /// Lists a directory.
    ListDirectory(ListDirectoryArgs),
    /// Finds files whose names match a glob or contain a string.
    SearchFiles(SearchFilesArgs),
    /// Describes a file or directory.
    FileInfo(FileInfoArgs),
    /// Copies a file.
    CopyFile(TransferArgs),
    /// Moves a file or directory.
    MoveFile(TransferArgs),
    /// Deletes a file or directory.
    DeleteFile(DeleteFileArgs),
    /// Searches text files below a directory for a string.
    FindInFiles(FindInFilesArgs),
}

/// Flags shared by every command that writes a single file.
#[derive(Args, Debug, Clone, Copy)]
pub(crate) struct BackupFlags {
    /// Skip the timestamped backup copy.
    #[arg(long)]
    pub(crate) no_backup: bool,
}

#[derive(Args, Debug)]
pub(crate) struct EditArgs {
    /// File to edit.
    pub(crate) path: PathBuf,
    /// JSON array of `{start_line, end_line, replacement, description}`
    /// objects, read from a file or `-` for stdin.
    #[arg(long, value_name = "FILE")]
    pub(crate) operations: String,
    #[command(flatten)]
    pub(crate) backup: BackupFlags,
    /// Apply operations without checking ranges and overlaps first.
    #[arg(long)]
    pub(crate) skip_validation: bool,
    /// Print a preview instead of writing.
    #[arg(long)]
    pub(crate) preview: bool,
    /// Write after each operation rather than once.
    #[arg(long)]
    pub(crate) non_atomic: bool,
}

#[derive(Args, Debug)]
pub(crate) struct EditBlockArgs {
    /// File to edit.
    pub(crate) path: PathBuf,
    /// First replaced line (one-based).
    #[arg(long)]
    pub(crate) start_line: usize,
    /// Last replaced line (inclusive).
    #[arg(long)]
    pub(crate) end_line: usize,
    /// Replacement text.
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) replacement: String,
    /// Omit the before/after comparison.
    #[arg(long)]
    pub(crate) no_diff: bool,
    #[command(flatten)]
    pub(crate) backup: BackupFlags,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// JSON batch request, read from a file or `-` for stdin.
    #[arg(long, value_name = "FILE")]
    pub(crate) request: String,
    /// Process files independently instead of all-or-nothing.
    #[arg(long)]
    pub(crate) non_atomic: bool,
    /// Print previews without writing.
    #[arg(long)]
    pub(crate) dry_run: bool,
    /// Keep going after a file fails (non-atomic batches only).
    #[arg(long)]
    pub(crate) continue_on_error: bool,
    /// Skip validating every file before processing the first.
    #[arg(long)]
    pub(crate) skip_validation: bool,
}

#[derive(Args, Debug)]
pub(crate) struct InsertArgs {
    /// File to edit.
    pub(crate) path: PathBuf,
    /// JSON array of `{line, content, before}` objects, read from a file or
    /// `-` for stdin.
    #[arg(long, value_name = "FILE")]
    pub(crate) insertions: String,
    #[command(flatten)]
    pub(crate) backup: BackupFlags,
    /// Address each insertion against the file as left by the previous one.
    #[arg(long)]
    pub(crate) sequential_lines: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReplaceArgs {
    /// File to edit.
    pub(crate) path: PathBuf,
    /// Text or pattern to find.
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) find: String,
    /// Replacement text.
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) replace: String,
    /// Treat `--find` as a regular expression.
    #[arg(long)]
    pub(crate) regex: bool,
    /// Match regardless of case.
    #[arg(long)]
    pub(crate) ignore_case: bool,
    /// Only match whole words.
    #[arg(long)]
    pub(crate) whole_word: bool,
    /// Stop after this many replacements; zero or less means unlimited.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub(crate) max_replacements: i64,
    #[command(flatten)]
    pub(crate) backup: BackupFlags,
}

#[derive(Args, Debug)]
pub(crate) struct ReadFileArgs {
    /// File to read.
    pub(crate) path: PathBuf,
    /// First line to print (one-based).
    #[arg(long, default_value_t = 1)]
    pub(crate) offset: usize,
    /// Lines to print; zero prints through the end.
    #[arg(long, default_value_t = 0)]
    pub(crate) length: usize,
    /// Prefix each line with its number.
    #[arg(long)]
    pub(crate) line_numbers: bool,
}

#[derive(Args, Debug)]
pub(crate) struct WriteFileArgs {
    /// File to write.
    pub(crate) path: PathBuf,
    /// Text to write. Read from stdin when omitted.
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) content: Option<String>,
    /// Add to the end of the file instead of replacing it.
    #[arg(long)]
    pub(crate) append: bool,
    /// Copy an existing file aside first.
    #[arg(long)]
    pub(crate) backup: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CreateDirectoryArgs {
    /// Directory to create.
    pub(crate) path: PathBuf,
    /// Fail when the parent directory is missing.
    #[arg(long)]
    pub(crate) no_parents: bool,
    /// Octal permission bits.
    #[arg(long, default_value = "0755")]
    pub(crate) permissions: String,
}

#[derive(Args, Debug)]
pub(crate) struct ListDirectoryArgs {
    /// Directory to list.
    pub(crate) path: PathBuf,
    /// Show entries whose names start with a dot.
    #[arg(long)]
    pub(crate) all: bool,
    /// Descend into subdirectories.
    #[arg(long)]
    pub(crate) recursive: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SearchFilesArgs {
    /// Directory to search.
    pub(crate) directory: PathBuf,
    /// Glob, or text the name must contain.
    #[arg(allow_hyphen_values = true)]
    pub(crate) pattern: String,
    /// Match case exactly.
    #[arg(long)]
    pub(crate) case_sensitive: bool,
    /// Report matching directories too.
    #[arg(long)]
    pub(crate) include_directories: bool,
    /// Levels to descend; negative means unbounded.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub(crate) max_depth: i64,
}

#[derive(Args, Debug)]
pub(crate) struct FileInfoArgs {
    /// File or directory to describe.
    pub(crate) path: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct TransferArgs {
    /// Existing source.
    pub(crate) source: PathBuf,
    /// Destination path.
    pub(crate) destination: PathBuf,
    /// Replace an existing destination.
    #[arg(long)]
    pub(crate) overwrite: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DeleteFileArgs {
    /// File or directory to delete.
    pub(crate) path: PathBuf,
    /// Delete a directory with its contents.
    #[arg(long)]
    pub(crate) recursive: bool,
    /// Copy a file aside before deleting it.
    #[arg(long)]
    pub(crate) backup: bool,
}

#[derive(Args, Debug)]
pub(crate) struct FindInFilesArgs {
    /// Directory to search.
    pub(crate) directory: PathBuf,
    /// Text to find.
    #[arg(allow_hyphen_values = true)]
    pub(crate) pattern: String,
    /// Glob the file name must match.
    #[arg(long, default_value = "*")]
    pub(crate) files: String,
    /// Match case exactly.
    #[arg(long)]
    pub(crate) case_sensitive: bool,
    /// Lines of context around each match.
    #[arg(long, default_value_t = 0)]
    pub(crate) context: usize,
}
