//! Directory listing and search.
//!
//! Walks never follow symbolic links, so they stay below the resolved
//! directory. Entries are visited in file-name order.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, info_span};
use walkdir::WalkDir;

use super::format::{is_text_file, listing_line};
use super::request::{FindInFilesRequest, ListDirectoryRequest, SearchFilesRequest};
use super::{FILES_TARGET, FileTools, finish};
use crate::error::EditError;

/// Result of a text search that found nothing.
pub const NO_MATCHES: &str = "No matches found";

impl FileTools<'_> {
    /// Lists a directory, one line per entry.
    ///
    /// Each line holds the mode, the size (`<DIR>` for directories), the
    /// modification time, and the name. Recursive listings name entries
    /// relative to the directory and show the directory itself by its base
    /// name. Hidden directories are not descended into unless
    /// `include_hidden` is set.
    ///
    /// # Errors
    ///
    /// Fails when the path is refused or the directory cannot be read.
    pub fn list_directory(&self, request: &ListDirectoryRequest) -> Result<String, EditError> {
        let span = info_span!(
            target: FILES_TARGET,
            "list_directory",
            directory = %request.path.display(),
            recursive = request.recursive,
        );
        let _entered = span.enter();
        finish(self.run_list_directory(request))
    }

    fn run_list_directory(&self, request: &ListDirectoryRequest) -> Result<String, EditError> {
        let root = self.resolve(&request.path)?;
        let lines = if request.recursive {
            list_recursive(request, &root)?
        } else {
            list_flat(request, &root)?
        };
        debug!(target: FILES_TARGET, entries = lines.len(), "directory listed");
        Ok(lines.join("\n"))
    }

    /// Finds entries whose names match `pattern` as a glob or contain it.
    ///
    /// Matches are reported one per line, spelled under the requested
    /// directory. Unreadable entries are skipped.
    ///
    /// # Errors
    ///
    /// Fails when the pattern is empty or the directory is refused.
    pub fn search_files(&self, request: &SearchFilesRequest) -> Result<String, EditError> {
        let span = info_span!(
            target: FILES_TARGET,
            "search_files",
            directory = %request.directory.display(),
            pattern = %request.pattern,
        );
        let _entered = span.enter();
        finish(self.run_search_files(request))
    }

    fn run_search_files(&self, request: &SearchFilesRequest) -> Result<String, EditError> {
        if request.pattern.is_empty() {
            return Err(EditError::EmptyPattern);
        }
        let root = self.resolve(&request.directory)?;
        let matcher = NameMatcher::new(&request.pattern, request.case_sensitive);

        let mut walker = WalkDir::new(&root)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name();
        if let Some(depth) = request.depth_limit() {
            walker = walker.max_depth(depth.saturating_add(1));
        }
        let matches: Vec<String> = walker
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| request.include_directories || !entry.file_type().is_dir())
            .filter(|entry| matcher.matches(entry.file_name()))
            .map(|entry| spelled_under(&request.directory, &root, entry.path()))
            .collect();
        debug!(target: FILES_TARGET, matches = matches.len(), "search finished");
        Ok(matches.join("\n"))
    }

    /// Searches the text files below a directory for lines containing
    /// `pattern`.
    ///
    /// Only files whose names match `file_pattern` and whose extensions mark
    /// them as text are read; unreadable files are skipped. Each file with a
    /// hit contributes a `=== path ===` header followed by one context block
    /// per matching line. [`NO_MATCHES`] is returned when nothing matches.
    ///
    /// # Errors
    ///
    /// Fails when the pattern is empty, the file pattern is not a valid glob,
    /// or the directory is refused.
    pub fn find_in_files(&self, request: &FindInFilesRequest) -> Result<String, EditError> {
        let span = info_span!(
            target: FILES_TARGET,
            "find_in_files",
            directory = %request.directory.display(),
            file_pattern = %request.file_pattern,
        );
        let _entered = span.enter();
        finish(self.run_find_in_files(request))
    }

    fn run_find_in_files(&self, request: &FindInFilesRequest) -> Result<String, EditError> {
        if request.pattern.is_empty() {
            return Err(EditError::EmptyPattern);
        }
        let file_glob = GlobBuilder::new(&request.file_pattern)
            .literal_separator(true)
            .build()
            .map_err(|error| EditError::InvalidGlob {
                pattern: request.file_pattern.clone(),
                message: error.to_string(),
            })?
            .compile_matcher();
        let root = self.resolve(&request.directory)?;
        let needle = TextNeedle::new(&request.pattern, request.case_sensitive);

        let mut sections = Vec::new();
        let mut files = 0_usize;
        let candidates = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| file_glob.is_match(entry.file_name()))
            .filter(|entry| is_text_file(entry.path()));
        for entry in candidates {
            let Ok(bytes) = self.store.read(entry.path()) else {
                continue;
            };
            let text = String::from_utf8_lossy(&bytes);
            let blocks = context_blocks(&text, &needle, request.context_lines);
            if blocks.is_empty() {
                continue;
            }
            files += 1;
            sections.push(format!(
                "=== {} ===",
                spelled_under(&request.directory, &root, entry.path())
            ));
            sections.extend(blocks);
            sections.push(String::new());
        }
        debug!(target: FILES_TARGET, files, "text search finished");

        if sections.is_empty() {
            return Ok(String::from(NO_MATCHES));
        }
        Ok(sections.join("\n"))
    }
}

fn list_flat(request: &ListDirectoryRequest, root: &Path) -> Result<Vec<String>, EditError> {
    let failure = |err: std::io::Error| EditError::file_operation("list", request.path.clone(), &err);
    let mut entries = fs::read_dir(root)
        .map_err(failure)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(failure)?;
    entries.sort_by_key(fs::DirEntry::file_name);
    Ok(entries
        .iter()
        .filter(|entry| request.include_hidden || !is_hidden(&entry.file_name()))
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            Some(listing_line(&entry.file_name().to_string_lossy(), &metadata))
        })
        .collect())
}

fn list_recursive(request: &ListDirectoryRequest, root: &Path) -> Result<Vec<String>, EditError> {
    let base = root.file_name().map_or_else(
        || root.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    );
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || request.include_hidden || !is_hidden(entry.file_name())
        });

    let mut lines = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|error| walk_failure(&request.path, &error))?;
        let metadata = entry
            .metadata()
            .map_err(|error| walk_failure(&request.path, &error))?;
        let name = if entry.depth() == 0 {
            base.clone()
        } else {
            entry
                .path()
                .strip_prefix(root)
                .unwrap_or_else(|_| entry.path())
                .display()
                .to_string()
        };
        lines.push(listing_line(&name, &metadata));
    }
    Ok(lines)
}

fn walk_failure(requested: &Path, error: &walkdir::Error) -> EditError {
    EditError::FileOperationFailed {
        action: "list",
        path: requested.to_path_buf(),
        message: error.to_string(),
    }
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Spells `path`, found below the canonical `root`, under the directory the
/// caller named.
fn spelled_under(requested: &Path, root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map_or_else(|_| path.to_path_buf(), |relative| requested.join(relative))
        .display()
        .to_string()
}

/// Matches entry names by glob, falling back to substring containment.
struct NameMatcher {
    glob: Option<GlobMatcher>,
    needle: TextNeedle,
}

impl NameMatcher {
    fn new(pattern: &str, case_sensitive: bool) -> Self {
        // A pattern that is not a valid glob still matches as plain text.
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .case_insensitive(!case_sensitive)
            .build()
            .ok()
            .map(|glob| glob.compile_matcher());
        Self {
            glob,
            needle: TextNeedle::new(pattern, case_sensitive),
        }
    }

    fn matches(&self, name: &OsStr) -> bool {
        self.glob.as_ref().is_some_and(|glob| glob.is_match(name))
            || self.needle.found_in(&name.to_string_lossy())
    }
}

/// Substring search with optional case folding.
struct TextNeedle {
    text: String,
    case_sensitive: bool,
}

impl TextNeedle {
    fn new(text: &str, case_sensitive: bool) -> Self {
        let text = if case_sensitive {
            text.to_owned()
        } else {
            text.to_lowercase()
        };
        Self {
            text,
            case_sensitive,
        }
    }

    fn found_in(&self, haystack: &str) -> bool {
        if self.case_sensitive {
            haystack.contains(&self.text)
        } else {
            haystack.to_lowercase().contains(&self.text)
        }
    }
}

/// One block per matching line: `Context for line N:` followed by the line
/// and up to `context` lines on each side.
fn context_blocks(text: &str, needle: &TextNeedle, context: usize) -> Vec<String> {
    let lines: Vec<&str> = text.split('\n').collect();
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| needle.found_in(line))
        .map(|(index, _)| {
            let start = index.saturating_sub(context);
            let end = index.saturating_add(context).saturating_add(1).min(lines.len());
            let shown = lines.get(start..end).unwrap_or_default().join("\n");
            format!("Context for line {}:\n{shown}\n", index + 1)
        })
        .collect()
}
