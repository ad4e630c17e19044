use std::path::PathBuf;

use crate::logging::LogFormat;

/// Roots consulted when no layer configures an allow-list.
pub const DEFAULT_ALLOWED_DIRECTORIES: &[&str] = &["/home", "/tmp", "/var/log"];

/// Lines a single file read returns before it is truncated.
pub const DEFAULT_FILE_READ_LINE_LIMIT: usize = 1000;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binary.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the binary.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default allow-list roots as owned paths.
pub fn default_allowed_directories() -> Vec<PathBuf> {
    DEFAULT_ALLOWED_DIRECTORIES
        .iter()
        .map(PathBuf::from)
        .collect()
}
