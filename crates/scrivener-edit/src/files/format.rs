//! Rendering of sizes, modes, and timestamps for listings and file info.

use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

/// Extensions whose files are treated as text when searching.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "json", "xml", "yaml", "yml", "go", "py", "js", "ts", "java", "c", "cpp", "h",
    "hpp", "cs", "php", "rb", "rs", "kt", "html", "css", "scss", "sass", "less", "sql", "sh",
    "bat", "ps1", "dockerfile", "cfg", "conf", "ini", "toml", "properties",
];

const UNKNOWN_TIME: &str = "unknown";

/// Renders a byte count with a binary unit, such as `512 B` or `1.5 KB`.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const STEP: u64 = 1024;
    const UNITS: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];
    if bytes < STEP {
        return format!("{bytes} B");
    }
    let mut divisor = STEP;
    let mut exponent = 0;
    let mut scaled = bytes / STEP;
    while scaled >= STEP && exponent + 1 < UNITS.len() {
        divisor *= STEP;
        scaled /= STEP;
        exponent += 1;
    }
    let unit = UNITS.get(exponent).copied().unwrap_or('E');
    let value = bytes as f64 / divisor as f64;
    format!("{value:.1} {unit}B")
}

/// Whether `path` has an extension from the text file list.
#[must_use]
pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            TEXT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        })
}

/// Ten-character mode string in the `ls -l` style, such as `drwxr-xr-x`.
pub(crate) fn mode_string(metadata: &Metadata) -> String {
    let file_type = metadata.file_type();
    let kind = if file_type.is_dir() {
        'd'
    } else if file_type.is_symlink() {
        'L'
    } else {
        '-'
    };
    let bits = permission_bits(metadata);
    let mut text = String::with_capacity(10);
    text.push(kind);
    for shift in [6, 3, 0] {
        for (mask, flag) in [(4, 'r'), (2, 'w'), (1, 'x')] {
            text.push(if (bits >> shift) & mask == 0 { '-' } else { flag });
        }
    }
    text
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> u32 {
    match (metadata.is_dir(), metadata.permissions().readonly()) {
        (true, _) => 0o755,
        (false, true) => 0o444,
        (false, false) => 0o644,
    }
}

/// One listing line: mode, size (or `<DIR>`), modification time, and name.
pub(crate) fn listing_line(name: &str, metadata: &Metadata) -> String {
    let size = if metadata.is_dir() {
        String::from("<DIR>")
    } else {
        format_bytes(metadata.len())
    };
    let modified = metadata.modified().map_or_else(
        |_| String::from(UNKNOWN_TIME),
        |time| {
            OffsetDateTime::from(time)
                .format(format_description!(
                    "[year]-[month]-[day] [hour]:[minute]:[second]"
                ))
                .unwrap_or_else(|_| String::from(UNKNOWN_TIME))
        },
    );
    format!("{:<10} {size:>10} {modified} {name}", mode_string(metadata))
}

/// RFC 3339 rendering of a modification time.
pub(crate) fn rfc3339(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from(UNKNOWN_TIME))
}
