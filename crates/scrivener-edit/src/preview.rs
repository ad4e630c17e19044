//! Human-readable previews of pending edits.

use std::fmt::Write;

use crate::buffer::LineBuffer;
use crate::operation::EditOperation;

/// Renders each operation's original and replacement lines, in request order.
///
/// ```text
/// Lines 2-3:
/// - Original:
///   2: old two
///   3: old three
/// + Replacement:
///   2: new two
///   Description: rename
/// ```
///
/// Original lines that fall outside `buffer` are omitted, so previews of
/// unvalidated operations still render, however large their ranges.
#[must_use]
pub fn render_operations(buffer: &LineBuffer, operations: &[EditOperation]) -> String {
    let mut preview = String::new();
    for operation in operations {
        render_operation(&mut preview, buffer, operation);
    }
    preview
}

fn render_operation(out: &mut String, buffer: &LineBuffer, operation: &EditOperation) {
    let _ = writeln!(
        out,
        "Lines {}-{}:",
        operation.start_line, operation.end_line
    );
    out.push_str("- Original:\n");
    let last = operation.end_line.min(buffer.line_count());
    for number in operation.start_line.max(1)..=last {
        if let Some(line) = buffer.line(number) {
            let _ = writeln!(out, "  {number}: {line}");
        }
    }
    out.push_str("+ Replacement:\n");
    for (offset, line) in operation.replacement_lines().iter().enumerate() {
        let _ = writeln!(out, "  {}: {line}", operation.start_line.saturating_add(offset));
    }
    if let Some(description) = &operation.description {
        let _ = writeln!(out, "  Description: {description}");
    }
    out.push('\n');
}

/// Compares a block before and after replacement.
///
/// Identical inputs render as `No changes`.
#[must_use]
pub fn character_diff(original: &str, replacement: &str) -> String {
    if original == replacement {
        return String::from("No changes");
    }
    format!("- Original:\n{original}\n+ Replacement:\n{replacement}\n")
}
