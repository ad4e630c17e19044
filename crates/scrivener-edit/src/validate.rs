//! Pre-write checks for operations and insertions.
//!
//! Validation runs against the buffer as read, before any backup or write.
//! It reports the first problem found, scanning operations in request order.

use crate::buffer::LineBuffer;
use crate::error::ValidationError;
use crate::operation::{EditOperation, TextInsertion};

/// Checks one range against a buffer of `line_count` lines.
///
/// `operation` is the one-based position used in the error.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidRange`] for zero or inverted ranges and
/// [`ValidationError::OutOfBounds`] when `end_line` is past the last line.
pub const fn check_range(
    operation: usize,
    start_line: usize,
    end_line: usize,
    line_count: usize,
) -> Result<(), ValidationError> {
    if start_line == 0 || end_line == 0 || start_line > end_line {
        return Err(ValidationError::InvalidRange {
            operation,
            start_line,
            end_line,
        });
    }
    if end_line > line_count {
        return Err(ValidationError::OutOfBounds {
            operation,
            start_line,
            end_line,
            line_count,
        });
    }
    Ok(())
}

/// Validates a set of operations against the buffer they address.
///
/// Every operation must have a well-formed range inside the buffer, and no
/// two operations may share a line.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate_operations(
    buffer: &LineBuffer,
    operations: &[EditOperation],
) -> Result<(), ValidationError> {
    for (index, operation) in operations.iter().enumerate() {
        check_range(
            index + 1,
            operation.start_line,
            operation.end_line,
            buffer.line_count(),
        )?;
    }
    check_overlaps(operations)
}

/// Validates that every insertion anchors on an existing line.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidInsertion`] for the first anchor outside
/// `1..=line_count`.
pub fn validate_insertions(
    buffer: &LineBuffer,
    insertions: &[TextInsertion],
) -> Result<(), ValidationError> {
    insertions
        .iter()
        .enumerate()
        .try_for_each(|(index, insertion)| check_anchor(index + 1, insertion, buffer))
}

/// Checks one insertion anchor against the current buffer.
pub(crate) fn check_anchor(
    insertion: usize,
    text: &TextInsertion,
    buffer: &LineBuffer,
) -> Result<(), ValidationError> {
    let line_count = buffer.line_count();
    if text.line == 0 || text.line > line_count {
        return Err(ValidationError::InvalidInsertion {
            insertion,
            line: text.line,
            line_count,
        });
    }
    Ok(())
}

/// Sweeps operations by start line, tracking the furthest end seen so far.
///
/// Ranges are inclusive, so `[2, 4]` and `[4, 6]` overlap on line 4.
fn check_overlaps(operations: &[EditOperation]) -> Result<(), ValidationError> {
    let mut order: Vec<usize> = (0..operations.len()).collect();
    order.sort_by_key(|&index| (operations[index].start_line, index));

    let mut furthest: Option<usize> = None;
    for &index in &order {
        if let Some(previous) = furthest {
            if operations[index].start_line <= operations[previous].end_line {
                return Err(ValidationError::OverlappingOperations {
                    first: previous.min(index) + 1,
                    second: previous.max(index) + 1,
                });
            }
        }
        let extends = furthest
            .is_none_or(|previous| operations[index].end_line > operations[previous].end_line);
        if extends {
            furthest = Some(index);
        }
    }
    Ok(())
}
