//! Application of operations and insertions to a buffer.
//!
//! Operations are addressed against the buffer as read, so they are applied
//! from the bottom of the file upwards: a splice never shifts the lines an
//! unapplied operation refers to. Ties on the same position are applied in
//! reverse request order, which leaves their output in request order.

use crate::buffer::LineBuffer;
use crate::error::ValidationError;
use crate::operation::{EditOperation, TextInsertion};
use crate::validate::{check_anchor, check_range};

/// Request indices of `operations` in application order.
#[must_use]
pub fn application_order(operations: &[EditOperation]) -> Vec<usize> {
    descending_by(operations.len(), |index| operations[index].start_line)
}

/// Applies every operation, returning the edited buffer.
///
/// # Errors
///
/// Fails if an operation's range does not fit the buffer. Ranges are always
/// checked here, even when the caller skipped validation.
pub fn apply_operations(
    buffer: &LineBuffer,
    operations: &[EditOperation],
) -> Result<LineBuffer, ValidationError> {
    application_order(operations)
        .into_iter()
        .try_fold(buffer.clone(), |current, index| {
            apply_operation(&current, index + 1, &operations[index])
        })
}

/// Applies a single operation; `number` is its one-based request position.
///
/// # Errors
///
/// Fails if the operation's range does not fit `buffer`.
pub fn apply_operation(
    buffer: &LineBuffer,
    number: usize,
    operation: &EditOperation,
) -> Result<LineBuffer, ValidationError> {
    check_range(
        number,
        operation.start_line,
        operation.end_line,
        buffer.line_count(),
    )?;
    buffer
        .splice(
            operation.start_line,
            operation.end_line,
            operation.replacement_lines(),
        )
        .map_err(|error| ValidationError::from_range(number, error))
}

/// Applies insertions addressed against the original line numbers.
///
/// # Errors
///
/// Fails if any anchor is not a line of `buffer`.
pub fn apply_insertions(
    buffer: &LineBuffer,
    insertions: &[TextInsertion],
) -> Result<LineBuffer, ValidationError> {
    descending_by(insertions.len(), |index| insertions[index].insertion_point())
        .into_iter()
        .try_fold(buffer.clone(), |current, index| {
            check_anchor(index + 1, &insertions[index], buffer)?;
            insert(&current, index + 1, &insertions[index])
        })
}

/// Applies insertions in request order, each seeing the lines added before it.
///
/// # Errors
///
/// Fails if an anchor is not a line of the buffer as it stands when that
/// insertion is reached.
pub fn apply_insertions_in_sequence(
    buffer: &LineBuffer,
    insertions: &[TextInsertion],
) -> Result<LineBuffer, ValidationError> {
    insertions
        .iter()
        .enumerate()
        .try_fold(buffer.clone(), |current, (index, insertion)| {
            check_anchor(index + 1, insertion, &current)?;
            insert(&current, index + 1, insertion)
        })
}

fn insert(
    buffer: &LineBuffer,
    number: usize,
    insertion: &TextInsertion,
) -> Result<LineBuffer, ValidationError> {
    let point = insertion.insertion_point();
    buffer
        .splice(point + 1, point, insertion.content_lines())
        .map_err(|error| ValidationError::InvalidInsertion {
            insertion: number,
            line: insertion.line,
            line_count: error.line_count,
        })
}

/// Sorts `0..len` by descending key, breaking ties by descending index.
fn descending_by(len: usize, key: impl Fn(usize) -> usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by(|&a, &b| key(b).cmp(&key(a)).then_with(|| b.cmp(&a)));
    order
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn buffer(lines: &[&str]) -> LineBuffer {
        LineBuffer::from_lines(lines.iter().map(|line| (*line).to_owned()).collect())
    }

    #[test]
    fn operations_apply_against_original_numbering() {
        let original = buffer(&["a", "b", "c", "d", "e"]);
        let operations = [
            EditOperation::new(1, 1, "A1\nA2"),
            EditOperation::new(4, 5, "DE"),
        ];
        let edited = apply_operations(&original, &operations).expect("operations fit");
        assert_eq!(edited.lines(), ["A1", "A2", "b", "c", "DE"]);
    }

    #[rstest]
    #[case::ascending(&[(1, 1), (3, 3), (5, 5)])]
    #[case::descending(&[(5, 5), (3, 3), (1, 1)])]
    #[case::shuffled(&[(3, 3), (5, 5), (1, 1)])]
    fn request_order_does_not_change_the_result(#[case] ranges: &[(usize, usize)]) {
        let original = buffer(&["a", "b", "c", "d", "e"]);
        let operations: Vec<_> = ranges
            .iter()
            .map(|&(start, end)| EditOperation::new(start, end, format!("{start}\n{start}")))
            .collect();
        let edited = apply_operations(&original, &operations).expect("operations fit");
        assert_eq!(edited.lines(), ["1", "1", "b", "3", "3", "d", "5", "5"]);
    }

    #[test]
    fn application_order_is_bottom_up() {
        let operations = [
            EditOperation::new(2, 2, ""),
            EditOperation::new(9, 9, ""),
            EditOperation::new(4, 6, ""),
        ];
        assert_eq!(application_order(&operations), [1, 2, 0]);
    }

    #[test]
    fn out_of_range_operation_fails_without_validation() {
        let error = apply_operations(&buffer(&["a"]), &[EditOperation::new(2, 3, "x")])
            .expect_err("range should not fit");
        assert!(matches!(error, ValidationError::OutOfBounds { operation: 1, .. }));
    }

    #[test]
    fn insertions_before_and_after_the_same_line() {
        let original = buffer(&["one", "two", "three"]);
        let insertions = [
            TextInsertion::before(2, "before two"),
            TextInsertion::after(2, "after two"),
        ];
        let edited = apply_insertions(&original, &insertions).expect("anchors exist");
        assert_eq!(
            edited.lines(),
            ["one", "before two", "two", "after two", "three"]
        );
    }

    #[test]
    fn insertions_sharing_a_gap_keep_request_order() {
        let original = buffer(&["one", "two"]);
        let insertions = [
            TextInsertion::after(1, "first"),
            TextInsertion::before(2, "second"),
            TextInsertion::after(1, "third"),
        ];
        let edited = apply_insertions(&original, &insertions).expect("anchors exist");
        assert_eq!(edited.lines(), ["one", "first", "second", "third", "two"]);
    }

    #[test]
    fn sequential_insertions_see_earlier_lines() {
        let original = buffer(&["one", "two"]);
        let insertions = [
            TextInsertion::after(1, "inserted"),
            TextInsertion::after(2, "after inserted"),
        ];
        let edited = apply_insertions_in_sequence(&original, &insertions).expect("anchors exist");
        assert_eq!(
            edited.lines(),
            ["one", "inserted", "after inserted", "two"]
        );
    }

    #[test]
    fn sequential_insertions_may_anchor_on_added_lines() {
        let original = buffer(&["one"]);
        let insertions = [
            TextInsertion::after(1, "two"),
            TextInsertion::after(2, "three"),
        ];
        assert!(apply_insertions(&original, &insertions).is_err());
        let edited = apply_insertions_in_sequence(&original, &insertions).expect("anchors exist");
        assert_eq!(edited.lines(), ["one", "two", "three"]);
    }
}
