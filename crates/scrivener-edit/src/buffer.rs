//! Line-addressed text buffers.
//!
//! A [`LineBuffer`] holds one file's content as an ordered list of lines.
//! Line numbers are one-based at the API boundary. Loading collapses `\r\n`
//! and lone `\r` separators into `\n`; serialisation joins with `\n`, so
//! `LineBuffer::load(text).serialize() == normalize(text)` for every input.

use thiserror::Error;

/// Separator used between lines after normalisation.
pub const LINE_SEPARATOR: &str = "\n";

/// Collapses `\r\n` and `\r` into `\n`.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Splits text into normalised lines.
///
/// The split is strict: a trailing separator yields a trailing empty line,
/// and empty input yields a single empty line.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    normalize(text)
        .split(LINE_SEPARATOR)
        .map(str::to_owned)
        .collect()
}

/// A line range that does not fit the buffer it was applied to.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("lines {start}-{end} do not fit a buffer of {line_count} lines")]
pub struct RangeError {
    /// First line of the rejected range (one-based).
    pub start: usize,
    /// Last line of the rejected range (one-based, inclusive).
    pub end: usize,
    /// Number of lines in the buffer.
    pub line_count: usize,
}

/// In-memory content of one file, addressed by line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
}

impl LineBuffer {
    /// Builds a buffer from raw file text.
    #[must_use]
    pub fn load(text: &str) -> Self {
        Self {
            lines: split_lines(text),
        }
    }

    /// Builds a buffer from already-split lines.
    #[must_use]
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Number of lines held.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// All lines in order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns line `number` (one-based).
    #[must_use]
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .map(String::as_str)
    }

    /// Returns lines `start..=end` (one-based, inclusive).
    ///
    /// # Errors
    ///
    /// Fails when `start` is zero, `end < start`, or `end` is past the last line.
    pub fn slice(&self, start: usize, end: usize) -> Result<&[String], RangeError> {
        if start == 0 || end < start {
            return Err(self.range_error(start, end));
        }
        self.lines
            .get(start - 1..end)
            .ok_or_else(|| self.range_error(start, end))
    }

    /// Returns a new buffer with lines `start..=end` replaced by `new_lines`.
    ///
    /// `end == start - 1` selects the empty range in front of `start`, which
    /// inserts without consuming any line. `start` may be one past the last
    /// line in that case, appending to the buffer.
    ///
    /// # Errors
    ///
    /// Fails when the range does not describe a position in this buffer.
    pub fn splice<I>(&self, start: usize, end: usize, new_lines: I) -> Result<Self, RangeError>
    where
        I: IntoIterator<Item = String>,
    {
        let fits = start >= 1 && end + 1 >= start && end <= self.lines.len();
        if !fits {
            return Err(self.range_error(start, end));
        }

        let head = self.lines.iter().take(start - 1).cloned();
        let tail = self.lines.iter().skip(end).cloned();
        Ok(Self {
            lines: head.chain(new_lines).chain(tail).collect(),
        })
    }

    /// Joins the lines with the normalised separator.
    #[must_use]
    pub fn serialize(&self) -> String {
        self.lines.join(LINE_SEPARATOR)
    }

    /// Consumes the buffer, returning its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    fn range_error(&self, start: usize, end: usize) -> RangeError {
        RangeError {
            start,
            end,
            line_count: self.lines.len(),
        }
    }
}
