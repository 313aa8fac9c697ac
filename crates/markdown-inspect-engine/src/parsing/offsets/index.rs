use std::fmt;

use serde::Serialize;

/// A 0-based line and column in the normalized original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

impl LineColumn {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for LineColumn {
    /// Renders 1-based `line:column`, the way diagnostics are reported.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Cumulative character counts per physical line.
///
/// Entry `i` is the number of characters consumed through the end of line `i`,
/// terminator included, so the sequence is strictly increasing and
/// `ends[i] - ends[i - 1]` is the length of line `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetIndex {
    ends: Vec<usize>,
}

impl OffsetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line of `length` characters (terminator included).
    pub fn push(&mut self, length: usize) {
        debug_assert!(length > 0, "every line carries at least its terminator");
        let end = self.total_len() + length;
        self.ends.push(end);
    }

    pub fn line_count(&self) -> usize {
        self.ends.len()
    }

    /// Total characters indexed so far.
    pub fn total_len(&self) -> usize {
        self.ends.last().copied().unwrap_or(0)
    }

    /// Absolute offset of the first character of `line`.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        match line {
            0 => Some(0),
            n => self.ends.get(n - 1).copied().filter(|_| n < self.ends.len()),
        }
    }

    /// Length of `line` in characters, terminator included.
    pub fn line_len(&self, line: usize) -> Option<usize> {
        let end = *self.ends.get(line)?;
        Some(end - self.line_start(line)?)
    }

    /// Maps an absolute offset to its line and column.
    ///
    /// Finds the greatest line end `<= offset` by binary search; the column is
    /// the residual. `offset == total_len()` is valid and resolves to the end
    /// of the last line. Anything past that is `None`.
    pub fn resolve(&self, offset: usize) -> Option<LineColumn> {
        let total = self.total_len();
        if offset > total {
            return None;
        }
        if self.ends.is_empty() {
            return Some(LineColumn::new(0, 0));
        }

        let line = self.ends.partition_point(|&end| end <= offset);
        if line == self.ends.len() {
            // One past the last character.
            let last = line - 1;
            let start = self.line_start(last)?;
            return Some(LineColumn::new(last, offset - start));
        }

        let start = if line == 0 { 0 } else { self.ends[line - 1] };
        Some(LineColumn::new(line, offset - start))
    }

    /// Inverse of [`resolve`](Self::resolve).
    pub fn offset_of(&self, position: LineColumn) -> Option<usize> {
        if self.ends.is_empty() {
            return (position == LineColumn::new(0, 0)).then_some(0);
        }
        let start = self.line_start(position.line)?;
        let len = self.line_len(position.line)?;
        let is_last = position.line + 1 == self.ends.len();
        // Only the last line may address the one-past-the-end column.
        if position.column < len || (is_last && position.column == len) {
            Some(start + position.column)
        } else {
            None
        }
    }
}

impl FromIterator<usize> for OffsetIndex {
    fn from_iter<T: IntoIterator<Item = usize>>(lengths: T) -> Self {
        let mut index = OffsetIndex::new();
        for length in lengths {
            index.push(length);
        }
        index
    }
}
