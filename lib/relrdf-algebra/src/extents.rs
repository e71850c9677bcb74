use std::fmt;
use std::sync::Arc;

/// A region of query source text, used to point at the origin of IR nodes in diagnostics.
///
/// Lines and columns start at 1. Columns count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extents {
    pub file_name: Arc<str>,
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Extents {
    /// A single position.
    pub fn point(file_name: Arc<str>, line: usize, column: usize) -> Self {
        Self {
            file_name,
            start_line: line,
            start_column: column,
            end_line: line,
            end_column: column,
        }
    }

    /// The extents starting where `self` starts and ending where `end` ends.
    #[must_use]
    pub fn span_to(&self, end: &Self) -> Self {
        Self {
            file_name: Arc::clone(&self.file_name),
            start_line: self.start_line,
            start_column: self.start_column,
            end_line: end.end_line,
            end_column: end.end_column,
        }
    }

    /// The smallest extents covering both `self` and `other`.
    #[must_use]
    pub fn cover(&self, other: &Self) -> Self {
        let start = if (other.start_line, other.start_column) < (self.start_line, self.start_column) {
            other
        } else {
            self
        };
        let end = if (other.end_line, other.end_column) > (self.end_line, self.end_column) {
            other
        } else {
            self
        };
        start.span_to(end)
    }

    /// Start and end are ordered.
    pub fn is_monotonic(&self) -> bool {
        self.start_line < self.end_line
            || (self.start_line == self.end_line && self.start_column <= self.end_column)
    }

    pub fn is_point(&self) -> bool {
        self.start_line == self.end_line && self.start_column == self.end_column
    }
}

impl fmt::Display for Extents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file_name, self.start_line, self.start_column
        )?;
        if !self.is_point() {
            write!(
                f,
                ": (ends: line {}, col {})",
                self.end_line, self.end_column
            )?;
        }
        Ok(())
    }
}

/// Converts byte offsets of a source text into line and column positions.
#[derive(Debug, Clone)]
pub(crate) struct LineIndex {
    file_name: Arc<str>,
    text: Arc<str>,
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(file_name: &str, text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            file_name: file_name.into(),
            text: text.into(),
            line_starts,
        }
    }

    pub fn file_name(&self) -> Arc<str> {
        Arc::clone(&self.file_name)
    }

    /// Line and column of the character at `offset`.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let line = self
            .line_starts
            .partition_point(|start| *start <= offset)
            .max(1);
        let line_start = self.line_starts.get(line - 1).copied().unwrap_or(0);
        let column = self
            .text
            .get(line_start..offset)
            .map_or(offset - line_start, |prefix| prefix.chars().count());
        (line, column + 1)
    }

    /// Extents covering the bytes `start..end`. The end position is the last covered character.
    pub fn extents(&self, start: usize, end: usize) -> Extents {
        let (start_line, start_column) = self.position(start);
        let (end_line, end_column) = if end > start {
            let mut last = end.min(self.text.len()).saturating_sub(1);
            while !self.text.is_char_boundary(last) {
                last -= 1;
            }
            self.position(last)
        } else {
            (start_line, start_column)
        };
        Extents {
            file_name: self.file_name(),
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions() {
        let index = LineIndex::new("q.rq", "ab\ncdé\nf");
        assert_eq!(index.position(0), (1, 1));
        assert_eq!(index.position(2), (1, 3));
        assert_eq!(index.position(3), (2, 1));
        assert_eq!(index.position(8), (3, 1));
        let extents = index.extents(3, 7);
        assert_eq!(
            (extents.start_line, extents.start_column, extents.end_line, extents.end_column),
            (2, 1, 2, 3)
        );
        assert!(extents.is_monotonic());
    }

    #[test]
    fn display() {
        let index = LineIndex::new("q.rq", "SELECT ?x\nWHERE {}");
        assert_eq!(index.extents(7, 9).to_string(), "q.rq:1:8: (ends: line 1, col 9)");
        assert_eq!(index.extents(10, 10).to_string(), "q.rq:2:1");
    }

    #[test]
    fn cover() {
        let index = LineIndex::new("q.rq", "SELECT ?x\nWHERE {}");
        let covered = index.extents(10, 12).cover(&index.extents(0, 6));
        assert_eq!(covered.to_string(), "q.rq:1:1: (ends: line 2, col 2)");
    }
}
