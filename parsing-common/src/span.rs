use crate::Position;

/// A half-open range of code points in one source file.
///
/// Spans are produced by the scanner around rule activations and semantic
/// actions and are immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Index of the file in the caller's file table
    pub file_index: usize,
    /// First code point covered by the span
    pub start: usize,
    /// One past the last code point covered by the span
    pub end: usize,
    /// Line of `start` (1-indexed)
    pub start_line: usize,
    /// Line of `end` (1-indexed)
    pub end_line: usize,
}

impl Span {
    /// Creates the span between two scanner positions.
    pub fn between(file_index: usize, start: Position, end: Position) -> Self {
        debug_assert!(start.offset <= end.offset);
        Self {
            file_index,
            start: start.offset,
            end: end.offset,
            start_line: start.line,
            end_line: end.line,
        }
    }

    /// Creates an empty span at a single position.
    pub fn at(file_index: usize, position: Position) -> Self {
        Self::between(file_index, position, position)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_between() {
        let span = Span::between(2, Position::at(1, 3, 2), Position::at(2, 2, 7));
        assert_eq!(span.file_index, 2);
        assert_eq!(span.len(), 5);
        assert_eq!(span.start_line, 1);
        assert_eq!(span.end_line, 2);
        assert!(span.contains(2));
        assert!(!span.contains(7));
    }

    #[test]
    fn test_span_at_is_empty() {
        let span = Span::at(0, Position::at(1, 5, 4));
        assert!(span.is_empty());
        assert_eq!(span.start, 4);
    }
}
