use parsing_common::{Checkpoint, Position, TextSlice};
use std::sync::Arc;

/// A cursor for traversing a code-point buffer.
///
/// Besides the current position the cursor remembers the farthest position
/// it ever reached. Backtracking rewinds the former but never the latter,
/// which is what a top-level "parse stopped here" diagnostic points at.
#[derive(Debug, Clone)]
pub struct Cursor {
    buffer: Arc<[char]>,
    position: Position,
    farthest: Position,
}

impl Cursor {
    /// Creates a new cursor from the input string.
    pub fn new<S: AsRef<str>>(input: S) -> Self {
        let buffer: Arc<[char]> = input.as_ref().chars().collect::<Vec<_>>().into();
        Self::with_arc(buffer)
    }

    /// Creates a cursor from an existing shared buffer.
    pub fn with_arc(buffer: Arc<[char]>) -> Self {
        Self {
            buffer,
            position: Position::new(),
            farthest: Position::new(),
        }
    }

    /// Returns the current position in the source.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Returns the farthest position the cursor has advanced to.
    pub fn farthest(&self) -> Position {
        self.farthest
    }

    /// Returns the current offset in code points.
    pub fn offset(&self) -> usize {
        self.position.offset
    }

    /// Returns the total number of code points in the buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns true if the cursor is at the end of the input.
    pub fn is_eof(&self) -> bool {
        self.offset() >= self.buffer.len()
    }

    /// Returns the shared buffer.
    pub fn buffer(&self) -> Arc<[char]> {
        Arc::clone(&self.buffer)
    }

    /// Returns the next character without advancing the cursor.
    pub fn peek(&self) -> Option<char> {
        self.buffer.get(self.offset()).copied()
    }

    /// Returns the character `n` places ahead without advancing the cursor.
    pub fn peek_at(&self, n: usize) -> Option<char> {
        self.buffer.get(self.offset() + n).copied()
    }

    /// Returns true if the remaining input starts with `expected`.
    pub fn starts_with(&self, expected: &[char]) -> bool {
        self.buffer[self.offset()..].starts_with(expected)
    }

    /// Advances the cursor by one character.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position = self.position.advanced(ch);
        if self.position.offset > self.farthest.offset {
            self.farthest = self.position;
        }
        Some(ch)
    }

    /// Advances the cursor by n characters.
    pub fn advance_by(&mut self, n: usize) -> usize {
        let mut count = 0;
        for _ in 0..n {
            if self.advance().is_none() {
                break;
            }
            count += 1;
        }
        count
    }

    /// Consumes characters while the predicate returns true.
    pub fn consume_while<F>(&mut self, mut predicate: F) -> TextSlice
    where
        F: FnMut(char) -> bool,
    {
        let start = self.offset();
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.advance();
        }
        TextSlice::new(self.buffer(), start, self.offset())
    }

    /// Returns the code points between two offsets.
    pub fn slice(&self, start: usize, end: usize) -> TextSlice {
        let end = end.min(self.buffer.len());
        TextSlice::new(self.buffer(), start.min(end), end)
    }

    /// Returns the remaining input from the current position.
    pub fn remaining(&self) -> TextSlice {
        self.slice(self.offset(), self.buffer.len())
    }

    /// Resets the cursor to the beginning.
    pub fn reset(&mut self) {
        self.position = Position::new();
        self.farthest = Position::new();
    }

    /// Creates a checkpoint that can be restored later.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.position)
    }

    /// Restores the cursor to a previous checkpoint.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.position();
    }
}
