use crate::Position;

/// A saved scanner location used for backtracking.
///
/// Restoring a checkpoint rewinds both the offset and the line/column
/// bookkeeping, so a rolled-back alternative leaves no trace in later
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    position: Position,
}

impl Checkpoint {
    /// Creates a checkpoint at the given position.
    pub fn new(position: Position) -> Self {
        Self { position }
    }

    /// Returns the code-point offset stored in this checkpoint.
    pub fn index(&self) -> usize {
        self.position.offset
    }

    /// Returns the line stored in this checkpoint.
    pub fn line(&self) -> usize {
        self.position.line
    }

    /// Returns the position stored in this checkpoint.
    pub fn position(&self) -> Position {
        self.position
    }
}
