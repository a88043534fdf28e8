/// Represents a location in the scanned input.
///
/// Offsets count code points, not bytes: the scanner works over a buffer
/// of `char`s so that every primitive consumes exactly one unit per
/// character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Code-point offset from the start of the input
    pub offset: usize,
}

impl Position {
    /// Creates a new position at the start of the input.
    pub fn new() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Creates a position with the given values.
    pub fn at(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Returns the position after consuming `ch`.
    pub fn advanced(self, ch: char) -> Self {
        if ch == '\n' {
            Self {
                line: self.line + 1,
                column: 1,
                offset: self.offset + 1,
            }
        } else {
            Self {
                line: self.line,
                column: self.column + 1,
                offset: self.offset + 1,
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_new() {
        let pos = Position::new();
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.offset, 0);
    }

    #[test]
    fn test_position_default() {
        assert_eq!(Position::default(), Position::new());
    }

    #[test]
    fn test_position_advanced_same_line() {
        let pos = Position::new().advanced('a').advanced('b');
        assert_eq!(pos, Position::at(1, 3, 2));
    }

    #[test]
    fn test_position_advanced_newline() {
        let pos = Position::new().advanced('a').advanced('\n');
        assert_eq!(pos, Position::at(2, 1, 2));
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::at(5, 10, 100).to_string(), "5:10");
    }
}
