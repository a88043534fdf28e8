use std::ops::Deref;
use std::sync::Arc;

/// Immutable slice referencing a shared code-point buffer.
///
/// The slice keeps an `Arc<[char]>` alive so that it can be freely cloned
/// and handed to semantic actions without borrowing the scanner. It derefs
/// to `[char]`; use `to_string()` for an owned `String`.
#[derive(Clone, Debug)]
pub struct TextSlice {
    buffer: Arc<[char]>,
    start: usize,
    end: usize,
}

impl TextSlice {
    /// Creates a new slice from the given shared buffer and code-point range.
    pub fn new(buffer: Arc<[char]>, start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        debug_assert!(end <= buffer.len());
        Self { buffer, start, end }
    }

    /// Creates a slice that covers the entire buffer.
    pub fn from_arc(buffer: Arc<[char]>) -> Self {
        let end = buffer.len();
        Self {
            buffer,
            start: 0,
            end,
        }
    }

    /// Returns the length in code points.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the slice is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the underlying shared buffer.
    pub fn buffer(&self) -> Arc<[char]> {
        Arc::clone(&self.buffer)
    }

    /// Returns the start offset.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the end offset.
    pub fn end(&self) -> usize {
        self.end
    }
}

impl std::fmt::Display for TextSlice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;
        for &ch in self.deref() {
            f.write_char(ch)?;
        }
        Ok(())
    }
}

impl Deref for TextSlice {
    type Target = [char];

    fn deref(&self) -> &Self::Target {
        &self.buffer[self.start..self.end]
    }
}

impl PartialEq<&str> for TextSlice {
    fn eq(&self, other: &&str) -> bool {
        self.iter().copied().eq(other.chars())
    }
}

impl PartialEq<TextSlice> for &str {
    fn eq(&self, other: &TextSlice) -> bool {
        other == self
    }
}

impl PartialEq for TextSlice {
    fn eq(&self, other: &Self) -> bool {
        self.deref() == other.deref()
    }
}

impl Eq for TextSlice {}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> Arc<[char]> {
        text.chars().collect::<Vec<_>>().into()
    }

    #[test]
    fn test_slice_display_and_eq() {
        let slice = TextSlice::new(buffer("if (x) y;"), 4, 5);
        assert_eq!(slice.len(), 1);
        assert_eq!(slice.to_string(), "x");
        assert!(slice == "x");
        assert!("x" == slice);
    }

    #[test]
    fn test_slice_counts_code_points() {
        let slice = TextSlice::from_arc(buffer("äöü"));
        assert_eq!(slice.len(), 3);
        assert_eq!(slice.to_string(), "äöü");
    }

    #[test]
    fn test_empty_slice() {
        let slice = TextSlice::new(buffer("abc"), 1, 1);
        assert!(slice.is_empty());
        assert_eq!(slice.to_string(), "");
    }
}
