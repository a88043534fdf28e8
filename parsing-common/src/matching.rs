/// Outcome of a single parser invocation.
///
/// `length` is only meaningful when `hit` is true; [`Match::nothing`]
/// always carries a length of zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    hit: bool,
    length: usize,
}

impl Match {
    /// A successful match that consumed `length` code points.
    pub fn hit(length: usize) -> Self {
        Self { hit: true, length }
    }

    /// A successful match that consumed nothing.
    pub fn empty() -> Self {
        Self::hit(0)
    }

    /// A soft failure.
    pub fn nothing() -> Self {
        Self {
            hit: false,
            length: 0,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.hit
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Extends this match by the length of `other`, following the match
    /// when both sides hit.
    pub fn concatenate(self, other: Match) -> Match {
        if self.hit && other.hit {
            Match::hit(self.length + other.length)
        } else {
            Match::nothing()
        }
    }
}
