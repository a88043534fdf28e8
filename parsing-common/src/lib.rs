//! Common Framework
//!
//! Value types shared by `scanner-framework` and `parsing-framework`:
//! source positions, backtracking checkpoints, spans, match results and
//! shared code-point slices.

pub mod checkpoint;
pub mod id;
pub mod matching;
pub mod position;
pub mod span;
pub mod text_slice;

pub use checkpoint::Checkpoint;
pub use id::{GrammarId, RuleId};
pub use matching::Match;
pub use position::Position;
pub use span::Span;
pub use text_slice::TextSlice;
