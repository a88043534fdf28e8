//! Scanner Framework
//!
//! The input side of the parsing engine: a [`Cursor`] over an in-memory
//! buffer of code points and the [`Scanner`] that wraps it with file
//! metadata, skip-rule bookkeeping and an optional [`ParseLog`].

pub mod cursor;
pub mod log;
pub mod scanner;

pub use cursor::Cursor;
pub use log::ParseLog;
pub use parsing_common::{Checkpoint, Position, Span, TextSlice};
pub use scanner::Scanner;
