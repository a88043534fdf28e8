//! Example grammars for the parsing framework.
//!
//! - [`cpp`]: a C++ statement subset producing an AST, split over two
//!   grammars that link rules across grammar boundaries.
//! - [`xml`]: an XML subset reporting its structure to a processor passed
//!   down as an inherited attribute.

pub mod cpp;
pub mod xml;
