//! Parsing Framework
//!
//! A backtracking PEG engine whose grammars are data. Rules are built from
//! [`Parser`] combinators, refer to each other by name and are linked into
//! a [`ParsingDomain`], which parses input completely with a grammar's
//! start rule.
//!
//! Rules communicate through attributes: a caller passes inherited values
//! to a callee, and a valued rule hands its synthesized value back on
//! success. Each rule activation owns its own [`AttributeFrame`], so
//! recursive grammars never mix up the values of nested activations.
//!
//! ```
//! use parsing_framework::{GrammarBuilder, Parser, ParsingDomain, RuleBuilder};
//!
//! let digits = RuleBuilder::new("Number", Parser::digit().plus().token().action("value"))
//!     .value("u64")
//!     .action("value", |ctx| {
//!         let value = ctx.text().to_string().parse::<u64>().unwrap_or_default();
//!         ctx.set_value(value);
//!     });
//! let domain = ParsingDomain::builder()
//!     .grammar(GrammarBuilder::new("Numbers").rule(digits).start("Number"))
//!     .unwrap()
//!     .build();
//! let grammar = domain.grammar("Numbers").unwrap();
//! assert_eq!(grammar.parse("1234", 0, "input").unwrap(), Some(1234));
//! ```

pub mod charset;
pub mod config;
mod context;
pub mod domain;
pub mod error;
pub mod frame;
pub mod grammar;
pub mod parser;
pub mod rule;
pub mod value;

pub use charset::{CharClass, CharSet};
pub use config::ParserConfig;
pub use domain::{DomainBuilder, GrammarRef, ParseOptions, ParsingDomain};
pub use error::{ExpectationFailure, GrammarError, ParsingError, ParsingException, SourceLocation};
pub use frame::AttributeFrame;
pub use grammar::{Grammar, GrammarBuilder, RuleLink};
pub use parser::Parser;
pub use parsing_common::{GrammarId, Match, Position, RuleId, Span, TextSlice};
pub use rule::{argument, forward, ActionContext, ActionFn, ArgumentFn, Rule, RuleBuilder};
pub use scanner_framework::ParseLog;
pub use value::ValueStack;
