//! A C++ statement subset.
//!
//! Two grammars in the `cpp` namespace: `ExpressionGrammar` for
//! expressions (and the shared `Spacing` rule), and `StatementGrammar`,
//! which references it and links its `Expression` and `Spacing` rules.

pub mod ast;
pub mod expression;
pub mod statement;

pub use ast::{BinaryOp, CppValue, Expression, Statement, UnaryOp};

use parsing_framework::{
    GrammarError, GrammarRef, ParseLog, ParseOptions, ParserConfig, ParsingDomain, ParsingError,
};

/// The two C++ grammars linked into one domain.
pub struct CppParser {
    domain: ParsingDomain<CppValue>,
}

impl CppParser {
    pub fn new() -> Result<Self, GrammarError> {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Result<Self, GrammarError> {
        let domain = ParsingDomain::builder()
            .config(config)
            .grammar(expression::grammar())?
            .grammar(statement::grammar())?
            .build();
        Ok(Self { domain })
    }

    pub fn domain(&self) -> &ParsingDomain<CppValue> {
        &self.domain
    }

    fn grammar(&self, name: &str) -> Result<GrammarRef<'_, CppValue>, ParsingError> {
        self.domain.require(&format!("cpp.{name}"))
    }

    /// Parses a compound statement such as `{ x; }`.
    pub fn parse_statement(&self, input: &str, file_name: &str) -> Result<Statement, ParsingError> {
        self.parse_statement_with(input, ParseOptions::new().file(0, file_name))
    }

    /// Parses a compound statement, writing a rule trace to `log`.
    pub fn trace_statement(
        &self,
        input: &str,
        file_name: &str,
        log: ParseLog,
    ) -> Result<Statement, ParsingError> {
        self.parse_statement_with(input, ParseOptions::new().file(0, file_name).log(log))
    }

    fn parse_statement_with(
        &self,
        input: &str,
        options: ParseOptions<CppValue>,
    ) -> Result<Statement, ParsingError> {
        let grammar = self.grammar(statement::NAME)?;
        grammar
            .parse_with(input.chars().collect::<Vec<_>>().into(), options)?
            .and_then(CppValue::into_statement)
            .ok_or_else(|| ParsingError::MissingRuleValue {
                rule: format!("{}.CompoundStatement", grammar.qualified_name()),
            })
    }

    pub fn parse_expression(&self, input: &str, file_name: &str) -> Result<Expression, ParsingError> {
        let grammar = self.grammar(expression::NAME)?;
        grammar
            .parse(input, 0, file_name)?
            .and_then(CppValue::into_expression)
            .ok_or_else(|| ParsingError::MissingRuleValue {
                rule: format!("{}.Expression", grammar.qualified_name()),
            })
    }
}
