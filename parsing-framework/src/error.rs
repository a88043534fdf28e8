use parsing_common::Span;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Where a fatal failure happened, with enough of the input to render it.
#[derive(Clone)]
pub struct SourceLocation {
    pub file_name: Arc<str>,
    pub span: Span,
    input: Arc<[char]>,
}

impl SourceLocation {
    pub fn new(file_name: Arc<str>, span: Span, input: Arc<[char]>) -> Self {
        Self {
            file_name,
            span,
            input,
        }
    }

    /// The parsed input the span refers to.
    pub fn input(&self) -> &[char] {
        &self.input
    }

    pub fn line(&self) -> usize {
        self.span.start_line
    }

    /// 1-indexed column of the span's start.
    pub fn column(&self) -> usize {
        self.line_start_offset()
            .map_or(self.start_offset() + 1, |line_start| {
                self.start_offset() - line_start + 1
            })
    }

    /// The full source line containing the span's start, without the line
    /// terminator.
    pub fn source_line(&self) -> String {
        let start = self.line_start_offset().unwrap_or(0);
        self.input[start..]
            .iter()
            .take_while(|&&ch| ch != '\n' && ch != '\r')
            .collect()
    }

    /// The source line followed by a caret under the column.
    pub fn excerpt(&self) -> String {
        let source = self.source_line();
        let padding: String = source
            .chars()
            .take(self.column() - 1)
            .map(|ch| if ch == '\t' { '\t' } else { ' ' })
            .collect();
        format!("{source}\n{padding}^")
    }

    /// `file:line:column` followed by the excerpt.
    pub fn render(&self) -> String {
        format!("{self}\n{}", self.excerpt())
    }

    fn start_offset(&self) -> usize {
        self.span.start.min(self.input.len())
    }

    fn line_start_offset(&self) -> Option<usize> {
        self.input[..self.start_offset()]
            .iter()
            .rposition(|&ch| ch == '\n')
            .map(|newline| newline + 1)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file_name, self.line(), self.column())
    }
}

impl fmt::Debug for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceLocation")
            .field("file_name", &self.file_name)
            .field("span", &self.span)
            .finish()
    }
}

/// An `Expectation` whose inner parser did not match, or an input that the
/// start rule did not consume completely.
#[derive(Debug, Clone, Error)]
#[error("{location}: expected {expected}")]
pub struct ExpectationFailure {
    pub expected: String,
    pub location: SourceLocation,
}

impl ExpectationFailure {
    pub fn new(expected: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            expected: expected.into(),
            location,
        }
    }

    pub fn span(&self) -> Span {
        self.location.span
    }

    pub fn render(&self) -> String {
        format!("{}\n{}", self, self.location.excerpt())
    }
}

/// A fatal error raised by a semantic action or by a misconfigured grammar.
#[derive(Debug, Clone, Error)]
#[error("{location}: {message}")]
pub struct ParsingException {
    pub message: String,
    pub location: SourceLocation,
}

impl ParsingException {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }

    pub fn span(&self) -> Span {
        self.location.span
    }

    pub fn render(&self) -> String {
        format!("{}\n{}", self, self.location.excerpt())
    }
}

/// Errors that abort a parse.
#[derive(Debug, Error)]
pub enum ParsingError {
    #[error(transparent)]
    Expectation(#[from] ExpectationFailure),

    #[error(transparent)]
    Exception(#[from] ParsingException),

    #[error("{location}: rule '{rule}' exceeds the nesting limit of {max_depth} activations")]
    RecursionLimitExceeded {
        rule: String,
        max_depth: usize,
        location: SourceLocation,
    },

    #[error("input of {input_len} code points exceeds the limit of {max_len}")]
    InputTooLarge { input_len: usize, max_len: usize },

    #[error("rule '{rule}' declares {expected} inherited attributes but {found} values were supplied")]
    ArgumentCount {
        rule: String,
        expected: usize,
        found: usize,
    },

    #[error("rule '{rule}' found no value on the value stack")]
    ValueStackUnderflow { rule: String },

    #[error("rule '{rule}' matched without producing its value")]
    MissingRuleValue { rule: String },

    #[error("argument {index} for rule '{rule}' is not available in the calling frame")]
    MissingArgument { rule: String, index: usize },

    #[error("grammar '{name}' is not part of the domain")]
    UnknownGrammar { name: String },

    #[error("'{name}' was evaluated before its grammar was linked")]
    Unlinked { name: String },

    #[error("failed to write the parse log")]
    Log(#[from] std::io::Error),
}

impl ParsingError {
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            ParsingError::Expectation(failure) => Some(&failure.location),
            ParsingError::Exception(exception) => Some(&exception.location),
            ParsingError::RecursionLimitExceeded { location, .. } => Some(location),
            _ => None,
        }
    }

    /// The one-line message followed by the source line and a caret when
    /// the error has a location.
    pub fn render(&self) -> String {
        match self.location() {
            Some(location) => format!("{}\n{}", self, location.excerpt()),
            None => self.to_string(),
        }
    }
}

/// Errors detected while building and linking grammars.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("grammar '{name}' is already part of the domain")]
    DuplicateGrammar { name: String },

    #[error("grammar '{grammar}' references '{reference}', which has not been added to the domain")]
    UnknownGrammar { grammar: String, reference: String },

    #[error("grammar '{grammar}' links to '{target}' without referencing its grammar")]
    UnreferencedGrammar { grammar: String, target: String },

    #[error("grammar '{grammar}' defines rule '{rule}' more than once")]
    DuplicateRule { grammar: String, rule: String },

    #[error("rule '{grammar}.{rule}' refers to unknown rule '{name}'")]
    RuleNotFound {
        grammar: String,
        rule: String,
        name: String,
    },

    #[error("rule '{grammar}.{rule}' uses action '{action}', which it does not define")]
    ActionNotFound {
        grammar: String,
        rule: String,
        action: String,
    },

    #[error("rule '{grammar}.{rule}' calls '{name}' with {found} arguments but it declares {expected} inherited attributes")]
    ArgumentCountMismatch {
        grammar: String,
        rule: String,
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("grammar '{grammar}' names unknown start rule '{rule}'")]
    MissingStartRule { grammar: String, rule: String },

    #[error("grammar '{grammar}' names unknown skip rule '{rule}'")]
    MissingSkipRule { grammar: String, rule: String },

    #[error("skip rule '{rule}' of grammar '{grammar}' declares {inherited} inherited attributes")]
    SkipRuleWithAttributes {
        grammar: String,
        rule: String,
        inherited: usize,
    },

    #[error("grammar '{grammar}' has invalid rule path '{path}'")]
    InvalidRulePath { grammar: String, path: String },
}
