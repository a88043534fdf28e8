use crate::config::ParserConfig;
use crate::error::{ParsingError, SourceLocation};
use crate::rule::Rule;
use crate::value::ValueStack;
use parsing_common::{Checkpoint, Match, RuleId, Span};
use scanner_framework::Scanner;

/// Mutable state of one parse call.
///
/// Everything a parse mutates lives here: the scanner, the value stack and
/// the rule nesting depth. The rule table is shared and read-only, so any
/// number of contexts can run against the same domain.
pub(crate) struct ParseContext<'d, V> {
    rules: &'d [Rule<V>],
    pub(crate) scanner: Scanner,
    pub(crate) stack: ValueStack<V>,
    max_depth: usize,
    depth: usize,
}

impl<'d, V> ParseContext<'d, V> {
    pub(crate) fn new(rules: &'d [Rule<V>], scanner: Scanner, config: &ParserConfig) -> Self {
        Self {
            rules,
            scanner,
            stack: ValueStack::new(),
            max_depth: config.max_recursion_depth,
            depth: 0,
        }
    }

    pub(crate) fn rule(&self, id: RuleId) -> &'d Rule<V> {
        &self.rules[id.index()]
    }

    pub(crate) fn location(&self, span: Span) -> SourceLocation {
        SourceLocation::new(
            self.scanner.shared_file_name(),
            span,
            self.scanner.cursor().buffer(),
        )
    }

    /// A hit covering everything consumed since `start`.
    pub(crate) fn matched_since(&self, start: Checkpoint) -> Match {
        Match::hit(self.scanner.offset() - start.index())
    }

    /// Consumes one code point if `accept` admits it.
    pub(crate) fn scan_one(&mut self, accept: impl FnOnce(char) -> bool) -> Match {
        match self.scanner.peek() {
            Some(ch) if accept(ch) => {
                self.scanner.advance();
                Match::hit(1)
            }
            _ => Match::nothing(),
        }
    }

    /// Applies the skip rule at the current position.
    ///
    /// Does nothing when the grammar has no skip rule, while the skip rule
    /// itself is running, or inside a token. Values the skip rule pushes are
    /// discarded.
    pub(crate) fn skip(&mut self) -> Result<(), ParsingError> {
        let Some(skip_rule) = self.scanner.active_skip_rule() else {
            return Ok(());
        };
        let rule = self.rule(skip_rule);
        let start = self.scanner.checkpoint();
        let mark = self.stack.len();

        self.scanner.begin_skip();
        let result = rule.parse(self);
        self.scanner.end_skip();

        if !result?.is_hit() {
            self.scanner.restore(start);
        }
        self.stack.truncate(mark);
        Ok(())
    }

    pub(crate) fn enter_rule(&mut self, rule: &Rule<V>) -> Result<(), ParsingError> {
        if self.max_depth > 0 && self.depth >= self.max_depth {
            return Err(ParsingError::RecursionLimitExceeded {
                rule: rule.full_name().to_string(),
                max_depth: self.max_depth,
                location: self.location(self.scanner.current_span()),
            });
        }
        self.depth += 1;
        if self.scanner.is_skipping() {
            return Ok(());
        }

        log::trace!(
            "enter {} at {}",
            rule.full_name(),
            self.scanner.position()
        );
        let remaining = self.scanner.cursor().remaining();
        if let Some(log) = self.scanner.log_mut() {
            log.begin_rule(rule.name())?;
            log.try_input(&remaining)?;
        }
        Ok(())
    }

    pub(crate) fn leave_rule(
        &mut self,
        rule: &Rule<V>,
        start: Checkpoint,
        matched: Match,
    ) -> Result<(), ParsingError> {
        self.depth = self.depth.saturating_sub(1);
        if self.scanner.is_skipping() {
            return Ok(());
        }

        log::trace!(
            "leave {} at {} ({})",
            rule.full_name(),
            self.scanner.position(),
            if matched.is_hit() { "hit" } else { "miss" }
        );
        let text = self.scanner.text_from(start);
        if let Some(log) = self.scanner.log_mut() {
            if matched.is_hit() {
                log.success(&text)?;
            } else {
                log.fail()?;
            }
            log.end_rule(rule.name())?;
        }
        Ok(())
    }

    /// Closes an activation that ended with an error, keeping the depth
    /// count and the trace balanced. The original error wins over a failing
    /// trace writer.
    pub(crate) fn abandon_rule(&mut self, rule: &Rule<V>, start: Checkpoint) {
        if let Err(error) = self.leave_rule(rule, start, Match::nothing()) {
            log::warn!("could not close trace of {}: {}", rule.full_name(), error);
        }
    }

    /// Flushes the parse log, if any.
    pub(crate) fn finish(&mut self) -> Result<(), ParsingError> {
        if let Some(log) = self.scanner.log_mut() {
            log.flush()?;
        }
        Ok(())
    }
}
