use crate::cursor::Cursor;
use crate::log::ParseLog;
use parsing_common::{Checkpoint, Position, RuleId, Span, TextSlice};
use std::sync::Arc;

/// Per-parse input state.
///
/// A scanner owns the cursor over one file's code points together with the
/// file's identity, the grammar's skip rule and the two flags that suppress
/// skipping: `skipping` (the skip rule is itself running) and the token
/// depth (the parser is inside one or more `Token` groups).
#[derive(Debug)]
pub struct Scanner {
    cursor: Cursor,
    file_index: usize,
    file_name: Arc<str>,
    skip_rule: Option<RuleId>,
    skipping: bool,
    token_depth: usize,
    log: Option<ParseLog>,
}

impl Scanner {
    pub fn new(buffer: Arc<[char]>, file_index: usize, file_name: impl Into<Arc<str>>) -> Self {
        Self {
            cursor: Cursor::with_arc(buffer),
            file_index,
            file_name: file_name.into(),
            skip_rule: None,
            skipping: false,
            token_depth: 0,
            log: None,
        }
    }

    /// Creates a scanner over a string, converting it to code points.
    pub fn from_text(input: &str, file_index: usize, file_name: impl Into<Arc<str>>) -> Self {
        let buffer: Arc<[char]> = input.chars().collect::<Vec<_>>().into();
        Self::new(buffer, file_index, file_name)
    }

    pub fn with_skip_rule(mut self, skip_rule: Option<RuleId>) -> Self {
        self.skip_rule = skip_rule;
        self
    }

    pub fn with_log(mut self, log: ParseLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn file_index(&self) -> usize {
        self.file_index
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn shared_file_name(&self) -> Arc<str> {
        Arc::clone(&self.file_name)
    }

    pub fn skip_rule(&self) -> Option<RuleId> {
        self.skip_rule
    }

    /// Returns the skip rule if it should run at the current point:
    /// a skip rule exists, it is not already running, and no `Token`
    /// group is open.
    pub fn active_skip_rule(&self) -> Option<RuleId> {
        if self.skipping || self.token_depth > 0 {
            None
        } else {
            self.skip_rule
        }
    }

    pub fn begin_skip(&mut self) {
        self.skipping = true;
    }

    pub fn end_skip(&mut self) {
        self.skipping = false;
    }

    pub fn is_skipping(&self) -> bool {
        self.skipping
    }

    pub fn begin_token(&mut self) {
        self.token_depth += 1;
    }

    pub fn end_token(&mut self) {
        self.token_depth = self.token_depth.saturating_sub(1);
    }

    pub fn in_token(&self) -> bool {
        self.token_depth > 0
    }

    pub fn log_mut(&mut self) -> Option<&mut ParseLog> {
        self.log.as_mut()
    }

    pub fn take_log(&mut self) -> Option<ParseLog> {
        self.log.take()
    }

    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    pub fn is_eof(&self) -> bool {
        self.cursor.is_eof()
    }

    pub fn peek(&self) -> Option<char> {
        self.cursor.peek()
    }

    pub fn advance(&mut self) -> Option<char> {
        self.cursor.advance()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.cursor.checkpoint()
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.cursor.restore(checkpoint);
    }

    /// The span from `start` to the current position.
    pub fn span_from(&self, start: Checkpoint) -> Span {
        Span::between(self.file_index, start.position(), self.position())
    }

    /// An empty span at the current position.
    pub fn current_span(&self) -> Span {
        Span::at(self.file_index, self.position())
    }

    /// An empty span at the farthest position reached so far.
    pub fn farthest_span(&self) -> Span {
        Span::at(self.file_index, self.cursor.farthest())
    }

    /// The text consumed since `start`.
    pub fn text_from(&self, start: Checkpoint) -> TextSlice {
        self.cursor.slice(start.index(), self.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_suppresses_skip_rule() {
        let mut scanner = Scanner::from_text("a b", 0, "test").with_skip_rule(Some(RuleId::new(3)));
        assert_eq!(scanner.active_skip_rule(), Some(RuleId::new(3)));
        scanner.begin_token();
        scanner.begin_token();
        scanner.end_token();
        assert_eq!(scanner.active_skip_rule(), None);
        scanner.end_token();
        assert_eq!(scanner.active_skip_rule(), Some(RuleId::new(3)));
    }

    #[test]
    fn test_skipping_suppresses_skip_rule() {
        let mut scanner = Scanner::from_text(" ", 0, "test").with_skip_rule(Some(RuleId::new(0)));
        scanner.begin_skip();
        assert_eq!(scanner.active_skip_rule(), None);
        scanner.end_skip();
        assert!(!scanner.is_skipping());
    }

    #[test]
    fn test_span_and_text_from_checkpoint() {
        let mut scanner = Scanner::from_text("ab\ncd", 4, "file.cpp");
        scanner.advance();
        let start = scanner.checkpoint();
        scanner.advance();
        scanner.advance();
        scanner.advance();
        let span = scanner.span_from(start);
        assert_eq!(span.file_index, 4);
        assert_eq!((span.start, span.end), (1, 4));
        assert_eq!((span.start_line, span.end_line), (1, 2));
        assert_eq!(scanner.text_from(start).to_string(), "b\nc");
    }
}
