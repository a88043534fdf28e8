use std::fmt;
use std::io::{self, Write};

/// Default number of code points of input echoed per trace line.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 80;

/// An XML-shaped trace of rule activations.
///
/// Every rule activation is written as an element named after the rule,
/// containing a `<try>` line with the upcoming input, the nested
/// activations, and either a `<success>` line with the matched text or an
/// empty `<fail/>` element:
///
/// ```text
/// <Statement>
///   <try>if (x) y;</try>
///   ...
///   <success>if (x) y;</success>
/// </Statement>
/// ```
pub struct ParseLog {
    writer: Box<dyn Write + Send>,
    indent: usize,
    max_line_length: usize,
}

impl ParseLog {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer,
            indent: 0,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    pub fn begin_rule(&mut self, name: &str) -> io::Result<()> {
        self.write_line(format_args!("<{name}>"))?;
        self.indent += 1;
        Ok(())
    }

    pub fn end_rule(&mut self, name: &str) -> io::Result<()> {
        self.indent = self.indent.saturating_sub(1);
        self.write_line(format_args!("</{name}>"))
    }

    pub fn try_input(&mut self, text: &[char]) -> io::Result<()> {
        let text = self.escape(text);
        self.write_line(format_args!("<try>{text}</try>"))
    }

    pub fn success(&mut self, text: &[char]) -> io::Result<()> {
        let text = self.escape(text);
        self.write_line(format_args!("<success>{text}</success>"))
    }

    pub fn fail(&mut self) -> io::Result<()> {
        self.write_line(format_args!("<fail/>"))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn write_line(&mut self, line: fmt::Arguments<'_>) -> io::Result<()> {
        for _ in 0..self.indent {
            self.writer.write_all(b"  ")?;
        }
        self.writer.write_fmt(line)?;
        self.writer.write_all(b"\n")
    }

    fn escape(&self, text: &[char]) -> String {
        let mut escaped = String::new();
        for &ch in text.iter().take(self.max_line_length) {
            match ch {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                _ => escaped.push(ch),
            }
        }
        escaped
    }
}

impl fmt::Debug for ParseLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseLog")
            .field("indent", &self.indent)
            .field("max_line_length", &self.max_line_length)
            .finish()
    }
}
