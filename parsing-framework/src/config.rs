use scanner_framework::log::DEFAULT_MAX_LINE_LENGTH;

/// Default bound on nested rule activations.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 256;

/// Limits and tracing options applied to every parse of a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum number of nested rule activations; `0` disables the check
    pub max_recursion_depth: usize,
    /// Maximum input length in code points; `0` disables the check
    pub max_input_len: usize,
    /// Number of code points echoed per line of a parse trace
    pub trace_line_length: usize,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            max_input_len: 0,
            trace_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    pub fn with_max_input_len(mut self, len: usize) -> Self {
        self.max_input_len = len;
        self
    }

    pub fn with_trace_line_length(mut self, len: usize) -> Self {
        self.trace_line_length = len;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.max_recursion_depth, 256);
        assert_eq!(config.max_input_len, 0);
        assert_eq!(config.trace_line_length, 80);
    }

    #[test]
    fn test_builder_methods() {
        let config = ParserConfig::new()
            .with_max_recursion_depth(16)
            .with_max_input_len(1024)
            .with_trace_line_length(40);
        assert_eq!(config.max_recursion_depth, 16);
        assert_eq!(config.max_input_len, 1024);
        assert_eq!(config.trace_line_length, 40);
    }
}
