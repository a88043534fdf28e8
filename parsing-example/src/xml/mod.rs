//! An event-driven XML parser built on a single grammar, `xml.XmlGrammar`.

pub mod grammar;
pub mod processor;

pub use processor::{EventRecorder, SharedProcessor, XmlEvent, XmlProcessor, XmlValue};

use parsing_framework::{GrammarError, ParseLog, ParseOptions, ParserConfig, ParsingDomain, ParsingError};

pub struct XmlParser {
    domain: ParsingDomain<XmlValue>,
}

impl XmlParser {
    pub fn new() -> Result<Self, GrammarError> {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Result<Self, GrammarError> {
        let domain = ParsingDomain::builder()
            .config(config)
            .grammar(grammar::grammar())?
            .build();
        Ok(Self { domain })
    }

    pub fn domain(&self) -> &ParsingDomain<XmlValue> {
        &self.domain
    }

    /// Parses a document, reporting its structure to `processor`.
    pub fn parse(
        &self,
        input: &str,
        file_name: &str,
        processor: SharedProcessor,
    ) -> Result<(), ParsingError> {
        self.parse_with(input, ParseOptions::new().file(0, file_name), processor)
    }

    /// Like [`parse`](Self::parse), writing a rule trace to `log`.
    pub fn trace(
        &self,
        input: &str,
        file_name: &str,
        processor: SharedProcessor,
        log: ParseLog,
    ) -> Result<(), ParsingError> {
        self.parse_with(input, ParseOptions::new().file(0, file_name).log(log), processor)
    }

    fn parse_with(
        &self,
        input: &str,
        options: ParseOptions<XmlValue>,
        processor: SharedProcessor,
    ) -> Result<(), ParsingError> {
        let grammar = self.domain.require(&format!("xml.{}", grammar::NAME))?;
        let options = options.arg(XmlValue::Processor(processor));
        grammar.parse_with(input.chars().collect::<Vec<_>>().into(), options)?;
        Ok(())
    }
}
