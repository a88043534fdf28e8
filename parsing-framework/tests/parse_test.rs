use parsing_framework::{
    GrammarBuilder, ParseLog, ParseOptions, Parser, ParserConfig, ParsingDomain, ParsingError,
    RuleBuilder,
};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

fn single_rule(name: &str, definition: Parser<()>) -> ParsingDomain<()> {
    ParsingDomain::builder()
        .grammar(
            GrammarBuilder::new(name)
                .rule(RuleBuilder::new("Start", definition))
                .rule(RuleBuilder::new("Spacing", Parser::space().plus()))
                .start("Start")
                .skip("Spacing"),
        )
        .unwrap()
        .build()
}

#[test]
fn test_expectation_reports_position_after_keyword() {
    let domain = ParsingDomain::<()>::builder()
        .grammar(
            GrammarBuilder::new("If")
                .rule(RuleBuilder::new(
                    "Start",
                    Parser::keyword("if").then(Parser::char('(').expect()),
                ))
                .start("Start"),
        )
        .unwrap()
        .build();

    let error = domain.grammar("If").unwrap().parse("if x", 0, "if.txt").unwrap_err();
    match &error {
        ParsingError::Expectation(failure) => {
            assert_eq!(failure.expected, "'('");
            assert_eq!(failure.span().start, 2);
            assert_eq!(failure.location.column(), 3);
        }
        other => panic!("expected an expectation failure, got {other:?}"),
    }
    assert_eq!(error.render(), "if.txt:1:3: expected '('\nif x\n  ^");
}

#[test]
fn test_unconsumed_input_is_fatal() {
    let domain = single_rule("Single", Parser::char('a'));
    let grammar = domain.grammar("Single").unwrap();

    assert_eq!(grammar.parse("  a  ", 0, "ok.txt").unwrap(), None);
    match grammar.parse("ab", 3, "doc.txt") {
        Err(ParsingError::Expectation(failure)) => {
            assert_eq!(failure.expected, "Start");
            assert_eq!(failure.span().file_index, 3);
            assert_eq!(failure.span().start, 1);
            assert_eq!(failure.to_string(), "doc.txt:1:2: expected Start");
        }
        other => panic!("expected trailing input to be rejected, got {other:?}"),
    }
}

#[test]
fn test_failure_points_at_farthest_position() {
    let domain = single_rule("Single", Parser::char('a'));
    let error = domain
        .grammar("Single")
        .unwrap()
        .parse("a\nb", 0, "doc.txt")
        .unwrap_err();
    assert_eq!(error.to_string(), "doc.txt:2:1: expected Start");
}

#[test]
fn test_grammar_without_start_rule() {
    let domain = ParsingDomain::builder()
        .grammar(GrammarBuilder::new("Lib").rule(RuleBuilder::new("A", Parser::<()>::char('a'))))
        .unwrap()
        .build();

    match domain.grammar("Lib").unwrap().parse("a", 0, "lib.txt") {
        Err(ParsingError::Exception(exception)) => {
            assert_eq!(exception.message, "grammar 'Lib' has no start rule");
        }
        other => panic!("expected a parsing exception, got {other:?}"),
    }
}

#[test]
fn test_input_length_limit() {
    let domain = single_rule("Single", Parser::letter().plus())
        .with_config(ParserConfig::new().with_max_input_len(3));
    let result = domain.grammar("Single").unwrap().parse("abcd", 0, "long.txt");
    assert!(matches!(
        result,
        Err(ParsingError::InputTooLarge {
            input_len: 4,
            max_len: 3
        })
    ));
}

#[test]
fn test_start_rule_argument_count() {
    let domain = ParsingDomain::builder()
        .grammar(
            GrammarBuilder::new("Args")
                .rule(RuleBuilder::new("Start", Parser::<()>::char('a')).inherited("context"))
                .start("Start"),
        )
        .unwrap()
        .build();

    let result = domain.grammar("Args").unwrap().parse("a", 0, "args.txt");
    assert!(matches!(
        result,
        Err(ParsingError::ArgumentCount {
            expected: 1,
            found: 0,
            ..
        })
    ));
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_parse_log_traces_rule_activations() {
    let domain = ParsingDomain::builder()
        .grammar(
            GrammarBuilder::new("Letters")
                .rule(RuleBuilder::new("Start", Parser::<()>::nonterminal("Letter").plus()))
                .rule(RuleBuilder::new("Letter", Parser::letter()))
                .start("Start"),
        )
        .unwrap()
        .build();

    let buffer = SharedBuffer::default();
    let input: Arc<[char]> = "ab".chars().collect::<Vec<_>>().into();
    let options = ParseOptions::new()
        .file(0, "letters.txt")
        .log(ParseLog::new(Box::new(buffer.clone())));
    domain
        .grammar("Letters")
        .unwrap()
        .parse_with(input, options)
        .unwrap();

    let trace = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    let expected = "\
<Start>
  <try>ab</try>
  <Letter>
    <try>ab</try>
    <success>a</success>
  </Letter>
  <Letter>
    <try>b</try>
    <success>b</success>
  </Letter>
  <Letter>
    <try></try>
    <fail/>
  </Letter>
  <success>ab</success>
</Start>
";
    assert_eq!(trace, expected);
}

#[test]
fn test_domain_parse_log_uses_configured_line_length() {
    let domain = single_rule("Single", Parser::letter().plus())
        .with_config(ParserConfig::new().with_trace_line_length(2));
    let buffer = SharedBuffer::default();
    let options = ParseOptions::new()
        .file(0, "short.txt")
        .log(domain.parse_log(Box::new(buffer.clone())));
    domain
        .grammar("Single")
        .unwrap()
        .parse_with("abcd".chars().collect::<Vec<_>>().into(), options)
        .unwrap();

    let trace = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    assert!(trace.starts_with("<Start>\n  <try>ab</try>\n"));
    assert!(trace.contains("  <success>ab</success>\n"));
}

#[test]
fn test_parse_log_is_closed_after_fatal_error() {
    let domain = ParsingDomain::builder()
        .grammar(
            GrammarBuilder::new("Call")
                .rule(RuleBuilder::new(
                    "Start",
                    Parser::<()>::nonterminal("Letter").then(Parser::char('(').expect()),
                ))
                .rule(RuleBuilder::new("Letter", Parser::letter()))
                .start("Start"),
        )
        .unwrap()
        .build();

    let buffer = SharedBuffer::default();
    let options = ParseOptions::new()
        .file(0, "call.txt")
        .log(ParseLog::new(Box::new(buffer.clone())));
    let result = domain
        .grammar("Call")
        .unwrap()
        .parse_with("ab".chars().collect::<Vec<_>>().into(), options);
    assert!(matches!(result, Err(ParsingError::Expectation(_))));

    let trace = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    let expected = "\
<Start>
  <try>ab</try>
  <Letter>
    <try>ab</try>
    <success>a</success>
  </Letter>
  <fail/>
</Start>
";
    assert_eq!(trace, expected);
}
