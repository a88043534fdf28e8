use parsing_example::cpp::{BinaryOp, CppParser, Expression, Statement, UnaryOp};
use parsing_framework::{ParserConfig, ParsingError};
use rstest::rstest;

fn parse(input: &str) -> Result<Statement, ParsingError> {
    CppParser::new().unwrap().parse_statement(input, "test.cpp")
}

fn id(name: &str) -> Expression {
    Expression::identifier(name)
}

fn expr(name: &str) -> Statement {
    Statement::Expression(id(name))
}

#[test]
fn test_if_else() {
    let statement = parse("{ if (x) y; else z; }").unwrap();
    assert_eq!(
        statement,
        Statement::Compound(vec![Statement::If {
            condition: id("x"),
            then_branch: Box::new(expr("y")),
            else_branch: Some(Box::new(expr("z"))),
        }])
    );
}

#[test]
fn test_nested_compound_statements() {
    let statement = parse("{ { ; } ; }").unwrap();
    assert_eq!(
        statement,
        Statement::Compound(vec![
            Statement::Compound(vec![Statement::Empty]),
            Statement::Empty,
        ])
    );
}

#[test]
fn test_while_and_return() {
    let statement = parse("{\n  while (i < 10) { i; }\n  return i * 2;\n  return;\n}").unwrap();
    assert_eq!(
        statement,
        Statement::Compound(vec![
            Statement::While {
                condition: Expression::binary(BinaryOp::Less, id("i"), Expression::Integer(10)),
                body: Box::new(Statement::Compound(vec![expr("i")])),
            },
            Statement::Return(Some(Expression::binary(
                BinaryOp::Multiply,
                id("i"),
                Expression::Integer(2),
            ))),
            Statement::Return(None),
        ])
    );
}

#[test]
fn test_dangling_else_binds_to_inner_if() {
    let statement = parse("{ if (a) if (b) x; else y; }").unwrap();
    let Statement::Compound(statements) = statement else {
        panic!("expected a compound statement");
    };
    match &statements[0] {
        Statement::If {
            then_branch,
            else_branch: None,
            ..
        } => assert!(matches!(**then_branch, Statement::If { else_branch: Some(_), .. })),
        other => panic!("unexpected statement {other:?}"),
    }
}

#[test]
fn test_comments_are_skipped() {
    let statement = parse("{ // first\n  x; /* second */ y; }").unwrap();
    assert_eq!(statement, Statement::Compound(vec![expr("x"), expr("y")]));
}

#[test]
fn test_keyword_prefix_is_an_identifier() {
    let statement = parse("{ iffy; returned; }").unwrap();
    assert_eq!(statement, Statement::Compound(vec![expr("iffy"), expr("returned")]));
}

#[test]
fn test_trailing_input_is_fatal() {
    match parse("{ } garbage") {
        Err(ParsingError::Expectation(failure)) => {
            assert_eq!(failure.expected, "compound statement");
            assert_eq!(failure.to_string(), "test.cpp:1:5: expected compound statement");
        }
        other => panic!("expected trailing input to be rejected, got {other:?}"),
    }
}

#[test]
fn test_missing_parenthesis_after_if() {
    let error = parse("{ if x }").unwrap_err();
    assert_eq!(error.render(), "test.cpp:1:6: expected '('\n{ if x }\n     ^");
}

#[test]
fn test_missing_semicolon() {
    match parse("{ x y; }") {
        Err(ParsingError::Expectation(failure)) => {
            assert_eq!(failure.expected, "';'");
            assert_eq!(failure.span().start, 4);
        }
        other => panic!("expected a missing ';', got {other:?}"),
    }
}

#[test]
fn test_else_without_if() {
    match parse("{ else; }") {
        Err(ParsingError::Expectation(failure)) => assert_eq!(failure.expected, "'}'"),
        other => panic!("expected a missing '}}', got {other:?}"),
    }
}

#[test]
fn test_unterminated_block_comment() {
    match parse("{ /* x }") {
        Err(ParsingError::Expectation(failure)) => assert_eq!(failure.expected, "\"*/\""),
        other => panic!("expected an unterminated comment, got {other:?}"),
    }
}

#[test]
fn test_integer_out_of_range() {
    match parse("{ 99999999999999999999; }") {
        Err(ParsingError::Exception(exception)) => {
            assert_eq!(
                exception.message,
                "integer literal '99999999999999999999' is out of range"
            );
            assert_eq!(exception.location.column(), 3);
        }
        other => panic!("expected a range error, got {other:?}"),
    }
}

#[rstest]
#[case("a + 2 * b == c", "((a + (2 * b)) == c)")]
#[case("a - b - c", "((a - b) - c)")]
#[case("(a - b) % c", "((a - b) % c)")]
#[case("a || b && c", "(a || (b && c))")]
#[case("a <= b != c >= d", "((a <= b) != (c >= d))")]
#[case("-x * !y", "(-x * !y)")]
#[case("a /* between */ / b", "(a / b)")]
fn test_expression_precedence(#[case] input: &str, #[case] expected: &str) {
    let parser = CppParser::new().unwrap();
    let expression = parser.parse_expression(input, "expr").unwrap();
    assert_eq!(expression.to_string(), expected);
}

#[test]
fn test_unary_tree() {
    let parser = CppParser::new().unwrap();
    assert_eq!(
        parser.parse_expression("--1", "expr").unwrap(),
        Expression::Unary {
            op: UnaryOp::Negate,
            operand: Box::new(Expression::Unary {
                op: UnaryOp::Negate,
                operand: Box::new(Expression::Integer(1)),
            }),
        }
    );
}

#[test]
fn test_missing_right_operand() {
    let parser = CppParser::new().unwrap();
    match parser.parse_expression("a +", "expr") {
        Err(ParsingError::Expectation(failure)) => assert_eq!(failure.expected, "Multiplicative"),
        other => panic!("expected a missing operand, got {other:?}"),
    }
}

#[test]
fn test_nesting_limit() {
    let parser =
        CppParser::with_config(ParserConfig::new().with_max_recursion_depth(20)).unwrap();
    let input = format!("{}x{}", "(".repeat(10), ")".repeat(10));
    assert!(matches!(
        parser.parse_expression(&input, "deep"),
        Err(ParsingError::RecursionLimitExceeded { max_depth: 20, .. })
    ));
    assert!(CppParser::new().unwrap().parse_expression(&input, "deep").is_ok());

    let input = format!("{}x{}", "(".repeat(40), ")".repeat(40));
    assert!(matches!(
        CppParser::new().unwrap().parse_expression(&input, "deep"),
        Err(ParsingError::RecursionLimitExceeded { max_depth: 256, .. })
    ));
}
