use parsing_framework::{
    argument, GrammarBuilder, GrammarError, Parser, ParsingDomain, ParsingError, RuleBuilder,
};
use std::thread;

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i64),
    Text(String),
}

fn library() -> GrammarBuilder<Value> {
    let number = RuleBuilder::new("Number", Parser::digit().plus().token().action("digits"))
        .value("Int")
        .info("number")
        .action("digits", |ctx| {
            let text = ctx.text().to_string();
            match text.parse() {
                Ok(value) => ctx.set_value(Value::Int(value)),
                Err(_) => ctx.reject(),
            }
        });
    let name = RuleBuilder::new("Name", Parser::letter().plus().token().action("letters"))
        .value("Text")
        .action("letters", |ctx| {
            let text = ctx.text().to_string();
            ctx.set_value(Value::Text(text));
        });
    GrammarBuilder::new("Lib")
        .namespace("test")
        .rule(number)
        .rule(name)
        .rule(RuleBuilder::new("Spacing", Parser::space().plus()))
}

/// `Assignment ::= Name '=' Number` through a link and a qualified path.
fn application() -> GrammarBuilder<Value> {
    let assignment = RuleBuilder::new(
        "Assignment",
        Parser::nonterminal_as("test.Lib.Name", "name")
            .then(Parser::char('='))
            .then(Parser::nonterminal("Number"))
            .action("assign"),
    )
    .value("Text")
    .action("assign", |ctx| {
        let name = ctx.take_instance("name");
        let number = ctx.take_instance("Number");
        if let (Some(Value::Text(name)), Some(Value::Int(number))) = (name, number) {
            ctx.set_value(Value::Text(format!("{name}:{number}")));
        }
    });
    GrammarBuilder::new("App")
        .namespace("test")
        .reference("test.Lib")
        .link("Number", "test.Lib.Number")
        .link("Spacing", "test.Lib.Spacing")
        .rule(assignment)
        .start("Assignment")
        .skip("Spacing")
}

fn domain() -> ParsingDomain<Value> {
    ParsingDomain::builder()
        .grammar(library())
        .unwrap()
        .grammar(application())
        .unwrap()
        .build()
}

#[test]
fn test_rule_link_across_grammars() {
    let domain = domain();
    let grammar = domain.grammar("test.App").unwrap();

    let value = grammar.parse("x = 42", 0, "app").unwrap();
    assert_eq!(value, Some(Value::Text("x:42".into())));
}

#[test]
fn test_require_unknown_grammar() {
    let domain = domain();
    assert!(domain.require("test.Lib").is_ok());
    match domain.require("App") {
        Err(ParsingError::UnknownGrammar { name }) => assert_eq!(name, "App"),
        other => panic!("expected an unknown grammar error, got {other:?}"),
    }
}

#[test]
fn test_grammar_introspection() {
    let domain = domain();
    let app = domain.grammar("test.App").unwrap();
    let lib = domain.grammar("test.Lib").unwrap();

    assert_eq!(app.qualified_name(), "test.App");
    assert_eq!(app.name(), "App");
    assert_eq!(app.namespace(), Some("test"));
    assert_eq!(app.references(), &[lib.id()]);
    assert_eq!(app.rules().map(|(name, _)| name).collect::<Vec<_>>(), vec!["Assignment"]);
    assert_eq!(app.rule("Number"), lib.rule("Number"));
    assert_eq!(app.skip_rule(), lib.rule("Spacing"));
    assert_eq!(app.start_rule(), app.rule("Assignment"));

    let number = domain.rule(lib.rule("Number").unwrap()).unwrap();
    assert_eq!(number.full_name(), "test.Lib.Number");
    assert_eq!(number.info(), "number");
    assert_eq!(number.value_type(), Some("Int"));
    assert_eq!(number.action_names().collect::<Vec<_>>(), vec!["digits"]);
    assert_eq!(app.rule("Assignment").map(|id| id.index()), Some(3));
}

#[test]
fn test_grammar_display() {
    let domain = domain();
    let text = domain.grammar("test.App").unwrap().to_string();

    assert!(text.starts_with("grammar test.App\n{\n"));
    assert!(text.contains("    reference test.Lib;\n"));
    assert!(text.contains("    using Number = test.Lib.Number;\n"));
    assert!(text.contains("    skip Spacing;\n"));
    assert!(text.contains("    start Assignment;\n"));
    assert!(text.contains("    Assignment : Text ::= test.Lib.Name:name '=' Number;\n"));
    assert!(text.ends_with('}'));
}

#[test]
fn test_domain_is_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ParsingDomain<Value>>();

    let domain = domain();
    thread::scope(|scope| {
        for index in 0..4 {
            let domain = &domain;
            scope.spawn(move || {
                let grammar = domain.grammar("test.App").unwrap();
                let input = format!("v = {index}");
                let value = grammar.parse(&input, index, "thread").unwrap();
                assert_eq!(value, Some(Value::Text(format!("v:{index}"))));
            });
        }
    });
}

fn build_error(builders: Vec<GrammarBuilder<Value>>) -> GrammarError {
    let mut domain = ParsingDomain::builder();
    for builder in builders {
        if let Err(error) = domain.add_grammar(builder) {
            return error;
        }
    }
    panic!("expected the domain to be rejected")
}

#[test]
fn test_reference_must_be_added_first() {
    let error = build_error(vec![application(), library()]);
    assert_eq!(
        error,
        GrammarError::UnknownGrammar {
            grammar: "test.App".into(),
            reference: "test.Lib".into(),
        }
    );
}

#[test]
fn test_duplicate_grammar() {
    let error = build_error(vec![library(), library()]);
    assert_eq!(error, GrammarError::DuplicateGrammar { name: "test.Lib".into() });
}

#[test]
fn test_duplicate_rule() {
    let grammar = GrammarBuilder::new("G")
        .rule(RuleBuilder::new("A", Parser::char('a')))
        .rule(RuleBuilder::new("A", Parser::char('b')));
    assert_eq!(
        build_error(vec![grammar]),
        GrammarError::DuplicateRule {
            grammar: "G".into(),
            rule: "A".into(),
        }
    );
}

#[test]
fn test_unresolved_nonterminal() {
    let grammar = GrammarBuilder::new("G").rule(RuleBuilder::new("A", Parser::nonterminal("B")));
    assert_eq!(
        build_error(vec![grammar]),
        GrammarError::RuleNotFound {
            grammar: "G".into(),
            rule: "A".into(),
            name: "B".into(),
        }
    );
}

#[test]
fn test_qualified_path_requires_reference() {
    let grammar = GrammarBuilder::new("G").rule(RuleBuilder::new("A", Parser::nonterminal("test.Lib.Name")));
    assert_eq!(
        build_error(vec![library(), grammar]),
        GrammarError::RuleNotFound {
            grammar: "G".into(),
            rule: "A".into(),
            name: "test.Lib.Name".into(),
        }
    );
}

#[test]
fn test_unknown_action() {
    let grammar = GrammarBuilder::new("G").rule(RuleBuilder::new("A", Parser::char('a').action("missing")));
    assert_eq!(
        build_error(vec![grammar]),
        GrammarError::ActionNotFound {
            grammar: "G".into(),
            rule: "A".into(),
            action: "missing".into(),
        }
    );
}

#[test]
fn test_argument_count_must_match_inherited_attributes() {
    let callee = RuleBuilder::new("Callee", Parser::char('a')).inherited("first").inherited("second");
    let caller = RuleBuilder::new(
        "Caller",
        Parser::call("Callee", "callee", vec![argument(|_| Some(Value::Int(1)))]),
    );
    let grammar = GrammarBuilder::new("G").rule(caller).rule(callee);
    assert_eq!(
        build_error(vec![grammar]),
        GrammarError::ArgumentCountMismatch {
            grammar: "G".into(),
            rule: "Caller".into(),
            name: "Callee".into(),
            expected: 2,
            found: 1,
        }
    );
}

#[test]
fn test_missing_start_and_skip_rules() {
    let grammar = GrammarBuilder::<Value>::new("G")
        .rule(RuleBuilder::new("A", Parser::char('a')))
        .start("B");
    assert_eq!(
        build_error(vec![grammar]),
        GrammarError::MissingStartRule {
            grammar: "G".into(),
            rule: "B".into(),
        }
    );

    let grammar = GrammarBuilder::<Value>::new("G")
        .rule(RuleBuilder::new("A", Parser::char('a')))
        .skip("Spacing");
    assert_eq!(
        build_error(vec![grammar]),
        GrammarError::MissingSkipRule {
            grammar: "G".into(),
            rule: "Spacing".into(),
        }
    );
}

#[test]
fn test_link_errors() {
    let unreferenced = GrammarBuilder::new("G").link("Number", "test.Lib.Number");
    assert_eq!(
        build_error(vec![library(), unreferenced]),
        GrammarError::UnreferencedGrammar {
            grammar: "G".into(),
            target: "test.Lib.Number".into(),
        }
    );

    let invalid = GrammarBuilder::new("G").link("Number", "Number");
    assert_eq!(
        build_error(vec![invalid]),
        GrammarError::InvalidRulePath {
            grammar: "G".into(),
            path: "Number".into(),
        }
    );

    let missing = GrammarBuilder::new("G")
        .reference("test.Lib")
        .link("Float", "test.Lib.Float");
    assert_eq!(
        build_error(vec![library(), missing]),
        GrammarError::RuleNotFound {
            grammar: "G".into(),
            rule: "Float".into(),
            name: "test.Lib.Float".into(),
        }
    );
}

#[test]
fn test_failed_grammar_leaves_builder_usable() {
    let mut builder = ParsingDomain::builder();
    builder.add_grammar(library()).unwrap();
    let broken = GrammarBuilder::new("Broken").rule(RuleBuilder::new("A", Parser::nonterminal("B")));
    assert!(builder.add_grammar(broken).is_err());
    builder.add_grammar(application()).unwrap();

    let domain = builder.build();
    assert_eq!(domain.grammars().count(), 2);
    assert_eq!(domain.rules().len(), 4);
    assert!(domain.grammar("Broken").is_none());
}

#[test]
fn test_skip_rule_cannot_take_arguments() {
    let grammar = GrammarBuilder::new("G")
        .rule(RuleBuilder::new("A", Parser::letter().plus()))
        .rule(RuleBuilder::new("Sp", Parser::space().plus()).inherited("x"))
        .start("A")
        .skip("Sp");
    assert_eq!(
        build_error(vec![grammar]),
        GrammarError::SkipRuleWithAttributes {
            grammar: "G".into(),
            rule: "Sp".into(),
            inherited: 1,
        }
    );
}

#[test]
fn test_keyword_continuation_cannot_take_arguments() {
    let grammar = GrammarBuilder::new("G")
        .rule(RuleBuilder::new(
            "A",
            Parser::keyword_with_continuation("int", "C"),
        ))
        .rule(RuleBuilder::new("C", Parser::letter()).inherited("x"))
        .start("A");
    assert_eq!(
        build_error(vec![grammar]),
        GrammarError::ArgumentCountMismatch {
            grammar: "G".into(),
            rule: "A".into(),
            name: "C".into(),
            expected: 1,
            found: 0,
        }
    );
}
