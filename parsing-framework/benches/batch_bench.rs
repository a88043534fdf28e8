use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use parsing_framework::{GrammarBuilder, Parser, ParsingDomain, RuleBuilder};

/// A rule that counts the assignments nested inside it.
fn counting_rule(name: &str, open: Parser<usize>, close: Parser<usize>) -> RuleBuilder<usize> {
    let item = Parser::nonterminal("Block")
        .or(Parser::nonterminal("Assignment"))
        .action("add");
    RuleBuilder::new(name, open.action("init").then(item.star()).then(close))
        .value("usize")
        .action("init", |ctx| ctx.set_value(0))
        .action("add", |ctx| {
            let nested = ctx
                .take_instance("Block")
                .or_else(|| ctx.take_instance("Assignment"))
                .unwrap_or(0);
            if let Some(total) = ctx.frame_mut().value_mut() {
                *total += nested;
            }
        })
}

// Program    ::= (Block | Assignment)*
// Block      ::= '{' (Block | Assignment)* '}'!
// Assignment ::= token(letter+) '=' token(digit+) ';'!
fn bench_domain() -> ParsingDomain<usize> {
    let assignment = RuleBuilder::new(
        "Assignment",
        Parser::letter()
            .plus()
            .token()
            .then(Parser::char('='))
            .then(Parser::digit().plus().token())
            .then(Parser::char(';').expect())
            .action("one"),
    )
    .value("usize")
    .action("one", |ctx| ctx.set_value(1));

    let grammar = GrammarBuilder::new("Bench")
        .rule(counting_rule("Program", Parser::empty(), Parser::empty()))
        .rule(counting_rule(
            "Block",
            Parser::char('{'),
            Parser::char('}').expect(),
        ))
        .rule(assignment)
        .rule(RuleBuilder::new("Spacing", Parser::space().plus()))
        .start("Program")
        .skip("Spacing");

    ParsingDomain::builder()
        .grammar(grammar)
        .expect("bench grammar should link")
        .build()
}

fn generate_flat_input(count: usize) -> String {
    let mut input = String::new();
    for i in 0..count {
        input.push_str(&format!("value{} = {};\n", "x".repeat(i % 7), i));
    }
    input
}

fn generate_nested_input(depth: usize, width: usize) -> String {
    if depth == 0 {
        return "leaf = 1;".to_string();
    }
    let mut input = String::from("{ ");
    for _ in 0..width {
        input.push_str(&generate_nested_input(depth - 1, width));
        input.push(' ');
    }
    input.push_str("a = 0; }");
    input
}

fn bench_parser(c: &mut Criterion) {
    let domain = bench_domain();
    let grammar = domain.grammar("Bench").expect("grammar exists");

    let mut group = c.benchmark_group("grammar_parse");

    let size = 1000;
    let flat = generate_flat_input(size);
    group.throughput(Throughput::Elements(size as u64));
    group.bench_function("flat_assignments", |b| {
        b.iter(|| grammar.parse(black_box(&flat), 0, "flat").expect("flat input parses"))
    });

    let nested = generate_nested_input(5, 3);
    let count = grammar
        .parse(&nested, 0, "nested")
        .ok()
        .flatten()
        .unwrap_or_default();
    group.throughput(Throughput::Elements(count as u64));
    group.bench_function("nested_blocks", |b| {
        b.iter(|| grammar.parse(black_box(&nested), 0, "nested").expect("nested input parses"))
    });

    group.finish();
}

criterion_group!(benches, bench_parser);
criterion_main!(benches);
