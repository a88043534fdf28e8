use super::ast::{BinaryOp, CppValue, Expression, UnaryOp};
use parsing_framework::{ActionContext, GrammarBuilder, Parser, RuleBuilder};

pub const NAME: &str = "ExpressionGrammar";

/// Words an identifier may not be.
pub const KEYWORDS: &[&str] = &["if", "else", "while", "return"];

fn take_expression(ctx: &mut ActionContext<'_, CppValue>, instance: &str) -> Option<Expression> {
    ctx.take_instance(instance).and_then(CppValue::into_expression)
}

/// Moves the value of the nonterminal instance `instance` into the frame.
fn pass(instance: &'static str) -> impl Fn(&mut ActionContext<'_, CppValue>) + Send + Sync {
    move |ctx| match take_expression(ctx, instance) {
        Some(expression) => ctx.set_value(CppValue::Expression(expression)),
        None => ctx.reject(),
    }
}

/// A left-associative binary level:
///
/// `Name ::= Operand (op Operand!)*`
fn binary_level(
    name: &str,
    info: &str,
    operand: &'static str,
    operators: &[(&str, BinaryOp)],
) -> RuleBuilder<CppValue> {
    let operator = Parser::choice(
        operators
            .iter()
            .enumerate()
            .map(|(index, (text, _))| Parser::literal(text).action(&format!("op{index}"))),
    );
    let definition = Parser::nonterminal(operand).action("first").then(
        operator
            .then(Parser::nonterminal(operand).expect())
            .action("combine")
            .star(),
    );

    let mut rule = RuleBuilder::new(name, definition)
        .info(info)
        .value("Expression")
        .local("op")
        .action("first", pass(operand))
        .action("combine", move |ctx| {
            let right = take_expression(ctx, operand);
            let frame = ctx.frame_mut();
            let (Some(CppValue::Operator(op)), Some(right), Some(CppValue::Expression(left))) =
                (frame.take_local("op"), right, frame.take_value())
            else {
                ctx.reject();
                return;
            };
            ctx.set_value(CppValue::Expression(Expression::binary(op, left, right)));
        });
    for (index, &(_, op)) in operators.iter().enumerate() {
        rule = rule.action(format!("op{index}"), move |ctx| {
            ctx.frame_mut().set_local("op", CppValue::Operator(op));
        });
    }
    rule
}

fn identifier_chars() -> Parser<CppValue> {
    Parser::id_start().then(Parser::id_cont().star()).token()
}

fn comment() -> Parser<CppValue> {
    let line = Parser::literal("//").then(Parser::any_char().except(Parser::char('\n')).star());
    let block = Parser::literal("/*")
        .then(Parser::any_char().except(Parser::literal("*/")).star())
        .then(Parser::literal("*/").expect());
    line.or(block)
}

/// Expressions of the C++ subset, from `||` down to primaries.
///
/// The grammar also owns the `Spacing` rule (white space and both comment
/// forms), which grammars built on top of it link to as their skip rule.
pub fn grammar() -> GrammarBuilder<CppValue> {
    use BinaryOp::*;

    let unary = Parser::char('-')
        .then(Parser::nonterminal("Unary").expect())
        .action("negate")
        .or(Parser::char('!')
            .then(Parser::nonterminal("Unary").expect())
            .action("not"))
        .or(Parser::nonterminal("Primary").action("primary"));

    let primary = Parser::nonterminal("Integer")
        .action("integer")
        .or(Parser::nonterminal("Identifier").action("identifier"))
        .or(Parser::char('(')
            .then(Parser::nonterminal("Expression").expect())
            .then(Parser::char(')').expect())
            .action("parenthesized"));

    GrammarBuilder::new(NAME)
        .namespace("cpp")
        .rule(
            RuleBuilder::new("Expression", Parser::nonterminal("LogicalOr").action("value"))
                .info("expression")
                .value("Expression")
                .action("value", pass("LogicalOr")),
        )
        .rule(binary_level("LogicalOr", "logical or", "LogicalAnd", &[("||", LogicalOr)]))
        .rule(binary_level("LogicalAnd", "logical and", "Equality", &[("&&", LogicalAnd)]))
        .rule(binary_level(
            "Equality",
            "equality",
            "Relational",
            &[("==", Equal), ("!=", NotEqual)],
        ))
        .rule(binary_level(
            "Relational",
            "relational",
            "Additive",
            &[("<=", LessEqual), (">=", GreaterEqual), ("<", Less), (">", Greater)],
        ))
        .rule(binary_level(
            "Additive",
            "additive",
            "Multiplicative",
            &[("+", Add), ("-", Subtract)],
        ))
        .rule(binary_level(
            "Multiplicative",
            "multiplicative",
            "Unary",
            &[("*", Multiply), ("/", Divide), ("%", Remainder)],
        ))
        .rule(
            RuleBuilder::new("Unary", unary)
                .info("unary expression")
                .value("Expression")
                .action("negate", |ctx| apply_unary(ctx, UnaryOp::Negate))
                .action("not", |ctx| apply_unary(ctx, UnaryOp::Not))
                .action("primary", pass("Primary")),
        )
        .rule(
            RuleBuilder::new("Primary", primary)
                .info("primary expression")
                .value("Expression")
                .action("integer", pass("Integer"))
                .action("identifier", pass("Identifier"))
                .action("parenthesized", pass("Expression")),
        )
        .rule(
            RuleBuilder::new("Integer", Parser::digit().plus().token().action("value"))
                .info("integer literal")
                .value("Expression")
                .action("value", |ctx| {
                    let text = ctx.text().to_string();
                    match text.parse::<i64>() {
                        Ok(value) => ctx.set_value(CppValue::Expression(Expression::Integer(value))),
                        Err(_) => ctx.raise(format!("integer literal '{text}' is out of range")),
                    }
                }),
        )
        .rule(
            RuleBuilder::new(
                "Identifier",
                identifier_chars()
                    .except(Parser::keyword_list(identifier_chars(), KEYWORDS))
                    .action("value"),
            )
            .info("identifier")
            .value("Expression")
            .action("value", |ctx| {
                let name = ctx.text().to_string();
                ctx.set_value(CppValue::Expression(Expression::Identifier(name)));
            }),
        )
        .rule(RuleBuilder::new("Spacing", Parser::space().or(comment()).plus()).info("white space"))
        .start("Expression")
        .skip("Spacing")
}

fn apply_unary(ctx: &mut ActionContext<'_, CppValue>, op: UnaryOp) {
    match take_expression(ctx, "Unary") {
        Some(operand) => ctx.set_value(CppValue::Expression(Expression::Unary {
            op,
            operand: Box::new(operand),
        })),
        None => ctx.reject(),
    }
}
