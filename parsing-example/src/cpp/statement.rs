use super::ast::{CppValue, Expression, Statement};
use super::expression;
use parsing_framework::{ActionContext, GrammarBuilder, Parser, RuleBuilder};

pub const NAME: &str = "StatementGrammar";

fn take_statement(ctx: &mut ActionContext<'_, CppValue>, instance: &str) -> Option<Statement> {
    ctx.take_instance(instance).and_then(CppValue::into_statement)
}

fn take_expression(ctx: &mut ActionContext<'_, CppValue>) -> Option<Expression> {
    ctx.take_instance("Expression").and_then(CppValue::into_expression)
}

fn statement_mut<'f>(ctx: &'f mut ActionContext<'_, CppValue>) -> Option<&'f mut Statement> {
    match ctx.frame_mut().value_mut() {
        Some(CppValue::Statement(statement)) => Some(statement),
        _ => None,
    }
}

fn set_statement(ctx: &mut ActionContext<'_, CppValue>, statement: Statement) {
    ctx.set_value(CppValue::Statement(statement));
}

/// `"(" Expression ")"` after `if` and `while`, all of it required.
fn condition() -> Parser<CppValue> {
    Parser::char('(')
        .expect()
        .then(Parser::nonterminal("Expression").expect())
        .then(Parser::char(')').expect())
}

/// Statements of the C++ subset. The start rule parses one compound
/// statement, skipping white space and comments through the expression
/// grammar's `Spacing`.
pub fn grammar() -> GrammarBuilder<CppValue> {
    let expression_grammar = format!("cpp.{}", expression::NAME);

    let statement = Parser::choice(
        [
            "CompoundStatement",
            "IfStatement",
            "WhileStatement",
            "ReturnStatement",
            "EmptyStatement",
            "ExpressionStatement",
        ]
        .into_iter()
        .map(|rule| Parser::nonterminal_as(rule, "statement")),
    )
    .action("value");

    let compound = Parser::char('{')
        .action("open")
        .then(Parser::nonterminal("Statement").action("push").star())
        .then(Parser::char('}').expect());

    let if_statement = Parser::keyword("if")
        .then(condition())
        .then(Parser::nonterminal("Statement").expect())
        .action("then")
        .then(
            Parser::keyword("else")
                .then(Parser::nonterminal("Statement").expect())
                .action("else")
                .opt(),
        );

    let while_statement = Parser::keyword("while")
        .then(condition())
        .then(Parser::nonterminal("Statement").expect())
        .action("value");

    let return_statement = Parser::keyword("return")
        .then(Parser::nonterminal("Expression").opt())
        .then(Parser::char(';').expect())
        .action("value");

    GrammarBuilder::new(NAME)
        .namespace("cpp")
        .reference(expression_grammar.clone())
        .link("Expression", format!("{expression_grammar}.Expression"))
        .link("Spacing", format!("{expression_grammar}.Spacing"))
        .rule(
            RuleBuilder::new("Statement", statement)
                .info("statement")
                .value("Statement")
                .action("value", |ctx| match take_statement(ctx, "statement") {
                    Some(statement) => set_statement(ctx, statement),
                    None => ctx.reject(),
                }),
        )
        .rule(
            RuleBuilder::new("CompoundStatement", compound)
                .info("compound statement")
                .value("Statement")
                .action("open", |ctx| set_statement(ctx, Statement::Compound(Vec::new())))
                .action("push", |ctx| {
                    let Some(statement) = take_statement(ctx, "Statement") else {
                        return ctx.reject();
                    };
                    if let Some(Statement::Compound(statements)) = statement_mut(ctx) {
                        statements.push(statement);
                    }
                }),
        )
        .rule(
            RuleBuilder::new("IfStatement", if_statement)
                .info("if statement")
                .value("Statement")
                .action("then", |ctx| {
                    let (Some(condition), Some(then_branch)) =
                        (take_expression(ctx), take_statement(ctx, "Statement"))
                    else {
                        return ctx.reject();
                    };
                    set_statement(
                        ctx,
                        Statement::If {
                            condition,
                            then_branch: Box::new(then_branch),
                            else_branch: None,
                        },
                    );
                })
                .action("else", |ctx| {
                    let Some(statement) = take_statement(ctx, "Statement") else {
                        return ctx.reject();
                    };
                    if let Some(Statement::If { else_branch, .. }) = statement_mut(ctx) {
                        *else_branch = Some(Box::new(statement));
                    }
                }),
        )
        .rule(
            RuleBuilder::new("WhileStatement", while_statement)
                .info("while statement")
                .value("Statement")
                .action("value", |ctx| {
                    let (Some(condition), Some(body)) =
                        (take_expression(ctx), take_statement(ctx, "Statement"))
                    else {
                        return ctx.reject();
                    };
                    set_statement(
                        ctx,
                        Statement::While {
                            condition,
                            body: Box::new(body),
                        },
                    );
                }),
        )
        .rule(
            RuleBuilder::new("ReturnStatement", return_statement)
                .info("return statement")
                .value("Statement")
                .action("value", |ctx| {
                    let value = take_expression(ctx);
                    set_statement(ctx, Statement::Return(value));
                }),
        )
        .rule(
            RuleBuilder::new("EmptyStatement", Parser::char(';').action("value"))
                .value("Statement")
                .action("value", |ctx| set_statement(ctx, Statement::Empty)),
        )
        .rule(
            RuleBuilder::new(
                "ExpressionStatement",
                Parser::nonterminal("Expression")
                    .then(Parser::char(';').expect())
                    .action("value"),
            )
            .info("expression statement")
            .value("Statement")
            .action("value", |ctx| match take_expression(ctx) {
                Some(expression) => set_statement(ctx, Statement::Expression(expression)),
                None => ctx.reject(),
            }),
        )
        .start("CompoundStatement")
        .skip("Spacing")
}
