use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    LogicalOr,
    LogicalAnd,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::LogicalOr => "||",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    Integer(i64),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn identifier(name: &str) -> Self {
        Expression::Identifier(name.to_string())
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Fully parenthesized, so the tree shape is visible.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) => write!(f, "{name}"),
            Expression::Integer(value) => write!(f, "{value}"),
            Expression::Unary { op, operand } => {
                let symbol = match op {
                    UnaryOp::Negate => '-',
                    UnaryOp::Not => '!',
                };
                write!(f, "{symbol}{operand}")
            }
            Expression::Binary { op, left, right } => {
                write!(f, "({left} {} {right})", op.symbol())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Compound(Vec<Statement>),
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    Return(Option<Expression>),
    Expression(Expression),
    Empty,
}

impl Statement {
    /// Writes the statement as an indented outline.
    pub fn write_outline(&self, out: &mut impl fmt::Write, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            Statement::Compound(statements) => {
                writeln!(out, "{indent}compound")?;
                for statement in statements {
                    statement.write_outline(out, depth + 1)?;
                }
                Ok(())
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                writeln!(out, "{indent}if {condition}")?;
                then_branch.write_outline(out, depth + 1)?;
                if let Some(else_branch) = else_branch {
                    writeln!(out, "{indent}else")?;
                    else_branch.write_outline(out, depth + 1)?;
                }
                Ok(())
            }
            Statement::While { condition, body } => {
                writeln!(out, "{indent}while {condition}")?;
                body.write_outline(out, depth + 1)
            }
            Statement::Return(Some(value)) => writeln!(out, "{indent}return {value}"),
            Statement::Return(None) => writeln!(out, "{indent}return"),
            Statement::Expression(expression) => writeln!(out, "{indent}{expression}"),
            Statement::Empty => writeln!(out, "{indent};"),
        }
    }
}

/// The synthesized value of every rule of the C++ grammars.
#[derive(Debug, Clone, PartialEq)]
pub enum CppValue {
    Expression(Expression),
    Statement(Statement),
    Operator(BinaryOp),
}

impl CppValue {
    pub fn into_expression(self) -> Option<Expression> {
        match self {
            CppValue::Expression(expression) => Some(expression),
            _ => None,
        }
    }

    pub fn into_statement(self) -> Option<Statement> {
        match self {
            CppValue::Statement(statement) => Some(statement),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_display_is_parenthesized() {
        let expression = Expression::binary(
            BinaryOp::Add,
            Expression::identifier("a"),
            Expression::binary(BinaryOp::Multiply, Expression::Integer(2), Expression::identifier("b")),
        );
        assert_eq!(expression.to_string(), "(a + (2 * b))");
    }

    #[test]
    fn test_outline() {
        let statement = Statement::Compound(vec![
            Statement::While {
                condition: Expression::identifier("x"),
                body: Box::new(Statement::Empty),
            },
            Statement::Return(None),
        ]);
        let mut out = String::new();
        statement.write_outline(&mut out, 0).unwrap();
        assert_eq!(out, "compound\n  while x\n    ;\n  return\n");
    }
}
