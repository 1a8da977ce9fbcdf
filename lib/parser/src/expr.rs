use std::fmt::{self, Display, Formatter};

use scanner::Token;
use value::Value;

use crate::printer;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary { left: Box<Expr>, operator: Token, right: Box<Expr> },
    Grouping(Box<Expr>),
    Unary { operator: Token, right: Box<Expr> },
    Literal(Value),
}

impl Expr {
    pub fn binary(left: Expr, operator: Token, right: Expr) -> Self {
        Expr::Binary { left: Box::new(left), operator, right: Box::new(right) }
    }

    pub fn grouping(expr: Expr) -> Self {
        Expr::Grouping(Box::new(expr))
    }

    pub fn unary(operator: Token, right: Expr) -> Self {
        Expr::Unary { operator, right: Box::new(right) }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", printer::print(self))
    }
}
