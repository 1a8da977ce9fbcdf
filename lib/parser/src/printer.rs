//! Renders expression trees as fully parenthesized prefix notation, e.g.
//! `-(3) * 4` becomes `(* (- (group 3)) 4)`.

use itertools::Itertools;
use value::Value;

use crate::Expr;

pub fn print(expr: &Expr) -> String {
    match expr {
        Expr::Binary { left, operator, right } => {
            parenthesize(operator.lexeme(), &[left.as_ref(), right.as_ref()])
        }
        Expr::Grouping(expr) => parenthesize("group", &[expr.as_ref()]),
        Expr::Unary { operator, right } => parenthesize(operator.lexeme(), &[right.as_ref()]),
        Expr::Literal(value) => literal(value),
    }
}

fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
    format!("({} {})", name, exprs.iter().map(|expr| print(expr)).join(" "))
}

// Plain default formatting, so numbers are not run through the `print` statement rules.
fn literal(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Str(s) => s.clone(),
    }
}
