use crate::Expr;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Expr),
    Print(Expr),
}

impl Stmt {
    pub fn expr(&self) -> &Expr {
        match self {
            Stmt::Expression(expr) | Stmt::Print(expr) => expr,
        }
    }
}
