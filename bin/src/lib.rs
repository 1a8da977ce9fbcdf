use std::io::{self, Write};

use errors::{LoxErrors, Reporter};
use interpreter::Interpreter;
use parser::{printer, Parser, Stmt};
use scanner::Scanner;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Scan or parse errors. Nothing was executed.
    #[error("{0}")]
    Static(#[from] LoxErrors),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub fn parse(source: &str) -> Result<Vec<Stmt>, LoxErrors> {
    let tokens = Scanner::new(source).scan_tokens()?;
    Parser::new(tokens).parse()
}

/// Runs `source` on `interpreter`. Runtime errors go to `reporter`, so an `Ok`
/// does not mean every statement ran.
pub fn run<W: Write>(
    source: &str,
    interpreter: &mut Interpreter<W>,
    reporter: &mut impl Reporter,
) -> Result<(), RunError> {
    let stmts = parse(source)?;
    interpreter.interpret(&stmts, reporter)?;
    Ok(())
}

/// Writes the tree of every statement's expression instead of running it.
pub fn print_ast(source: &str, out: &mut impl Write) -> Result<(), RunError> {
    for stmt in parse(source)? {
        writeln!(out, "{}", printer::print(stmt.expr()))?;
    }
    Ok(())
}
