use std::io::{self, Stdout, Write};

use errors::Reporter;
use parser::{Expr, Stmt};
use scanner::{Token, TokenKind};
use value::Value;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("Operand must be a number")]
    OperandMustBeNumber,
    #[error("Operands must be numbers")]
    OperandsMustBeNumbers,
    #[error("Operands must be two numbers or two strings")]
    OperandsMustBeNumbersOrStrings,
}

/// An operator was applied to values it does not support.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{kind}")]
pub struct RuntimeError {
    pub token: Token,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    fn new(token: &Token, kind: RuntimeErrorKind) -> Self {
        Self { token: token.clone(), kind }
    }
}

#[derive(thiserror::Error, Debug)]
enum ExecError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Tree-walking evaluator. `print` statements write to `out`.
#[derive(Debug)]
pub struct Interpreter<W: Write> {
    out: W,
}

impl Default for Interpreter<Stdout> {
    fn default() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Executes `stmts` in order. The first runtime error stops execution and
    /// is handed to `reporter`; output of earlier statements is kept.
    ///
    /// Only a failure to write to the output stream is returned as an error.
    pub fn interpret(&mut self, stmts: &[Stmt], reporter: &mut impl Reporter) -> io::Result<()> {
        for stmt in stmts {
            match self.execute(stmt) {
                Ok(()) => (),
                Err(ExecError::Runtime(e)) => {
                    log::debug!("Runtime error at line {}: {}", e.token.line(), e);
                    reporter.runtime_error(e.token.line(), &e.to_string());
                    return Ok(());
                }
                Err(ExecError::Io(e)) => return Err(e),
            }
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), ExecError> {
        log::debug!("Executing {:?}", stmt);
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
            }
        }
        Ok(())
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        log::trace!("Evaluating {}", expr);
        match expr {
            Expr::Literal(value) => Ok(value.clone()),

            Expr::Grouping(expr) => self.evaluate(expr),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match (&operator.kind, right) {
                    (TokenKind::Bang, v) => Ok(Value::from(!v.is_truthy())),
                    (TokenKind::Minus, Value::Number(n)) => Ok(Value::from(-n)),
                    (TokenKind::Minus, _) => {
                        Err(RuntimeError::new(operator, RuntimeErrorKind::OperandMustBeNumber))
                    }
                    (kind, _) => unreachable!("Parser produced unary operator {kind}"),
                }
            }

            Expr::Binary { left, operator, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;

                use TokenKind::*;
                match &operator.kind {
                    BangEqual => Ok(Value::from(!left.eq_in_lox(&right))),
                    EqualEqual => Ok(Value::from(left.eq_in_lox(&right))),

                    // `+` also concatenates strings.
                    Plus => match (left, right) {
                        (Value::Number(l), Value::Number(r)) => Ok(Value::from(l + r)),
                        (Value::Str(l), Value::Str(r)) => Ok(Value::from(l + &r)),
                        _ => Err(RuntimeError::new(
                            operator,
                            RuntimeErrorKind::OperandsMustBeNumbersOrStrings,
                        )),
                    },

                    Greater => {
                        number_operands(operator, &left, &right).map(|(l, r)| Value::from(l > r))
                    }
                    GreaterEqual => {
                        number_operands(operator, &left, &right).map(|(l, r)| Value::from(l >= r))
                    }
                    Less => {
                        number_operands(operator, &left, &right).map(|(l, r)| Value::from(l < r))
                    }
                    LessEqual => {
                        number_operands(operator, &left, &right).map(|(l, r)| Value::from(l <= r))
                    }

                    Minus => {
                        number_operands(operator, &left, &right).map(|(l, r)| Value::from(l - r))
                    }
                    Slash => {
                        number_operands(operator, &left, &right).map(|(l, r)| Value::from(l / r))
                    }
                    Star => {
                        number_operands(operator, &left, &right).map(|(l, r)| Value::from(l * r))
                    }

                    kind => unreachable!("Parser produced binary operator {kind}"),
                }
            }
        }
    }
}

fn number_operands(
    operator: &Token,
    left: &Value,
    right: &Value,
) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok((*l, *r)),
        _ => Err(RuntimeError::new(operator, RuntimeErrorKind::OperandsMustBeNumbers)),
    }
}

#[cfg(test)]
mod tests {
    use errors::Line;
    use parser::Parser;
    use pretty_assertions::assert_eq;
    use scanner::Scanner;

    use super::*;

    #[ctor::ctor]
    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn parse(source: &str) -> Vec<Stmt> {
        Parser::new(Scanner::new(source).scan_tokens().unwrap()).parse().unwrap()
    }

    fn eval(source: &str) -> Result<Value, RuntimeError> {
        let expr = Parser::new(Scanner::new(source).scan_tokens().unwrap())
            .parse_expression()
            .unwrap();
        Interpreter::new(io::sink()).evaluate(&expr)
    }

    fn run(source: &str) -> (Vec<String>, Vec<(Line, String)>) {
        let mut output = Vec::new();
        let mut reported: Vec<(Line, String)> = Vec::new();
        Interpreter::new(&mut output).interpret(&parse(source), &mut reported).unwrap();

        let lines = String::from_utf8(output).unwrap().lines().map(str::to_string).collect();
        (lines, reported)
    }

    fn error_message(source: &str) -> String {
        eval(source).unwrap_err().to_string()
    }

    #[test]
    fn literals_and_grouping() {
        assert_eq!(eval("42"), Ok(Value::Number(42.0)));
        assert_eq!(eval("\"hello\""), Ok(Value::from("hello")));
        assert_eq!(eval("(((true)))"), Ok(Value::Bool(true)));
        assert_eq!(eval("nil"), Ok(Value::Nil));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval("40 + 2"), Ok(Value::Number(42.0)));
        assert_eq!(eval("40 - 10"), Ok(Value::Number(30.0)));
        assert_eq!(eval("7 * 3"), Ok(Value::Number(21.0)));
        assert_eq!(eval("10 / 4"), Ok(Value::Number(2.5)));
        assert_eq!(eval("-(1 + 2)"), Ok(Value::Number(-3.0)));
    }

    #[test]
    fn division_by_zero_follows_ieee() {
        assert_eq!(eval("1 / 0"), Ok(Value::Number(f64::INFINITY)));
        assert_eq!(eval("-1 / 0"), Ok(Value::Number(f64::NEG_INFINITY)));
        match eval("0 / 0") {
            Ok(Value::Number(n)) => assert!(n.is_nan()),
            other => panic!("expected NaN, got {other:?}"),
        }
    }

    #[test]
    fn plus_overload() {
        assert_eq!(eval("1 + 2"), Ok(Value::Number(3.0)));
        assert_eq!(eval("\"a\" + \"b\""), Ok(Value::from("ab")));
        assert_eq!(error_message("1 + \"a\""), "Operands must be two numbers or two strings");
        assert_eq!(error_message("\"a\" + 1"), "Operands must be two numbers or two strings");
        assert_eq!(error_message("nil + nil"), "Operands must be two numbers or two strings");
        assert_eq!(error_message("true + 1"), "Operands must be two numbers or two strings");
    }

    #[test]
    fn arithmetic_type_errors() {
        assert_eq!(error_message("\"x\" - 1"), "Operands must be numbers");
        assert_eq!(error_message("\"a\" * 2"), "Operands must be numbers");
        assert_eq!(error_message("nil / 2"), "Operands must be numbers");
        assert_eq!(error_message("-\"a\""), "Operand must be a number");
        assert_eq!(error_message("-nil"), "Operand must be a number");
    }

    #[test]
    fn comparison() {
        assert_eq!(eval("2 < 3"), Ok(Value::Bool(true)));
        assert_eq!(eval("2 > 3"), Ok(Value::Bool(false)));
        assert_eq!(eval("3 >= 3"), Ok(Value::Bool(true)));
        assert_eq!(eval("4 <= 3"), Ok(Value::Bool(false)));
        assert_eq!(error_message("1 < \"a\""), "Operands must be numbers");
        assert_eq!(error_message("\"a\" < \"b\""), "Operands must be numbers");
        assert_eq!(error_message("true >= false"), "Operands must be numbers");
    }

    #[test]
    fn equality() {
        assert_eq!(eval("nil == nil"), Ok(Value::Bool(true)));
        assert_eq!(eval("nil == 0"), Ok(Value::Bool(false)));
        assert_eq!(eval("1 == \"1\""), Ok(Value::Bool(false)));
        assert_eq!(eval("\"ab\" == \"a\" + \"b\""), Ok(Value::Bool(true)));
        assert_eq!(eval("true != false"), Ok(Value::Bool(true)));
        assert_eq!(eval("1 != 1"), Ok(Value::Bool(false)));
    }

    #[test]
    fn truthiness() {
        assert_eq!(eval("!nil"), Ok(Value::Bool(true)));
        assert_eq!(eval("!false"), Ok(Value::Bool(true)));
        assert_eq!(eval("!0"), Ok(Value::Bool(false)));
        assert_eq!(eval("!\"\""), Ok(Value::Bool(false)));
        assert_eq!(eval("!!123"), Ok(Value::Bool(true)));
    }

    #[test]
    fn errors_point_at_the_operator() {
        let error = eval("1 +\n\n\"a\"").unwrap_err();
        assert_eq!(error.token.lexeme(), "+");
        assert_eq!(error.token.line(), Line(1));
        assert_eq!(error.kind, RuntimeErrorKind::OperandsMustBeNumbersOrStrings);
    }

    #[test]
    fn inner_errors_abort_the_whole_expression() {
        let error = eval("(1 + 2) * (3 - -\"x\")").unwrap_err();
        assert_eq!(error.kind, RuntimeErrorKind::OperandMustBeNumber);
        assert_eq!(error.token.lexeme(), "-");
    }

    #[test]
    fn print_stringifies() {
        let (output, reported) =
            run("print 4.0; print 4.5; print nil; print \"s\"; print true; print 1 / 0;");
        assert_eq!(output, vec!["4", "4.5", "nil", "s", "true", "Infinity"]);
        assert!(reported.is_empty());
    }

    #[test]
    fn expression_statements_print_nothing() {
        let (output, reported) = run("1 + 2; \"unused\";");
        assert!(output.is_empty());
        assert!(reported.is_empty());
    }

    #[test]
    fn stops_at_first_runtime_error() {
        let (output, reported) = run("print 1 + 1;\nprint \"x\" - 1;\nprint 3;");
        assert_eq!(output, vec!["2"]);
        assert_eq!(reported, vec![(Line(2), "Operands must be numbers".to_string())]);
    }

    #[test]
    fn output_errors_are_returned() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut reported: Vec<(Line, String)> = Vec::new();
        let result = Interpreter::new(Broken).interpret(&parse("print 1;"), &mut reported);
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert!(reported.is_empty());
    }
}
