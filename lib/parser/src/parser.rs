mod expr;
pub mod printer;
mod stmt;

use errors::{LoxError, LoxErrors, Result};
use scanner::{Token, TokenKind};
use value::Value;

pub use expr::Expr;
pub use stmt::Stmt;

use TokenKind::*;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ParserErrorType {
    #[error("Expect expression.")]
    ExpectedExpression,
    #[error("Expect ')' after expression.")]
    MissingRightParen,
    #[error("Expect ';' after value.")]
    ExpectedSemicolonAfterValue,
    #[error("Expect ';' after expression.")]
    ExpectedSemicolonAfterExpression,
}

impl ParserErrorType {
    fn at(self, token: &Token) -> LoxError {
        LoxError::new(token.line(), self.to_string()).at(token.location())
    }
}

#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&Eof) {
            let line = tokens.last().map_or(errors::Line(1), Token::line);
            tokens.push(Token::new(Eof, "", line));
        }
        Self { tokens, current: 0 }
    }

    pub fn parse(mut self) -> std::result::Result<Vec<Stmt>, LoxErrors> {
        let mut errors = LoxErrors::default();
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            match self.statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    errors.push(e);
                    self.synchronize();
                }
            }
        }

        log::debug!("Parsed {} statements, {} errors", stmts.len(), errors.len());
        if errors.is_empty() {
            Ok(stmts)
        } else {
            Err(errors)
        }
    }

    /// Parses a single expression that must make up the whole input.
    pub fn parse_expression(mut self) -> std::result::Result<Expr, LoxErrors> {
        let expr = self.expression()?;
        if !self.is_at_end() {
            return Err(ParserErrorType::ExpectedExpression.at(self.peek_token()).into());
        }
        Ok(expr)
    }

    fn statement(&mut self) -> Result<Stmt> {
        if self.consume(Print).is_some() {
            return self.print_statement();
        }

        self.expression_statement()
    }

    fn print_statement(&mut self) -> Result<Stmt> {
        let value = self.expression()?;
        self.consume_or_error(Semicolon, ParserErrorType::ExpectedSemicolonAfterValue)?;
        Ok(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let value = self.expression()?;
        self.consume_or_error(Semicolon, ParserErrorType::ExpectedSemicolonAfterExpression)?;
        Ok(Stmt::Expression(value))
    }

    fn expression(&mut self) -> Result<Expr> {
        self.equality()
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut expr = self.comparison()?;

        while let BangEqual | EqualEqual = self.peek() {
            let operator = self.advance();
            let right = self.comparison()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr = self.term()?;

        while let Greater | GreaterEqual | Less | LessEqual = self.peek() {
            let operator = self.advance();
            let right = self.term()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut expr = self.factor()?;

        while let Plus | Minus = self.peek() {
            let operator = self.advance();
            let right = self.factor()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr> {
        let mut expr = self.unary()?;

        while let Star | Slash = self.peek() {
            let operator = self.advance();
            let right = self.unary()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if let Bang | Minus = self.peek() {
            let operator = self.advance();
            let right = self.unary()?;
            return Ok(Expr::unary(operator, right));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr> {
        let literal = match self.peek() {
            False => Value::Bool(false),
            True => Value::Bool(true),
            Nil => Value::Nil,
            Number(n) => Value::Number(*n),
            Str(s) => Value::Str(s.clone()),
            LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume_or_error(RightParen, ParserErrorType::MissingRightParen)?;
                return Ok(Expr::grouping(expr));
            }
            _ => return Err(ParserErrorType::ExpectedExpression.at(self.peek_token())),
        };

        self.advance();
        Ok(Expr::Literal(literal))
    }

    /// Skips tokens until the start of the next statement.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == Semicolon {
                return;
            }

            match self.peek() {
                Class | Fun | Var | For | If | While | Print | Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

// Helpers
impl Parser {
    fn consume(&mut self, kind: TokenKind) -> Option<Token> {
        (*self.peek() == kind).then(|| self.advance())
    }

    fn consume_or_error(&mut self, kind: TokenKind, error_type: ParserErrorType) -> Result<Token> {
        match self.consume(kind) {
            Some(token) => Ok(token),
            None => Err(error_type.at(self.peek_token())),
        }
    }

    fn peek_token(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek(&self) -> &TokenKind {
        &self.peek_token().kind
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Returns the current token and moves past it. Never moves past `Eof`.
    fn advance(&mut self) -> Token {
        let token = self.peek_token().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        *self.peek() == Eof
    }
}
