use errors::{Line, LoxError, LoxErrors};

pub mod token;
pub use token::{Token, TokenKind};
use TokenKind::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("Unexpected character.")]
    UnexpectedCharacter,
    #[error("Unterminated string.")]
    UnterminatedString,
}

pub struct Scanner {
    start: usize,
    current: usize,
    line: usize,
    source: Vec<char>,
    tokens: Vec<Token>,
    errors: LoxErrors,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            start: 0,
            current: 0,
            line: 1,
            source: source.chars().collect(),
            tokens: Vec::new(),
            errors: LoxErrors::default(),
        }
    }

    pub fn scan_tokens(mut self) -> Result<Vec<Token>, LoxErrors> {
        while let Some(c) = self.consume() {
            self.start = self.current - 1;
            match c {
                '(' => self.add_token(LeftParen),
                ')' => self.add_token(RightParen),
                '{' => self.add_token(LeftBrace),
                '}' => self.add_token(RightBrace),
                ',' => self.add_token(Comma),
                '.' => self.add_token(Dot),
                '-' => self.add_token(Minus),
                '+' => self.add_token(Plus),
                ';' => self.add_token(Semicolon),
                '*' => self.add_token(Star),

                '!' => {
                    let kind = if self.consume_if_matches('=') { BangEqual } else { Bang };
                    self.add_token(kind)
                }
                '=' => {
                    let kind = if self.consume_if_matches('=') { EqualEqual } else { Equal };
                    self.add_token(kind)
                }
                '<' => {
                    let kind = if self.consume_if_matches('=') { LessEqual } else { Less };
                    self.add_token(kind)
                }
                '>' => {
                    let kind = if self.consume_if_matches('=') { GreaterEqual } else { Greater };
                    self.add_token(kind)
                }

                '/' => {
                    if self.consume_if_matches('/') {
                        // Comment
                        while !matches!(self.peek(), Some('\n') | None) {
                            self.consume();
                        }
                    } else {
                        self.add_token(Slash)
                    }
                }

                '"' => self.string(),
                d if d.is_ascii_digit() => self.number(),
                a if is_alpha(a) => self.identifier(),

                ' ' | '\r' | '\t' => (),
                '\n' => self.line += 1,

                c => {
                    log::debug!("Unexpected character {c:?} on line {}", self.line);
                    self.error(ScanError::UnexpectedCharacter)
                }
            }
        }

        self.tokens.push(Token::new(Eof, "", self.line));
        log::debug!("Scanned {} tokens, {} errors", self.tokens.len(), self.errors.len());

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    fn string(&mut self) {
        let start_line = self.line;
        loop {
            match self.consume() {
                Some('"') => break,
                Some('\n') => self.line += 1,
                Some(_) => (),
                // Reported where the string starts, not at the end of the source.
                None => return self.error_at(start_line, ScanError::UnterminatedString),
            }
        }

        let value = self.source[self.start + 1..self.current - 1].iter().collect();
        self.add_token(Str(value));
    }

    fn number(&mut self) {
        self.consume_while(|c| c.is_ascii_digit());

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.consume();
            self.consume_while(|c| c.is_ascii_digit());
        }

        // Only ASCII digits and at most one '.', so this always parses.
        let value = self.lexeme().parse().unwrap_or_default();
        self.add_token(Number(value));
    }

    fn identifier(&mut self) {
        self.consume_while(|c| is_alpha(c) || c.is_ascii_digit());
        let kind = TokenKind::keyword(&self.lexeme()).unwrap_or(Identifier);
        self.add_token(kind);
    }
}

// Helpers
impl Scanner {
    fn lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, kind: TokenKind) {
        let token = Token::new(kind, self.lexeme(), self.line);
        log::trace!("{} {}", token.kind, token.lexeme);
        self.tokens.push(token);
    }

    fn error(&mut self, error: ScanError) {
        self.error_at(self.line, error)
    }

    fn error_at(&mut self, line: usize, error: ScanError) {
        self.errors.push(LoxError::new(Line(line), error.to_string()));
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.current + 1).copied()
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.current += 1;
        Some(c)
    }

    fn consume_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.current += 1;
        }
    }

    fn consume_if_matches(&mut self, expected: char) -> bool {
        match self.peek() {
            Some(c) if c == expected => {
                self.current += 1;
                true
            }
            _ => false,
        }
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}
