use std::{
    fmt::Display,
    ops::{Deref, DerefMut},
};

use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, derive_more::Display, derive_more::From)]
pub struct Line(pub usize);

/// A static (scan or parse) error. Runtime errors live in the interpreter and
/// are handed to a [`Reporter`] instead.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[error("[line {line}] Error{location}: {message}")]
pub struct LoxError {
    pub line: Line,
    /// Either empty, ` at end` or ` at '<lexeme>'`.
    pub location: String,
    pub message: String,
}

impl LoxError {
    pub fn new(line: Line, message: impl Into<String>) -> Self {
        Self { line, location: String::new(), message: message.into() }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}

#[derive(thiserror::Error, Debug, Default, PartialEq)]
pub struct LoxErrors(pub Vec<LoxError>);

impl From<LoxError> for LoxErrors {
    fn from(e: LoxError) -> Self {
        Self(vec![e])
    }
}

impl Deref for LoxErrors {
    type Target = Vec<LoxError>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for LoxErrors {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Display for LoxErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

pub type Result<T> = std::result::Result<T, LoxError>;

/// Receives runtime errors that aborted an `interpret` call.
pub trait Reporter {
    fn runtime_error(&mut self, line: Line, message: &str);
}

impl Reporter for Vec<(Line, String)> {
    fn runtime_error(&mut self, line: Line, message: &str) {
        self.push((line, message.to_string()));
    }
}
