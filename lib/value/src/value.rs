use std::fmt::{self, Display, Formatter};

/// A runtime value.
///
/// The [`Display`] impl is what `print` writes: numbers without a trailing
/// `.0`, strings without quotes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl Value {
    /// `nil` and `false` are falsey, everything else (including `0` and `""`) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Number(_) | Value::Str(_) => true,
        }
    }

    /// Equality without coercion between kinds. Unlike IEEE-754, `NaN` equals
    /// itself so that every value is equal to itself.
    pub fn eq_in_lox(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Number(l), Value::Number(r)) => l == r || (l.is_nan() && r.is_nan()),
            (Value::Str(l), Value::Str(r)) => l == r,
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let text = n.to_string();
    match text.strip_suffix(".0") {
        Some(integral) => integral.to_string(),
        None => text,
    }
}
