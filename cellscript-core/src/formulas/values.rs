//! Runtime values and the coarse static type lattice.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::Display;

use super::cell_ref::RangeRef;
use super::errors::ErrorCode;

/// Coarse static type assigned to every AST node by the inferencer, doubling
/// as the runtime kind tag of a [`Value`].
///
/// `Unknown` is the "defer to runtime" type, used for functions like `IF`
/// whose return type depends on their arguments.
#[derive(Serialize, Deserialize, Debug, Display, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BaseType {
    #[strum(to_string = "number")]
    Number,
    #[strum(to_string = "boolean")]
    Bool,
    #[strum(to_string = "text")]
    String,
    #[strum(to_string = "cell reference")]
    CellRef,
    #[strum(to_string = "range")]
    Range,
    #[strum(to_string = "blank")]
    Blank,
    #[strum(to_string = "unknown")]
    Unknown,
    #[strum(to_string = "error")]
    Error,
}

/// A value produced by evaluation.
///
/// `Blank` is the distinct "empty cell" value and is not the same as empty
/// text. `Error` values are first-class: they propagate through operators and
/// short-circuit further computation, and never silently coerce to another
/// kind.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Text(String),
    Range(RangeRef),
    #[default]
    Blank,
    Error(ErrorCode),
}
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", number_to_text(*n)),
            Value::Bool(true) => write!(f, "TRUE"),
            Value::Bool(false) => write!(f, "FALSE"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Range(range) => write!(f, "{range}"),
            Value::Blank => write!(f, ""),
            Value::Error(code) => write!(f, "{code}"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}
impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}
impl From<RangeRef> for Value {
    fn from(range: RangeRef) -> Self {
        Value::Range(range)
    }
}
impl From<ErrorCode> for Value {
    fn from(code: ErrorCode) -> Self {
        Value::Error(code)
    }
}

impl Value {
    /// Returns the runtime kind of this value.
    pub fn base_type(&self) -> BaseType {
        match self {
            Value::Number(_) => BaseType::Number,
            Value::Bool(_) => BaseType::Bool,
            Value::Text(_) => BaseType::String,
            Value::Range(_) => BaseType::Range,
            Value::Blank => BaseType::Blank,
            Value::Error(_) => BaseType::Error,
        }
    }

    pub fn as_error(&self) -> Option<ErrorCode> {
        match self {
            Value::Error(code) => Some(*code),
            _ => None,
        }
    }

    /// Coerces this value to a number for arithmetic and ordered comparison:
    /// numbers are taken as-is and `Blank` behaves as zero. Everything else
    /// (including errors) refuses to coerce.
    pub fn coerce_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Blank => Some(0.0),
            _ => None,
        }
    }
}

/// Canonical textualization of a number: shortest decimal form with up to 15
/// significant digits, equivalent to C's `%.15g`.
pub fn number_to_text(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    if !n.is_finite() {
        // Evaluation replaces non-finite results with #NUM!; this branch only
        // serves values injected directly into a cell store.
        return if n.is_nan() {
            "NaN"
        } else if n > 0.0 {
            "inf"
        } else {
            "-inf"
        }
        .to_string();
    }
    let exp = n.abs().log10().floor() as i32;
    if (-4..15).contains(&exp) {
        let decimals = (14 - exp).max(0) as usize;
        let mut s = format!("{n:.decimals$}");
        if s.contains('.') {
            while s.ends_with('0') {
                s.pop();
            }
            if s.ends_with('.') {
                s.pop();
            }
        }
        s
    } else {
        let s = format!("{n:.14e}");
        match s.split_once('e') {
            Some((mantissa, exponent)) => {
                let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
                format!("{mantissa}e{exponent}")
            }
            None => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_textualization() {
        assert_eq!(number_to_text(0.0), "0");
        assert_eq!(number_to_text(-0.0), "0");
        assert_eq!(number_to_text(7.0), "7");
        assert_eq!(number_to_text(-7.5), "-7.5");
        assert_eq!(number_to_text(512.0), "512");
        assert_eq!(number_to_text(0.1 + 0.2), "0.3");
        assert_eq!(number_to_text(1.0 / 3.0), "0.333333333333333");
        assert_eq!(number_to_text(1e-5), "1e-5");
        assert_eq!(number_to_text(1e21), "1e21");
        assert_eq!(number_to_text(-2.5e-9), "-2.5e-9");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Bool(true).to_string(), "TRUE");
        assert_eq!(Value::Bool(false).to_string(), "FALSE");
        assert_eq!(Value::Text("abc".into()).to_string(), "abc");
        assert_eq!(Value::Blank.to_string(), "");
        assert_eq!(Value::Error(ErrorCode::Div0).to_string(), "#DIV/0!");
        assert_eq!(Value::Error(ErrorCode::Name).to_string(), "#NAME?");
    }
}
