//! Error reporting functionality for compilation and runtime.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use strum_macros::Display;
use thiserror::Error;

use crate::Span;

pub type CodeResult<T = ()> = Result<T, RunError>;

/// Error message and accompanying span.
///
/// These are the *structural* errors: a formula that fails to tokenize or
/// parse never produces an AST, and the host surfaces the diagnostic
/// directly. Runtime errors are ordinary [`super::Value`]s carrying an
/// [`ErrorCode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunError {
    /// Location of the source code where the error occurred (if any).
    pub span: Option<Span>,
    /// Type of error.
    pub msg: RunErrorMsg,
}
impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "column {} to {}: {}", span.start, span.end, self.msg),
            None => write!(f, "{}", self.msg),
        }
    }
}
impl std::error::Error for RunError {}
impl RunError {
    /// Attaches a span to this RunError, if it does not already have one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }
}

/// Information about the type of error that occurred.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunErrorMsg {
    // Lex errors
    #[error("This {0} never ends")]
    Unterminated(&'static str),
    #[error("{c:?} is not allowed after a {after}")]
    BadFollower { after: &'static str, c: char },
    #[error("The percent operator needs a number, cell reference, or parenthesized expression before it")]
    MisplacedPercent,
    #[error("A comma is only valid between function arguments")]
    MisplacedArgSep,
    #[error("Right paren without a matching left paren")]
    UnmatchedRParen,

    // Parse errors
    #[error("Expected {expected}{}", fmt_got(.got))]
    Expected {
        expected: Cow<'static, str>,
        got: Option<Cow<'static, str>>,
    },
    #[error("Unexpected {0}")]
    Unexpected(Cow<'static, str>),
    #[error("Bad cell reference")]
    BadCellReference,
    #[error("Bad numeric literal")]
    BadNumber,
    #[error("Formula is nested too deeply")]
    TooDeep,
}
impl RunErrorMsg {
    /// Attaches a span to this error message, returning a RunError.
    pub fn with_span(self, span: Span) -> RunError {
        RunError {
            span: Some(span),
            msg: self,
        }
    }
    /// Returns a RunError from this error message, without a span.
    pub const fn without_span(self) -> RunError {
        RunError {
            span: None,
            msg: self,
        }
    }
}
impl From<RunErrorMsg> for RunError {
    fn from(msg: RunErrorMsg) -> Self {
        msg.without_span()
    }
}

fn fmt_got(got: &Option<Cow<'static, str>>) -> String {
    match got {
        Some(got) => format!(", got {got}"),
        None => String::new(),
    }
}

/// Code carried by a runtime error value, mirroring the canonical spreadsheet
/// surface forms.
#[derive(Serialize, Deserialize, Debug, Display, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Placeholder for the absence of a more specific error.
    #[strum(to_string = "#NULL!")]
    None,
    #[strum(to_string = "#VALUE!")]
    Value,
    #[strum(to_string = "#DIV/0!")]
    Div0,
    #[strum(to_string = "#REF!")]
    Ref,
    #[strum(to_string = "#NAME?")]
    Name,
    #[strum(to_string = "#NUM!")]
    Num,
    #[strum(to_string = "#CYCLE!")]
    Cycle,
    #[strum(to_string = "#N/A")]
    NA,
}
