//! Abstract syntax tree of a formula expression, its pretty-printer, and the
//! evaluator.
//!
//! Every node can be evaluated in one of two modes. *Scalar* dereferences
//! cell references against the store and rejects ranges; *ref-like* keeps
//! cell and range references as [`RangeRef`] values (a single cell becomes a
//! degenerate 1x1 range). The `:` operator evaluates its operands ref-like;
//! function arguments are ref-like exactly when their parameter accepts a
//! reference; everything else is scalar.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::cell_ref::{RangeRef, Reference};
use super::ctx::Ctx;
use super::errors::ErrorCode;
use super::functions;
use super::params::matches_param;
use super::values::{BaseType, Value};
use crate::Span;

/// Binding power of the postfix `%` operator.
pub(super) const POSTFIX_BINDING_POWER: u8 = 100;
/// Binding power of the prefix `+` and `-` operators.
pub(super) const PREFIX_BINDING_POWER: u8 = 80;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AstNode {
    pub span: Span,
    pub contents: AstNodeContents,
    /// Coarse static type, written once by [`super::infer_types`].
    /// `BaseType::Unknown` until then.
    pub inferred_type: BaseType,
}
impl AstNode {
    pub fn new(span: Span, contents: AstNodeContents) -> Self {
        Self {
            span,
            contents,
            inferred_type: BaseType::Unknown,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum AstNodeContents {
    Literal(Literal),
    Reference(Reference),
    Unary {
        op: UnaryOp,
        operand: Box<AstNode>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<AstNode>,
        rhs: Box<AstNode>,
    },
    FunctionCall {
        name: String,
        /// Span of the name alone, for host diagnostics; the node's span
        /// covers the whole call.
        name_span: Span,
        args: Vec<AstNode>,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    /// Postfix; divides by 100.
    Percent,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Lt,
    Gt,
    Eq,
    Neq,
    Lte,
    Gte,
    Range,
    Concat,
}
impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Eq => "=",
            BinaryOp::Neq => "<>",
            BinaryOp::Lte => "<=",
            BinaryOp::Gte => ">=",
            BinaryOp::Range => ":",
            BinaryOp::Concat => "&",
        }
    }

    /// Left binding power; higher binds tighter.
    pub(super) fn binding_power(self) -> u8 {
        match self {
            BinaryOp::Pow => 90,
            BinaryOp::Mul | BinaryOp::Div => 70,
            BinaryOp::Add | BinaryOp::Sub => 60,
            BinaryOp::Concat => 50,
            BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::Eq
            | BinaryOp::Neq
            | BinaryOp::Lte
            | BinaryOp::Gte => 40,
            BinaryOp::Range => 30,
        }
    }

    pub(super) fn is_right_associative(self) -> bool {
        self == BinaryOp::Pow
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_at_binding_power(f, 0)
    }
}
impl AstNode {
    /// Binding power of this node's outermost operator, or `u8::MAX` for
    /// atoms.
    fn binding_power(&self) -> u8 {
        match &self.contents {
            AstNodeContents::Unary {
                op: UnaryOp::Percent,
                ..
            } => POSTFIX_BINDING_POWER,
            AstNodeContents::Unary { .. } => PREFIX_BINDING_POWER,
            AstNodeContents::Binary { op, .. } => op.binding_power(),
            _ => u8::MAX,
        }
    }

    /// Writes the canonical text of this node, parenthesizing it if its
    /// binding power is below `min_bp`. Reparsing the output of the
    /// root-level printer yields a structurally equal tree.
    fn fmt_at_binding_power(&self, f: &mut fmt::Formatter<'_>, min_bp: u8) -> fmt::Result {
        let parens = self.binding_power() < min_bp;
        if parens {
            write!(f, "(")?;
        }
        match &self.contents {
            AstNodeContents::Literal(Literal::Number(n)) => write!(f, "{n:?}")?,
            AstNodeContents::Literal(Literal::String(s)) => {
                write!(f, "\"{}\"", s.replace('"', "\"\""))?
            }
            AstNodeContents::Reference(reference) => write!(f, "{reference}")?,
            AstNodeContents::Unary {
                op: UnaryOp::Percent,
                operand,
            } => {
                // `%` only lexes directly after a number, cell reference,
                // or `)`.
                let bare = matches!(
                    &operand.contents,
                    AstNodeContents::Literal(Literal::Number(_))
                        | AstNodeContents::Reference(_)
                        | AstNodeContents::FunctionCall { .. }
                );
                if bare {
                    operand.fmt_at_binding_power(f, POSTFIX_BINDING_POWER)?;
                } else {
                    write!(f, "(")?;
                    operand.fmt_at_binding_power(f, 0)?;
                    write!(f, ")")?;
                }
                write!(f, "%")?;
            }
            AstNodeContents::Unary { op, operand } => {
                write!(f, "{}", if *op == UnaryOp::Plus { "+" } else { "-" })?;
                operand.fmt_at_binding_power(f, PREFIX_BINDING_POWER)?;
            }
            AstNodeContents::Binary {
                op: BinaryOp::Range,
                lhs,
                rhs,
            } => {
                let bp = BinaryOp::Range.binding_power();
                fmt_range_operand(f, lhs, bp)?;
                write!(f, ":")?;
                fmt_range_operand(f, rhs, bp + 1)?;
            }
            AstNodeContents::Binary { op, lhs, rhs } => {
                let bp = op.binding_power();
                let (lhs_bp, rhs_bp) = if op.is_right_associative() {
                    (bp + 1, bp)
                } else {
                    (bp, bp + 1)
                };
                lhs.fmt_at_binding_power(f, lhs_bp)?;
                write!(f, "{}", op.symbol())?;
                rhs.fmt_at_binding_power(f, rhs_bp)?;
            }
            AstNodeContents::FunctionCall { name, args, .. } => {
                write!(f, "{}({})", name, args.iter().join(", "))?;
            }
        }
        if parens {
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Writes one operand of the `:` operator. `:` does not lex after a bare
/// numeric literal, so anything other than a reference, a call, or a chained
/// range is parenthesized regardless of binding power.
fn fmt_range_operand(f: &mut fmt::Formatter<'_>, operand: &AstNode, min_bp: u8) -> fmt::Result {
    let bare = matches!(
        &operand.contents,
        AstNodeContents::Reference(_)
            | AstNodeContents::FunctionCall { .. }
            | AstNodeContents::Binary {
                op: BinaryOp::Range,
                ..
            }
    );
    if bare {
        operand.fmt_at_binding_power(f, min_bp)
    } else {
        write!(f, "(")?;
        operand.fmt_at_binding_power(f, 0)?;
        write!(f, ")")
    }
}

impl AstNode {
    /// Evaluates this node in scalar mode against a read-only cell store.
    pub fn eval(&self, ctx: &mut Ctx<'_>) -> Value {
        self.eval_scalar(ctx)
    }

    pub(super) fn eval_scalar(&self, ctx: &mut Ctx<'_>) -> Value {
        if self.inferred_type == BaseType::Error {
            return self.static_error_value();
        }
        if !ctx.enter() {
            return Value::Error(ErrorCode::Value);
        }
        let ret = match &self.contents {
            AstNodeContents::Literal(Literal::Number(n)) => Value::Number(*n),
            AstNodeContents::Literal(Literal::String(s)) => Value::Text(s.clone()),
            AstNodeContents::Reference(Reference::Cell(cell)) => ctx.get_cell(*cell),
            AstNodeContents::Reference(Reference::Range(_)) => Value::Error(ErrorCode::Value),
            AstNodeContents::Unary { op, operand } => {
                eval_unary_op(*op, operand.eval_scalar(ctx))
            }
            AstNodeContents::Binary {
                op: BinaryOp::Range,
                ..
            } => {
                // A range used where a scalar is needed collapses to its
                // single cell's value, and only if it is 1x1.
                match self.eval_ref_like(ctx) {
                    Value::Range(range) => match range.single_cell() {
                        Some(cell) => ctx.get_cell(cell),
                        None => Value::Error(ErrorCode::Value),
                    },
                    other => other,
                }
            }
            AstNodeContents::Binary { op, lhs, rhs } => {
                eval_binary_op(*op, lhs.eval_scalar(ctx), rhs.eval_scalar(ctx))
            }
            AstNodeContents::FunctionCall { name, args, .. } => {
                eval_function_call(ctx, name, args)
            }
        };
        ctx.exit();
        ret
    }

    pub(super) fn eval_ref_like(&self, ctx: &mut Ctx<'_>) -> Value {
        if self.inferred_type == BaseType::Error {
            return self.static_error_value();
        }
        match &self.contents {
            AstNodeContents::Reference(Reference::Cell(cell)) => {
                Value::Range(RangeRef::from(*cell))
            }
            AstNodeContents::Reference(Reference::Range(range)) => Value::Range(*range),
            AstNodeContents::Binary {
                op: BinaryOp::Range,
                lhs,
                rhs,
            } => {
                if !ctx.enter() {
                    return Value::Error(ErrorCode::Value);
                }
                let ret = match (lhs.eval_ref_like(ctx), rhs.eval_ref_like(ctx)) {
                    (Value::Error(e), _) | (_, Value::Error(e)) => Value::Error(e),
                    (Value::Range(a), Value::Range(b)) => Value::Range(a.bounding_box(b)),
                    _ => Value::Error(ErrorCode::Ref),
                };
                ctx.exit();
                ret
            }
            _ => self.eval_scalar(ctx),
        }
    }

    /// The value of an `Error`-typed node: `#VALUE!`, except that a call to
    /// an unknown function surfaces as `#NAME?`.
    fn static_error_value(&self) -> Value {
        if let AstNodeContents::FunctionCall { name, .. } = &self.contents {
            if functions::lookup_function(name).is_none() {
                return Value::Error(ErrorCode::Name);
            }
        }
        Value::Error(ErrorCode::Value)
    }
}

fn eval_unary_op(op: UnaryOp, operand: Value) -> Value {
    if let Value::Error(e) = operand {
        return Value::Error(e);
    }
    let Some(n) = operand.coerce_number() else {
        return Value::Error(ErrorCode::Value);
    };
    match op {
        UnaryOp::Plus => Value::Number(n),
        UnaryOp::Minus => Value::Number(-n),
        UnaryOp::Percent => Value::Number(n / 100.0),
    }
}

fn eval_binary_op(op: BinaryOp, lhs: Value, rhs: Value) -> Value {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Pow => {
            eval_arithmetic(op, lhs, rhs)
        }
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Lte | BinaryOp::Gte => {
            eval_ordered_comparison(op, lhs, rhs)
        }
        BinaryOp::Eq | BinaryOp::Neq => eval_equality(op, lhs, rhs),
        BinaryOp::Concat => eval_concat(lhs, rhs),
        // `:` is handled by the dispatcher; reaching it here means a range in
        // a scalar-only position.
        BinaryOp::Range => Value::Error(ErrorCode::Ref),
    }
}

fn eval_arithmetic(op: BinaryOp, lhs: Value, rhs: Value) -> Value {
    if let Value::Error(e) = lhs {
        return Value::Error(e);
    }
    if let Value::Error(e) = rhs {
        return Value::Error(e);
    }
    let (Some(a), Some(b)) = (lhs.coerce_number(), rhs.coerce_number()) else {
        return Value::Error(ErrorCode::Value);
    };
    let n = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Value::Error(ErrorCode::Div0);
            }
            a / b
        }
        BinaryOp::Pow => {
            if a == 0.0 && b == 0.0 {
                return Value::Error(ErrorCode::Num);
            }
            if a < 0.0 && b.fract() != 0.0 {
                return Value::Error(ErrorCode::Num);
            }
            a.powf(b)
        }
        _ => return Value::Error(ErrorCode::Value),
    };
    if n.is_finite() {
        Value::Number(n)
    } else {
        Value::Error(ErrorCode::Num)
    }
}

fn eval_ordered_comparison(op: BinaryOp, lhs: Value, rhs: Value) -> Value {
    if let Value::Error(e) = lhs {
        return Value::Error(e);
    }
    if let Value::Error(e) = rhs {
        return Value::Error(e);
    }
    let (Some(a), Some(b)) = (lhs.coerce_number(), rhs.coerce_number()) else {
        return Value::Error(ErrorCode::Value);
    };
    Value::Bool(match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Gt => a > b,
        BinaryOp::Lte => a <= b,
        BinaryOp::Gte => a >= b,
        _ => return Value::Error(ErrorCode::Value),
    })
}

/// Strict same-kind equality: values of different kinds are simply unequal.
/// `Blank` equals only `Blank`, never empty text or zero.
fn eval_equality(op: BinaryOp, lhs: Value, rhs: Value) -> Value {
    if let Value::Error(e) = lhs {
        return Value::Error(e);
    }
    if let Value::Error(e) = rhs {
        return Value::Error(e);
    }
    let eq = match (&lhs, &rhs) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Text(a), Value::Text(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Blank, Value::Blank) => true,
        _ => false,
    };
    Value::Bool(if op == BinaryOp::Neq { !eq } else { eq })
}

fn eval_concat(lhs: Value, rhs: Value) -> Value {
    if let Value::Error(e) = lhs {
        return Value::Error(e);
    }
    if let Value::Error(e) = rhs {
        return Value::Error(e);
    }
    if matches!(lhs, Value::Range(_)) || matches!(rhs, Value::Range(_)) {
        return Value::Error(ErrorCode::Value);
    }
    Value::Text(format!("{lhs}{rhs}"))
}

fn eval_function_call(ctx: &mut Ctx<'_>, name: &str, args: &[AstNode]) -> Value {
    let Some(func) = functions::lookup_function(name) else {
        return Value::Error(ErrorCode::Name);
    };
    if !func.matches_arity(args.len()) {
        return Value::Error(ErrorCode::Value);
    }

    let mut arg_values = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        let ref_like = func.param_for_arg(i).is_some_and(|p| p.accepts_reference());
        arg_values.push(if ref_like {
            arg.eval_ref_like(ctx)
        } else {
            arg.eval_scalar(ctx)
        });
    }

    // Re-validate kinds at runtime with the same predicate the inferencer
    // uses. Error values pass through: each function decides whether to
    // propagate or absorb them (`IF` discards the unselected branch).
    for (i, value) in arg_values.iter().enumerate() {
        let Some(param) = func.param_for_arg(i) else {
            continue;
        };
        let ty = value.base_type();
        if ty != BaseType::Error && !matches_param(param, ty) {
            return Value::Error(ErrorCode::Value);
        }
    }

    (func.eval)(ctx, &arg_values)
}
