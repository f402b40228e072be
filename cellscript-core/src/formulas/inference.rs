//! Bottom-up static type annotation.
//!
//! Every node gets a [`BaseType`]; ill-typed subtrees become
//! `BaseType::Error` and taint their ancestors (strict propagation, including
//! across equality operators). Inference never fails: the evaluator
//! short-circuits `Error`-typed subtrees instead.

use super::ast::{AstNode, AstNodeContents, BinaryOp, Literal};
use super::cell_ref::Reference;
use super::functions;
use super::params::matches_param;
use super::values::BaseType;

/// Annotates every node of the tree in place and returns the root's type.
pub fn infer_types(node: &mut AstNode) -> BaseType {
    let inferred = match &mut node.contents {
        AstNodeContents::Literal(Literal::Number(_)) => BaseType::Number,
        AstNodeContents::Literal(Literal::String(_)) => BaseType::String,
        AstNodeContents::Reference(Reference::Cell(_)) => BaseType::CellRef,
        AstNodeContents::Reference(Reference::Range(_)) => BaseType::Range,
        AstNodeContents::Unary { operand, .. } => {
            // `+`, `-`, and `%` all demand a numeric-compatible operand.
            if is_numeric_operand(infer_types(operand)) {
                BaseType::Number
            } else {
                BaseType::Error
            }
        }
        AstNodeContents::Binary { op, lhs, rhs } => {
            let op = *op;
            let lhs = infer_types(lhs);
            let rhs = infer_types(rhs);
            infer_binary(op, lhs, rhs)
        }
        AstNodeContents::FunctionCall { name, args, .. } => {
            let arg_types: Vec<BaseType> = args.iter_mut().map(|arg| infer_types(arg)).collect();
            infer_call(name, &arg_types)
        }
    };
    node.inferred_type = inferred;
    inferred
}

/// Types that arithmetic, ordered comparison, and the unary operators accept.
fn is_numeric_operand(ty: BaseType) -> bool {
    matches!(ty, BaseType::CellRef | BaseType::Number | BaseType::Unknown)
}

/// Types the `:` operator accepts: the parser only wires cell references
/// through, so a `Range` operand (union of ranges) is ill-typed.
fn is_range_operand(ty: BaseType) -> bool {
    matches!(ty, BaseType::CellRef | BaseType::Unknown)
}

fn infer_binary(op: BinaryOp, lhs: BaseType, rhs: BaseType) -> BaseType {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Pow => {
            if is_numeric_operand(lhs) && is_numeric_operand(rhs) {
                BaseType::Number
            } else {
                BaseType::Error
            }
        }
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Lte | BinaryOp::Gte => {
            if is_numeric_operand(lhs) && is_numeric_operand(rhs) {
                BaseType::Bool
            } else {
                BaseType::Error
            }
        }
        BinaryOp::Eq | BinaryOp::Neq => {
            // Equality tolerates any kind mismatch (it reduces to an unequal
            // result at runtime) but not an ill-typed operand.
            if lhs != BaseType::Error && rhs != BaseType::Error {
                BaseType::Bool
            } else {
                BaseType::Error
            }
        }
        BinaryOp::Concat => {
            let ok = |ty| ty != BaseType::Error && ty != BaseType::Range;
            if ok(lhs) && ok(rhs) {
                BaseType::String
            } else {
                BaseType::Error
            }
        }
        BinaryOp::Range => {
            if is_range_operand(lhs) && is_range_operand(rhs) {
                BaseType::Range
            } else {
                BaseType::Error
            }
        }
    }
}

fn infer_call(name: &str, arg_types: &[BaseType]) -> BaseType {
    let Some(func) = functions::lookup_function(name) else {
        return BaseType::Error;
    };
    if !func.matches_arity(arg_types.len()) {
        return BaseType::Error;
    }
    for (i, &ty) in arg_types.iter().enumerate() {
        match func.param_for_arg(i) {
            Some(param) if matches_param(param, ty) => (),
            _ => return BaseType::Error,
        }
    }
    func.return_type
}
