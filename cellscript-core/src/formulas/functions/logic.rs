//! Logic functions for formulas.

use super::super::params::ParamKind;
use super::*;

pub const CATEGORY: FormulaFunctionCategory = FormulaFunctionCategory {
    name: "Logic functions",
    docs: "Conditions must be booleans; a blank cell counts as FALSE. \
           There are no boolean literals in the formula language, so `TRUE()` \
           and `FALSE()` are functions.",
    get_functions,
};

fn get_functions() -> Vec<FormulaFunction> {
    vec![
        FormulaFunction {
            name: "TRUE",
            doc: "Returns TRUE.",
            params: vec![],
            variadic: false,
            return_type: BaseType::Bool,
            eval: |_ctx, _args| Value::Bool(true),
        },
        FormulaFunction {
            name: "FALSE",
            doc: "Returns FALSE.",
            params: vec![],
            variadic: false,
            return_type: BaseType::Bool,
            eval: |_ctx, _args| Value::Bool(false),
        },
        FormulaFunction {
            name: "NOT",
            doc: "Returns TRUE if its argument is FALSE and FALSE if it is TRUE.",
            params: vec![Param::new("a", &[ParamKind::Bool])],
            variadic: false,
            return_type: BaseType::Bool,
            eval: |_ctx, args| match args.first().map(coerce_bool) {
                Some(Ok(b)) => Value::Bool(!b),
                Some(Err(e)) => Value::Error(e),
                None => Value::Error(ErrorCode::Value),
            },
        },
        FormulaFunction {
            name: "AND",
            doc: "Returns TRUE if all values are TRUE. Returns TRUE if given \
                  no values.",
            params: vec![Param::new("booleans", &[ParamKind::Bool])],
            variadic: true,
            return_type: BaseType::Bool,
            eval: |_ctx, args| fold_bools(args, true, |acc, b| acc & b),
        },
        FormulaFunction {
            name: "OR",
            doc: "Returns TRUE if any value is TRUE. Returns FALSE if given \
                  no values.",
            params: vec![Param::new("booleans", &[ParamKind::Bool])],
            variadic: true,
            return_type: BaseType::Bool,
            eval: |_ctx, args| fold_bools(args, false, |acc, b| acc | b),
        },
        FormulaFunction {
            name: "IF",
            doc: "Returns the second argument if the condition is TRUE and \
                  the third if it is FALSE. Both branches are evaluated, but \
                  only the selected branch's error (if any) surfaces.",
            params: vec![
                Param::new("condition", &[ParamKind::Bool]),
                Param::new("if_true", &[ParamKind::AnyScalar]),
                Param::new("if_false", &[ParamKind::AnyScalar]),
            ],
            variadic: false,
            return_type: BaseType::Unknown,
            eval: |_ctx, args| match args {
                [condition, if_true, if_false] => match condition {
                    Value::Bool(true) => if_true.clone(),
                    Value::Bool(false) => if_false.clone(),
                    Value::Error(e) => Value::Error(*e),
                    _ => Value::Error(ErrorCode::Value),
                },
                _ => Value::Error(ErrorCode::Value),
            },
        },
    ]
}

fn fold_bools(args: &[Value], init: bool, f: fn(bool, bool) -> bool) -> Value {
    let mut acc = init;
    for arg in args {
        match coerce_bool(arg) {
            Ok(b) => acc = f(acc, b),
            Err(e) => return Value::Error(e),
        }
    }
    Value::Bool(acc)
}
