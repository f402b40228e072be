//! Mathematics functions for formulas.

use super::super::params::ParamKind;
use super::*;

pub const CATEGORY: FormulaFunctionCategory = FormulaFunctionCategory {
    name: "Mathematics functions",
    docs: "Numeric aggregates accept numbers, cell references, and ranges. \
           Cells inside a range that do not contain numbers are ignored.",
    get_functions,
};

/// Kinds accepted by the numeric aggregates' tail parameter.
const SUMMABLE: &[ParamKind] = &[ParamKind::Number, ParamKind::Ref, ParamKind::Range];

fn get_functions() -> Vec<FormulaFunction> {
    vec![
        FormulaFunction {
            name: "SUM",
            doc: "Adds all numbers in its arguments. Returns 0 if given no numbers.",
            params: vec![Param::new("numbers", SUMMABLE)],
            variadic: true,
            return_type: BaseType::Number,
            eval: |ctx, args| match flat_collect_numbers(ctx, args) {
                Ok(numbers) => Value::Number(numbers.iter().sum()),
                Err(e) => Value::Error(e),
            },
        },
        FormulaFunction {
            name: "MIN",
            doc: "Returns the smallest number among its arguments, \
                  or 0 if given no numbers.",
            params: vec![Param::new("numbers", SUMMABLE)],
            variadic: true,
            return_type: BaseType::Number,
            eval: |ctx, args| match flat_collect_numbers(ctx, args) {
                Ok(numbers) if numbers.is_empty() => Value::Number(0.0),
                Ok(numbers) => {
                    Value::Number(numbers.iter().copied().fold(f64::INFINITY, f64::min))
                }
                Err(e) => Value::Error(e),
            },
        },
        FormulaFunction {
            name: "MAX",
            doc: "Returns the largest number among its arguments, \
                  or 0 if given no numbers.",
            params: vec![Param::new("numbers", SUMMABLE)],
            variadic: true,
            return_type: BaseType::Number,
            eval: |ctx, args| match flat_collect_numbers(ctx, args) {
                Ok(numbers) if numbers.is_empty() => Value::Number(0.0),
                Ok(numbers) => {
                    Value::Number(numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max))
                }
                Err(e) => Value::Error(e),
            },
        },
        FormulaFunction {
            name: "AVERAGE",
            doc: "Returns the arithmetic mean of the numbers among its \
                  arguments. Returns #DIV/0! if given no numbers.",
            params: vec![Param::new("numbers", SUMMABLE)],
            variadic: true,
            return_type: BaseType::Number,
            eval: |ctx, args| match flat_collect_numbers(ctx, args) {
                Ok(numbers) if numbers.is_empty() => Value::Error(ErrorCode::Div0),
                Ok(numbers) => {
                    Value::Number(numbers.iter().sum::<f64>() / numbers.len() as f64)
                }
                Err(e) => Value::Error(e),
            },
        },
        FormulaFunction {
            name: "COUNT",
            doc: "Returns the number of numeric values among its arguments.",
            params: vec![Param::new("numbers", SUMMABLE)],
            variadic: true,
            return_type: BaseType::Number,
            eval: |ctx, args| match flat_collect_numbers(ctx, args) {
                Ok(numbers) => Value::Number(numbers.len() as f64),
                Err(e) => Value::Error(e),
            },
        },
        FormulaFunction {
            name: "ABS",
            doc: "Returns the absolute value of a number.",
            params: vec![Param::new("number", &[ParamKind::Number])],
            variadic: false,
            return_type: BaseType::Number,
            eval: |_ctx, args| match args {
                [Value::Number(n)] => Value::Number(n.abs()),
                [Value::Blank] => Value::Number(0.0),
                [Value::Error(e)] => Value::Error(*e),
                _ => Value::Error(ErrorCode::Value),
            },
        },
    ]
}
