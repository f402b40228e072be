//! String functions for formulas.

use super::super::params::ParamKind;
use super::*;

pub const CATEGORY: FormulaFunctionCategory = FormulaFunctionCategory {
    name: "String functions",
    docs: "",
    get_functions,
};

fn get_functions() -> Vec<FormulaFunction> {
    vec![
        FormulaFunction {
            name: "LEN",
            doc: "Returns the length of a text value in Unicode code points. \
                  A blank cell has length 0.",
            params: vec![Param::new("text", &[ParamKind::Text])],
            variadic: false,
            return_type: BaseType::Number,
            eval: |_ctx, args| match args {
                [Value::Text(s)] => Value::Number(s.chars().count() as f64),
                [Value::Blank] => Value::Number(0.0),
                [Value::Error(e)] => Value::Error(*e),
                _ => Value::Error(ErrorCode::Value),
            },
        },
        FormulaFunction {
            name: "CONCATENATE",
            doc: "Textualizes each argument and joins the results. Numbers use \
                  the canonical shortest form, booleans become TRUE/FALSE, \
                  and blanks become the empty string.",
            params: vec![Param::new("values", &[ParamKind::AnyScalar])],
            variadic: true,
            return_type: BaseType::String,
            eval: |_ctx, args| {
                let mut out = String::new();
                for arg in args {
                    match arg {
                        Value::Error(e) => return Value::Error(*e),
                        Value::Range(_) => return Value::Error(ErrorCode::Value),
                        value => out.push_str(&value.to_string()),
                    }
                }
                Value::Text(out)
            },
        },
    ]
}
