//! Function parameter descriptions and the kind-matching predicate shared by
//! the type inferencer and the evaluator, so the two passes always agree.

use super::values::BaseType;

/// One acceptable argument kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Number,
    Text,
    Bool,
    AnyScalar,
    Ref,
    Range,
}
impl ParamKind {
    fn is_scalar(self) -> bool {
        matches!(
            self,
            ParamKind::Number | ParamKind::Text | ParamKind::Bool | ParamKind::AnyScalar,
        )
    }
}

/// Formula function parameter description: a name (for diagnostics and docs)
/// and the set of kinds it accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: &'static str,
    pub kinds: &'static [ParamKind],
}
impl Param {
    pub const fn new(name: &'static str, kinds: &'static [ParamKind]) -> Self {
        Self { name, kinds }
    }

    /// Returns whether arguments for this parameter should be evaluated in
    /// reference-preserving mode.
    pub fn accepts_reference(&self) -> bool {
        self.kinds
            .iter()
            .any(|&k| matches!(k, ParamKind::Ref | ParamKind::Range))
    }
}

/// Returns whether a single kind accepts a type, with no implicit
/// conversions.
pub fn kind_matches(kind: ParamKind, ty: BaseType) -> bool {
    match kind {
        ParamKind::Number => ty == BaseType::Number,
        ParamKind::Text => ty == BaseType::String,
        ParamKind::Bool => ty == BaseType::Bool,
        ParamKind::AnyScalar => {
            matches!(ty, BaseType::Number | BaseType::String | BaseType::Bool)
        }
        ParamKind::Ref => ty == BaseType::CellRef,
        ParamKind::Range => ty == BaseType::Range,
    }
}

/// Returns whether a parameter accepts an argument of the given type.
///
/// `Unknown` always matches (defer to runtime). A `CellRef` additionally
/// matches any scalar kind: the evaluator dereferences it. A `Blank` (which
/// only exists at runtime, as the contents of an empty cell) matches any
/// scalar kind; coercion is up to the function.
pub fn matches_param(param: &Param, ty: BaseType) -> bool {
    match ty {
        BaseType::Unknown => true,
        BaseType::CellRef => param
            .kinds
            .iter()
            .any(|&k| k == ParamKind::Ref || k.is_scalar()),
        BaseType::Blank => param.kinds.iter().any(|&k| k.is_scalar()),
        _ => param.kinds.iter().any(|&k| kind_matches(k, ty)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_param() {
        let number_only = Param::new("n", &[ParamKind::Number]);
        let text_only = Param::new("t", &[ParamKind::Text]);
        let summable = Param::new("v", &[ParamKind::Number, ParamKind::Ref, ParamKind::Range]);

        assert!(matches_param(&number_only, BaseType::Number));
        assert!(matches_param(&number_only, BaseType::Unknown));
        assert!(matches_param(&number_only, BaseType::CellRef)); // implicit deref
        assert!(matches_param(&number_only, BaseType::Blank));
        assert!(!matches_param(&number_only, BaseType::String));
        assert!(!matches_param(&number_only, BaseType::Range));
        assert!(!matches_param(&number_only, BaseType::Error));

        assert!(matches_param(&text_only, BaseType::String));
        assert!(!matches_param(&text_only, BaseType::Number));

        assert!(matches_param(&summable, BaseType::Range));
        assert!(matches_param(&summable, BaseType::CellRef));
        assert!(!matches_param(&summable, BaseType::String));
        assert!(summable.accepts_reference());
        assert!(!number_only.accepts_reference());
    }
}
