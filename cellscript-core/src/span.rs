//! Byte-offset source locations for tokens, AST nodes, and diagnostics.

use serde::{Deserialize, Serialize};

/// A half-open `start..end` byte range within a formula's source text.
///
/// Tokens and AST nodes carry one of these instead of owning their lexeme;
/// the text is recovered with [`Span::slice`] when a diagnostic or literal
/// needs it. Formulas are short, so offsets are `u32`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}
impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// A zero-width span, for positions with no text such as end-of-formula.
    pub fn at(idx: u32) -> Self {
        Self {
            start: idx,
            end: idx,
        }
    }

    /// The smallest span covering both operands; an operator node gets the
    /// extent of its whole subexpression this way.
    pub fn union(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The source text this span matched. The lexer only produces offsets on
    /// character boundaries of the formula it scanned, so the slice cannot
    /// split a UTF-8 sequence.
    pub fn slice(self, source: &str) -> &str {
        &source[self.start as usize..self.end as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_union_and_slice() {
        let a = Span::new(2, 5);
        let b = Span::new(4, 9);
        assert_eq!(a.union(b), Span::new(2, 9));
        assert_eq!(b.union(a), Span::new(2, 9));
        assert_eq!(a.union(a), a);
        assert_eq!(Span::at(3), Span::new(3, 3));
        assert_eq!(Span::new(1, 3).slice("A1+10"), "1+");
        assert_eq!(Span::at(5).slice("A1+10"), "");
    }
}
