//! Functions for lossless tokenization.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use strum_macros::Display;

use super::errors::{CodeResult, RunErrorMsg};
use crate::Span;

fn new_fullmatch_regex(s: &str) -> Regex {
    Regex::new(&("^(".to_owned() + s + ")")).unwrap()
}

/// Double-quoted string literal. Two consecutive `""` inside denote an
/// escaped quote.
const STRING_LITERAL_PATTERN: &str = r#""([^"]|"")*""#;
/// Unterminated string literal.
const UNTERMINATED_STRING_LITERAL_PATTERN: &str = r#"""#;

/// Floating-point or integer number, without leading sign.
///
/// ```ignored
/// \d+\.(\d+([eE]-?\d+)?)?|\.\d+([eE]-?\d+)?|\d+([eE]-?\d+)?
/// \d+\.                                                        EITHER digits and a decimal point
///       (\d+          )?                                         optionally followed by more digits
///           ([eE]-?\d+)?                                           and an exponent
///                         \.\d+                                OR a decimal part only
///                              ([eE]-?\d+)?                      with an optional exponent
///                                           \d+                OR an integer part only
///                                              ([eE]-?\d+)?      with an optional exponent
/// ```
///
/// The trailing-dot branch comes first and carries no exponent of its own, so
/// that `5.` lexes as one number while `5.e3` stops after the dot (a decimal
/// point may not directly precede the exponent). Exponent signs are limited
/// to `-`. Any other malformed continuation is rejected by the follow-set
/// check.
const NUMERIC_LITERAL_PATTERN: &str = r"\d+\.(\d+([eE]-?\d+)?)?|\.\d+([eE]-?\d+)?|\d+([eE]-?\d+)?";

/// A1-style cell reference: letters followed by digits.
const CELL_REFERENCE_PATTERN: &str = r"[A-Za-z]+\d+";
/// Function name: letters not followed by a digit (else the cell reference
/// pattern, which comes first, wins).
const IDENT_PATTERN: &str = r"[A-Za-z]+";

lazy_static! {
    /// List of token patterns, arranged roughly from least to most general.
    static ref TOKEN_PATTERNS: &'static [&'static str] = vec![
        // String literal.
        STRING_LITERAL_PATTERN,
        UNTERMINATED_STRING_LITERAL_PATTERN,
        // Numeric literal.
        NUMERIC_LITERAL_PATTERN,
        // Reference to a cell.
        CELL_REFERENCE_PATTERN,
        // Function name.
        IDENT_PATTERN,
        // Comparison operators `<=`, `>=` and `<>`.
        r"<=|>=|<>",
        // Whitespace.
        r"\s+",
        // Any other single character.
        r"[\s\S]",
    ]
    .leak();

    /// Single regex that matches any token, by joining each member of
    /// `TOKEN_PATTERNS` with "|".
    static ref TOKEN_REGEX: Regex =
        RegexBuilder::new(&TOKEN_PATTERNS.join("|")).build().unwrap();

    /// Regex that matches a valid string literal.
    static ref STRING_LITERAL_REGEX: Regex = new_fullmatch_regex(STRING_LITERAL_PATTERN);

    /// Regex that matches all valid numeric literals.
    static ref NUMERIC_LITERAL_REGEX: Regex = new_fullmatch_regex(NUMERIC_LITERAL_PATTERN);

    /// Regex that matches a valid A1-style cell reference.
    static ref CELL_REFERENCE_REGEX: Regex = new_fullmatch_regex(CELL_REFERENCE_PATTERN);

    /// Regex that matches a valid function name.
    static ref IDENT_REGEX: Regex = new_fullmatch_regex(IDENT_PATTERN);
}

/// Characters that may directly follow each operand-producing token.
/// Whitespace is deliberately absent: a space directly after a number,
/// reference, or function name is an error.
mod follow_sets {
    pub const VALID_AFTER_NUMBER: &str = ",)+-/*^%&<>=";
    pub const VALID_AFTER_REFERENCE: &str = ",:)+-/*^><=%&";
    pub const VALID_AFTER_IDENT: &str = ",()+-/*^:";
}

/// One lexed token: its kind and where it sits in the source. The lexeme is
/// not stored; [`Token::lexeme`] recovers it from the source text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
impl Token {
    /// The matched source text.
    pub fn lexeme<'a>(&self, source: &'a str) -> &'a str {
        self.span.slice(source)
    }
}

#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Grouping
    #[strum(to_string = "left paren")]
    LParen,
    #[strum(to_string = "right paren")]
    RParen,

    // Separator
    #[strum(to_string = "argument separator (comma)")]
    ArgSep,

    // Comparison operators
    #[strum(to_string = "equals comparison")]
    Eql,
    #[strum(to_string = "not-equals comparison")]
    Neq,
    #[strum(to_string = "less-than comparison")]
    Lt,
    #[strum(to_string = "greater-than comparison")]
    Gt,
    #[strum(to_string = "less-than-or-equal comparison")]
    Lte,
    #[strum(to_string = "greater-than-or-equal comparison")]
    Gte,

    // Mathematical operators. `Plus` and `Minus` are emitted unqualified; the
    // parser reinterprets them as prefix or infix by position.
    #[strum(to_string = "plus operator")]
    Plus,
    #[strum(to_string = "minus operator")]
    Minus,
    #[strum(to_string = "multiplication operator")]
    Mult,
    #[strum(to_string = "division operator")]
    Div,
    #[strum(to_string = "exponentiation operator")]
    Power, // ^

    // Other operators
    #[strum(to_string = "concatenation operator")]
    Concat, // &
    #[strum(to_string = "percent operator")]
    Percent, // %
    #[strum(to_string = "cell range operator")]
    CellRangeOp, // :

    // Other tokens
    #[strum(to_string = "string literal")]
    StringLiteral,
    #[strum(to_string = "unterminated string literal")]
    UnterminatedStringLiteral,
    #[strum(to_string = "numeric literal")]
    NumericLiteral,
    #[strum(to_string = "cell reference")]
    CellRef,
    #[strum(to_string = "function name")]
    FunctionName,
    #[strum(to_string = "whitespace")]
    Whitespace,
    #[strum(to_string = "unknown symbol")]
    Unknown,
    #[strum(to_string = "end of formula")]
    Eof,
}
impl TokenKind {
    /// Consumes a token from a given starting index and returns the index of
    /// the next character after the token.
    fn consume_from_input(input_str: &str, start: usize) -> Option<(Self, usize)> {
        let m = TOKEN_REGEX.find_at(input_str, start)?;

        let kind = match m.as_str() {
            "(" => Self::LParen,
            ")" => Self::RParen,
            "," => Self::ArgSep,
            "=" => Self::Eql,
            "<>" => Self::Neq,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Lte,
            ">=" => Self::Gte,
            "+" => Self::Plus,
            "-" => Self::Minus,
            "*" => Self::Mult,
            "/" => Self::Div,
            "^" => Self::Power,
            "&" => Self::Concat,
            "%" => Self::Percent,
            ":" => Self::CellRangeOp,
            "\"" => Self::UnterminatedStringLiteral,

            // Match anything else.
            s if STRING_LITERAL_REGEX.is_match(s) => Self::StringLiteral,
            s if NUMERIC_LITERAL_REGEX.is_match(s) => Self::NumericLiteral,
            s if CELL_REFERENCE_REGEX.is_match(s) => Self::CellRef,
            s if IDENT_REGEX.is_match(s) => Self::FunctionName,
            s if s.trim().is_empty() => Self::Whitespace,

            // Give up.
            _ => Self::Unknown,
        };

        Some((kind, m.end()))
    }

    /// Returns whether this token is whitespace that should be skipped when
    /// parsing.
    pub fn is_skip(self) -> bool {
        matches!(self, Self::Whitespace)
    }

    /// Returns the follow set of this token, if it has one: the characters
    /// that are allowed to come directly after it (end-of-input is always
    /// allowed). Used together with the token's name in diagnostics.
    fn follow_set(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::NumericLiteral => Some(("number", follow_sets::VALID_AFTER_NUMBER)),
            Self::CellRef => Some(("cell reference", follow_sets::VALID_AFTER_REFERENCE)),
            Self::FunctionName => Some(("function name", follow_sets::VALID_AFTER_IDENT)),
            _ => None,
        }
    }
}

/// Tokenizes a formula, validating the contextual lexical rules: string
/// termination, paren balance (a `)` with no open paren is an error here; a
/// missing `)` is the parser's job), comma placement, the left operand of the
/// postfix `%`, and each operand token's follow set. The returned token
/// vector always ends with `Eof`.
pub fn tokenize(input_str: &str) -> CodeResult<Vec<Token>> {
    let mut tokens: Vec<Token> = vec![];
    let mut open_parens: u32 = 0;
    let mut token_start = 0;
    while let Some((kind, token_end)) = TokenKind::consume_from_input(input_str, token_start) {
        let span = Span::new(token_start as u32, token_end as u32);
        let lexeme = &input_str[token_start..token_end];
        token_start = token_end;

        let prev = last_meaningful_kind(&tokens);
        match kind {
            TokenKind::UnterminatedStringLiteral => {
                return Err(RunErrorMsg::Unterminated("string literal").with_span(span));
            }
            TokenKind::Unknown => {
                return Err(
                    RunErrorMsg::Unexpected(format!("character {lexeme:?}").into()).with_span(span)
                );
            }
            TokenKind::LParen => open_parens += 1,
            TokenKind::RParen => match open_parens.checked_sub(1) {
                Some(n) => open_parens = n,
                None => return Err(RunErrorMsg::UnmatchedRParen.with_span(span)),
            },
            TokenKind::ArgSep => {
                let after_operator_or_lparen = match prev {
                    None | Some(TokenKind::LParen) => true,
                    Some(t) => is_operator(t),
                };
                if open_parens == 0 || after_operator_or_lparen {
                    return Err(RunErrorMsg::MisplacedArgSep.with_span(span));
                }
            }
            TokenKind::Percent => match prev {
                Some(TokenKind::RParen | TokenKind::CellRef | TokenKind::NumericLiteral) => (),
                _ => return Err(RunErrorMsg::MisplacedPercent.with_span(span)),
            },
            _ => (),
        }

        if let Some((token_name, follow_set)) = kind.follow_set() {
            if let Some(c) = input_str[token_end..].chars().next() {
                if !follow_set.contains(c) {
                    return Err(RunErrorMsg::BadFollower {
                        after: token_name,
                        c,
                    }
                    .with_span(span));
                }
            }
        }

        tokens.push(Token { kind, span });
    }
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::at(input_str.len() as u32),
    });
    Ok(tokens)
}

fn last_meaningful_kind(tokens: &[Token]) -> Option<TokenKind> {
    tokens
        .iter()
        .rev()
        .map(|t| t.kind)
        .find(|t| !t.is_skip())
}

/// The postfix `%` is excluded: it produces a complete operand, so a comma
/// may follow it.
fn is_operator(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Eql
            | TokenKind::Neq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::Lte
            | TokenKind::Gte
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Mult
            | TokenKind::Div
            | TokenKind::Power
            | TokenKind::Concat
            | TokenKind::CellRangeOp
    )
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn kinds(s: &str) -> Vec<TokenKind> {
        tokenize(s)
            .expect("lex error")
            .into_iter()
            .map(|t| t.kind)
            .collect_vec()
    }
    fn lex_err(s: &str) -> RunErrorMsg {
        tokenize(s).expect_err("expected lex error").msg
    }

    #[test]
    fn test_lex_basic() {
        use TokenKind::*;
        assert_eq!(
            kinds("1+2*3"),
            vec![
                NumericLiteral,
                Plus,
                NumericLiteral,
                Mult,
                NumericLiteral,
                Eof,
            ],
        );
        assert_eq!(
            kinds(r#"IF(A1>=10,"big","small")"#),
            vec![
                FunctionName,
                LParen,
                CellRef,
                Gte,
                NumericLiteral,
                ArgSep,
                StringLiteral,
                ArgSep,
                StringLiteral,
                RParen,
                Eof,
            ],
        );
        assert_eq!(
            kinds("A1:B5"),
            vec![CellRef, CellRangeOp, CellRef, Eof],
        );
    }

    #[test]
    fn test_lex_spans() {
        let tokens = tokenize("A1+10").unwrap();
        let spans = tokens
            .iter()
            .map(|t| (t.span.start, t.span.end))
            .collect_vec();
        assert_eq!(spans, vec![(0, 2), (2, 3), (3, 5), (5, 5)]);
        assert_eq!(tokens[2].lexeme("A1+10"), "10");
    }

    #[test]
    fn test_lex_numbers() {
        use TokenKind::*;
        assert_eq!(kinds("1.25"), vec![NumericLiteral, Eof]);
        assert_eq!(kinds(".5"), vec![NumericLiteral, Eof]);
        assert_eq!(kinds("5."), vec![NumericLiteral, Eof]);
        assert_eq!(kinds("1e5"), vec![NumericLiteral, Eof]);
        assert_eq!(kinds("1.5E-10"), vec![NumericLiteral, Eof]);

        // A second decimal point, an exponent directly after the decimal
        // point, and an exponent with no digits all leave a dangling
        // character that the follow-set check rejects.
        assert!(matches!(lex_err("1.2.3"), RunErrorMsg::BadFollower { .. }));
        assert!(matches!(lex_err("5.e3"), RunErrorMsg::BadFollower { .. }));
        assert!(matches!(lex_err("1e"), RunErrorMsg::BadFollower { .. }));
        assert!(matches!(lex_err("1e-"), RunErrorMsg::BadFollower { .. }));
        assert!(matches!(lex_err("1e+5"), RunErrorMsg::BadFollower { .. }));
    }

    #[test]
    fn test_lex_strings() {
        use TokenKind::*;
        assert_eq!(kinds(r#""hello""#), vec![StringLiteral, Eof]);
        assert_eq!(kinds(r#""he said ""hi""""#), vec![StringLiteral, Eof]);
        assert_eq!(kinds(r#""a"&"b""#), vec![StringLiteral, Concat, StringLiteral, Eof]);
        assert_eq!(
            lex_err(r#""no closing quote"#),
            RunErrorMsg::Unterminated("string literal"),
        );
    }

    #[test]
    fn test_lex_follow_sets() {
        // A space directly after an operand token is an error; elsewhere it
        // is skipped.
        assert!(matches!(lex_err("1 +2"), RunErrorMsg::BadFollower { .. }));
        assert!(matches!(lex_err("A1 +2"), RunErrorMsg::BadFollower { .. }));
        assert!(tokenize("SUM(1, 2)").is_ok());
        assert!(tokenize("SUM( A1,B2)").is_ok());

        assert!(matches!(lex_err("1x"), RunErrorMsg::BadFollower { .. }));
        assert!(matches!(lex_err("A1.5"), RunErrorMsg::BadFollower { .. }));
        assert!(matches!(lex_err("SUM\"x\""), RunErrorMsg::BadFollower { c: '"', .. }));
    }

    #[test]
    fn test_lex_context_checks() {
        assert_eq!(lex_err(")"), RunErrorMsg::UnmatchedRParen);
        assert_eq!(lex_err("(1))"), RunErrorMsg::UnmatchedRParen);
        assert_eq!(lex_err("1,2"), RunErrorMsg::MisplacedArgSep);
        assert_eq!(lex_err("SUM(,1)"), RunErrorMsg::MisplacedArgSep);
        assert_eq!(lex_err("SUM(1+,2)"), RunErrorMsg::MisplacedArgSep);
        assert_eq!(lex_err("%5"), RunErrorMsg::MisplacedPercent);
        assert_eq!(lex_err("5%%"), RunErrorMsg::MisplacedPercent);
        assert_eq!(lex_err(r#""x"%"#), RunErrorMsg::MisplacedPercent);
        assert!(tokenize("5%").is_ok());
        assert!(tokenize("A1%").is_ok());
        assert!(tokenize("(5)%").is_ok());
        assert!(tokenize("SUM(5%,1)").is_ok());
    }

    #[test]
    fn test_lex_unknown_character() {
        assert!(matches!(lex_err("1+@"), RunErrorMsg::Unexpected(_)));
        assert!(matches!(lex_err("{1}"), RunErrorMsg::Unexpected(_)));
    }
}
