//! Pratt parser that turns a flat list of tokens directly into an AST.
//!
//! `nud` handles prefixes and atoms, `led` handles infix and postfix
//! operators; `parse_expression` is the binding-power loop tying them
//! together. The precedence table lives on [`BinaryOp`] so the pretty-printer
//! and the parser cannot disagree.

use super::ast::{
    AstNode, AstNodeContents, BinaryOp, Literal, UnaryOp, PREFIX_BINDING_POWER,
    POSTFIX_BINDING_POWER,
};
use super::cell_ref::{CellRef, Reference};
use super::errors::{CodeResult, RunError, RunErrorMsg};
use super::lexer::{Token, TokenKind};
use super::MAX_FORMULA_DEPTH;
use crate::Span;

/// Parses a token vector (as produced by [`super::tokenize`]) into a single
/// AST spanning the whole input.
pub fn parse(source_str: &str, tokens: &[Token]) -> CodeResult<AstNode> {
    let mut p = Parser::new(source_str, tokens);
    let ast = p.parse_expression(0)?;
    p.ok_if_done(ast)
}

/// Returns the binding power with which `kind` binds to a left operand, or
/// `None` if it is not an infix/postfix operator.
fn infix_binding_power(kind: TokenKind) -> Option<u8> {
    match kind {
        TokenKind::Percent => Some(POSTFIX_BINDING_POWER),
        _ => binary_op_for(kind).map(|op| op.binding_power()),
    }
}

fn binary_op_for(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Mult => Some(BinaryOp::Mul),
        TokenKind::Div => Some(BinaryOp::Div),
        TokenKind::Power => Some(BinaryOp::Pow),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::Eql => Some(BinaryOp::Eq),
        TokenKind::Neq => Some(BinaryOp::Neq),
        TokenKind::Lte => Some(BinaryOp::Lte),
        TokenKind::Gte => Some(BinaryOp::Gte),
        TokenKind::CellRangeOp => Some(BinaryOp::Range),
        TokenKind::Concat => Some(BinaryOp::Concat),
        _ => None,
    }
}

/// Token parser used to assemble an AST.
#[derive(Debug, Copy, Clone)]
struct Parser<'a> {
    /// Source string.
    source_str: &'a str,
    /// Tokens to feed.
    tokens: &'a [Token],
    /// Index of the "current" token (None = before start).
    cursor: Option<usize>,
    /// Current expression nesting depth.
    depth: usize,
}
impl<'a> Parser<'a> {
    fn new(source_str: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            source_str,
            tokens,
            cursor: None,
            depth: 0,
        }
    }

    /// Returns the kind of the token at the cursor, or `Eof` past the end.
    fn current(self) -> TokenKind {
        self.cursor
            .and_then(|idx| self.tokens.get(idx))
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }
    /// Returns the span of the current token. If there is no current token,
    /// returns a zero-width span at the beginning or end of the input
    /// appropriately.
    fn span(&self) -> Span {
        match self.cursor {
            Some(idx) => match self.tokens.get(idx) {
                Some(token) => token.span,
                None => Span::at(self.source_str.len() as u32),
            },
            None => Span::at(0),
        }
    }
    /// Returns the source string of the current token. If there is no current
    /// token, returns an empty string.
    fn token_str(&self) -> &'a str {
        self.span().slice(self.source_str)
    }

    /// Moves the cursor forward, skipping whitespace, and then returns the
    /// token kind at the cursor.
    fn next(&mut self) -> TokenKind {
        loop {
            self.cursor = Some(self.cursor.map(|idx| idx + 1).unwrap_or(0));
            if !self.current().is_skip() {
                return self.current();
            }
        }
    }
    /// Returns the kind of the token after the one at the cursor, without
    /// moving the cursor.
    fn peek_next(self) -> TokenKind {
        let mut tmp = self;
        tmp.next()
    }

    /// Consumes an expression at the given minimum binding power.
    fn parse_expression(&mut self, min_bp: u8) -> CodeResult<AstNode> {
        if self.depth >= MAX_FORMULA_DEPTH {
            return Err(RunErrorMsg::TooDeep.with_span(self.span()));
        }
        self.depth += 1;
        let ret = self.parse_expression_inner(min_bp);
        self.depth -= 1;
        ret
    }

    fn parse_expression_inner(&mut self, min_bp: u8) -> CodeResult<AstNode> {
        let kind = self.next();
        let mut left = self.nud(kind)?;
        loop {
            let next_kind = self.peek_next();
            let Some(bp) = infix_binding_power(next_kind) else {
                break;
            };
            if min_bp >= bp {
                break;
            }
            self.next();
            left = self.led(next_kind, left)?;
        }
        Ok(left)
    }

    /// Null denotation: parses a prefix operator or an atom.
    fn nud(&mut self, kind: TokenKind) -> CodeResult<AstNode> {
        let span = self.span();
        match kind {
            TokenKind::NumericLiteral => {
                let n: f64 = self
                    .token_str()
                    .parse()
                    .map_err(|_| RunErrorMsg::BadNumber.with_span(span))?;
                if !n.is_finite() {
                    return Err(RunErrorMsg::BadNumber.with_span(span));
                }
                Ok(AstNode::new(span, AstNodeContents::Literal(Literal::Number(n))))
            }
            TokenKind::StringLiteral => {
                let contents = parse_string_literal(self.token_str());
                Ok(AstNode::new(
                    span,
                    AstNodeContents::Literal(Literal::String(contents)),
                ))
            }
            TokenKind::CellRef => {
                let cell = CellRef::parse_a1(self.token_str())
                    .ok_or_else(|| RunErrorMsg::BadCellReference.with_span(span))?;
                Ok(AstNode::new(
                    span,
                    AstNodeContents::Reference(Reference::Cell(cell)),
                ))
            }
            TokenKind::LParen => {
                let inner = self.parse_expression(0)?;
                if self.next() != TokenKind::RParen {
                    return self.expected("right paren");
                }
                // No paren node; just widen the span to cover the parens.
                Ok(AstNode {
                    span: span.union(self.span()),
                    ..inner
                })
            }
            TokenKind::Plus | TokenKind::Minus => {
                let op = match kind {
                    TokenKind::Plus => UnaryOp::Plus,
                    _ => UnaryOp::Minus,
                };
                let operand = self.parse_expression(PREFIX_BINDING_POWER)?;
                Ok(AstNode::new(
                    span.union(operand.span),
                    AstNodeContents::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                ))
            }
            TokenKind::FunctionName => {
                let name = self.token_str().to_string();
                let name_span = span;
                if self.next() != TokenKind::LParen {
                    return self.expected("left paren after function name");
                }
                let mut args = vec![];
                if self.peek_next() == TokenKind::RParen {
                    self.next();
                } else {
                    loop {
                        args.push(self.parse_expression(0)?);
                        match self.next() {
                            TokenKind::ArgSep => continue,
                            TokenKind::RParen => break,
                            _ => return self.expected("comma or right paren"),
                        }
                    }
                }
                Ok(AstNode::new(
                    name_span.union(self.span()),
                    AstNodeContents::FunctionCall {
                        name,
                        name_span,
                        args,
                    },
                ))
            }
            _ => Err(RunErrorMsg::Expected {
                expected: "expression".into(),
                got: Some(kind.to_string().into()),
            }
            .with_span(span)),
        }
    }

    /// Left denotation: parses an infix or postfix operator applied to an
    /// already-parsed left operand.
    fn led(&mut self, kind: TokenKind, left: AstNode) -> CodeResult<AstNode> {
        let op_span = self.span();
        if kind == TokenKind::Percent {
            return Ok(AstNode::new(
                left.span.union(op_span),
                AstNodeContents::Unary {
                    op: UnaryOp::Percent,
                    operand: Box::new(left),
                },
            ));
        }
        let Some(op) = binary_op_for(kind) else {
            return Err(RunErrorMsg::Unexpected(kind.to_string().into()).with_span(op_span));
        };
        let bp = op.binding_power();
        let rhs_bp = if op.is_right_associative() { bp - 1 } else { bp };
        let right = self.parse_expression(rhs_bp)?;
        Ok(AstNode::new(
            left.span.union(right.span),
            AstNodeContents::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            },
        ))
    }

    /// Returns `or_else` if the next token is `Eof`, and an error otherwise.
    fn ok_if_done<T>(mut self, or_else: T) -> CodeResult<T> {
        match self.next() {
            TokenKind::Eof => Ok(or_else),
            kind => Err(RunErrorMsg::Unexpected(kind.to_string().into()).with_span(self.span())),
        }
    }

    /// Returns an error describing that `expected` was expected.
    fn expected<T>(&self, expected: impl ToString) -> CodeResult<T> {
        Err(RunError {
            span: Some(self.span()),
            msg: RunErrorMsg::Expected {
                expected: expected.to_string().into(),
                got: Some(self.current().to_string().into()),
            },
        })
    }
}

/// Unescapes the contents of a string literal token (outer quotes stripped,
/// doubled quotes collapsed). The lexer guarantees the shape.
fn parse_string_literal(s: &str) -> String {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
        .replace("\"\"", "\"")
}
