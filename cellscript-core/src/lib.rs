//! Cellscript: a pure spreadsheet formula engine.
//!
//! Given a formula string and a read-only cell store, the engine produces a
//! typed [`formulas::Value`]. The pipeline has four stages: tokenization
//! ([`formulas::tokenize`]), Pratt parsing ([`formulas::parse`]), static type
//! annotation ([`formulas::infer_types`]), and evaluation
//! ([`formulas::evaluate`]). [`formulas::parse_formula`] runs the first three
//! and returns a ready-to-evaluate [`formulas::Formula`].
//!
//! The engine holds no mutable shared state: the function registry is frozen
//! after construction and the cell store is borrowed read-only, so
//! independent formulas may be evaluated concurrently.

pub mod formulas;
mod span;

pub use span::Span;
