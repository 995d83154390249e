//! # Introduction
//!
//! mathparse parses textual arithmetic expressions — numbers,
//! parenthesized argument lists, prefix/infix operators, and named
//! unary/binary functions — into an annotated syntax tree, collecting
//! every syntax error found instead of aborting on the first one.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Parser → SyntaxTree (+ diagnostics) → Evaluator
//! ```
//!
//! 1. [`parser`] — classifies the input character stream in place and
//!    builds the tree; each node carries its variant, source span,
//!    covered text, and children.
//! 2. [`eval`] — the collaborator boundary: an [`eval::Evaluate`]
//!    implementation consumes the tree, and the orchestrator
//!    short-circuits it whenever the parse reported diagnostics.
//!
//! ## Surface
//!
//! Numbers: digits with `_` grouping, optional fraction, optional
//! unsigned exponent. Operators: `+ - * × / ÷ % ^ **` infix, `+`/`-`
//! prefix. Functions: fixed unary and binary keyword sets
//! (`sqrt`, `sin`, ..., `min`, `max`, `pow`).

pub mod eval;
pub mod parser;
