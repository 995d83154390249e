//! Expression text parser
//!
//! This module transforms expression source text into an annotated
//! syntax tree plus a list of diagnostics:
//! - [`cursor`]: position tracking over the immutable input
//! - [`token`]: token classification and the operator/function tables
//! - [`ast`]: tree node definitions
//! - [`parser`]: the recursive-descent grammar and parse entry points
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent, with no separate tokenization pass:
//! the grammar classifies the raw input at the cursor position and
//! consumes characters directly. Operator precedence is enforced by a
//! post-hoc rotation applied to each infix node rather than by
//! precedence climbing. All syntax errors are collected and returned
//! together with a best-effort tree; parsing never stops at the first
//! fault.

pub mod ast;
pub mod cursor;
pub mod parser;
pub mod token;
