//! Evaluator boundary and parse-then-evaluate orchestration
//!
//! Numeric semantics — operator arithmetic, function application, arity
//! checking — are not implemented in this crate. They live behind the
//! [`Evaluate`] trait, and [`run`] wires a parse to an evaluator while
//! guaranteeing the evaluator never sees a tree that carries parse
//! diagnostics.

use crate::parser::ast::SourceLocation;
use crate::parser::parser::{parse, SyntaxTree};
use std::fmt;

/// Evaluation error reported by an [`Evaluate`] implementation.
#[derive(Debug, Clone)]
pub struct EvalError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Evaluation error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for EvalError {}

/// An expression evaluator consuming a parsed tree.
pub trait Evaluate {
    /// Evaluate the tree to a numeric result, or report every
    /// evaluation error found.
    fn evaluate(&self, tree: &SyntaxTree) -> Result<f64, Vec<EvalError>>;
}

/// The result of running the parse-then-evaluate pipeline.
#[derive(Debug)]
pub enum Outcome {
    /// Parsed cleanly and evaluated to a value
    Value { value: f64, tree: SyntaxTree },
    /// The parse produced diagnostics; the evaluator was not invoked
    ParseFailed { tree: SyntaxTree },
    /// Parsed cleanly, but evaluation reported errors
    EvalFailed {
        tree: SyntaxTree,
        errors: Vec<EvalError>,
    },
}

/// Parse `input` and hand the tree to `evaluator`.
///
/// If the parse produced any diagnostics, the evaluator is not invoked
/// and the tree is returned with its errors as-is.
pub fn run<E: Evaluate>(input: &str, evaluator: &E) -> Outcome {
    let tree = parse(input);

    if tree.has_errors() {
        return Outcome::ParseFailed { tree };
    }

    match evaluator.evaluate(&tree) {
        Ok(value) => Outcome::Value { value, tree },
        Err(errors) => Outcome::EvalFailed { tree, errors },
    }
}
