//! Error types for solver-level setup.

use mf_system::SystemError;
use thiserror::Error;

/// Errors raised while wiring a model into a solver or a subproblem.
///
/// Failures during a solve are plain [`SystemError`]s and are never
/// re-wrapped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Variable '{name}' does not exist in model")]
    UnknownVariable { name: String },

    #[error(
        "Ambiguous variable '{name}' matches {candidates:?}; give the full name with an alias instead"
    )]
    AmbiguousVariable {
        name: String,
        candidates: Vec<String>,
    },

    #[error("Variable '{name}' already exists; rename it or remove the duplicate")]
    DuplicateVariable { name: String },

    #[error(transparent)]
    System(#[from] SystemError),
}

pub type SolverResult<T> = Result<T, SolverError>;
