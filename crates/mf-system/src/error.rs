//! System-level error types.

use mf_core::MfError;
use thiserror::Error;

use crate::transfer::Direction;

/// Errors raised while building a system tree or while moving data through it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SystemError {
    #[error("Duplicate subsystem name '{name}'")]
    DuplicateSubsystem { name: String },

    #[error("Invalid subsystem name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Duplicate variable '{name}'")]
    DuplicateVariable { name: String },

    #[error("Unknown variable '{name}'")]
    UnknownVariable { name: String },

    #[error("Connection source '{name}' is not an output")]
    NotAnOutput { name: String },

    #[error("Connection target '{name}' is not an input")]
    NotAnInput { name: String },

    #[error("Input '{name}' is already connected to '{existing}'")]
    AlreadyConnected { name: String, existing: String },

    #[error("Missing {direction} transfer for child {index}")]
    MissingTransfer { direction: Direction, index: usize },

    #[error("Transfer table has {actual} {direction} transfers for {expected} children")]
    TransferCount {
        direction: Direction,
        expected: usize,
        actual: usize,
    },

    #[error("Ownership error: {what}")]
    Ownership { what: String },

    #[error("Vector size mismatch for {what} in '{system}': expected {expected}, got {actual}")]
    SizeMismatch {
        system: String,
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Transfer failed for child {index}: {what}")]
    Transfer { index: usize, what: String },

    #[error("Evaluation failed in '{path}': {message}")]
    Evaluation { path: String, message: String },

    #[error("Nonlinear solve did not converge in '{path}'")]
    NotConverged { path: String },

    #[error(transparent)]
    Core(#[from] MfError),
}

pub type SystemResult<T> = Result<T, SystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_transfer_names_direction() {
        let err = SystemError::MissingTransfer {
            direction: Direction::Fwd,
            index: 2,
        };
        assert_eq!(err.to_string(), "Missing fwd transfer for child 2");
    }

    #[test]
    fn core_errors_are_transparent() {
        let core = MfError::InvalidArg { what: "slot" };
        let err: SystemError = core.clone().into();
        assert_eq!(err.to_string(), core.to_string());
    }
}
