//! Error kinds surfaced by the matrix engine

use thiserror::Error;

/// Result type alias using the engine's Error
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Empty, ragged or non-conformant input
    #[error("invalid matrix: {reason}")]
    InvalidMatrix { reason: &'static str },

    /// Operand shapes (or scalar/nested cell kinds) are incompatible
    #[error("dimension mismatch in '{op}': {lhs:?} vs {rhs:?}")]
    DimensionMismatch {
        op: &'static str,
        lhs: (usize, usize),
        rhs: (usize, usize),
    },

    /// Mathematically undefined request: non-square input or singular matrix
    #[error("undefined operation '{op}': {reason}")]
    UndefinedOperation {
        op: &'static str,
        reason: &'static str,
    },

    #[error("expected a block matrix")]
    ExpectedBlockMatrix,

    /// The root finder gave up before the corrections fell under tolerance
    #[error("root finder did not converge after {iterations} iterations")]
    NoConvergence { iterations: usize },
}

impl Error {
    pub(crate) fn not_square(op: &'static str) -> Self {
        Error::UndefinedOperation {
            op,
            reason: "matrix is not square",
        }
    }

    pub(crate) fn singular(op: &'static str) -> Self {
        Error::UndefinedOperation {
            op,
            reason: "matrix is singular",
        }
    }
}
