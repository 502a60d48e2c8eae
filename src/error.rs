//! Error types for expression graph construction.

use std::fmt;
use thiserror::Error;

/// Result type alias using the graph's [Error].
pub type Result<T> = std::result::Result<T, Error>;

/// Row and column count of a matrix valued expression, displayed as `RxC`.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub struct Shape(pub usize, pub usize);

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.0, self.1)
    }
}

/// Errors that abort the construction of a node. No partially constructed node is ever published
/// when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Operand shapes cannot be combined, not even by scalar broadcasting.
    #[error("Shape mismatch: lhs is {lhs}, while rhs is {rhs}")]
    ShapeMismatch {
        /// Shape of the left operand
        lhs: Shape,
        /// Shape of the right operand
        rhs: Shape,
    },

    /// The number of selected slots does not match the right-hand side of an assignment.
    #[error("Dimension mismatch: lhs is {lhs}, while rhs is {rhs}")]
    DimensionMismatch {
        /// Shape of the selection
        lhs: Shape,
        /// Shape of the assigned value
        rhs: Shape,
    },

    /// A row or column index is outside the operand.
    #[error("Index {index} out of bounds for matrix of shape {shape}")]
    IndexError {
        /// The offending index
        index: usize,
        /// Shape of the indexed operand
        shape: Shape,
    },

    /// A flat nonzero index is outside the operand's nonzeros.
    #[error("Nonzero index {index} out of bounds, the operand has {nnz} nonzeros")]
    NonzeroIndexError {
        /// The offending index
        index: i64,
        /// Number of nonzeros of the indexed operand
        nnz: usize,
    },

    /// A strided selection with a zero step.
    #[error("Invalid slice {start}:{stop}:{step}, the step must be positive")]
    InvalidSlice {
        /// First index of the slice
        start: usize,
        /// One past the last index of the slice
        stop: usize,
        /// Step between selected indexes
        step: usize,
    },

    /// The requested form of an operation exists in the API but has no implementation.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// An operation that requires a node was invoked on an empty handle.
    #[error("Operation on a null expression")]
    NullExpression,

    /// Compressed row data does not describe a valid pattern.
    #[error("Invalid sparsity: {0}")]
    InvalidSparsity(String),
}
