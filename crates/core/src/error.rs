//! # Error Types
//!
//! Errors while declaring a model are construction-time failures: an
//! attempt to wire a factor, constraint or index that the declared
//! ranges and value types cannot support. None of them are transient.

use thiserror::Error;

use crate::shape::{RangeId, ValueShape};

/// Errors raised by a graph builder while a model is being declared.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// An operand's shape doesn't match what the factor requires.
    #[error("Shape mismatch in {context}: expected {expected}, got {got}")]
    ShapeMismatch {
        context: String,
        expected: ValueShape,
        got: ValueShape,
    },

    /// The range handle was not issued by this builder.
    #[error("Unknown range {0:?}")]
    UnknownRange(RangeId),

    /// The variable handle was not issued by this builder.
    #[error("Unknown variable: {reason}")]
    UnknownVariable { reason: String },

    /// A constant index lies outside its dimension.
    #[error("Index {index} out of range for dimension of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    /// More indices than the variable has dimensions.
    #[error("Variable '{name}' has rank {rank} but was indexed {got} times")]
    TooManyIndices {
        name: String,
        rank: usize,
        got: usize,
    },

    /// A range (or random index) used to index a dimension of another size.
    #[error("Range size mismatch: dimension has size {expected}, index ranges over {got}")]
    RangeSizeMismatch { expected: usize, got: usize },

    /// A random index must be a scalar integer variable.
    #[error("Invalid random index '{name}': {reason}")]
    InvalidIndex { name: String, reason: String },

    /// `pop_frame` was called with no open scope.
    #[error("No open scope to close")]
    NoOpenScope,

    /// The model was finished while scopes were still open.
    #[error("Cannot finish model '{model}': {open} scope(s) still open")]
    OpenScopes { model: String, open: usize },
}
