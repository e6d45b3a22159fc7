//! Error types for belief and belief-array operations.

use thiserror::Error;

/// Errors that can occur in belief computations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbError {
    /// A distribution parameter is outside its domain.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Two arrays being compared element-wise have different lengths.
    #[error("Length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// An array (or a nested row) is absent where a value is required.
    #[error("Array is absent where {operation} requires a value")]
    MissingArray { operation: &'static str },

    /// Vector belief dimensions disagree.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Unrecognized diff-metric keyword.
    #[error("Unknown diff metric '{keyword}' (expected \"mean\" or \"stddev\")")]
    UnknownMetric { keyword: String },

    /// A row cannot be normalized because its norm is zero.
    #[error("Row {row} has zero norm and cannot be normalized")]
    ZeroNorm { row: usize },

    /// The product of two beliefs has no mass (e.g. two different point masses).
    #[error("Product of beliefs is zero everywhere: {reason}")]
    ZeroProduct { reason: String },
}
