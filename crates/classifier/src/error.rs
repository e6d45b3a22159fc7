//! Error types for classifier builders.

use infer_core::CoreError;
use thiserror::Error;

/// Errors raised while adding classifier structure to a model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifierError {
    /// The graph builder rejected a declaration.
    #[error(transparent)]
    Graph(#[from] CoreError),

    /// A known class index is not below the number of classes.
    #[error("Class index {index} out of range for {classes} classes")]
    InvalidClassIndex { index: usize, classes: usize },

    /// An input does not have the layout the builder expects.
    #[error("Invalid {argument}: {reason}")]
    InvalidInput {
        argument: &'static str,
        reason: String,
    },
}
