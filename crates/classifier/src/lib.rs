//! # Classifier - Score and Argmax Builders for Bayes Point Machines
//!
//! Model fragments for multiclass linear classifiers, declared into any
//! [`GraphBuilder`](infer_core::GraphBuilder):
//!
//! - **Scores**: noisy per-class linear scores from dense or sparse features
//! - **Argmax**: pairwise strict inequalities that make one class's score
//!   the maximum, and a guarded switch over an integer label
//! - **Config**: the name prefix and query type shared by both
//!
//! ## Example
//!
//! ```rust
//! use infer_classifier::{compute_class_scores, constrain_maximum, DenseFeatures, ScoreConfig, Weights};
//! use infer_core::{GraphBuilder, ModelBuilder, Operand, ValueType, VarRef};
//!
//! let mut builder = ModelBuilder::begin("bpm");
//! let classes = builder.declare_range("class", 3);
//! let w = builder.declare_variable("w", ValueType::Vector { dim: 2 }, &[classes]).unwrap();
//! let x = builder.declare_variable("x", ValueType::Vector { dim: 2 }, &[]).unwrap();
//! let label = builder.declare_variable("label", ValueType::discrete(3), &[]).unwrap();
//!
//! let config = ScoreConfig::default();
//! let scores = compute_class_scores(
//!     &mut builder,
//!     &Weights::Vectors(VarRef::new(w)),
//!     &DenseFeatures::Vector(VarRef::new(x)),
//!     Operand::Real(1.0),
//!     &config,
//! )
//! .unwrap();
//! let switch = constrain_maximum(&mut builder, &VarRef::new(label), &scores.noisy, None, &config).unwrap();
//!
//! assert_eq!(switch.branches.len(), 3);
//! assert_eq!(switch.constraint_count(), 6);
//! ```

pub mod argmax;
pub mod config;
pub mod error;
pub mod score;

pub use argmax::{
    constrain_arg_max, constrain_maximum, ArgmaxConstraintSet, ArgmaxEntry, ClassIndex,
    MaximumBranch, MaximumSwitch,
};
pub use config::{ScoreConfig, DEFAULT_PREFIX};
pub use error::ClassifierError;
pub use score::{
    compute_class_scores, compute_sparse_class_scores, ClassScores, DenseFeatures,
    SparseFeatureRef, Weights,
};
