//! # Prob - Beliefs and Belief-Array Algebra
//!
//! This crate implements the distribution side of a message-passing
//! classifier: the belief families, arrays of beliefs of rank 1 to 4, and
//! the diagnostics run over successive posteriors.
//!
//! ## Core Concepts
//!
//! - **Beliefs are values**: `Gaussian`, `Gamma`, `VectorGaussian`,
//!   `Bernoulli` and `Beta` compare by parameters and serialize with serde
//! - **Capabilities are traits**: each belief implements only the
//!   capabilities it has ([`HasMean`], [`Rescale`], ...), and array
//!   operations bound on exactly what they use
//! - **Rank is a type**: a rank-2 array is `Vec<Vec<B>>`, and [`Nested`]
//!   lifts leaf operations to every rank
//! - **Absent is explicit**: `Option` marks a level that may be missing
//!
//! ## Example: Convergence Check
//!
//! ```rust
//! use infer_prob::algebra::{max_diff, DiffMetric};
//! use infer_prob::factory::{gaussian_array, Dim, Shape2};
//!
//! let previous = gaussian_array(&Shape2(2, Dim::Fixed(3)), 0.0, 1.0).unwrap();
//! let current = gaussian_array(&Shape2(2, Dim::Fixed(3)), 0.05, 1.0).unwrap();
//!
//! let change = max_diff(&previous, &current, DiffMetric::MeanAbsolute).unwrap();
//! assert!(change < 0.1); // converged
//! ```

pub mod algebra;
pub mod array;
pub mod belief;
mod error;
pub mod factory;
pub mod traits;

pub use algebra::DiffMetric;
pub use array::{BeliefArray1, BeliefArray2, BeliefArray3, BeliefArray4, Nested};
pub use belief::{Bernoulli, Beta, Gamma, Gaussian, VectorGaussian};
pub use error::ProbError;
pub use factory::{Dim, Shape1, Shape2, Shape3, Shape4};
pub use traits::{
    ClosedUnderProduct, HasLogProb, HasMean, HasPrecision, HasUniform, HasVariance, Rescale,
};
