//! # Beliefs
//!
//! Parametric probability distributions used as messages and posteriors:
//!
//! - [`Gaussian`]: real scalars, mean/variance form
//! - [`Gamma`]: positive reals, shape/rate form
//! - [`VectorGaussian`]: real vectors, mean/precision form
//! - [`Bernoulli`] and [`Beta`]: booleans and probabilities
//!
//! All derive `Serialize`/`Deserialize`. Improper members (infinite
//! variance) serialize as JSON `null` under `serde_json`, which does not
//! read back; persist finite beliefs.

mod bernoulli;
mod gamma;
mod gaussian;
mod special;
mod vector_gaussian;

pub use bernoulli::{Bernoulli, Beta};
pub use gamma::Gamma;
pub use gaussian::Gaussian;
pub use vector_gaussian::VectorGaussian;
