//! # Capability Traits
//!
//! Each belief type opts into exactly the capabilities it supports, one
//! trait per capability. Array operations are written against the
//! narrowest bound they need: `means` only asks for [`HasMean`],
//! `normalize` asks for [`HasMean`] plus [`Rescale`].
//!
//! | Capability | Gaussian | Gamma | VectorGaussian | Bernoulli | Beta |
//! |------------|:--------:|:-----:|:--------------:|:---------:|:----:|
//! | `HasMean` | ✓ | ✓ | ✓ | ✓ | ✓ |
//! | `HasVariance` | ✓ | ✓ | | ✓ | ✓ |
//! | `HasPrecision` | ✓ | | ✓ | | |
//! | `HasUniform` | ✓ | ✓ | | ✓ | ✓ |
//! | `ClosedUnderProduct` | ✓ | ✓ | | ✓ | ✓ |
//! | `Rescale` | ✓ | ✓ | | | |
//! | `HasLogProb` | `f64` | `f64` | | `bool` | `f64` |

use crate::ProbError;

/// Beliefs that expose a mean.
pub trait HasMean {
    type Mean;

    fn mean(&self) -> Self::Mean;
}

/// Beliefs that expose a variance.
pub trait HasVariance {
    type Variance;

    fn variance(&self) -> Self::Variance;
}

/// Beliefs that expose a precision (inverse variance).
pub trait HasPrecision {
    type Precision;

    fn precision(&self) -> Self::Precision;
}

/// Beliefs with a uniform (possibly improper) member.
///
/// Uniform beliefs are the initial state of message-passing before any
/// evidence has been incorporated.
pub trait HasUniform: Sized {
    fn uniform() -> Self;

    fn is_uniform(&self) -> bool;
}

/// Beliefs whose family is closed under pointwise multiplication.
///
/// This is message combination: the product of two densities,
/// renormalized, is again a member of the family.
pub trait ClosedUnderProduct: Sized {
    fn product(&self, other: &Self) -> Result<Self, ProbError>;
}

/// Beliefs over a quantity that can be divided by a constant.
///
/// If `X` has this belief, `rescale(c)` is the belief over `X / c`:
/// the mean becomes `mean / c` and the variance `variance / c²`.
pub trait Rescale {
    fn rescale(&self, divisor: f64) -> Self;
}

/// Beliefs with a log density (or log mass) at values of type `T`.
pub trait HasLogProb<T> {
    fn log_prob(&self, value: T) -> f64;
}
