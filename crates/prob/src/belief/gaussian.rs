//! Univariate Gaussian beliefs.
//!
//! A belief is stored as mean and variance. Two limits are members of the
//! family and are represented exactly:
//!
//! - the **uniform** (improper) belief: infinite variance, zero precision
//! - the **point mass**: zero variance, infinite precision
//!
//! Message-passing state starts uniform and beliefs are combined with
//! [`ClosedUnderProduct::product`], where precisions add.
//!
//! # Example
//!
//! ```rust
//! use infer_prob::{ClosedUnderProduct, Gaussian};
//!
//! let prior = Gaussian::new(0.0, 1.0).unwrap();
//! let evidence = Gaussian::new(2.0, 1.0).unwrap();
//!
//! // Precisions add: 1 + 1, so the posterior variance halves.
//! let posterior = prior.product(&evidence).unwrap();
//! assert!((posterior.mean() - 1.0).abs() < 1e-12);
//! assert!((posterior.variance() - 0.5).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use crate::traits::{
    ClosedUnderProduct, HasLogProb, HasMean, HasPrecision, HasUniform, HasVariance, Rescale,
};
use crate::ProbError;

/// A univariate Gaussian (Normal) belief N(μ, σ²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    mean: f64,
    variance: f64,
}

impl Gaussian {
    /// Create a Gaussian belief N(mean, variance).
    ///
    /// # Errors
    /// Returns error if the mean is NaN or the variance is negative or NaN.
    pub fn new(mean: f64, variance: f64) -> Result<Self, ProbError> {
        if mean.is_nan() {
            return Err(ProbError::InvalidParameter {
                name: "mean".to_string(),
                reason: "mean must not be NaN".to_string(),
            });
        }
        if variance.is_nan() || variance < 0.0 {
            return Err(ProbError::InvalidParameter {
                name: "variance".to_string(),
                reason: "variance must be non-negative".to_string(),
            });
        }
        if variance.is_infinite() {
            return Ok(Self::uniform());
        }
        Ok(Self { mean, variance })
    }

    /// Create a Gaussian belief from mean and precision τ = 1/σ².
    ///
    /// A precision of zero gives the uniform belief (the mean is dropped);
    /// an infinite precision gives a point mass at `mean`.
    pub fn from_mean_and_precision(mean: f64, precision: f64) -> Result<Self, ProbError> {
        if mean.is_nan() {
            return Err(ProbError::InvalidParameter {
                name: "mean".to_string(),
                reason: "mean must not be NaN".to_string(),
            });
        }
        if precision.is_nan() || precision < 0.0 {
            return Err(ProbError::InvalidParameter {
                name: "precision".to_string(),
                reason: "precision must be non-negative".to_string(),
            });
        }
        Ok(Self::from_valid_precision(mean, precision))
    }

    /// Construct from parameters already known to be valid.
    pub(crate) fn from_valid_precision(mean: f64, precision: f64) -> Self {
        if precision == 0.0 {
            Self::uniform()
        } else if precision.is_infinite() {
            Self::point_mass(mean)
        } else {
            Self {
                mean,
                variance: 1.0 / precision,
            }
        }
    }

    /// The standard normal N(0, 1).
    pub fn standard() -> Self {
        Self {
            mean: 0.0,
            variance: 1.0,
        }
    }

    /// The improper uniform belief: mean 0, infinite variance.
    pub fn uniform() -> Self {
        Self {
            mean: 0.0,
            variance: f64::INFINITY,
        }
    }

    /// A point mass (degenerate Gaussian with σ = 0).
    pub fn point_mass(value: f64) -> Self {
        Self {
            mean: value,
            variance: 0.0,
        }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// The precision τ = 1/σ².
    ///
    /// Infinity for a point mass, zero for the uniform belief.
    pub fn precision(&self) -> f64 {
        if self.variance == 0.0 {
            f64::INFINITY
        } else {
            1.0 / self.variance
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    pub fn is_uniform(&self) -> bool {
        self.variance.is_infinite()
    }

    pub fn is_point_mass(&self) -> bool {
        self.variance == 0.0
    }

    /// Log density at x.
    ///
    /// The uniform belief has log density 0 everywhere; a point mass has
    /// 0 at its location and -∞ elsewhere.
    pub fn log_prob(&self, x: f64) -> f64 {
        if self.is_uniform() {
            0.0
        } else if self.is_point_mass() {
            if x == self.mean {
                0.0
            } else {
                f64::NEG_INFINITY
            }
        } else {
            let diff = x - self.mean;
            -0.5 * (2.0 * PI * self.variance).ln() - 0.5 * diff * diff / self.variance
        }
    }

    /// The one-sigma interval `[μ - σ, μ + σ]`.
    pub fn plus_minus_sigma(&self) -> [f64; 2] {
        let sd = self.std_dev();
        [self.mean - sd, self.mean + sd]
    }
}

impl Default for Gaussian {
    fn default() -> Self {
        Self::uniform()
    }
}

impl fmt::Display for Gaussian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_uniform() {
            write!(f, "Gaussian.Uniform")
        } else if self.is_point_mass() {
            write!(f, "Gaussian.PointMass({})", self.mean)
        } else {
            write!(f, "Gaussian({}, {})", self.mean, self.variance)
        }
    }
}

// ============================================================================
// Capabilities
// ============================================================================

impl HasMean for Gaussian {
    type Mean = f64;

    fn mean(&self) -> f64 {
        self.mean
    }
}

impl HasVariance for Gaussian {
    type Variance = f64;

    fn variance(&self) -> f64 {
        self.variance
    }
}

impl HasPrecision for Gaussian {
    type Precision = f64;

    fn precision(&self) -> f64 {
        Gaussian::precision(self)
    }
}

impl HasUniform for Gaussian {
    fn uniform() -> Self {
        Gaussian::uniform()
    }

    fn is_uniform(&self) -> bool {
        Gaussian::is_uniform(self)
    }
}

impl ClosedUnderProduct for Gaussian {
    /// Precisions add; the mean is the precision-weighted average.
    fn product(&self, other: &Self) -> Result<Self, ProbError> {
        match (self.is_point_mass(), other.is_point_mass()) {
            (true, true) => {
                if self.mean == other.mean {
                    Ok(*self)
                } else {
                    Err(ProbError::ZeroProduct {
                        reason: format!(
                            "point masses at {} and {} do not overlap",
                            self.mean, other.mean
                        ),
                    })
                }
            }
            (true, false) => Ok(*self),
            (false, true) => Ok(*other),
            (false, false) => {
                if self.is_uniform() {
                    return Ok(*other);
                }
                if other.is_uniform() {
                    return Ok(*self);
                }
                let (t1, t2) = (self.precision(), other.precision());
                let precision = t1 + t2;
                let mean = (self.mean * t1 + other.mean * t2) / precision;
                Ok(Self::from_valid_precision(mean, precision))
            }
        }
    }
}

impl Rescale for Gaussian {
    fn rescale(&self, divisor: f64) -> Self {
        if self.is_uniform() {
            return *self;
        }
        Self {
            mean: self.mean / divisor,
            variance: self.variance / (divisor * divisor),
        }
    }
}

impl HasLogProb<f64> for Gaussian {
    fn log_prob(&self, value: f64) -> f64 {
        Gaussian::log_prob(self, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-10;

    #[test]
    fn test_gaussian_new_rejects_negative_variance() {
        assert!(Gaussian::new(0.0, -1.0).is_err());
        assert!(Gaussian::new(0.0, f64::NAN).is_err());
        assert!(Gaussian::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_precision_zero_is_uniform() {
        let g = Gaussian::from_mean_and_precision(5.0, 0.0).unwrap();
        assert!(g.is_uniform());
        assert_eq!(g.mean(), 0.0);
        assert_eq!(g.precision(), 0.0);
    }

    #[test]
    fn test_precision_infinite_is_point_mass() {
        let g = Gaussian::from_mean_and_precision(3.0, f64::INFINITY).unwrap();
        assert!(g.is_point_mass());
        assert_eq!(g.mean(), 3.0);
        assert_eq!(g.precision(), f64::INFINITY);
    }

    #[test]
    fn test_mean_and_precision_roundtrip() {
        let g = Gaussian::from_mean_and_precision(1.5, 4.0).unwrap();
        assert!((g.variance() - 0.25).abs() < TOLERANCE);
        assert!((g.precision() - 4.0).abs() < TOLERANCE);
        assert!((g.std_dev() - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn test_log_prob_standard_normal() {
        let g = Gaussian::standard();
        // log(1/√(2π)) ≈ -0.9189385332
        assert!((g.log_prob(0.0) + 0.918_938_533_2).abs() < 1e-9);
        assert!((g.log_prob(1.0) - g.log_prob(-1.0)).abs() < TOLERANCE);
    }

    #[test]
    fn test_log_prob_limits() {
        assert_eq!(Gaussian::uniform().log_prob(123.0), 0.0);
        assert_eq!(Gaussian::point_mass(1.0).log_prob(1.0), 0.0);
        assert_eq!(Gaussian::point_mass(1.0).log_prob(2.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_plus_minus_sigma() {
        let g = Gaussian::new(2.0, 9.0).unwrap();
        assert_eq!(g.plus_minus_sigma(), [-1.0, 5.0]);
    }

    #[test]
    fn test_product_with_uniform_is_identity() {
        let g = Gaussian::new(1.0, 2.0).unwrap();
        assert_eq!(g.product(&Gaussian::uniform()).unwrap(), g);
        assert_eq!(Gaussian::uniform().product(&g).unwrap(), g);
    }

    #[test]
    fn test_product_of_distinct_point_masses_fails() {
        let a = Gaussian::point_mass(0.0);
        let b = Gaussian::point_mass(1.0);
        assert!(matches!(a.product(&b), Err(ProbError::ZeroProduct { .. })));
        assert_eq!(a.product(&Gaussian::standard()).unwrap(), a);
    }

    #[test]
    fn test_rescale_divides_mean_and_variance() {
        let g = Gaussian::new(4.0, 8.0).unwrap();
        let r = g.rescale(2.0);
        assert!((r.mean() - 2.0).abs() < TOLERANCE);
        assert!((r.variance() - 2.0).abs() < TOLERANCE);
        assert!(Gaussian::uniform().rescale(2.0).is_uniform());
    }

    #[test]
    fn test_display() {
        assert_eq!(Gaussian::uniform().to_string(), "Gaussian.Uniform");
        assert_eq!(Gaussian::new(1.0, 2.0).unwrap().to_string(), "Gaussian(1, 2)");
    }
}
