//! Gamma beliefs over positive reals, in shape/rate form.
//!
//! Used for precision (noise) parameters. The uniform belief is the
//! improper Gamma(1, 0); a point mass is tracked by its location.

use serde::{Deserialize, Serialize};

use super::special::ln_gamma;
use crate::traits::{ClosedUnderProduct, HasLogProb, HasMean, HasUniform, HasVariance, Rescale};
use crate::ProbError;

/// A Gamma belief with density ∝ x^(shape-1) e^(-rate·x).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gamma {
    shape: f64,
    rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    point: Option<f64>,
}

impl Gamma {
    /// Create Gamma(shape, rate).
    ///
    /// # Errors
    /// Returns error if shape is not positive or rate is negative (or either is NaN).
    pub fn from_shape_and_rate(shape: f64, rate: f64) -> Result<Self, ProbError> {
        if shape.is_nan() || shape <= 0.0 {
            return Err(ProbError::InvalidParameter {
                name: "shape".to_string(),
                reason: "shape must be positive".to_string(),
            });
        }
        if rate.is_nan() || rate < 0.0 {
            return Err(ProbError::InvalidParameter {
                name: "rate".to_string(),
                reason: "rate must be non-negative".to_string(),
            });
        }
        Ok(Self {
            shape,
            rate,
            point: None,
        })
    }

    /// The improper uniform belief Gamma(1, 0).
    pub fn uniform() -> Self {
        Self {
            shape: 1.0,
            rate: 0.0,
            point: None,
        }
    }

    /// A point mass at `value`.
    ///
    /// # Errors
    /// Returns error if `value` is negative or NaN.
    pub fn point_mass(value: f64) -> Result<Self, ProbError> {
        if value.is_nan() || value < 0.0 {
            return Err(ProbError::InvalidParameter {
                name: "value".to_string(),
                reason: "gamma point mass must be non-negative".to_string(),
            });
        }
        Ok(Self {
            shape: f64::INFINITY,
            rate: f64::INFINITY,
            point: Some(value),
        })
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_point_mass(&self) -> bool {
        self.point.is_some()
    }

    pub fn is_uniform(&self) -> bool {
        self.point.is_none() && self.shape == 1.0 && self.rate == 0.0
    }

    /// shape / rate (infinite when the rate is zero).
    pub fn mean(&self) -> f64 {
        match self.point {
            Some(v) => v,
            None => self.shape / self.rate,
        }
    }

    /// shape / rate².
    pub fn variance(&self) -> f64 {
        match self.point {
            Some(_) => 0.0,
            None => self.shape / (self.rate * self.rate),
        }
    }

    /// Log density at x. Improper beliefs drop their normalizer.
    pub fn log_prob(&self, x: f64) -> f64 {
        if let Some(v) = self.point {
            return if x == v { 0.0 } else { f64::NEG_INFINITY };
        }
        if x < 0.0 {
            return f64::NEG_INFINITY;
        }
        let power = if self.shape == 1.0 {
            0.0
        } else {
            (self.shape - 1.0) * x.ln()
        };
        if self.rate == 0.0 {
            return power;
        }
        self.shape * self.rate.ln() - ln_gamma(self.shape) + power - self.rate * x
    }
}

impl Default for Gamma {
    fn default() -> Self {
        Self::uniform()
    }
}

impl HasMean for Gamma {
    type Mean = f64;

    fn mean(&self) -> f64 {
        Gamma::mean(self)
    }
}

impl HasVariance for Gamma {
    type Variance = f64;

    fn variance(&self) -> f64 {
        Gamma::variance(self)
    }
}

impl HasUniform for Gamma {
    fn uniform() -> Self {
        Gamma::uniform()
    }

    fn is_uniform(&self) -> bool {
        Gamma::is_uniform(self)
    }
}

impl ClosedUnderProduct for Gamma {
    /// Shapes add (minus one) and rates add.
    fn product(&self, other: &Self) -> Result<Self, ProbError> {
        match (self.point, other.point) {
            (Some(a), Some(b)) if a != b => Err(ProbError::ZeroProduct {
                reason: format!("point masses at {} and {} do not overlap", a, b),
            }),
            (Some(_), _) => Ok(*self),
            (None, Some(_)) => Ok(*other),
            (None, None) => {
                Gamma::from_shape_and_rate(self.shape + other.shape - 1.0, self.rate + other.rate)
            }
        }
    }
}

impl Rescale for Gamma {
    /// X / c ~ Gamma(shape, rate · c) for c > 0.
    fn rescale(&self, divisor: f64) -> Self {
        match self.point {
            Some(v) => Self {
                point: Some(v / divisor),
                ..*self
            },
            None => Self {
                rate: self.rate * divisor,
                ..*self
            },
        }
    }
}

impl HasLogProb<f64> for Gamma {
    fn log_prob(&self, value: f64) -> f64 {
        Gamma::log_prob(self, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_gamma_moments() {
        let g = Gamma::from_shape_and_rate(3.0, 2.0).unwrap();
        assert!((g.mean() - 1.5).abs() < TOLERANCE);
        assert!((g.variance() - 0.75).abs() < TOLERANCE);
    }

    #[test]
    fn test_gamma_rejects_bad_parameters() {
        assert!(Gamma::from_shape_and_rate(0.0, 1.0).is_err());
        assert!(Gamma::from_shape_and_rate(1.0, -1.0).is_err());
        assert!(Gamma::point_mass(-0.5).is_err());
    }

    #[test]
    fn test_gamma_uniform_is_improper() {
        let u = Gamma::uniform();
        assert!(u.is_uniform());
        assert_eq!(u.mean(), f64::INFINITY);
        assert_eq!(u.log_prob(7.0), 0.0);
    }

    #[test]
    fn test_gamma_log_prob_exponential() {
        // Gamma(1, λ) is Exponential(λ): log p(x) = ln λ - λx
        let g = Gamma::from_shape_and_rate(1.0, 2.0).unwrap();
        assert!((g.log_prob(0.5) - (2.0_f64.ln() - 1.0)).abs() < TOLERANCE);
        assert_eq!(g.log_prob(-1.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_gamma_product() {
        let a = Gamma::from_shape_and_rate(2.0, 1.0).unwrap();
        let b = Gamma::from_shape_and_rate(3.0, 4.0).unwrap();
        let p = a.product(&b).unwrap();
        assert_eq!(p.shape(), 4.0);
        assert_eq!(p.rate(), 5.0);
        assert_eq!(a.product(&Gamma::uniform()).unwrap(), a);
    }

    #[test]
    fn test_gamma_rescale_matches_moments() {
        let g = Gamma::from_shape_and_rate(3.0, 2.0).unwrap();
        let r = g.rescale(3.0);
        assert!((r.mean() - g.mean() / 3.0).abs() < TOLERANCE);
        assert!((r.variance() - g.variance() / 9.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_gamma_point_mass() {
        let p = Gamma::point_mass(2.0).unwrap();
        assert_eq!(p.mean(), 2.0);
        assert_eq!(p.variance(), 0.0);
        assert_eq!(p.rescale(4.0).mean(), 0.5);
        let other = Gamma::point_mass(3.0).unwrap();
        assert!(p.product(&other).is_err());
    }
}
