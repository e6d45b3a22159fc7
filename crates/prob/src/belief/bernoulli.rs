//! Beliefs over booleans and over probabilities.

use serde::{Deserialize, Serialize};

use super::special::ln_beta;
use crate::traits::{ClosedUnderProduct, HasLogProb, HasMean, HasUniform, HasVariance};
use crate::ProbError;

/// A Bernoulli belief: P(true) = `prob_true`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bernoulli {
    prob_true: f64,
}

impl Bernoulli {
    /// # Errors
    /// Returns error if `prob_true` is outside [0, 1].
    pub fn new(prob_true: f64) -> Result<Self, ProbError> {
        if !(0.0..=1.0).contains(&prob_true) {
            return Err(ProbError::InvalidParameter {
                name: "prob_true".to_string(),
                reason: format!("probability must lie in [0, 1], got {}", prob_true),
            });
        }
        Ok(Self { prob_true })
    }

    pub fn point_mass(value: bool) -> Self {
        Self {
            prob_true: if value { 1.0 } else { 0.0 },
        }
    }

    pub fn uniform() -> Self {
        Self { prob_true: 0.5 }
    }

    pub fn prob_true(&self) -> f64 {
        self.prob_true
    }

    /// log P(value).
    pub fn log_prob(&self, value: bool) -> f64 {
        if value {
            self.prob_true.ln()
        } else {
            (1.0 - self.prob_true).ln()
        }
    }
}

impl HasMean for Bernoulli {
    type Mean = f64;

    fn mean(&self) -> f64 {
        self.prob_true
    }
}

impl HasVariance for Bernoulli {
    type Variance = f64;

    fn variance(&self) -> f64 {
        self.prob_true * (1.0 - self.prob_true)
    }
}

impl HasUniform for Bernoulli {
    fn uniform() -> Self {
        Bernoulli::uniform()
    }

    fn is_uniform(&self) -> bool {
        self.prob_true == 0.5
    }
}

impl ClosedUnderProduct for Bernoulli {
    fn product(&self, other: &Self) -> Result<Self, ProbError> {
        let t = self.prob_true * other.prob_true;
        let f = (1.0 - self.prob_true) * (1.0 - other.prob_true);
        if t + f == 0.0 {
            return Err(ProbError::ZeroProduct {
                reason: "beliefs are certain of opposite values".to_string(),
            });
        }
        Ok(Self {
            prob_true: t / (t + f),
        })
    }
}

impl HasLogProb<bool> for Bernoulli {
    fn log_prob(&self, value: bool) -> f64 {
        Bernoulli::log_prob(self, value)
    }
}

/// A Beta belief over a probability, in pseudo-count form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beta {
    true_count: f64,
    false_count: f64,
}

impl Beta {
    /// # Errors
    /// Returns error if either count is not positive.
    pub fn new(true_count: f64, false_count: f64) -> Result<Self, ProbError> {
        for (name, count) in [("true_count", true_count), ("false_count", false_count)] {
            if count.is_nan() || count <= 0.0 {
                return Err(ProbError::InvalidParameter {
                    name: name.to_string(),
                    reason: "pseudo-count must be positive".to_string(),
                });
            }
        }
        Ok(Self {
            true_count,
            false_count,
        })
    }

    /// Beta(1, 1).
    pub fn uniform() -> Self {
        Self {
            true_count: 1.0,
            false_count: 1.0,
        }
    }

    pub fn true_count(&self) -> f64 {
        self.true_count
    }

    pub fn false_count(&self) -> f64 {
        self.false_count
    }

    pub fn mean(&self) -> f64 {
        self.true_count / (self.true_count + self.false_count)
    }

    pub fn variance(&self) -> f64 {
        let total = self.true_count + self.false_count;
        self.true_count * self.false_count / (total * total * (total + 1.0))
    }

    pub fn log_prob(&self, x: f64) -> f64 {
        if !(0.0..=1.0).contains(&x) {
            return f64::NEG_INFINITY;
        }
        (self.true_count - 1.0) * x.ln() + (self.false_count - 1.0) * (1.0 - x).ln()
            - ln_beta(self.true_count, self.false_count)
    }
}

impl HasMean for Beta {
    type Mean = f64;

    fn mean(&self) -> f64 {
        Beta::mean(self)
    }
}

impl HasVariance for Beta {
    type Variance = f64;

    fn variance(&self) -> f64 {
        Beta::variance(self)
    }
}

impl HasUniform for Beta {
    fn uniform() -> Self {
        Beta::uniform()
    }

    fn is_uniform(&self) -> bool {
        self.true_count == 1.0 && self.false_count == 1.0
    }
}

impl ClosedUnderProduct for Beta {
    fn product(&self, other: &Self) -> Result<Self, ProbError> {
        Beta::new(
            self.true_count + other.true_count - 1.0,
            self.false_count + other.false_count - 1.0,
        )
    }
}

impl HasLogProb<f64> for Beta {
    fn log_prob(&self, value: f64) -> f64 {
        Beta::log_prob(self, value)
    }
}
