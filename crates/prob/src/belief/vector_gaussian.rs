//! Multivariate Gaussian beliefs in mean/precision form.

use serde::{Deserialize, Serialize};

use super::Gaussian;
use crate::traits::{HasMean, HasPrecision};
use crate::ProbError;

/// A multivariate Gaussian belief N(μ, Λ⁻¹).
///
/// Represents a belief over ℝⁿ with:
/// - μ: mean vector (n-dimensional)
/// - Λ: precision matrix (n×n, symmetric, row-major)
///
/// A zero precision matrix is the uniform belief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorGaussian {
    mean: Vec<f64>,
    /// Precision matrix Λ (row-major, n² elements)
    precision: Vec<f64>,
    dim: usize,
}

impl VectorGaussian {
    /// Create a vector Gaussian from a mean vector and a precision matrix.
    ///
    /// # Errors
    /// Returns error if the matrix is not `n × n`, is not symmetric, has a
    /// negative diagonal, or contains NaN.
    pub fn from_mean_and_precision(mean: Vec<f64>, precision: Vec<f64>) -> Result<Self, ProbError> {
        let n = mean.len();
        if precision.len() != n * n {
            return Err(ProbError::DimensionMismatch {
                expected: n * n,
                got: precision.len(),
            });
        }
        if mean.iter().chain(&precision).any(|x| x.is_nan()) {
            return Err(ProbError::InvalidParameter {
                name: "precision".to_string(),
                reason: "parameters must not be NaN".to_string(),
            });
        }

        for i in 0..n {
            for j in 0..i {
                if (precision[i * n + j] - precision[j * n + i]).abs() > 1e-10 {
                    return Err(ProbError::InvalidParameter {
                        name: "precision".to_string(),
                        reason: "precision matrix must be symmetric".to_string(),
                    });
                }
            }
            if precision[i * n + i] < 0.0 {
                return Err(ProbError::InvalidParameter {
                    name: "precision".to_string(),
                    reason: "diagonal elements must be non-negative".to_string(),
                });
            }
        }

        Ok(Self {
            mean,
            precision,
            dim: n,
        })
    }

    /// An isotropic belief: every component has mean `mean`, and the
    /// precision is `I / variance`.
    pub fn isotropic(dim: usize, mean: f64, variance: f64) -> Result<Self, ProbError> {
        if variance.is_nan() || variance < 0.0 {
            return Err(ProbError::InvalidParameter {
                name: "variance".to_string(),
                reason: "variance must be non-negative".to_string(),
            });
        }
        let tau = 1.0 / variance;
        let mut precision = vec![0.0; dim * dim];
        for i in 0..dim {
            precision[i * dim + i] = tau;
        }
        Self::from_mean_and_precision(vec![mean; dim], precision)
    }

    /// The uniform belief over ℝⁿ: zero mean, zero precision.
    pub fn uniform(dim: usize) -> Self {
        Self {
            mean: vec![0.0; dim],
            precision: vec![0.0; dim * dim],
            dim,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn mean_vector(&self) -> &[f64] {
        &self.mean
    }

    /// Get element (i, j) of the precision matrix.
    ///
    /// # Panics
    /// Panics if `i` or `j` is not below `dim`.
    pub fn precision_at(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.dim && j < self.dim, "precision index out of range");
        self.precision[i * self.dim + j]
    }

    pub fn is_uniform(&self) -> bool {
        self.precision.iter().all(|&p| p == 0.0)
    }

    /// Mean-field approximation: component `i` becomes N(μᵢ, 1/Λᵢᵢ).
    ///
    /// Off-diagonal correlations are discarded.
    pub fn independent_approximation(&self) -> Vec<Gaussian> {
        (0..self.dim)
            .map(|i| Gaussian::from_valid_precision(self.mean[i], self.precision_at(i, i)))
            .collect()
    }
}

impl HasMean for VectorGaussian {
    type Mean = Vec<f64>;

    fn mean(&self) -> Vec<f64> {
        self.mean.clone()
    }
}

impl HasPrecision for VectorGaussian {
    /// Row-major precision matrix.
    type Precision = Vec<f64>;

    fn precision(&self) -> Vec<f64> {
        self.precision.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn test_isotropic_precision() {
        let v = VectorGaussian::isotropic(3, 1.0, 0.5).unwrap();
        assert_eq!(v.dim(), 3);
        assert_eq!(v.mean_vector(), &[1.0, 1.0, 1.0]);
        assert!((v.precision_at(1, 1) - 2.0).abs() < TOLERANCE);
        assert_eq!(v.precision_at(0, 2), 0.0);
    }

    #[test]
    fn test_rejects_non_square_precision() {
        let result = VectorGaussian::from_mean_and_precision(vec![0.0; 2], vec![1.0; 3]);
        assert_eq!(
            result,
            Err(ProbError::DimensionMismatch {
                expected: 4,
                got: 3
            })
        );
    }

    #[test]
    fn test_rejects_asymmetric_precision() {
        let result =
            VectorGaussian::from_mean_and_precision(vec![0.0; 2], vec![1.0, 0.5, 0.0, 1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_independent_approximation_uses_diagonal() {
        let v = VectorGaussian::from_mean_and_precision(
            vec![1.0, -2.0],
            vec![4.0, 0.3, 0.3, 0.5],
        )
        .unwrap();
        let marginals = v.independent_approximation();
        assert_eq!(marginals.len(), 2);
        assert!((marginals[0].mean() - 1.0).abs() < TOLERANCE);
        assert!((marginals[0].precision() - 4.0).abs() < TOLERANCE);
        assert!((marginals[1].mean() + 2.0).abs() < TOLERANCE);
        assert!((marginals[1].variance() - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_uniform_approximates_to_uniform() {
        let marginals = VectorGaussian::uniform(2).independent_approximation();
        assert!(marginals.iter().all(Gaussian::is_uniform));
    }
}
