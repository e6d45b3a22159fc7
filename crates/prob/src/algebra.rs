//! # Distribution Array Algebra
//!
//! Element-wise operations over belief arrays of any rank:
//!
//! - **Copy and projection**: `copy`, `means`, `variances`,
//!   `standard_deviations`, `precisions`, `independent_approximation`
//! - **Convergence**: `max_diff` between successive posteriors
//! - **Weight diagnostics**: `sparsity`, `row_sparsity`, `normalize`
//! - **Evaluation**: `log_probability_of_truth`
//!
//! Projections are written once against [`Nested`] and lift to every rank:
//!
//! ```rust
//! use infer_prob::algebra::{max_diff, means, DiffMetric};
//! use infer_prob::Gaussian;
//!
//! let before = vec![vec![Gaussian::new(0.0, 1.0).unwrap(), Gaussian::new(1.0, 1.0).unwrap()]];
//! let after = vec![vec![Gaussian::new(0.1, 1.0).unwrap(), Gaussian::new(0.7, 1.0).unwrap()]];
//!
//! assert_eq!(means(&after), vec![vec![0.1, 0.7]]);
//! let change = max_diff(&before, &after, DiffMetric::MeanAbsolute).unwrap();
//! assert!((change - 0.3).abs() < 1e-12);
//! ```
//!
//! ## Absent Arrays
//!
//! `Option` levels pass through copies and projections unchanged. Pairwise
//! comparisons need both sides: an absent array is a
//! [`ProbError::MissingArray`], never a silent zero.

use std::str::FromStr;

use crate::array::Nested;
use crate::belief::{Bernoulli, Gaussian, VectorGaussian};
use crate::traits::{HasMean, HasPrecision, HasVariance, Rescale};
use crate::ProbError;

// ============================================================================
// Copy and Projection
// ============================================================================

/// A deep, independent copy of a belief array.
pub fn copy<A: Nested + Clone>(array: &A) -> A {
    array.clone()
}

/// Element-wise means.
pub fn means<A>(array: &A) -> A::Projected<<A::Leaf as HasMean>::Mean>
where
    A: Nested,
    A::Leaf: HasMean,
{
    array.project(&mut |b: &A::Leaf| b.mean())
}

/// Element-wise variances.
pub fn variances<A>(array: &A) -> A::Projected<<A::Leaf as HasVariance>::Variance>
where
    A: Nested,
    A::Leaf: HasVariance,
{
    array.project(&mut |b: &A::Leaf| b.variance())
}

/// Element-wise standard deviations, √variance.
pub fn standard_deviations<A>(array: &A) -> A::Projected<f64>
where
    A: Nested,
    A::Leaf: HasVariance<Variance = f64>,
{
    array.project(&mut |b: &A::Leaf| b.variance().sqrt())
}

/// Element-wise precisions.
pub fn precisions<A>(array: &A) -> A::Projected<<A::Leaf as HasPrecision>::Precision>
where
    A: Nested,
    A::Leaf: HasPrecision,
{
    array.project(&mut |b: &A::Leaf| b.precision())
}

/// Mean-field approximation of every vector Gaussian in the array.
///
/// Each leaf becomes a `Vec<Gaussian>` whose element i has mean μᵢ and
/// precision Λᵢᵢ.
pub fn independent_approximation<A>(array: &A) -> A::Projected<Vec<Gaussian>>
where
    A: Nested<Leaf = VectorGaussian>,
{
    array.project(&mut VectorGaussian::independent_approximation)
}

// ============================================================================
// Convergence
// ============================================================================

/// The standard per-element distances for [`max_diff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffMetric {
    /// |mean(a) - mean(b)|
    MeanAbsolute,
    /// |σ(a) - σ(b)|
    StdDevAbsolute,
}

impl FromStr for DiffMetric {
    type Err = ProbError;

    fn from_str(keyword: &str) -> Result<Self, Self::Err> {
        match keyword {
            "mean" => Ok(DiffMetric::MeanAbsolute),
            "stddev" => Ok(DiffMetric::StdDevAbsolute),
            other => Err(ProbError::UnknownMetric {
                keyword: other.to_string(),
            }),
        }
    }
}

/// A distance between two beliefs of the same family.
///
/// Implemented by [`DiffMetric`] and by any `Fn(&B, &B) -> f64`.
pub trait DiffFn<B> {
    fn diff(&self, a: &B, b: &B) -> f64;
}

impl<B> DiffFn<B> for DiffMetric
where
    B: HasMean<Mean = f64> + HasVariance<Variance = f64>,
{
    fn diff(&self, a: &B, b: &B) -> f64 {
        match self {
            DiffMetric::MeanAbsolute => (a.mean() - b.mean()).abs(),
            DiffMetric::StdDevAbsolute => (a.variance().sqrt() - b.variance().sqrt()).abs(),
        }
    }
}

impl<B, F> DiffFn<B> for F
where
    F: Fn(&B, &B) -> f64,
{
    fn diff(&self, a: &B, b: &B) -> f64 {
        self(a, b)
    }
}

/// The largest per-element distance between two arrays of the same shape.
///
/// Returns 0.0 for empty arrays. A NaN distance anywhere makes the
/// result NaN.
///
/// # Errors
/// [`ProbError::LengthMismatch`] if any level differs in length;
/// [`ProbError::MissingArray`] if a nested row is absent on either side.
pub fn max_diff<A, M>(a: &A, b: &A, metric: M) -> Result<f64, ProbError>
where
    A: Nested,
    M: DiffFn<A::Leaf>,
{
    let result = a.try_fold_pairs(b, 0.0_f64, &mut |acc, x, y| {
        let d = metric.diff(x, y);
        if acc.is_nan() || d.is_nan() {
            f64::NAN
        } else {
            acc.max(d)
        }
    })?;
    tracing::trace!(max_diff = result, "computed max diff");
    Ok(result)
}

/// [`max_diff`] for callers holding possibly-absent arrays (e.g. the
/// previous iteration's posterior on the first pass).
///
/// # Errors
/// [`ProbError::MissingArray`] if either side is `None`.
pub fn max_diff_optional<A, M>(a: Option<&A>, b: Option<&A>, metric: M) -> Result<f64, ProbError>
where
    A: Nested,
    M: DiffFn<A::Leaf>,
{
    match (a, b) {
        (Some(a), Some(b)) => max_diff(a, b, metric),
        _ => Err(ProbError::MissingArray {
            operation: "max_diff",
        }),
    }
}

// ============================================================================
// Weight Diagnostics
// ============================================================================

/// The fraction of a row's means that are effectively zero.
///
/// With `norm = Σ meanᵢ²`, an element counts as zeroed out when
/// `|meanᵢ| ≤ threshold · norm`. An empty row has sparsity 0.
pub fn sparsity<B>(row: &[B], threshold: f64) -> f64
where
    B: HasMean<Mean = f64>,
{
    if row.is_empty() {
        return 0.0;
    }
    let means: Vec<f64> = row.iter().map(HasMean::mean).collect();
    let norm: f64 = means.iter().map(|m| m * m).sum();
    let cutoff = threshold * norm;
    let zeroed = means.iter().filter(|m| m.abs() <= cutoff).count();
    let result = zeroed as f64 / row.len() as f64;
    tracing::trace!(len = row.len(), zeroed, sparsity = result, "row sparsity");
    result
}

/// [`sparsity`] for every row.
pub fn row_sparsity<B>(rows: &[Vec<B>], threshold: f64) -> Vec<f64>
where
    B: HasMean<Mean = f64>,
{
    rows.iter().map(|row| sparsity(row, threshold)).collect()
}

/// Rescale every row by `norm = Σ meanᵢ²` over that row.
///
/// Each element maps `mean → mean / norm` and `variance → variance / norm²`.
/// The norm is the sum of squared means, not its square root. Empty rows
/// are returned empty.
///
/// # Errors
/// [`ProbError::ZeroNorm`] if a non-empty row has all means zero.
pub fn normalize<B>(rows: &[Vec<B>]) -> Result<Vec<Vec<B>>, ProbError>
where
    B: HasMean<Mean = f64> + Rescale,
{
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            if row.is_empty() {
                return Ok(Vec::new());
            }
            let norm: f64 = row.iter().map(|b| b.mean() * b.mean()).sum();
            if norm == 0.0 {
                return Err(ProbError::ZeroNorm { row: i });
            }
            tracing::trace!(row = i, norm, "normalize row");
            Ok(row.iter().map(|b| b.rescale(norm)).collect())
        })
        .collect()
}

// ============================================================================
// Evaluation
// ============================================================================

/// log P(truthᵢ) under each Bernoulli belief.
///
/// # Errors
/// [`ProbError::LengthMismatch`] if the slices differ in length.
pub fn log_probability_of_truth(beliefs: &[Bernoulli], truth: &[bool]) -> Result<Vec<f64>, ProbError> {
    if beliefs.len() != truth.len() {
        return Err(ProbError::LengthMismatch {
            expected: beliefs.len(),
            got: truth.len(),
        });
    }
    Ok(beliefs
        .iter()
        .zip(truth)
        .map(|(b, &t)| b.log_prob(t))
        .collect())
}

/// Row-wise [`log_probability_of_truth`] over a jagged array.
pub fn log_probability_of_truth_jagged(
    beliefs: &[Vec<Bernoulli>],
    truth: &[Vec<bool>],
) -> Result<Vec<Vec<f64>>, ProbError> {
    if beliefs.len() != truth.len() {
        return Err(ProbError::LengthMismatch {
            expected: beliefs.len(),
            got: truth.len(),
        });
    }
    beliefs
        .iter()
        .zip(truth)
        .map(|(b, t)| log_probability_of_truth(b, t))
        .collect()
}

/// [`log_probability_of_truth`], where an absent input gives an absent result.
pub fn log_probability_of_truth_optional(
    beliefs: Option<&[Bernoulli]>,
    truth: Option<&[bool]>,
) -> Result<Option<Vec<f64>>, ProbError> {
    match (beliefs, truth) {
        (Some(b), Some(t)) => log_probability_of_truth(b, t).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::Gamma;

    const TOLERANCE: f64 = 1e-12;

    fn g(mean: f64, variance: f64) -> Gaussian {
        Gaussian::new(mean, variance).unwrap()
    }

    #[test]
    fn test_copy_is_independent() {
        let original = vec![vec![g(1.0, 1.0)]];
        let mut copied = copy(&original);
        copied[0][0] = g(5.0, 1.0);
        assert_eq!(original[0][0].mean(), 1.0);
    }

    #[test]
    fn test_copy_preserves_absent_rows() {
        let original: Vec<Option<Vec<Gaussian>>> = vec![None, Some(vec![g(0.0, 1.0)])];
        assert_eq!(copy(&original), original);
        let absent: Option<Vec<Gaussian>> = None;
        assert_eq!(copy(&absent), None);
    }

    #[test]
    fn test_projections_rank2() {
        let arr = vec![vec![g(1.0, 4.0)], vec![g(2.0, 9.0), g(3.0, 0.25)]];
        assert_eq!(means(&arr), vec![vec![1.0], vec![2.0, 3.0]]);
        assert_eq!(variances(&arr), vec![vec![4.0], vec![9.0, 0.25]]);
        assert_eq!(standard_deviations(&arr), vec![vec![2.0], vec![3.0, 0.5]]);
        assert_eq!(precisions(&arr), vec![vec![0.25], vec![1.0 / 9.0, 4.0]]);
    }

    #[test]
    fn test_projection_over_gamma() {
        let arr = vec![Gamma::from_shape_and_rate(2.0, 4.0).unwrap()];
        assert_eq!(means(&arr), vec![0.5]);
    }

    #[test]
    fn test_independent_approximation_rank1() {
        let arr = vec![
            VectorGaussian::isotropic(2, 1.0, 0.5).unwrap(),
            VectorGaussian::uniform(2),
        ];
        let approx = independent_approximation(&arr);
        assert_eq!(approx.len(), 2);
        assert!((approx[0][1].precision() - 2.0).abs() < TOLERANCE);
        assert!(approx[1].iter().all(Gaussian::is_uniform));
    }

    #[test]
    fn test_max_diff_reflexive_and_empty() {
        let arr = vec![g(1.0, 1.0), g(-3.0, 2.0)];
        assert_eq!(max_diff(&arr, &arr, DiffMetric::MeanAbsolute).unwrap(), 0.0);
        let empty: Vec<Vec<Gaussian>> = vec![];
        assert_eq!(max_diff(&empty, &empty, DiffMetric::MeanAbsolute).unwrap(), 0.0);
    }

    #[test]
    fn test_max_diff_stddev_metric() {
        let a = vec![g(0.0, 4.0)];
        let b = vec![g(0.0, 1.0)];
        assert_eq!(max_diff(&a, &b, DiffMetric::StdDevAbsolute).unwrap(), 1.0);
    }

    #[test]
    fn test_max_diff_custom_metric() {
        let a = vec![g(0.0, 4.0), g(1.0, 1.0)];
        let b = vec![g(0.0, 1.0), g(1.0, 2.0)];
        let by_variance = |x: &Gaussian, y: &Gaussian| (x.variance() - y.variance()).abs();
        assert_eq!(max_diff(&a, &b, by_variance).unwrap(), 3.0);
    }

    #[test]
    fn test_max_diff_propagates_nan() {
        let a = vec![Gaussian::uniform(), g(0.0, 1.0)];
        let b = vec![Gaussian::uniform(), g(5.0, 1.0)];
        let d = max_diff(&a, &b, DiffMetric::StdDevAbsolute).unwrap();
        assert!(d.is_nan());
    }

    #[test]
    fn test_max_diff_length_mismatch() {
        let a = vec![vec![g(0.0, 1.0)]];
        let b = vec![vec![g(0.0, 1.0)], vec![]];
        assert_eq!(
            max_diff(&a, &b, DiffMetric::MeanAbsolute),
            Err(ProbError::LengthMismatch {
                expected: 1,
                got: 2
            })
        );
    }

    #[test]
    fn test_max_diff_optional_missing() {
        let a = vec![g(0.0, 1.0)];
        let result = max_diff_optional(Some(&a), None, DiffMetric::MeanAbsolute);
        assert_eq!(
            result,
            Err(ProbError::MissingArray {
                operation: "max_diff"
            })
        );
        assert_eq!(
            max_diff_optional(Some(&a), Some(&a), DiffMetric::MeanAbsolute).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_metric_keywords() {
        assert_eq!("mean".parse::<DiffMetric>().unwrap(), DiffMetric::MeanAbsolute);
        assert_eq!("stddev".parse::<DiffMetric>().unwrap(), DiffMetric::StdDevAbsolute);
        assert!(matches!(
            "median".parse::<DiffMetric>(),
            Err(ProbError::UnknownMetric { .. })
        ));
    }

    #[test]
    fn test_sparsity_literal_formula() {
        // means [0, 0.1, 1]: norm = 1.01, cutoff = 0.5 * 1.01
        let row = vec![g(0.0, 1.0), g(0.1, 1.0), g(1.0, 1.0)];
        assert!((sparsity(&row, 0.5) - 2.0 / 3.0).abs() < TOLERANCE);
        assert_eq!(sparsity::<Gaussian>(&[], 0.5), 0.0);
    }

    #[test]
    fn test_sparsity_one_dominant_mean() {
        // norm = 0.01² + 5² + 0.02² = 25.0005, cutoff ≈ 2.50005
        let row = vec![g(0.01, 1.0), g(5.0, 1.0), g(0.02, 1.0)];
        assert!((sparsity(&row, 0.1) - 2.0 / 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_sparsity_cutoff_is_inclusive() {
        // norm = 2, cutoff = 0.5 * 2 = 1: both means sit exactly on it
        let row = vec![g(1.0, 1.0), g(-1.0, 1.0)];
        assert_eq!(sparsity(&row, 0.5), 1.0);
        assert_eq!(sparsity(&row, 0.25), 0.0);
    }

    #[test]
    fn test_row_sparsity() {
        let rows = vec![vec![g(0.0, 1.0), g(0.0, 1.0)], vec![g(3.0, 1.0)], vec![]];
        assert_eq!(row_sparsity(&rows, 0.1), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_normalize_divides_by_sum_of_squares() {
        // norm = 1² + 2² = 5
        let rows = vec![vec![g(1.0, 1.0), g(2.0, 4.0)]];
        let normalized = normalize(&rows).unwrap();
        assert!((normalized[0][0].mean() - 0.2).abs() < TOLERANCE);
        assert!((normalized[0][1].mean() - 0.4).abs() < TOLERANCE);
        assert!((normalized[0][1].variance() - 4.0 / 25.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_normalize_zero_row() {
        let rows = vec![vec![g(1.0, 1.0)], vec![g(0.0, 1.0)]];
        assert_eq!(normalize(&rows), Err(ProbError::ZeroNorm { row: 1 }));
        let empty_row: Vec<Vec<Gaussian>> = vec![vec![]];
        assert_eq!(normalize(&empty_row).unwrap(), vec![Vec::<Gaussian>::new()]);
    }

    #[test]
    fn test_log_probability_of_truth() {
        let beliefs = vec![Bernoulli::new(0.9).unwrap(), Bernoulli::new(0.2).unwrap()];
        let lp = log_probability_of_truth(&beliefs, &[true, false]).unwrap();
        assert!((lp[0] - 0.9_f64.ln()).abs() < TOLERANCE);
        assert!((lp[1] - 0.8_f64.ln()).abs() < TOLERANCE);
        assert!(log_probability_of_truth(&beliefs, &[true]).is_err());
    }

    #[test]
    fn test_log_probability_of_truth_jagged_and_optional() {
        let beliefs = vec![vec![Bernoulli::uniform()], vec![]];
        let lp = log_probability_of_truth_jagged(&beliefs, &[vec![true], vec![]]).unwrap();
        assert!((lp[0][0] - 0.5_f64.ln()).abs() < TOLERANCE);
        assert!(lp[1].is_empty());

        assert_eq!(log_probability_of_truth_optional(None, Some(&[true])).unwrap(), None);
    }
}
