//! # Rank-Typed Belief Arrays
//!
//! A belief array of rank r is a plain nested container: `Vec<Gaussian>`
//! is rank 1, `Vec<Vec<Gaussian>>` is rank 2 (rows may be ragged), and so
//! on. The rank is part of the type, so there is no runtime array-type
//! construction and no reflection.
//!
//! [`Nested`] is the one recursive abstraction every array operation is
//! written against:
//!
//! - each belief type is a leaf (rank 0)
//! - `Vec<A>` adds one level
//! - `Option<A>` marks a level that may be absent
//!
//! An operation defined on leaves lifts to every rank by the rule
//! `project(outer) = outer.map(project)`:
//!
//! ```rust
//! use infer_prob::{Gaussian, Nested};
//!
//! let rows = vec![
//!     vec![Gaussian::new(1.0, 1.0).unwrap()],
//!     vec![Gaussian::new(2.0, 1.0).unwrap(), Gaussian::new(3.0, 1.0).unwrap()],
//! ];
//! let means: Vec<Vec<f64>> = rows.project(&mut |g: &Gaussian| g.mean());
//! assert_eq!(means, vec![vec![1.0], vec![2.0, 3.0]]);
//! assert_eq!(rows.leaf_count(), 3);
//! ```

use crate::belief::{Bernoulli, Beta, Gamma, Gaussian, VectorGaussian};
use crate::ProbError;

/// A nested array with leaves of type [`Nested::Leaf`].
pub trait Nested {
    /// The element type at the bottom of the nesting.
    type Leaf;

    /// The same nesting with leaves replaced by `U`.
    type Projected<U>;

    /// Number of `Vec` levels (absent-markers do not count).
    const RANK: usize;

    /// Map every leaf, keeping the shape.
    fn project<U, F>(&self, f: &mut F) -> Self::Projected<U>
    where
        F: FnMut(&Self::Leaf) -> U;

    /// Map every leaf with a fallible function, stopping at the first error.
    fn try_project<U, E, F>(&self, f: &mut F) -> Result<Self::Projected<U>, E>
    where
        F: FnMut(&Self::Leaf) -> Result<U, E>;

    /// Visit every present leaf in row-major order.
    fn for_each_leaf<F>(&self, f: &mut F)
    where
        F: FnMut(&Self::Leaf);

    /// Number of present leaves.
    fn leaf_count(&self) -> usize {
        let mut n = 0;
        self.for_each_leaf(&mut |_| n += 1);
        n
    }

    /// Fold over corresponding leaves of two arrays of the same shape.
    ///
    /// # Errors
    /// [`ProbError::LengthMismatch`] if any level differs in length, and
    /// [`ProbError::MissingArray`] if either side is absent anywhere.
    fn try_fold_pairs<Acc, F>(&self, other: &Self, init: Acc, f: &mut F) -> Result<Acc, ProbError>
    where
        F: FnMut(Acc, &Self::Leaf, &Self::Leaf) -> Acc;
}

/// Rank-1 belief array.
pub type BeliefArray1<B> = Vec<B>;
/// Rank-2 belief array (rows may be ragged).
pub type BeliefArray2<B> = Vec<Vec<B>>;
/// Rank-3 belief array.
pub type BeliefArray3<B> = Vec<Vec<Vec<B>>>;
/// Rank-4 belief array.
pub type BeliefArray4<B> = Vec<Vec<Vec<Vec<B>>>>;

macro_rules! leaf_belief {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Nested for $ty {
                type Leaf = $ty;
                type Projected<U> = U;
                const RANK: usize = 0;

                fn project<U, F>(&self, f: &mut F) -> U
                where
                    F: FnMut(&Self::Leaf) -> U,
                {
                    f(self)
                }

                fn try_project<U, E, F>(&self, f: &mut F) -> Result<U, E>
                where
                    F: FnMut(&Self::Leaf) -> Result<U, E>,
                {
                    f(self)
                }

                fn for_each_leaf<F>(&self, f: &mut F)
                where
                    F: FnMut(&Self::Leaf),
                {
                    f(self)
                }

                fn try_fold_pairs<Acc, F>(&self, other: &Self, init: Acc, f: &mut F) -> Result<Acc, ProbError>
                where
                    F: FnMut(Acc, &Self::Leaf, &Self::Leaf) -> Acc,
                {
                    Ok(f(init, self, other))
                }
            }
        )*
    };
}

leaf_belief!(Gaussian, Gamma, VectorGaussian, Bernoulli, Beta);

impl<A: Nested> Nested for Vec<A> {
    type Leaf = A::Leaf;
    type Projected<U> = Vec<A::Projected<U>>;
    const RANK: usize = A::RANK + 1;

    fn project<U, F>(&self, f: &mut F) -> Self::Projected<U>
    where
        F: FnMut(&Self::Leaf) -> U,
    {
        self.iter().map(|a| a.project(f)).collect()
    }

    fn try_project<U, E, F>(&self, f: &mut F) -> Result<Self::Projected<U>, E>
    where
        F: FnMut(&Self::Leaf) -> Result<U, E>,
    {
        self.iter().map(|a| a.try_project(f)).collect()
    }

    fn for_each_leaf<F>(&self, f: &mut F)
    where
        F: FnMut(&Self::Leaf),
    {
        for a in self {
            a.for_each_leaf(f);
        }
    }

    fn try_fold_pairs<Acc, F>(&self, other: &Self, init: Acc, f: &mut F) -> Result<Acc, ProbError>
    where
        F: FnMut(Acc, &Self::Leaf, &Self::Leaf) -> Acc,
    {
        if self.len() != other.len() {
            return Err(ProbError::LengthMismatch {
                expected: self.len(),
                got: other.len(),
            });
        }
        self.iter()
            .zip(other)
            .try_fold(init, |acc, (a, b)| a.try_fold_pairs(b, acc, f))
    }
}

impl<A: Nested> Nested for Option<A> {
    type Leaf = A::Leaf;
    type Projected<U> = Option<A::Projected<U>>;
    const RANK: usize = A::RANK;

    fn project<U, F>(&self, f: &mut F) -> Self::Projected<U>
    where
        F: FnMut(&Self::Leaf) -> U,
    {
        self.as_ref().map(|a| a.project(f))
    }

    fn try_project<U, E, F>(&self, f: &mut F) -> Result<Self::Projected<U>, E>
    where
        F: FnMut(&Self::Leaf) -> Result<U, E>,
    {
        self.as_ref().map(|a| a.try_project(f)).transpose()
    }

    fn for_each_leaf<F>(&self, f: &mut F)
    where
        F: FnMut(&Self::Leaf),
    {
        if let Some(a) = self {
            a.for_each_leaf(f);
        }
    }

    fn try_fold_pairs<Acc, F>(&self, other: &Self, init: Acc, f: &mut F) -> Result<Acc, ProbError>
    where
        F: FnMut(Acc, &Self::Leaf, &Self::Leaf) -> Acc,
    {
        match (self, other) {
            (Some(a), Some(b)) => a.try_fold_pairs(b, init, f),
            _ => Err(ProbError::MissingArray {
                operation: "an element-wise comparison",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(mean: f64) -> Gaussian {
        Gaussian::new(mean, 1.0).unwrap()
    }

    #[test]
    fn test_rank_constants() {
        assert_eq!(<Gaussian as Nested>::RANK, 0);
        assert_eq!(<BeliefArray1<Gaussian> as Nested>::RANK, 1);
        assert_eq!(<BeliefArray4<Gamma> as Nested>::RANK, 4);
        assert_eq!(<Vec<Option<Vec<Beta>>> as Nested>::RANK, 2);
    }

    #[test]
    fn test_project_keeps_ragged_shape() {
        let arr: BeliefArray3<Gaussian> = vec![vec![vec![g(1.0)], vec![]], vec![vec![g(2.0), g(3.0)]]];
        let means = arr.project(&mut |b: &Gaussian| b.mean());
        assert_eq!(means, vec![vec![vec![1.0], vec![]], vec![vec![2.0, 3.0]]]);
    }

    #[test]
    fn test_absent_rows_propagate() {
        let arr: Vec<Option<Vec<Gaussian>>> = vec![Some(vec![g(1.0)]), None];
        let means = arr.project(&mut |b: &Gaussian| b.mean());
        assert_eq!(means, vec![Some(vec![1.0]), None]);
        assert_eq!(arr.leaf_count(), 1);
    }

    #[test]
    fn test_try_project_stops_at_first_error() {
        let arr = vec![g(1.0), g(-1.0), g(2.0)];
        let mut visited = 0;
        let result: Result<Vec<f64>, String> = arr.try_project(&mut |b: &Gaussian| {
            visited += 1;
            if b.mean() < 0.0 {
                Err("negative".to_string())
            } else {
                Ok(b.mean())
            }
        });
        assert!(result.is_err());
        assert_eq!(visited, 2);
    }

    #[test]
    fn test_fold_pairs_checks_every_level() {
        let a = vec![vec![g(0.0)], vec![g(1.0)]];
        let b = vec![vec![g(0.0)], vec![g(1.0), g(2.0)]];
        let result = a.try_fold_pairs(&b, 0usize, &mut |n, _, _| n + 1);
        assert_eq!(
            result,
            Err(ProbError::LengthMismatch {
                expected: 1,
                got: 2
            })
        );
    }

    #[test]
    fn test_fold_pairs_missing_side() {
        let a = Some(vec![g(0.0)]);
        let result = a.try_fold_pairs(&None, 0usize, &mut |n, _, _| n + 1);
        assert!(matches!(result, Err(ProbError::MissingArray { .. })));
    }

    #[test]
    fn test_for_each_leaf_row_major() {
        let arr = vec![vec![g(1.0), g(2.0)], vec![g(3.0)]];
        let mut seen = Vec::new();
        arr.for_each_leaf(&mut |b: &Gaussian| seen.push(b.mean()));
        assert_eq!(seen, vec![1.0, 2.0, 3.0]);
    }
}
