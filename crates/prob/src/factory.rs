//! # Distribution Factory
//!
//! Builds belief arrays of rank 1 to 4 from a shape and per-element
//! parameter sources.
//!
//! ## Shapes
//!
//! The outer extent is always a single length. Each inner extent is a
//! [`Dim`]: either a fixed length for every parent, or one length per
//! index of the *immediately enclosing* dimension, which yields a ragged
//! array.
//!
//! ## Parameter Sources
//!
//! A [`ParamSource`] is a constant `f64` or a zero-argument generator
//! wrapped with [`generate`]. Generators are called once per element in
//! row-major order and receive no index; close over a counter if the
//! value should depend on position.
//!
//! ```rust
//! use infer_prob::factory::{gaussian_array, generate, Dim, Shape2};
//!
//! let mut next = 0.0;
//! let weights = gaussian_array(
//!     &Shape2(2, Dim::PerIndex(vec![1, 3])),
//!     generate(|| { next += 1.0; next }),
//!     1.0,
//! )
//! .unwrap();
//!
//! assert_eq!(weights[1].len(), 3);
//! assert_eq!(weights[1][2].mean(), 4.0);
//! ```

use crate::belief::{Gamma, Gaussian, VectorGaussian};
use crate::traits::HasUniform;
use crate::ProbError;

// ============================================================================
// Shapes
// ============================================================================

/// The extent of an inner dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dim {
    /// Every parent has the same length.
    Fixed(usize),
    /// Parent `i` has length `lengths[i]`.
    PerIndex(Vec<usize>),
}

impl Dim {
    /// The length under parent index `parent`.
    fn extent(&self, parent: usize) -> usize {
        match self {
            Dim::Fixed(n) => *n,
            Dim::PerIndex(lengths) => lengths[parent],
        }
    }

    /// Check the per-index lengths line up with the enclosing extent.
    fn check(&self, enclosing: usize, level: usize) {
        if let Dim::PerIndex(lengths) = self {
            assert!(
                lengths.len() == enclosing,
                "per-index extent at level {} has {} entries but the enclosing dimension has {}",
                level,
                lengths.len(),
                enclosing
            );
        }
    }
}

impl From<usize> for Dim {
    fn from(n: usize) -> Self {
        Dim::Fixed(n)
    }
}

impl From<Vec<usize>> for Dim {
    fn from(lengths: Vec<usize>) -> Self {
        Dim::PerIndex(lengths)
    }
}

/// Shape of a rank-1 array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape1(pub usize);

/// Shape of a rank-2 array: outer length, row extent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape2(pub usize, pub Dim);

/// Shape of a rank-3 array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape3(pub usize, pub Dim, pub Dim);

/// Shape of a rank-4 array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape4(pub usize, pub Dim, pub Dim, pub Dim);

/// A shape that can be filled element by element.
///
/// # Panics
/// Building panics if a [`Dim::PerIndex`] has a different number of
/// entries than its enclosing dimension has elements.
pub trait ArrayShape {
    type Array<T>;

    /// Fill the shape in row-major order, stopping at the first error.
    fn try_build<T, E, F>(&self, f: &mut F) -> Result<Self::Array<T>, E>
    where
        F: FnMut() -> Result<T, E>;

    /// Fill the shape in row-major order.
    fn build<T, F>(&self, f: &mut F) -> Self::Array<T>
    where
        F: FnMut() -> T,
    {
        match self.try_build(&mut || Ok::<T, std::convert::Infallible>(f())) {
            Ok(array) => array,
            Err(never) => match never {},
        }
    }
}

fn row<T, E, F>(n: usize, f: &mut F) -> Result<Vec<T>, E>
where
    F: FnMut() -> Result<T, E>,
{
    (0..n).map(|_| f()).collect()
}

impl ArrayShape for Shape1 {
    type Array<T> = Vec<T>;

    fn try_build<T, E, F>(&self, f: &mut F) -> Result<Vec<T>, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        row(self.0, f)
    }
}

impl ArrayShape for Shape2 {
    type Array<T> = Vec<Vec<T>>;

    fn try_build<T, E, F>(&self, f: &mut F) -> Result<Vec<Vec<T>>, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.1.check(self.0, 1);
        (0..self.0)
            .map(|i| row(self.1.extent(i), f))
            .collect::<Result<Vec<_>, E>>()
    }
}

impl ArrayShape for Shape3 {
    type Array<T> = Vec<Vec<Vec<T>>>;

    fn try_build<T, E, F>(&self, f: &mut F) -> Result<Vec<Vec<Vec<T>>>, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.1.check(self.0, 1);
        (0..self.0)
            .map(|i| {
                let n = self.1.extent(i);
                self.2.check(n, 2);
                (0..n)
                    .map(|j| row(self.2.extent(j), f))
                    .collect::<Result<Vec<_>, E>>()
            })
            .collect::<Result<Vec<_>, E>>()
    }
}

impl ArrayShape for Shape4 {
    type Array<T> = Vec<Vec<Vec<Vec<T>>>>;

    fn try_build<T, E, F>(&self, f: &mut F) -> Result<Vec<Vec<Vec<Vec<T>>>>, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.1.check(self.0, 1);
        (0..self.0)
            .map(|i| {
                let n = self.1.extent(i);
                self.2.check(n, 2);
                (0..n)
                    .map(|j| {
                        let p = self.2.extent(j);
                        self.3.check(p, 3);
                        (0..p)
                            .map(|k| row(self.3.extent(k), f))
                            .collect::<Result<Vec<_>, E>>()
                    })
                    .collect::<Result<Vec<_>, E>>()
            })
            .collect::<Result<Vec<_>, E>>()
    }
}

// ============================================================================
// Parameter Sources
// ============================================================================

/// Supplies one parameter value per array element.
pub trait ParamSource {
    fn next_value(&mut self) -> f64;
}

impl ParamSource for f64 {
    fn next_value(&mut self) -> f64 {
        *self
    }
}

/// A generator-backed parameter source. Build with [`generate`].
#[derive(Debug, Clone)]
pub struct Generate<F>(F);

/// Wrap a zero-argument generator as a [`ParamSource`].
pub fn generate<F: FnMut() -> f64>(f: F) -> Generate<F> {
    Generate(f)
}

impl<F: FnMut() -> f64> ParamSource for Generate<F> {
    fn next_value(&mut self) -> f64 {
        (self.0)()
    }
}

// ============================================================================
// Belief Arrays
// ============================================================================

/// An array of uniform (improper) beliefs, the initial message-passing state.
pub fn uniform_array<S: ArrayShape, B: HasUniform>(shape: &S) -> S::Array<B> {
    shape.build(&mut B::uniform)
}

/// An array of Gaussians N(mean, variance).
pub fn gaussian_array<S, M, V>(
    shape: &S,
    mut mean: M,
    mut variance: V,
) -> Result<S::Array<Gaussian>, ProbError>
where
    S: ArrayShape,
    M: ParamSource,
    V: ParamSource,
{
    shape.try_build(&mut || Gaussian::new(mean.next_value(), variance.next_value()))
}

/// An array of Gaussians from mean and precision.
pub fn gaussian_array_from_mean_and_precision<S, M, P>(
    shape: &S,
    mut mean: M,
    mut precision: P,
) -> Result<S::Array<Gaussian>, ProbError>
where
    S: ArrayShape,
    M: ParamSource,
    P: ParamSource,
{
    shape.try_build(&mut || {
        Gaussian::from_mean_and_precision(mean.next_value(), precision.next_value())
    })
}

/// An array of Gamma(shape, rate) beliefs.
pub fn gamma_array<S, A, R>(
    shape: &S,
    mut shape_param: A,
    mut rate: R,
) -> Result<S::Array<Gamma>, ProbError>
where
    S: ArrayShape,
    A: ParamSource,
    R: ParamSource,
{
    shape.try_build(&mut || Gamma::from_shape_and_rate(shape_param.next_value(), rate.next_value()))
}

/// An array of isotropic vector Gaussians of dimension `dim`.
///
/// Each element draws one mean (broadcast to every component) and one
/// variance (the precision matrix is `I / variance`).
pub fn vector_gaussian_array<S, M, V>(
    shape: &S,
    dim: usize,
    mut mean: M,
    mut variance: V,
) -> Result<S::Array<VectorGaussian>, ProbError>
where
    S: ArrayShape,
    M: ParamSource,
    V: ParamSource,
{
    shape.try_build(&mut || VectorGaussian::isotropic(dim, mean.next_value(), variance.next_value()))
}

// ============================================================================
// Plain Arrays
// ============================================================================

/// An array with every element equal to `value`.
pub fn filled<S: ArrayShape, T: Clone>(shape: &S, value: T) -> S::Array<T> {
    shape.build(&mut || value.clone())
}

/// An array of zeros.
pub fn zeros<S: ArrayShape>(shape: &S) -> S::Array<f64> {
    filled(shape, 0.0)
}

/// `count` zero vectors of dimension `dim`.
pub fn vector_zeros(count: usize, dim: usize) -> Vec<Vec<f64>> {
    vec![vec![0.0; dim]; count]
}

/// `[start, start + 1, ..., start + count - 1]` as reals.
pub fn double_range(start: i64, count: usize) -> Vec<f64> {
    (0..count).map(|i| (start + i as i64) as f64).collect()
}
