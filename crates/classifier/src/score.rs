//! # Class Scores - Linear Scores Plus Gaussian Noise
//!
//! Every builder here declares, for a class range `k`:
//!
//! ```text
//! score[k]      = w[k] · x
//! noisyScore[k] ~ N(score[k], 1 / noisePrecision)
//! ```
//!
//! and marks `noisyScore` for the configured query. How `w[k] · x` is
//! spelled depends on the representation of weights and features:
//!
//! | Weights   | Features   | Factors                                           |
//! |-----------|------------|---------------------------------------------------|
//! | `Vectors` | any        | `InnerProduct(w[k], x)`                           |
//! | `Jagged`  | `Vector`   | `InnerProduct(w[k], x)`                           |
//! | `Jagged`  | `Array`    | `p[k][f] = w[k][f] * x[f]`, `score[k] = Sum(p[k])` |
//! | sparse    | sparse     | gather `w[k][indices]`, then as above             |
//!
//! The product-then-sum form keeps every factor scalar, which suits
//! expectation propagation better than a single inner product.

use infer_core::{DeterministicOp, GraphBuilder, Operand, RangeId, StochasticOp, ValueType, VarRef};

use crate::config::ScoreConfig;
use crate::error::ClassifierError;

/// Per-class weights.
#[derive(Debug, Clone, PartialEq)]
pub enum Weights {
    /// `vector<d>[classes]`: one weight vector per class.
    Vectors(VarRef),
    /// `real[classes][features]`: one real array per class.
    Jagged(VarRef),
}

impl Weights {
    pub fn var(&self) -> &VarRef {
        match self {
            Weights::Vectors(v) | Weights::Jagged(v) => v,
        }
    }
}

/// A dense feature observation.
#[derive(Debug, Clone, PartialEq)]
pub enum DenseFeatures {
    /// A scalar `vector<d>`.
    Vector(VarRef),
    /// `real[features]`.
    Array(VarRef),
}

/// A sparse feature observation: `values[a]` is the value of feature
/// `indices[a]`, for `a` over the `active` range.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseFeatureRef {
    pub values: VarRef,
    pub indices: VarRef,
    pub active: RangeId,
}

/// The arrays declared by a score builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScores {
    /// `noisyScore[classes]`, marked for query.
    pub noisy: VarRef,
    /// `score[classes]`, the noise-free linear scores.
    pub clean: VarRef,
    /// The cloned class range both arrays are declared over.
    pub classes: RangeId,
}

/// The class range a weight array is declared over, checking its rank.
fn class_range<G: GraphBuilder>(
    graph: &G,
    weights: &VarRef,
    rank: usize,
) -> Result<RangeId, ClassifierError> {
    let dims = graph.dims_of(weights)?;
    if dims.len() != rank {
        return Err(ClassifierError::InvalidInput {
            argument: "weights",
            reason: format!("expected an array of rank {}, got rank {}", rank, dims.len()),
        });
    }
    Ok(dims[0])
}

/// Declare `score` and `noisyScore` over a clone of `classes`.
fn declare_scores<G: GraphBuilder>(
    graph: &mut G,
    classes: RangeId,
    config: &ScoreConfig,
) -> Result<(RangeId, VarRef, VarRef), ClassifierError> {
    let k = graph.clone_range(classes, &config.name("Clone"))?;
    let clean = VarRef::new(graph.declare_variable(&config.name("Score"), ValueType::Real, &[k])?);
    let noisy = VarRef::new(graph.declare_variable(
        &config.name("NoisyScore"),
        ValueType::Real,
        &[k],
    )?);
    graph.mark_for_query(noisy.var, config.query)?;
    Ok((k, clean, noisy))
}

/// `noisy[k] ~ N(clean[k], 1 / noise_precision)` inside an open loop over `k`.
fn add_noise<G: GraphBuilder>(
    graph: &mut G,
    scores: &ClassScores,
    noise_precision: &Operand,
) -> Result<(), ClassifierError> {
    let k = scores.classes;
    graph.add_stochastic(
        scores.noisy.at(k),
        StochasticOp::GaussianFromMeanAndPrecision {
            mean: Operand::Var(scores.clean.at(k)),
            precision: noise_precision.clone(),
        },
    )?;
    Ok(())
}

/// Declare one noisy score per class from dense weights and features.
///
/// `noise_precision` is usually a literal or a scalar real variable with
/// its own prior.
pub fn compute_class_scores<G: GraphBuilder>(
    graph: &mut G,
    weights: &Weights,
    features: &DenseFeatures,
    noise_precision: Operand,
    config: &ScoreConfig,
) -> Result<ClassScores, ClassifierError> {
    let rank = match weights {
        Weights::Vectors(_) => 1,
        Weights::Jagged(_) => 2,
    };
    let classes = class_range(graph, weights.var(), rank)?;
    let (k, clean, noisy) = declare_scores(graph, classes, config)?;
    let scores = ClassScores { noisy, clean, classes: k };

    match (weights, features) {
        (Weights::Jagged(w), DenseFeatures::Array(x)) => {
            let dims = graph.dims_of(x)?;
            let &[feature_range] = dims.as_slice() else {
                return Err(ClassifierError::InvalidInput {
                    argument: "features",
                    reason: format!("expected a rank-1 real array, got rank {}", dims.len()),
                });
            };
            let f = graph.clone_range(feature_range, &config.name("FeatureClone"))?;
            let products = VarRef::new(graph.declare_variable(
                &config.name("Product"),
                ValueType::Real,
                &[k, f],
            )?);

            let mut per_class = graph.for_each(k)?;
            {
                let mut per_feature = per_class.for_each(f)?;
                per_feature.add_deterministic(
                    products.at(k).at(f),
                    DeterministicOp::Product(w.at(k).at(f), x.at(f)),
                )?;
            }
            per_class.add_deterministic(
                scores.clean.at(k),
                DeterministicOp::Sum(products.at(k)),
            )?;
            add_noise(&mut *per_class, &scores, &noise_precision)?;
        }
        (w, DenseFeatures::Vector(x) | DenseFeatures::Array(x)) => {
            let mut per_class = graph.for_each(k)?;
            per_class.add_deterministic(
                scores.clean.at(k),
                DeterministicOp::InnerProduct(w.var().at(k), x.clone()),
            )?;
            add_noise(&mut *per_class, &scores, &noise_precision)?;
        }
    }

    tracing::debug!(
        prefix = %config.prefix,
        classes = graph.range(k)?.size,
        "class scores declared"
    );
    Ok(scores)
}

/// Declare one noisy score per class from a sparse observation.
///
/// `weights` is `real[classes][features]`. Only the weights at the
/// observation's `indices` are gathered, so the factors scale with the
/// active range rather than the full feature dimension. Indices outside
/// the feature range are the caller's contract.
pub fn compute_sparse_class_scores<G: GraphBuilder>(
    graph: &mut G,
    weights: &VarRef,
    features: &SparseFeatureRef,
    noise_precision: Operand,
    config: &ScoreConfig,
) -> Result<ClassScores, ClassifierError> {
    let classes = class_range(graph, weights, 2)?;
    let (k, clean, noisy) = declare_scores(graph, classes, config)?;
    let scores = ClassScores { noisy, clean, classes: k };
    let a = features.active;

    let sparse_weights = VarRef::new(graph.declare_variable(
        &config.name("SparseWeights"),
        ValueType::Real,
        &[k, a],
    )?);
    let products = VarRef::new(graph.declare_variable(
        &config.name("Product"),
        ValueType::Real,
        &[k, a],
    )?);

    let mut per_class = graph.for_each(k)?;
    per_class.add_deterministic(
        sparse_weights.at(k),
        DeterministicOp::Subarray {
            array: weights.at(k),
            indices: features.indices.clone(),
        },
    )?;
    {
        let mut per_active = per_class.for_each(a)?;
        per_active.add_deterministic(
            products.at(k).at(a),
            DeterministicOp::Product(features.values.at(a), sparse_weights.at(k).at(a)),
        )?;
    }
    per_class.add_deterministic(scores.clean.at(k), DeterministicOp::Sum(products.at(k)))?;
    add_noise(&mut *per_class, &scores, &noise_precision)?;
    drop(per_class);

    tracing::debug!(
        prefix = %config.prefix,
        classes = graph.range(k)?.size,
        active = graph.range(a)?.size,
        "sparse class scores declared"
    );
    Ok(scores)
}
