//! Bayes Point Machine: Declaring a Multiclass Model and Checking Convergence
//!
//! Run with: cargo run -p infer-classifier --example bayes_point_machine
//!
//! This example demonstrates:
//! - Declaring weights, features and a label on a recording model builder
//! - Gamma and uniform priors on the noise precision and the label
//! - Noisy class scores, dense and sparse
//! - The argmax switch that ties the label to the winning score
//! - Uniform initial posteriors from the factory
//! - The convergence and sparsity diagnostics run between iterations
//!
//! Key insight: a discrete label becomes C - 1 strict inequalities per branch,
//! so message passing only ever sees continuous factors.

use infer_classifier::{
    compute_class_scores, compute_sparse_class_scores, constrain_arg_max, constrain_maximum,
    ClassIndex, DenseFeatures, ScoreConfig, SparseFeatureRef, Weights,
};
use infer_core::{GraphBuilder, ModelBuilder, Operand, QueryType, StochasticOp, ValueType, VarRef};
use infer_prob::algebra::{max_diff, means, normalize, row_sparsity, DiffMetric};
use infer_prob::factory::{gaussian_array, generate, uniform_array};
use infer_prob::{Dim, Gaussian, Shape2};

const CLASSES: usize = 3;
const FEATURES: usize = 4;

fn main() {
    println!("=== Bayes Point Machine: Model Declaration and Diagnostics ===\n");

    // -------------------------------------------------------------------------
    // 1. Dense Scores and the Argmax Switch
    // -------------------------------------------------------------------------
    println!("1. Dense Scores and the Argmax Switch");
    println!("-------------------------------------\n");

    let mut builder = ModelBuilder::begin("bpm");
    let class = builder.declare_range("class", CLASSES);
    let weights = builder
        .declare_variable("weights", ValueType::Vector { dim: FEATURES }, &[class])
        .unwrap();
    let features = builder
        .declare_variable("features", ValueType::Vector { dim: FEATURES }, &[])
        .unwrap();
    let label = builder
        .declare_variable("label", ValueType::discrete(CLASSES), &[])
        .unwrap();
    let noise = builder
        .declare_variable("noisePrecision", ValueType::Real, &[])
        .unwrap();
    builder
        .add_stochastic(
            VarRef::new(noise),
            StochasticOp::GammaFromShapeAndRate {
                shape: Operand::Real(1.0),
                rate: Operand::Real(1.0),
            },
        )
        .unwrap();
    builder
        .add_stochastic(
            VarRef::new(label),
            StochasticOp::DiscreteUniform { size: CLASSES },
        )
        .unwrap();

    let config = ScoreConfig::default();
    let scores = compute_class_scores(
        &mut builder,
        &Weights::Vectors(VarRef::new(weights)),
        &DenseFeatures::Vector(VarRef::new(features)),
        Operand::from(noise),
        &config,
    )
    .unwrap();
    let switch =
        constrain_maximum(&mut builder, &VarRef::new(label), &scores.noisy, None, &config).unwrap();

    let model = builder.finish().unwrap();
    print!("{}", model);
    for branch in &switch.branches {
        println!(
            "  branch label == {}: score[{}] beats {:?}",
            branch.class,
            branch.class,
            branch.constraints.losers()
        );
    }
    println!("  Constraints in switch: {}", switch.constraint_count());
    println!();

    // -------------------------------------------------------------------------
    // 2. Sparse Scores for a Known Class
    // -------------------------------------------------------------------------
    println!("2. Sparse Scores for a Known Class");
    println!("----------------------------------\n");

    let mut builder = ModelBuilder::begin("sparse-bpm");
    let class = builder.declare_range("class", CLASSES);
    let feature = builder.declare_range("feature", 1000);
    let active = builder.declare_range("active", 5);
    let weights = builder
        .declare_variable("weights", ValueType::Real, &[class, feature])
        .unwrap();
    let values = builder
        .declare_variable("values", ValueType::Real, &[active])
        .unwrap();
    let indices = builder
        .declare_variable("indices", ValueType::discrete(1000), &[active])
        .unwrap();

    let config = ScoreConfig::default()
        .with_prefix("sensor")
        .with_query(QueryType::Samples);
    let sparse = SparseFeatureRef {
        values: VarRef::new(values),
        indices: VarRef::new(indices),
        active,
    };
    let scores = compute_sparse_class_scores(
        &mut builder,
        &VarRef::new(weights),
        &sparse,
        Operand::Real(10.0),
        &config,
    )
    .unwrap();
    let set = constrain_arg_max(&mut builder, &ClassIndex::Known(2), &scores.noisy, &config)
        .unwrap();

    let model = builder.finish().unwrap();
    print!("{}", model);
    println!("  Class 2 must beat classes {:?}", set.losers());
    println!();

    // -------------------------------------------------------------------------
    // 3. Posteriors and Convergence
    // -------------------------------------------------------------------------
    println!("3. Posteriors and Convergence");
    println!("-----------------------------\n");

    let shape = Shape2(CLASSES, Dim::Fixed(FEATURES));
    let initial: Vec<Vec<Gaussian>> = uniform_array(&shape);
    println!("Initial weights: {:?}", initial[0][0]);

    // Synthetic snapshots from three iterations of an external engine.
    let mut previous: Vec<Vec<Gaussian>> = gaussian_array(&shape, 0.0, 1.0).unwrap();
    for iteration in 1..=3 {
        let step = 1.0 / f64::from(iteration * iteration);
        let mut k = 0.0;
        let current = gaussian_array(
            &shape,
            generate(|| {
                k += 1.0;
                (k % 3.0) * step
            }),
            0.5,
        )
        .unwrap();
        let change = max_diff(&previous, &current, DiffMetric::MeanAbsolute).unwrap();
        println!("  iteration {}: max mean change = {:.4}", iteration, change);
        previous = current;
    }
    println!();

    println!("Final means: {:?}", means(&previous));
    println!("Row sparsity (threshold 0.1): {:?}", row_sparsity(&previous, 0.1));
    let normalized = normalize(&previous).unwrap();
    println!("Normalized row 0: {:?}", means(&normalized[0]));
}
