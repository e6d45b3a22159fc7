//! Class score builder tests: factor layout per feature representation.

use infer_classifier::{
    compute_class_scores, compute_sparse_class_scores, DenseFeatures, ScoreConfig,
    SparseFeatureRef, Weights,
};
use infer_core::{
    DeterministicOp, FactorKind, GraphBuilder, Index, Model, ModelBuilder, Operand, QueryType,
    StochasticOp, ValueType, VarRef, VariableId,
};

fn factor_names(model: &Model, var: VariableId) -> Vec<&'static str> {
    model
        .defining_factors(var)
        .into_iter()
        .map(|f| f.kind.name())
        .collect()
}

#[test]
fn vector_features_use_an_inner_product() {
    let mut builder = ModelBuilder::begin("dense");
    let c = builder.declare_range("class", 3);
    let w = builder
        .declare_variable("w", ValueType::Vector { dim: 4 }, &[c])
        .unwrap();
    let x = builder
        .declare_variable("x", ValueType::Vector { dim: 4 }, &[])
        .unwrap();
    let scores = compute_class_scores(
        &mut builder,
        &Weights::Vectors(VarRef::new(w)),
        &DenseFeatures::Vector(VarRef::new(x)),
        Operand::Real(2.0),
        &ScoreConfig::default(),
    )
    .unwrap();
    let model = builder.finish().unwrap();

    assert_eq!(factor_names(&model, scores.clean.var), vec!["InnerProduct"]);
    let noise = model.defining_factor(scores.noisy.var).unwrap();
    assert_eq!(
        noise.kind,
        FactorKind::Stochastic(StochasticOp::GaussianFromMeanAndPrecision {
            mean: Operand::Var(scores.clean.at(scores.classes)),
            precision: Operand::Real(2.0),
        })
    );
    assert_eq!(noise.context.loops, vec![scores.classes]);
    assert_eq!(model.queried(), vec![(scores.noisy.var, QueryType::Marginal)]);
}

#[test]
fn jagged_weights_with_vector_features_use_an_inner_product() {
    let mut builder = ModelBuilder::begin("dense");
    let c = builder.declare_range("class", 2);
    let f = builder.declare_range("feature", 3);
    let w = builder.declare_variable("w", ValueType::Real, &[c, f]).unwrap();
    let x = builder
        .declare_variable("x", ValueType::Vector { dim: 3 }, &[])
        .unwrap();
    let scores = compute_class_scores(
        &mut builder,
        &Weights::Jagged(VarRef::new(w)),
        &DenseFeatures::Vector(VarRef::new(x)),
        Operand::Real(1.0),
        &ScoreConfig::default(),
    )
    .unwrap();
    let model = builder.finish().unwrap();

    assert_eq!(factor_names(&model, scores.clean.var), vec!["InnerProduct"]);
}

#[test]
fn jagged_weights_with_array_features_use_products_and_a_sum() {
    let mut builder = ModelBuilder::begin("ep");
    let c = builder.declare_range("class", 2);
    let f = builder.declare_range("feature", 5);
    let w = builder.declare_variable("w", ValueType::Real, &[c, f]).unwrap();
    let x = builder.declare_variable("x", ValueType::Real, &[f]).unwrap();
    let noise = builder.declare_variable("noise", ValueType::Real, &[]).unwrap();
    let scores = compute_class_scores(
        &mut builder,
        &Weights::Jagged(VarRef::new(w)),
        &DenseFeatures::Array(VarRef::new(x)),
        Operand::from(noise),
        &ScoreConfig::default(),
    )
    .unwrap();
    let model = builder.finish().unwrap();

    let products = model.variables_named("activityProduct");
    assert_eq!(products.len(), 1);
    let product = model.defining_factor(products[0]).unwrap();
    assert_eq!(product.kind.name(), "Product");
    assert_eq!(product.context.loops.len(), 2);
    assert_eq!(product.context.loops[0], scores.classes);

    let sum = model.defining_factor(scores.clean.var).unwrap();
    assert_eq!(
        sum.kind,
        FactorKind::Deterministic(DeterministicOp::Sum(
            VarRef::new(products[0]).at(scores.classes)
        ))
    );
    assert_eq!(sum.context.loops, vec![scores.classes]);
    assert!(model.range(product.context.loops[1]).unwrap().cloned_from == Some(f));
}

#[test]
fn sparse_scores_gather_the_active_weights() {
    let mut builder = ModelBuilder::begin("sparse");
    let c = builder.declare_range("class", 3);
    let f = builder.declare_range("feature", 100);
    let active = builder.declare_range("active", 4);
    let w = builder.declare_variable("w", ValueType::Real, &[c, f]).unwrap();
    let values = builder
        .declare_variable("values", ValueType::Real, &[active])
        .unwrap();
    let indices = builder
        .declare_variable("indices", ValueType::discrete(100), &[active])
        .unwrap();
    let sparse = SparseFeatureRef {
        values: VarRef::new(values),
        indices: VarRef::new(indices),
        active,
    };
    let config = ScoreConfig::default().with_prefix("sensor");
    let scores = compute_sparse_class_scores(
        &mut builder,
        &VarRef::new(w),
        &sparse,
        Operand::Real(1.0),
        &config,
    )
    .unwrap();
    let model = builder.finish().unwrap();

    let gathered = model.variables_named("sensorSparseWeights");
    assert_eq!(gathered.len(), 1);
    assert_eq!(
        model.defining_factor(gathered[0]).unwrap().kind,
        FactorKind::Deterministic(DeterministicOp::Subarray {
            array: VarRef::new(w).at(scores.classes),
            indices: VarRef::new(indices),
        })
    );

    let products = model.variables_named("sensorProduct");
    let product = model.defining_factor(products[0]).unwrap();
    assert_eq!(
        product.kind,
        FactorKind::Deterministic(DeterministicOp::Product(
            VarRef::new(values).at(active),
            VarRef::new(gathered[0]).at(scores.classes).at(Index::Range(active)),
        ))
    );
    assert_eq!(product.context.loops, vec![scores.classes, active]);
    assert_eq!(factor_names(&model, scores.clean.var), vec!["Sum"]);
    assert_eq!(model.queried(), vec![(scores.noisy.var, QueryType::Marginal)]);
    assert!(model.variables_named("sensorNoisyScore").contains(&scores.noisy.var));
}

#[test]
fn configured_query_type_is_attached_to_noisy_scores() {
    let mut builder = ModelBuilder::begin("dense");
    let c = builder.declare_range("class", 2);
    let w = builder
        .declare_variable("w", ValueType::Vector { dim: 2 }, &[c])
        .unwrap();
    let x = builder.declare_variable("x", ValueType::Real, &[c]).unwrap();
    let config = ScoreConfig::default().with_query(QueryType::Samples);
    let scores = compute_class_scores(
        &mut builder,
        &Weights::Vectors(VarRef::new(w)),
        &DenseFeatures::Array(VarRef::new(x)),
        Operand::Real(1.0),
        &config,
    )
    .unwrap();
    let model = builder.finish().unwrap();

    assert_eq!(model.queried(), vec![(scores.noisy.var, QueryType::Samples)]);
    assert!(model.to_string().contains("samples activityNoisyScore"));
}
