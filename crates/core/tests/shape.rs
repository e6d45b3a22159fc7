//! # Shape and Scope Tests
//!
//! Tests for how the builder checks references and tracks scopes:
//! - Index resolution by range, constant and random integer
//! - Factor operand checking
//! - Nested loop and guard frames
//!
//! These tests verify that a model that declares cleanly is well-shaped.

use infer_core::{
    Condition, CoreError, DeterministicOp, Frame, GraphBuilder, Guard, ModelBuilder, Operand,
    ValueShape, ValueType, VarRef,
};

// ============================================================================
// Index Resolution
// ============================================================================

#[test]
fn test_cloned_range_indexes_original_dimension() {
    let mut builder = ModelBuilder::begin("m");
    let c = builder.declare_range("class", 3);
    let c2 = builder.clone_range(c, "class2").unwrap();
    let s = builder.declare_variable("s", ValueType::Real, &[c]).unwrap();

    assert!(builder.shape_of(&VarRef::new(s).at(c2)).unwrap().is_scalar());
}

#[test]
fn test_range_of_wrong_size_rejected() {
    let mut builder = ModelBuilder::begin("m");
    let c = builder.declare_range("class", 3);
    let f = builder.declare_range("feature", 5);
    let s = builder.declare_variable("s", ValueType::Real, &[c]).unwrap();

    let result = builder.shape_of(&VarRef::new(s).at(f));
    assert_eq!(
        result,
        Err(CoreError::RangeSizeMismatch {
            expected: 3,
            got: 5
        })
    );
}

#[test]
fn test_random_index_must_be_integer() {
    let mut builder = ModelBuilder::begin("m");
    let c = builder.declare_range("class", 3);
    let s = builder.declare_variable("s", ValueType::Real, &[c]).unwrap();
    let x = builder.declare_variable("x", ValueType::Real, &[]).unwrap();

    let result = builder.shape_of(&VarRef::new(s).at(x));
    assert!(matches!(result, Err(CoreError::InvalidIndex { .. })));
}

#[test]
fn test_unbounded_integer_index_accepted() {
    let mut builder = ModelBuilder::begin("m");
    let c = builder.declare_range("class", 3);
    let s = builder.declare_variable("s", ValueType::Real, &[c]).unwrap();
    let i = builder
        .declare_variable("i", ValueType::Int { cardinality: None }, &[])
        .unwrap();

    assert!(builder.shape_of(&VarRef::new(s).at(i)).is_ok());
}

// ============================================================================
// Operand Checks
// ============================================================================

#[test]
fn test_subarray_shape_follows_indices() {
    let mut builder = ModelBuilder::begin("m");
    let f = builder.declare_range("feature", 10);
    let a = builder.declare_range("active", 3);
    let w = builder.declare_variable("w", ValueType::Real, &[f]).unwrap();
    let idx = builder
        .declare_variable("idx", ValueType::Int { cardinality: None }, &[a])
        .unwrap();
    let out = builder.declare_variable("out", ValueType::Real, &[a]).unwrap();
    let wrong = builder.declare_variable("wrong", ValueType::Real, &[f]).unwrap();

    let op = DeterministicOp::Subarray {
        array: VarRef::new(w),
        indices: VarRef::new(idx),
    };
    assert!(builder.add_deterministic(VarRef::new(out), op.clone()).is_ok());
    assert!(matches!(
        builder.add_deterministic(VarRef::new(wrong), op),
        Err(CoreError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_inner_product_of_real_array_and_vector() {
    let mut builder = ModelBuilder::begin("m");
    let a = builder.declare_range("active", 3);
    let vals = builder.declare_variable("vals", ValueType::Real, &[a]).unwrap();
    let w = builder
        .declare_variable("w", ValueType::Vector { dim: 3 }, &[])
        .unwrap();
    let s = builder.declare_variable("s", ValueType::Real, &[]).unwrap();

    let result = builder.add_deterministic(
        VarRef::new(s),
        DeterministicOp::InnerProduct(VarRef::new(vals), VarRef::new(w)),
    );
    assert!(result.is_ok());
}

#[test]
fn test_equal_constraint_needs_scalars() {
    let mut builder = ModelBuilder::begin("m");
    let c = builder.declare_range("class", 2);
    let arr = builder
        .declare_variable("arr", ValueType::discrete(2), &[c])
        .unwrap();

    let result = builder.constrain_equal(Operand::from(arr), Operand::Int(0));
    assert!(matches!(result, Err(CoreError::ShapeMismatch { .. })));
}

#[test]
fn test_is_positive_declares_bool() {
    let mut builder = ModelBuilder::begin("m");
    let x = VarRef::new(builder.declare_variable("x", ValueType::Real, &[]).unwrap());
    let flag = builder.is_positive("flag", x).unwrap();
    assert_eq!(
        builder.shape_of(&flag).unwrap(),
        ValueShape::scalar(ValueType::Bool)
    );
}

// ============================================================================
// Scopes
// ============================================================================

#[test]
fn test_guard_condition_checked_on_push() {
    let mut builder = ModelBuilder::begin("m");
    let x = builder.declare_variable("x", ValueType::Real, &[]).unwrap();
    let result = builder.push_frame(Frame::Guard(Guard::When(Condition::IsTrue(VarRef::new(x)))));
    assert!(result.is_err());
    assert_eq!(builder.open_frames(), 0);
}

#[test]
fn test_nested_when_not_recorded() {
    let mut builder = ModelBuilder::begin("m");
    let label = builder
        .declare_variable("label", ValueType::discrete(3), &[])
        .unwrap();
    let d = VarRef::new(builder.declare_variable("d", ValueType::Real, &[]).unwrap());
    {
        let mut outside = builder
            .when_not(Condition::Equal(Operand::from(label), Operand::Int(2)))
            .unwrap();
        let pos = outside.is_positive("pos", d).unwrap();
        outside.constrain_true(pos).unwrap();
    }

    let model = builder.finish().unwrap();
    let (_, constraint) = model.constraints().next().unwrap();
    assert_eq!(constraint.context.guards.len(), 1);
    assert!(constraint.context.guards[0].is_negated());
    assert!(constraint.context.loops.is_empty());
}
