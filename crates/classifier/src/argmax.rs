//! # Argmax Constraints - Discrete Decisions as Inequalities
//!
//! "Class `c` has the largest score" is encoded as `C - 1` strict
//! pairwise inequalities, one per other class `j`:
//!
//! ```text
//! scoreDiff = score[c] - score[j]
//! posDiff   = scoreDiff > 0
//! constrain posDiff == true
//! ```
//!
//! A *switch* over an integer `argmax` repeats this for every class `k`
//! under the guard `argmax == k`. The guards partition the values of
//! `argmax`, so for any assignment exactly one branch applies.
//!
//! The pairs are chosen from the class index alone. Nothing here looks at
//! score values.

use infer_core::{
    Condition, ConstraintId, DeterministicOp, GraphBuilder, Index, Operand, ValueType, VarRef,
};

use crate::config::ScoreConfig;
use crate::error::ClassifierError;

/// The class that must win.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassIndex {
    /// A fixed class, known when the model is declared.
    Known(usize),
    /// A scalar integer variable (possibly an element such as `labels[n]`).
    Variable(VarRef),
}

/// One strict inequality `scores[winner] - scores[loser] > 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgmaxEntry {
    pub winner: ClassIndex,
    pub loser: usize,
    /// The declared `scoreDiff` scalar.
    pub diff: VarRef,
    /// The `IsTrue(posDiff)` constraint.
    pub constraint: ConstraintId,
}

/// Constraints added by [`constrain_arg_max`], in class order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgmaxConstraintSet {
    pub entries: Vec<ArgmaxEntry>,
}

impl ArgmaxConstraintSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The classes constrained to lose, in order.
    pub fn losers(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.loser).collect()
    }
}

/// One guarded branch of a [`MaximumSwitch`].
#[derive(Debug, Clone, PartialEq)]
pub struct MaximumBranch {
    /// The branch applies while `argmax == class`.
    pub class: usize,
    pub constraints: ArgmaxConstraintSet,
    /// `Equal(class, current)`, if a current variable was linked.
    pub current: Option<ConstraintId>,
}

/// The case switch built by [`constrain_maximum`], one branch per class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaximumSwitch {
    pub branches: Vec<MaximumBranch>,
}

impl MaximumSwitch {
    /// Total number of constraints across all branches.
    pub fn constraint_count(&self) -> usize {
        self.branches
            .iter()
            .map(|b| b.constraints.len() + usize::from(b.current.is_some()))
            .sum()
    }
}

/// Number of classes in a rank-1 real score array.
fn class_count<G: GraphBuilder>(graph: &G, scores: &VarRef) -> Result<usize, ClassifierError> {
    let shape = graph.shape_of(scores)?;
    match (shape.ty, shape.sizes.as_slice()) {
        (ValueType::Real, &[classes]) => Ok(classes),
        _ => Err(ClassifierError::InvalidInput {
            argument: "scores",
            reason: format!("expected a rank-1 real array, got {}", shape),
        }),
    }
}

/// Check that `var` is a scalar integer that can take exactly the values
/// `0..classes`. An integer without a declared cardinality is accepted.
fn check_class_variable<G: GraphBuilder>(
    graph: &G,
    var: &VarRef,
    classes: usize,
    argument: &'static str,
) -> Result<(), ClassifierError> {
    let shape = graph.shape_of(var)?;
    match (shape.ty, shape.is_scalar()) {
        (ValueType::Int { cardinality: None }, true) => Ok(()),
        (ValueType::Int { cardinality: Some(n) }, true) if n == classes => Ok(()),
        (ValueType::Int { cardinality: Some(n) }, true) => Err(ClassifierError::InvalidInput {
            argument,
            reason: format!("takes {} values but there are {} classes", n, classes),
        }),
        _ => Err(ClassifierError::InvalidInput {
            argument,
            reason: format!("expected a scalar int, got {}", shape),
        }),
    }
}

/// Reduce a variable class index to a whole scalar that can index `scores`.
///
/// Indexed references such as `labels[n]` are copied into a fresh
/// `ArgMaxIndex` scalar first.
fn random_index<G: GraphBuilder>(
    graph: &mut G,
    chosen: &VarRef,
    classes: usize,
    config: &ScoreConfig,
) -> Result<VarRef, ClassifierError> {
    if chosen.is_whole() {
        return Ok(chosen.clone());
    }
    let copy = VarRef::new(graph.declare_variable(
        &config.name("ArgMaxIndex"),
        ValueType::discrete(classes),
        &[],
    )?);
    graph.add_deterministic(copy.clone(), DeterministicOp::Copy(chosen.clone()))?;
    Ok(copy)
}

/// Declare `scores[winner] - scores[loser] > 0` and constrain it true.
fn add_inequality<G: GraphBuilder>(
    graph: &mut G,
    scores: &VarRef,
    winner: Index,
    loser: usize,
    config: &ScoreConfig,
) -> Result<(VarRef, ConstraintId), ClassifierError> {
    let diff = graph.difference(
        &config.name("ScoreDiff"),
        scores.at(winner),
        scores.at(loser),
    )?;
    let positive = graph.is_positive(&config.name("PosDiff"), diff.clone())?;
    let constraint = graph.constrain_true(positive)?;
    Ok((diff, constraint))
}

/// Constrain `scores[chosen]` to be strictly larger than every other score.
///
/// With a [`ClassIndex::Known`] index the comparisons are unrolled and the
/// chosen class is skipped, so no class is compared with itself. With a
/// [`ClassIndex::Variable`] index every comparison is declared, each under
/// `when_not(chosen == j)`. A single class yields an empty set.
///
/// # Errors
///
/// [`ClassifierError::InvalidClassIndex`] if a known index is not below
/// the class count. [`ClassifierError::InvalidInput`] if the scores are
/// not `real[C]` or a variable index is not a scalar int over the classes.
/// [`ClassifierError::Graph`] if the graph rejects a declaration.
pub fn constrain_arg_max<G: GraphBuilder>(
    graph: &mut G,
    chosen: &ClassIndex,
    scores: &VarRef,
    config: &ScoreConfig,
) -> Result<ArgmaxConstraintSet, ClassifierError> {
    let classes = class_count(graph, scores)?;
    if let ClassIndex::Known(index) = chosen {
        if *index >= classes {
            return Err(ClassifierError::InvalidClassIndex {
                index: *index,
                classes,
            });
        }
    }

    if let ClassIndex::Variable(var) = chosen {
        check_class_variable(graph, var, classes, "chosen")?;
    }

    let mut set = ArgmaxConstraintSet::default();
    if classes <= 1 {
        tracing::debug!(prefix = %config.prefix, classes, "argmax over a single class is trivial");
        return Ok(set);
    }

    match chosen {
        ClassIndex::Known(winner) => {
            for loser in (0..classes).filter(|j| j != winner) {
                let (diff, constraint) =
                    add_inequality(graph, scores, Index::Const(*winner), loser, config)?;
                set.entries.push(ArgmaxEntry {
                    winner: chosen.clone(),
                    loser,
                    diff,
                    constraint,
                });
            }
        }
        ClassIndex::Variable(var) => {
            let index = random_index(graph, var, classes, config)?;
            for loser in 0..classes {
                let mut other = graph.when_not(Condition::Equal(
                    Operand::Var(index.clone()),
                    Operand::from(loser),
                ))?;
                let (diff, constraint) =
                    add_inequality(&mut *other, scores, Index::Random(index.var), loser, config)?;
                set.entries.push(ArgmaxEntry {
                    winner: chosen.clone(),
                    loser,
                    diff,
                    constraint,
                });
            }
        }
    }

    tracing::debug!(
        prefix = %config.prefix,
        classes,
        constraints = set.len(),
        "argmax constrained"
    );
    Ok(set)
}

/// Build a case switch tying the integer `argmax` to the winning score.
///
/// For every class `k` there is one branch guarded by `argmax == k` that
/// holds [`constrain_arg_max`] for `k`. If `current` is given, the same
/// branch also constrains `current == k`.
///
/// # Errors
///
/// [`ClassifierError::InvalidInput`] if `argmax` is not a scalar int, or if
/// its cardinality differs from the class count: the branches would then
/// not cover every value of `argmax`.
pub fn constrain_maximum<G: GraphBuilder>(
    graph: &mut G,
    argmax: &VarRef,
    scores: &VarRef,
    current: Option<&VarRef>,
    config: &ScoreConfig,
) -> Result<MaximumSwitch, ClassifierError> {
    let classes = class_count(graph, scores)?;
    check_class_variable(graph, argmax, classes, "argmax")?;
    let mut switch = MaximumSwitch::default();

    for class in 0..classes {
        let mut branch = graph.when(Condition::Equal(
            Operand::Var(argmax.clone()),
            Operand::from(class),
        ))?;
        let constraints = constrain_arg_max(&mut *branch, &ClassIndex::Known(class), scores, config)?;
        let current = current
            .map(|c| branch.constrain_equal(Operand::from(class), Operand::Var(c.clone())))
            .transpose()?;
        switch.branches.push(MaximumBranch {
            class,
            constraints,
            current,
        });
    }

    tracing::debug!(
        prefix = %config.prefix,
        classes,
        constraints = switch.constraint_count(),
        "maximum switch declared"
    );
    Ok(switch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use infer_core::{ModelBuilder, RangeId};

    fn scores(builder: &mut ModelBuilder, classes: usize) -> (RangeId, VarRef) {
        let c = builder.declare_range("c", classes);
        let s = builder.declare_variable("s", ValueType::Real, &[c]).unwrap();
        (c, VarRef::new(s))
    }

    #[test]
    fn test_known_index_skips_itself() {
        let mut builder = ModelBuilder::begin("m");
        let (_, s) = scores(&mut builder, 4);
        let set =
            constrain_arg_max(&mut builder, &ClassIndex::Known(2), &s, &ScoreConfig::default())
                .unwrap();
        assert_eq!(set.losers(), vec![0, 1, 3]);
    }

    #[test]
    fn test_known_index_out_of_range() {
        let mut builder = ModelBuilder::begin("m");
        let (_, s) = scores(&mut builder, 3);
        let result =
            constrain_arg_max(&mut builder, &ClassIndex::Known(3), &s, &ScoreConfig::default());
        assert_eq!(
            result,
            Err(ClassifierError::InvalidClassIndex {
                index: 3,
                classes: 3
            })
        );
    }

    #[test]
    fn test_scores_must_be_rank_one_real() {
        let mut builder = ModelBuilder::begin("m");
        let flag = builder.declare_variable("flag", ValueType::Bool, &[]).unwrap();
        let result = constrain_arg_max(
            &mut builder,
            &ClassIndex::Known(0),
            &VarRef::new(flag),
            &ScoreConfig::default(),
        );
        assert!(matches!(
            result,
            Err(ClassifierError::InvalidInput { argument: "scores", .. })
        ));
    }

    #[test]
    fn test_indexed_variable_is_copied_to_a_scalar() {
        let mut builder = ModelBuilder::begin("m");
        let (_, s) = scores(&mut builder, 3);
        let n = builder.declare_range("n", 5);
        let labels = builder
            .declare_variable("labels", ValueType::discrete(3), &[n])
            .unwrap();
        let label = VarRef::new(labels).at(1usize);

        let set = constrain_arg_max(
            &mut builder,
            &ClassIndex::Variable(label),
            &s,
            &ScoreConfig::default(),
        )
        .unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(builder.open_frames(), 0);

        let model = builder.finish().unwrap();
        let copies = model.variables_named("activityArgMaxIndex");
        assert_eq!(copies.len(), 1);
        assert_eq!(model.defining_factor(copies[0]).unwrap().kind.name(), "Copy");
    }
}
