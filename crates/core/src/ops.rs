//! Factor, constraint and condition vocabulary understood by a graph builder.
//!
//! These are declarations, not computations: an inference engine reads
//! them back from the finished [`Model`](crate::Model) and decides how to
//! pass messages through them.

use std::fmt;

use crate::shape::RangeId;
use crate::var::{Operand, VarRef};

/// A deterministic factor `target = op(inputs)`.
#[derive(Debug, Clone, PartialEq)]
pub enum DeterministicOp {
    /// Inner product of two vectors, or of a real array with a vector.
    InnerProduct(VarRef, VarRef),
    /// Product of two real scalars.
    Product(VarRef, VarRef),
    /// Sum over a rank-1 real array.
    Sum(VarRef),
    /// Difference of two real scalars, `a - b`.
    Difference(VarRef, VarRef),
    /// Gather `array[indices[i]]` for every `i`.
    Subarray { array: VarRef, indices: VarRef },
    /// Identity copy.
    Copy(VarRef),
    /// `input > 0`, as a boolean.
    IsPositive(VarRef),
}

impl DeterministicOp {
    /// Short name of the factor.
    pub fn name(&self) -> &'static str {
        match self {
            DeterministicOp::InnerProduct(..) => "InnerProduct",
            DeterministicOp::Product(..) => "Product",
            DeterministicOp::Sum(_) => "Sum",
            DeterministicOp::Difference(..) => "Difference",
            DeterministicOp::Subarray { .. } => "Subarray",
            DeterministicOp::Copy(_) => "Copy",
            DeterministicOp::IsPositive(_) => "IsPositive",
        }
    }

    /// The variable references this factor reads.
    pub fn inputs(&self) -> Vec<&VarRef> {
        match self {
            DeterministicOp::InnerProduct(a, b)
            | DeterministicOp::Product(a, b)
            | DeterministicOp::Difference(a, b) => vec![a, b],
            DeterministicOp::Subarray { array, indices } => vec![array, indices],
            DeterministicOp::Sum(a) | DeterministicOp::Copy(a) | DeterministicOp::IsPositive(a) => {
                vec![a]
            }
        }
    }
}

/// A stochastic factor `target ~ family(parameters)`.
#[derive(Debug, Clone, PartialEq)]
pub enum StochasticOp {
    GaussianFromMeanAndPrecision { mean: Operand, precision: Operand },
    GammaFromShapeAndRate { shape: Operand, rate: Operand },
    /// Uniform over `{0..size}`.
    DiscreteUniform { size: usize },
}

impl StochasticOp {
    pub fn name(&self) -> &'static str {
        match self {
            StochasticOp::GaussianFromMeanAndPrecision { .. } => "GaussianFromMeanAndPrecision",
            StochasticOp::GammaFromShapeAndRate { .. } => "GammaFromShapeAndRate",
            StochasticOp::DiscreteUniform { .. } => "DiscreteUniform",
        }
    }

    pub fn inputs(&self) -> Vec<&VarRef> {
        match self {
            StochasticOp::GaussianFromMeanAndPrecision { mean, precision } => {
                [mean, precision].into_iter().filter_map(Operand::as_var).collect()
            }
            StochasticOp::GammaFromShapeAndRate { shape, rate } => {
                [shape, rate].into_iter().filter_map(Operand::as_var).collect()
            }
            StochasticOp::DiscreteUniform { .. } => vec![],
        }
    }
}

/// A hard constraint on the model.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// The boolean variable must be true.
    IsTrue(VarRef),
    /// The two operands must be equal.
    Equal(Operand, Operand),
}

impl Constraint {
    pub fn inputs(&self) -> Vec<&VarRef> {
        match self {
            Constraint::IsTrue(v) => vec![v],
            Constraint::Equal(a, b) => [a, b].into_iter().filter_map(Operand::as_var).collect(),
        }
    }
}

/// A condition that can guard a block of declarations.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The two operands are equal (typically an integer variable and a class index).
    Equal(Operand, Operand),
    /// The boolean variable is true.
    IsTrue(VarRef),
}

impl Condition {
    pub fn inputs(&self) -> Vec<&VarRef> {
        match self {
            Condition::Equal(a, b) => [a, b].into_iter().filter_map(Operand::as_var).collect(),
            Condition::IsTrue(v) => vec![v],
        }
    }
}

/// A guard for a conditional block: the condition must hold (or fail).
#[derive(Debug, Clone, PartialEq)]
pub enum Guard {
    When(Condition),
    WhenNot(Condition),
}

impl Guard {
    pub fn condition(&self) -> &Condition {
        match self {
            Guard::When(c) | Guard::WhenNot(c) => c,
        }
    }

    pub fn is_negated(&self) -> bool {
        matches!(self, Guard::WhenNot(_))
    }
}

/// One open scope on the builder's stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Declarations inside are replicated over the range.
    Loop(RangeId),
    /// Declarations inside only apply while the guard holds.
    Guard(Guard),
}

/// The enclosing loops and guards at the point a node was declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    pub loops: Vec<RangeId>,
    pub guards: Vec<Guard>,
}

impl Context {
    pub(crate) fn from_frames(frames: &[Frame]) -> Self {
        let mut context = Context::default();
        for frame in frames {
            match frame {
                Frame::Loop(r) => context.loops.push(*r),
                Frame::Guard(g) => context.guards.push(g.clone()),
            }
        }
        context
    }

    /// True if declared outside every loop and guard.
    pub fn is_top_level(&self) -> bool {
        self.loops.is_empty() && self.guards.is_empty()
    }
}

/// What an inference engine should report for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Marginal,
    Samples,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryType::Marginal => write!(f, "marginal"),
            QueryType::Samples => write!(f, "samples"),
        }
    }
}
