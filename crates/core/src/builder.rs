//! # Graph Builder - The Model-Construction Interface
//!
//! Builders for class scores and argmax constraints are written against
//! [`GraphBuilder`], not a concrete graph. Anything that can declare
//! ranges, variables, factors and constraints can host them.
//!
//! ## Scoped Blocks
//!
//! Loops and conditional blocks are RAII guards. [`GraphBuilder::for_each`]
//! and [`GraphBuilder::when`] push a [`Frame`] and return a [`Scope`]
//! that derefs to the builder; dropping the scope pops the frame. A block
//! is closed on every exit path, including `?` early returns:
//!
//! ```rust
//! use infer_core::{Condition, GraphBuilder, ModelBuilder, Operand, ValueType, VarRef};
//!
//! let mut builder = ModelBuilder::begin("demo");
//! let classes = builder.declare_range("class", 3);
//! let label = builder.declare_variable("label", ValueType::discrete(3), &[]).unwrap();
//! let flag = builder.declare_variable("flag", ValueType::Bool, &[]).unwrap();
//! {
//!     let mut branch = builder
//!         .when(Condition::Equal(Operand::from(label), Operand::Int(0)))
//!         .unwrap();
//!     branch.constrain_true(VarRef::new(flag)).unwrap();
//! } // guard closed here
//! assert_eq!(builder.open_frames(), 0);
//! # let _ = classes;
//! ```

use std::ops::{Deref, DerefMut};

use crate::error::CoreError;
use crate::ops::{Condition, Constraint, DeterministicOp, Frame, Guard, QueryType, StochasticOp};
use crate::shape::{Range, RangeId, ValueShape, ValueType};
use crate::var::{Index, Operand, VarRef, VariableId};

/// Handle to a declared factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FactorId(pub petgraph::graph::NodeIndex);

/// Handle to a declared constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(pub petgraph::graph::NodeIndex);

/// The abstract model-graph building collaborator.
///
/// Implementations append to a mutable model under construction. They are
/// not expected to be thread-safe: one model is declared by one caller.
pub trait GraphBuilder {
    /// Declare an index range of the given size.
    fn declare_range(&mut self, name: &str, size: usize) -> RangeId;

    /// Declare a new range with the same size as an existing one.
    fn clone_range(&mut self, range: RangeId, name: &str) -> Result<RangeId, CoreError>;

    /// Look up a declared range.
    fn range(&self, range: RangeId) -> Result<&Range, CoreError>;

    /// Declare a variable array of element type `ty` over `dims` (outermost first).
    fn declare_variable(
        &mut self,
        name: &str,
        ty: ValueType,
        dims: &[RangeId],
    ) -> Result<VariableId, CoreError>;

    /// The shape of a variable reference after its indices are applied.
    fn shape_of(&self, var: &VarRef) -> Result<ValueShape, CoreError>;

    /// The ranges a reference still spans after its indices are applied.
    fn dims_of(&self, var: &VarRef) -> Result<Vec<RangeId>, CoreError>;

    /// Define `target` as a deterministic function of other variables.
    fn add_deterministic(
        &mut self,
        target: VarRef,
        op: DeterministicOp,
    ) -> Result<FactorId, CoreError>;

    /// Draw `target` from a parametric family.
    fn add_stochastic(&mut self, target: VarRef, op: StochasticOp)
        -> Result<FactorId, CoreError>;

    /// Add a hard constraint.
    fn add_constraint(&mut self, constraint: Constraint) -> Result<ConstraintId, CoreError>;

    /// Ask the inference engine to report this variable.
    fn mark_for_query(&mut self, var: VariableId, query: QueryType) -> Result<(), CoreError>;

    /// Open a scope. Prefer [`for_each`](Self::for_each) / [`when`](Self::when).
    fn push_frame(&mut self, frame: Frame) -> Result<(), CoreError>;

    /// Close the innermost scope.
    fn pop_frame(&mut self) -> Result<Frame, CoreError>;

    /// Open a loop over `range`. Use [`Scope::index`] to index by it.
    fn for_each(&mut self, range: RangeId) -> Result<Scope<'_, Self>, CoreError>
    where
        Self: Sized,
    {
        self.range(range)?;
        self.push_frame(Frame::Loop(range))?;
        Ok(Scope {
            builder: self,
            loop_range: Some(range),
        })
    }

    /// Open a block that applies only while `condition` holds.
    fn when(&mut self, condition: Condition) -> Result<Scope<'_, Self>, CoreError>
    where
        Self: Sized,
    {
        self.push_frame(Frame::Guard(Guard::When(condition)))?;
        Ok(Scope {
            builder: self,
            loop_range: None,
        })
    }

    /// Open a block that applies only while `condition` fails.
    fn when_not(&mut self, condition: Condition) -> Result<Scope<'_, Self>, CoreError>
    where
        Self: Sized,
    {
        self.push_frame(Frame::Guard(Guard::WhenNot(condition)))?;
        Ok(Scope {
            builder: self,
            loop_range: None,
        })
    }

    /// Declare a real scalar `name = a - b`.
    fn difference(&mut self, name: &str, a: VarRef, b: VarRef) -> Result<VarRef, CoreError> {
        let out = VarRef::new(self.declare_variable(name, ValueType::Real, &[])?);
        self.add_deterministic(out.clone(), DeterministicOp::Difference(a, b))?;
        Ok(out)
    }

    /// Declare a real scalar `name = a * b`.
    fn product(&mut self, name: &str, a: VarRef, b: VarRef) -> Result<VarRef, CoreError> {
        let out = VarRef::new(self.declare_variable(name, ValueType::Real, &[])?);
        self.add_deterministic(out.clone(), DeterministicOp::Product(a, b))?;
        Ok(out)
    }

    /// Declare a real scalar `name = Σ array`.
    fn sum(&mut self, name: &str, array: VarRef) -> Result<VarRef, CoreError> {
        let out = VarRef::new(self.declare_variable(name, ValueType::Real, &[])?);
        self.add_deterministic(out.clone(), DeterministicOp::Sum(array))?;
        Ok(out)
    }

    /// Declare a real scalar `name = a · b`.
    fn inner_product(&mut self, name: &str, a: VarRef, b: VarRef) -> Result<VarRef, CoreError> {
        let out = VarRef::new(self.declare_variable(name, ValueType::Real, &[])?);
        self.add_deterministic(out.clone(), DeterministicOp::InnerProduct(a, b))?;
        Ok(out)
    }

    /// Declare a real array `name[i] = array[indices[i]]` over `over`,
    /// which must be the range `indices` spans.
    fn subarray(
        &mut self,
        name: &str,
        array: VarRef,
        indices: VarRef,
        over: RangeId,
    ) -> Result<VarRef, CoreError> {
        let out = VarRef::new(self.declare_variable(name, ValueType::Real, &[over])?);
        self.add_deterministic(out.clone(), DeterministicOp::Subarray { array, indices })?;
        Ok(out)
    }

    /// Declare a real scalar `name ~ N(mean, 1 / precision)`.
    fn gaussian_from_mean_and_precision(
        &mut self,
        name: &str,
        mean: Operand,
        precision: Operand,
    ) -> Result<VarRef, CoreError> {
        let out = VarRef::new(self.declare_variable(name, ValueType::Real, &[])?);
        self.add_stochastic(
            out.clone(),
            StochasticOp::GaussianFromMeanAndPrecision { mean, precision },
        )?;
        Ok(out)
    }

    /// Declare a boolean scalar `name = input > 0`.
    fn is_positive(&mut self, name: &str, input: VarRef) -> Result<VarRef, CoreError> {
        let out = VarRef::new(self.declare_variable(name, ValueType::Bool, &[])?);
        self.add_deterministic(out.clone(), DeterministicOp::IsPositive(input))?;
        Ok(out)
    }

    /// Constrain a boolean to be true.
    fn constrain_true(&mut self, var: VarRef) -> Result<ConstraintId, CoreError> {
        self.add_constraint(Constraint::IsTrue(var))
    }

    /// Constrain two operands to be equal.
    fn constrain_equal(&mut self, a: Operand, b: Operand) -> Result<ConstraintId, CoreError> {
        self.add_constraint(Constraint::Equal(a, b))
    }
}

/// An open loop or conditional block.
///
/// Derefs to the underlying builder so declarations can be made inside the
/// block; the frame is popped when the scope is dropped.
pub struct Scope<'a, G: GraphBuilder> {
    builder: &'a mut G,
    loop_range: Option<RangeId>,
}

impl<G: GraphBuilder> Scope<'_, G> {
    /// The loop index of a `for_each` scope, `None` for conditional blocks.
    pub fn index(&self) -> Option<Index> {
        self.loop_range.map(Index::Range)
    }
}

impl<G: GraphBuilder> Deref for Scope<'_, G> {
    type Target = G;

    fn deref(&self) -> &G {
        self.builder
    }
}

impl<G: GraphBuilder> DerefMut for Scope<'_, G> {
    fn deref_mut(&mut self) -> &mut G {
        self.builder
    }
}

impl<G: GraphBuilder> Drop for Scope<'_, G> {
    fn drop(&mut self) {
        if let Err(err) = self.builder.pop_frame() {
            tracing::warn!(%err, "scope closed with no open frame");
        }
    }
}
