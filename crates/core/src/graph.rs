//! # Model Graph - Declared Variables, Factors and Constraints
//!
//! A model is a directed graph with three kinds of node:
//!
//! - **Variable**: a declared array over some ranges
//! - **Factor**: a deterministic or stochastic definition of one target
//! - **Constraint**: a hard condition on existing variables
//!
//! Edges run from every variable a node reads to that node, and from a
//! factor to the variable it defines. Each factor and constraint records
//! the [`Context`] (loops and guards) open when it was declared, which is
//! how a conditional block survives into the finished [`Model`].
//!
//! ## Lifetime
//!
//! [`ModelBuilder::begin`] opens a model; [`ModelBuilder::finish`]
//! consumes the builder and yields a read-only [`Model`]. Nothing can be
//! added after finishing.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::fmt;

use crate::builder::{ConstraintId, FactorId, GraphBuilder};
use crate::error::CoreError;
use crate::ops::{Condition, Constraint, Context, DeterministicOp, Frame, QueryType, StochasticOp};
use crate::shape::{Range, RangeId, Shape, ValueShape, ValueType};
use crate::var::{Index, Operand, VarRef, VariableId};

/// A declared variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableNode {
    pub name: String,
    pub shape: Shape,
    pub query: Option<QueryType>,
    /// Loops open at declaration: the variable is replicated over them.
    pub context: Context,
}

/// How a factor defines its target.
#[derive(Debug, Clone, PartialEq)]
pub enum FactorKind {
    Deterministic(DeterministicOp),
    Stochastic(StochasticOp),
}

impl FactorKind {
    pub fn name(&self) -> &'static str {
        match self {
            FactorKind::Deterministic(op) => op.name(),
            FactorKind::Stochastic(op) => op.name(),
        }
    }
}

/// A declared factor `target = kind(...)` or `target ~ kind(...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorNode {
    pub kind: FactorKind,
    pub target: VarRef,
    pub context: Context,
}

/// A declared constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintNode {
    pub constraint: Constraint,
    pub context: Context,
}

/// A node in the model graph.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelNode {
    Variable(VariableNode),
    Factor(FactorNode),
    Constraint(ConstraintNode),
}

/// An edge in the model graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// The source variable is read by the target factor or constraint.
    Input,
    /// The source factor defines the target variable.
    Output,
    /// The source variable appears in a guard around the target.
    Guard,
}

/// The recording [`GraphBuilder`]: a model under construction.
#[derive(Debug)]
pub struct ModelBuilder {
    name: String,
    graph: DiGraph<ModelNode, Edge>,
    ranges: Vec<Range>,
    frames: Vec<Frame>,
}

impl ModelBuilder {
    /// Begin declaring a new model.
    pub fn begin(name: impl Into<String>) -> Self {
        let name = name.into();
        tracing::debug!(model = %name, "begin model");
        Self {
            name,
            graph: DiGraph::new(),
            ranges: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// The model's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of currently open scopes.
    pub fn open_frames(&self) -> usize {
        self.frames.len()
    }

    /// Finish the model, returning the read-only graph.
    ///
    /// Fails if a frame pushed with [`GraphBuilder::push_frame`] was never popped.
    pub fn finish(self) -> Result<Model, CoreError> {
        if !self.frames.is_empty() {
            return Err(CoreError::OpenScopes {
                model: self.name,
                open: self.frames.len(),
            });
        }
        tracing::debug!(
            model = %self.name,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "finish model"
        );
        Ok(Model {
            name: self.name,
            graph: self.graph,
            ranges: self.ranges,
        })
    }

    fn variable_node(&self, var: VariableId) -> Result<&VariableNode, CoreError> {
        match self.graph.node_weight(var.0) {
            Some(ModelNode::Variable(v)) => Ok(v),
            Some(_) => Err(CoreError::UnknownVariable {
                reason: format!("node {:?} is not a variable", var.0),
            }),
            None => Err(CoreError::UnknownVariable {
                reason: format!("node {:?} not found", var.0),
            }),
        }
    }

    fn check_index(&self, index: &Index, dim: &Range) -> Result<(), CoreError> {
        match index {
            Index::Range(r) => {
                let range = self.range(*r)?;
                if range.size != dim.size {
                    return Err(CoreError::RangeSizeMismatch {
                        expected: dim.size,
                        got: range.size,
                    });
                }
            }
            Index::Const(i) => {
                if *i >= dim.size {
                    return Err(CoreError::IndexOutOfRange {
                        index: *i,
                        size: dim.size,
                    });
                }
            }
            Index::Random(v) => {
                let node = self.variable_node(*v)?;
                match (node.shape.ty, node.shape.rank()) {
                    (ValueType::Int { cardinality }, 0) => {
                        if let Some(n) = cardinality {
                            if n != dim.size {
                                return Err(CoreError::RangeSizeMismatch {
                                    expected: dim.size,
                                    got: n,
                                });
                            }
                        }
                    }
                    _ => {
                        return Err(CoreError::InvalidIndex {
                            name: node.name.clone(),
                            reason: format!(
                                "expected a scalar int, got {} of rank {}",
                                node.shape.ty,
                                node.shape.rank()
                            ),
                        })
                    }
                }
            }
        }
        Ok(())
    }

    fn operand_shape(&self, operand: &Operand) -> Result<ValueShape, CoreError> {
        match operand {
            Operand::Var(v) => self.shape_of(v),
            Operand::Int(_) => Ok(ValueShape::scalar(ValueType::Int { cardinality: None })),
            Operand::Real(_) => Ok(ValueShape::scalar(ValueType::Real)),
        }
    }

    fn expect_shape(
        &self,
        context: &str,
        expected: ValueShape,
        got: ValueShape,
    ) -> Result<(), CoreError> {
        if got.is_compatible(&expected) {
            Ok(())
        } else {
            Err(CoreError::ShapeMismatch {
                context: context.to_string(),
                expected,
                got,
            })
        }
    }

    /// The result shape of a deterministic op, checking its inputs.
    fn deterministic_shape(&self, op: &DeterministicOp) -> Result<ValueShape, CoreError> {
        let real = ValueShape::scalar(ValueType::Real);
        match op {
            DeterministicOp::InnerProduct(a, b) => {
                let sa = self.shape_of(a)?;
                let sb = self.shape_of(b)?;
                let ok = match (&sa, &sb) {
                    (l, r) if l.is_scalar() && r.is_scalar() => matches!(
                        (l.ty, r.ty),
                        (ValueType::Vector { dim: x }, ValueType::Vector { dim: y }) if x == y
                    ),
                    (l, r) if r.is_scalar() && l.sizes.len() == 1 => matches!(
                        (l.ty, r.ty),
                        (ValueType::Real, ValueType::Vector { dim }) if dim == l.sizes[0]
                    ),
                    (l, r) if l.is_scalar() && r.sizes.len() == 1 => matches!(
                        (l.ty, r.ty),
                        (ValueType::Vector { dim }, ValueType::Real) if dim == r.sizes[0]
                    ),
                    _ => false,
                };
                if !ok {
                    return Err(CoreError::ShapeMismatch {
                        context: "InnerProduct".to_string(),
                        expected: sa,
                        got: sb,
                    });
                }
                Ok(real)
            }
            DeterministicOp::Product(a, b) | DeterministicOp::Difference(a, b) => {
                self.expect_shape(op.name(), real.clone(), self.shape_of(a)?)?;
                self.expect_shape(op.name(), real.clone(), self.shape_of(b)?)?;
                Ok(real)
            }
            DeterministicOp::Sum(a) => {
                let sa = self.shape_of(a)?;
                if sa.ty != ValueType::Real || sa.sizes.len() != 1 {
                    return Err(CoreError::ShapeMismatch {
                        context: "Sum".to_string(),
                        expected: ValueShape::new(ValueType::Real, vec![sa.sizes.first().copied().unwrap_or(0)]),
                        got: sa,
                    });
                }
                Ok(real)
            }
            DeterministicOp::Subarray { array, indices } => {
                let sa = self.shape_of(array)?;
                let si = self.shape_of(indices)?;
                if sa.ty != ValueType::Real || sa.sizes.len() != 1 {
                    return Err(CoreError::ShapeMismatch {
                        context: "Subarray array".to_string(),
                        expected: ValueShape::new(ValueType::Real, vec![0]),
                        got: sa,
                    });
                }
                if !si.ty.is_compatible(&ValueType::Int { cardinality: None }) || si.sizes.len() != 1 {
                    return Err(CoreError::ShapeMismatch {
                        context: "Subarray indices".to_string(),
                        expected: ValueShape::new(ValueType::Int { cardinality: None }, vec![0]),
                        got: si,
                    });
                }
                Ok(ValueShape::new(ValueType::Real, si.sizes))
            }
            DeterministicOp::Copy(a) => self.shape_of(a),
            DeterministicOp::IsPositive(a) => {
                self.expect_shape("IsPositive", real, self.shape_of(a)?)?;
                Ok(ValueShape::scalar(ValueType::Bool))
            }
        }
    }

    fn stochastic_shape(&self, op: &StochasticOp) -> Result<ValueShape, CoreError> {
        let real = ValueShape::scalar(ValueType::Real);
        match op {
            StochasticOp::GaussianFromMeanAndPrecision { mean, precision } => {
                self.expect_shape("Gaussian mean", real.clone(), self.operand_shape(mean)?)?;
                self.expect_shape("Gaussian precision", real.clone(), self.operand_shape(precision)?)?;
                Ok(real)
            }
            StochasticOp::GammaFromShapeAndRate { shape, rate } => {
                self.expect_shape("Gamma shape", real.clone(), self.operand_shape(shape)?)?;
                self.expect_shape("Gamma rate", real.clone(), self.operand_shape(rate)?)?;
                Ok(real)
            }
            StochasticOp::DiscreteUniform { size } => {
                Ok(ValueShape::scalar(ValueType::discrete(*size)))
            }
        }
    }

    /// Both sides of an equality must be scalars of compatible type.
    fn check_equal(&self, context: &str, a: &Operand, b: &Operand) -> Result<(), CoreError> {
        let sa = self.operand_shape(a)?;
        let sb = self.operand_shape(b)?;
        if !sa.is_scalar() {
            return Err(CoreError::ShapeMismatch {
                context: context.to_string(),
                expected: ValueShape::scalar(sa.ty),
                got: sa,
            });
        }
        self.expect_shape(context, sa, sb)
    }

    fn check_condition(&self, condition: &Condition) -> Result<(), CoreError> {
        match condition {
            Condition::Equal(a, b) => self.check_equal("condition", a, b),
            Condition::IsTrue(v) => {
                self.expect_shape("condition", ValueShape::scalar(ValueType::Bool), self.shape_of(v)?)
            }
        }
    }

    /// Variables referenced by a reference, including random indices.
    fn referenced(var: &VarRef) -> impl Iterator<Item = VariableId> + '_ {
        std::iter::once(var.var).chain(var.indices.iter().filter_map(|i| match i {
            Index::Random(v) => Some(*v),
            _ => None,
        }))
    }

    /// Add a node and wire its inputs, guards and (for factors) its target.
    fn insert(
        &mut self,
        node: ModelNode,
        inputs: Vec<VarRef>,
        target: Option<VariableId>,
    ) -> NodeIndex {
        let guard_vars: Vec<VariableId> = self
            .frames
            .iter()
            .filter_map(|f| match f {
                Frame::Guard(g) => Some(g.condition().inputs()),
                Frame::Loop(_) => None,
            })
            .flatten()
            .flat_map(|v| Self::referenced(v).collect::<Vec<_>>())
            .collect();

        let idx = self.graph.add_node(node);
        for input in &inputs {
            for var in Self::referenced(input) {
                self.graph.add_edge(var.0, idx, Edge::Input);
            }
        }
        for var in guard_vars {
            self.graph.add_edge(var.0, idx, Edge::Guard);
        }
        if let Some(t) = target {
            self.graph.add_edge(idx, t.0, Edge::Output);
        }
        idx
    }
}

impl GraphBuilder for ModelBuilder {
    fn declare_range(&mut self, name: &str, size: usize) -> RangeId {
        let id = RangeId(self.ranges.len());
        tracing::trace!(model = %self.name, range = name, size, "declare range");
        self.ranges.push(Range {
            id,
            name: name.to_string(),
            size,
            cloned_from: None,
        });
        id
    }

    fn clone_range(&mut self, range: RangeId, name: &str) -> Result<RangeId, CoreError> {
        let size = self.range(range)?.size;
        let id = self.declare_range(name, size);
        self.ranges[id.0].cloned_from = Some(range);
        Ok(id)
    }

    fn range(&self, range: RangeId) -> Result<&Range, CoreError> {
        self.ranges
            .get(range.0)
            .ok_or(CoreError::UnknownRange(range))
    }

    fn declare_variable(
        &mut self,
        name: &str,
        ty: ValueType,
        dims: &[RangeId],
    ) -> Result<VariableId, CoreError> {
        for &d in dims {
            self.range(d)?;
        }
        tracing::trace!(model = %self.name, variable = name, %ty, rank = dims.len(), "declare variable");
        let node = VariableNode {
            name: name.to_string(),
            shape: Shape::new(ty, dims.to_vec()),
            query: None,
            context: Context::from_frames(&self.frames),
        };
        Ok(VariableId(self.graph.add_node(ModelNode::Variable(node))))
    }

    fn shape_of(&self, var: &VarRef) -> Result<ValueShape, CoreError> {
        let node = self.variable_node(var.var)?;
        if var.indices.len() > node.shape.rank() {
            return Err(CoreError::TooManyIndices {
                name: node.name.clone(),
                rank: node.shape.rank(),
                got: var.indices.len(),
            });
        }
        for (index, dim) in var.indices.iter().zip(&node.shape.dims) {
            let dim = self.range(*dim)?;
            self.check_index(index, dim)?;
        }
        let sizes = node.shape.dims[var.indices.len()..]
            .iter()
            .map(|d| self.range(*d).map(|r| r.size))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ValueShape::new(node.shape.ty, sizes))
    }

    fn dims_of(&self, var: &VarRef) -> Result<Vec<RangeId>, CoreError> {
        self.shape_of(var)?;
        let node = self.variable_node(var.var)?;
        Ok(node.shape.dims[var.indices.len()..].to_vec())
    }

    fn add_deterministic(
        &mut self,
        target: VarRef,
        op: DeterministicOp,
    ) -> Result<FactorId, CoreError> {
        let produced = self.deterministic_shape(&op)?;
        self.expect_shape(op.name(), produced, self.shape_of(&target)?)?;
        tracing::trace!(model = %self.name, factor = op.name(), "add deterministic factor");

        let inputs = op.inputs().into_iter().cloned().collect();
        let node = ModelNode::Factor(FactorNode {
            kind: FactorKind::Deterministic(op),
            target: target.clone(),
            context: Context::from_frames(&self.frames),
        });
        Ok(FactorId(self.insert(node, inputs, Some(target.var))))
    }

    fn add_stochastic(
        &mut self,
        target: VarRef,
        op: StochasticOp,
    ) -> Result<FactorId, CoreError> {
        let produced = self.stochastic_shape(&op)?;
        self.expect_shape(op.name(), produced, self.shape_of(&target)?)?;
        tracing::trace!(model = %self.name, factor = op.name(), "add stochastic factor");

        let inputs = op.inputs().into_iter().cloned().collect();
        let node = ModelNode::Factor(FactorNode {
            kind: FactorKind::Stochastic(op),
            target: target.clone(),
            context: Context::from_frames(&self.frames),
        });
        Ok(FactorId(self.insert(node, inputs, Some(target.var))))
    }

    fn add_constraint(&mut self, constraint: Constraint) -> Result<ConstraintId, CoreError> {
        match &constraint {
            Constraint::IsTrue(v) => self.expect_shape(
                "IsTrue",
                ValueShape::scalar(ValueType::Bool),
                self.shape_of(v)?,
            )?,
            Constraint::Equal(a, b) => self.check_equal("Equal", a, b)?,
        }
        tracing::trace!(model = %self.name, guards = self.frames.len(), "add constraint");

        let inputs = constraint.inputs().into_iter().cloned().collect();
        let node = ModelNode::Constraint(ConstraintNode {
            constraint,
            context: Context::from_frames(&self.frames),
        });
        Ok(ConstraintId(self.insert(node, inputs, None)))
    }

    fn mark_for_query(&mut self, var: VariableId, query: QueryType) -> Result<(), CoreError> {
        self.variable_node(var)?;
        if let Some(ModelNode::Variable(v)) = self.graph.node_weight_mut(var.0) {
            tracing::trace!(model = %self.name, variable = %v.name, %query, "mark for query");
            v.query = Some(query);
        }
        Ok(())
    }

    fn push_frame(&mut self, frame: Frame) -> Result<(), CoreError> {
        match &frame {
            Frame::Loop(r) => {
                self.range(*r)?;
            }
            Frame::Guard(g) => self.check_condition(g.condition())?,
        }
        tracing::trace!(model = %self.name, depth = self.frames.len() + 1, "open scope");
        self.frames.push(frame);
        Ok(())
    }

    fn pop_frame(&mut self) -> Result<Frame, CoreError> {
        let frame = self.frames.pop().ok_or(CoreError::NoOpenScope)?;
        tracing::trace!(model = %self.name, depth = self.frames.len(), "close scope");
        Ok(frame)
    }
}

/// A finished, read-only model graph.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    graph: DiGraph<ModelNode, Edge>,
    ranges: Vec<Range>,
}

impl Model {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying graph.
    pub fn graph(&self) -> &DiGraph<ModelNode, Edge> {
        &self.graph
    }

    pub fn range(&self, range: RangeId) -> Option<&Range> {
        self.ranges.get(range.0)
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn variable(&self, var: VariableId) -> Option<&VariableNode> {
        match self.graph.node_weight(var.0) {
            Some(ModelNode::Variable(v)) => Some(v),
            _ => None,
        }
    }

    /// All variables, in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &VariableNode)> {
        self.graph.node_indices().filter_map(move |i| match &self.graph[i] {
            ModelNode::Variable(v) => Some((VariableId(i), v)),
            _ => None,
        })
    }

    /// Variables with exactly this name (names need not be unique).
    pub fn variables_named(&self, name: &str) -> Vec<VariableId> {
        self.variables()
            .filter(|(_, v)| v.name == name)
            .map(|(id, _)| id)
            .collect()
    }

    /// Variables marked for a query.
    pub fn queried(&self) -> Vec<(VariableId, QueryType)> {
        self.variables()
            .filter_map(|(id, v)| v.query.map(|q| (id, q)))
            .collect()
    }

    /// All factors, in declaration order.
    pub fn factors(&self) -> impl Iterator<Item = (FactorId, &FactorNode)> {
        self.graph.node_indices().filter_map(move |i| match &self.graph[i] {
            ModelNode::Factor(f) => Some((FactorId(i), f)),
            _ => None,
        })
    }

    /// All constraints, in declaration order.
    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &ConstraintNode)> {
        self.graph.node_indices().filter_map(move |i| match &self.graph[i] {
            ModelNode::Constraint(c) => Some((ConstraintId(i), c)),
            _ => None,
        })
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&ConstraintNode> {
        match self.graph.node_weight(id.0) {
            Some(ModelNode::Constraint(c)) => Some(c),
            _ => None,
        }
    }

    /// Factors that define (some elements of) this variable.
    pub fn defining_factors(&self, var: VariableId) -> Vec<&FactorNode> {
        let mut factors: Vec<(NodeIndex, &FactorNode)> = self
            .graph
            .edges_directed(var.0, Direction::Incoming)
            .filter(|e| *e.weight() == Edge::Output)
            .filter_map(|e| match &self.graph[e.source()] {
                ModelNode::Factor(f) => Some((e.source(), f)),
                _ => None,
            })
            .collect();
        factors.sort_by_key(|(i, _)| *i);
        factors.into_iter().map(|(_, f)| f).collect()
    }

    /// The first factor declared for this variable, if any.
    pub fn defining_factor(&self, var: VariableId) -> Option<&FactorNode> {
        self.defining_factors(var).into_iter().next()
    }

    /// Render a reference as `name[i][j]` using range and variable names.
    pub fn describe(&self, var: &VarRef) -> String {
        let mut out = self
            .variable(var.var)
            .map(|v| v.name.clone())
            .unwrap_or_else(|| format!("{:?}", var.var.0));
        for index in &var.indices {
            let rendered = match index {
                Index::Range(r) => self
                    .range(*r)
                    .map(|r| r.name.clone())
                    .unwrap_or_else(|| format!("{:?}", r)),
                Index::Const(i) => i.to_string(),
                Index::Random(v) => self
                    .variable(*v)
                    .map(|v| v.name.clone())
                    .unwrap_or_else(|| format!("{:?}", v.0)),
            };
            out.push('[');
            out.push_str(&rendered);
            out.push(']');
        }
        out
    }

    pub fn variable_count(&self) -> usize {
        self.variables().count()
    }

    pub fn factor_count(&self) -> usize {
        self.factors().count()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints().count()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Model '{}' ({} ranges, {} variables, {} factors, {} constraints)",
            self.name,
            self.ranges.len(),
            self.variable_count(),
            self.factor_count(),
            self.constraint_count()
        )?;
        for (id, query) in self.queried() {
            writeln!(f, "  {} {}", query, self.describe(&VarRef::new(id)))?;
        }
        Ok(())
    }
}
