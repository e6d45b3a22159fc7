//! # Core - Model-Graph Building Context
//!
//! This crate provides the graph-building abstraction that classifier
//! helpers declare their factors into:
//!
//! - **Shapes**: Index ranges and element types of model variables
//! - **Variables**: Handles and indexed references (`w[c][f]`, `s[label]`)
//! - **Ops**: Deterministic and stochastic factors, constraints, conditions
//! - **Builder**: The [`GraphBuilder`] trait plus RAII loop/guard scopes
//! - **Graph**: [`ModelBuilder`], the recording builder, and the finished [`Model`]
//! - **Errors**: Construction-time failures
//!
//! ## Design Philosophy
//!
//! A model is declared, then inspected. Nothing here runs inference: the
//! finished [`Model`] is a `petgraph` graph of variables, factors and
//! constraints, each tagged with the loops and guards it was declared in,
//! ready to be handed to a message-passing engine.

pub mod builder;
pub mod error;
pub mod graph;
pub mod ops;
pub mod shape;
pub mod var;

// Re-export key types at crate root for convenience
pub use builder::{ConstraintId, FactorId, GraphBuilder, Scope};
pub use error::CoreError;
pub use graph::{
    ConstraintNode, Edge, FactorKind, FactorNode, Model, ModelBuilder, ModelNode, VariableNode,
};
pub use ops::{
    Condition, Constraint, Context, DeterministicOp, Frame, Guard, QueryType, StochasticOp,
};
pub use shape::{Range, RangeId, Shape, ValueShape, ValueType};
pub use var::{Index, Operand, VarRef, VariableId};
