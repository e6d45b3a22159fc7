//! Variable handles and indexed references.

use petgraph::graph::NodeIndex;

use crate::shape::RangeId;

/// Handle to a declared variable (array).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub NodeIndex);

/// One index applied to a variable, outermost dimension first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Index {
    /// Index by a loop range: one element per iteration.
    Range(RangeId),
    /// A fixed element.
    Const(usize),
    /// Index by the value of a scalar integer variable.
    Random(VariableId),
}

impl From<RangeId> for Index {
    fn from(range: RangeId) -> Self {
        Index::Range(range)
    }
}

impl From<usize> for Index {
    fn from(i: usize) -> Self {
        Index::Const(i)
    }
}

impl From<VariableId> for Index {
    fn from(var: VariableId) -> Self {
        Index::Random(var)
    }
}

/// A (possibly partially) indexed variable.
///
/// `weights[c][f]` is `VarRef { var: weights, indices: [Range(c), Range(f)] }`;
/// `weights[c]` leaves the inner dimension as an array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef {
    pub var: VariableId,
    pub indices: Vec<Index>,
}

impl VarRef {
    /// The whole variable, unindexed.
    pub fn new(var: VariableId) -> Self {
        Self {
            var,
            indices: Vec::new(),
        }
    }

    /// Apply one more index.
    pub fn at(&self, index: impl Into<Index>) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index.into());
        Self {
            var: self.var,
            indices,
        }
    }

    /// True if no indices are applied.
    pub fn is_whole(&self) -> bool {
        self.indices.is_empty()
    }
}

impl From<VariableId> for VarRef {
    fn from(var: VariableId) -> Self {
        VarRef::new(var)
    }
}

/// A scalar operand: a variable reference or a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Var(VarRef),
    Int(i64),
    Real(f64),
}

impl Operand {
    /// The variable reference, if this operand is not a literal.
    pub fn as_var(&self) -> Option<&VarRef> {
        match self {
            Operand::Var(v) => Some(v),
            _ => None,
        }
    }
}

impl From<VarRef> for Operand {
    fn from(v: VarRef) -> Self {
        Operand::Var(v)
    }
}

impl From<VariableId> for Operand {
    fn from(v: VariableId) -> Self {
        Operand::Var(VarRef::new(v))
    }
}

impl From<f64> for Operand {
    fn from(x: f64) -> Self {
        Operand::Real(x)
    }
}

impl From<i64> for Operand {
    fn from(x: i64) -> Self {
        Operand::Int(x)
    }
}

impl From<usize> for Operand {
    fn from(x: usize) -> Self {
        Operand::Int(x as i64)
    }
}
