//! # Shapes - Ranges and Value Types
//!
//! Every variable in a model is an array over zero or more index ranges
//! (a scalar has none). A shape pairs the element [`ValueType`] with the
//! ranges it is declared over, and must agree with the shape expected by
//! every factor the variable is wired into.
//!
//! ## Design Choices
//!
//! Ranges are compared by *size*, not identity: a cloned range (the
//! usual way to index the same classes twice in one expression) is a
//! distinct handle with the same size, and is accepted anywhere the
//! original is.

use std::fmt;

/// Handle to an index range declared on a builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RangeId(pub usize);

/// A named index set `{0, 1, ..., size - 1}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    pub id: RangeId,
    pub name: String,
    pub size: usize,
    /// The range this one was cloned from, if any.
    pub cloned_from: Option<RangeId>,
}

impl Range {
    /// Iterate over the indices of this range.
    pub fn indices(&self) -> std::ops::Range<usize> {
        0..self.size
    }
}

/// The element type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// A real number.
    Real,
    /// An integer, optionally with a known number of states `{0..cardinality}`.
    Int { cardinality: Option<usize> },
    /// A boolean.
    Bool,
    /// A dense real vector of fixed dimension.
    Vector { dim: usize },
}

impl ValueType {
    /// Integer with `n` states.
    pub fn discrete(n: usize) -> Self {
        ValueType::Int {
            cardinality: Some(n),
        }
    }

    /// Check if a value of this type can stand where `other` is expected.
    ///
    /// Integers are compatible regardless of cardinality; vectors only
    /// when dimensions agree.
    pub fn is_compatible(&self, other: &ValueType) -> bool {
        match (self, other) {
            (ValueType::Int { .. }, ValueType::Int { .. }) => true,
            _ => self == other,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Real => write!(f, "real"),
            ValueType::Int { cardinality: None } => write!(f, "int"),
            ValueType::Int {
                cardinality: Some(n),
            } => write!(f, "int<{}>", n),
            ValueType::Bool => write!(f, "bool"),
            ValueType::Vector { dim } => write!(f, "vector<{}>", dim),
        }
    }
}

/// The declared shape of a variable: element type plus ranges, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub ty: ValueType,
    pub dims: Vec<RangeId>,
}

impl Shape {
    /// Create a new shape with given type and ranges.
    pub fn new(ty: ValueType, dims: Vec<RangeId>) -> Self {
        Self { ty, dims }
    }

    /// Create a scalar shape (no ranges).
    pub fn scalar(ty: ValueType) -> Self {
        Self { ty, dims: vec![] }
    }

    /// Number of ranges (array rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }
}

/// The shape of an expression after indexing, with ranges resolved to sizes.
///
/// This is what factors check their operands against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueShape {
    pub ty: ValueType,
    pub sizes: Vec<usize>,
}

impl ValueShape {
    pub fn new(ty: ValueType, sizes: Vec<usize>) -> Self {
        Self { ty, sizes }
    }

    pub fn scalar(ty: ValueType) -> Self {
        Self { ty, sizes: vec![] }
    }

    pub fn is_scalar(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Check if this shape is compatible with another.
    pub fn is_compatible(&self, other: &ValueShape) -> bool {
        self.ty.is_compatible(&other.ty) && self.sizes == other.sizes
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sizes.is_empty() {
            write!(f, "{}", self.ty)
        } else {
            write!(
                f,
                "{}[{}]",
                self.ty,
                self.sizes
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_compatibility_ignores_cardinality() {
        let a = ValueType::discrete(3);
        let b = ValueType::Int { cardinality: None };
        assert!(a.is_compatible(&b));
        assert!(!a.is_compatible(&ValueType::Real));
    }

    #[test]
    fn test_vector_compatibility() {
        let a = ValueType::Vector { dim: 4 };
        assert!(a.is_compatible(&ValueType::Vector { dim: 4 }));
        assert!(!a.is_compatible(&ValueType::Vector { dim: 5 }));
    }

    #[test]
    fn test_value_shape_display() {
        assert_eq!(ValueShape::scalar(ValueType::Real).to_string(), "real");
        assert_eq!(
            ValueShape::new(ValueType::Real, vec![3, 4]).to_string(),
            "real[3, 4]"
        );
        assert_eq!(
            ValueShape::scalar(ValueType::discrete(5)).to_string(),
            "int<5>"
        );
    }

    #[test]
    fn test_shape_rank() {
        let s = Shape::new(ValueType::Real, vec![RangeId(0), RangeId(1)]);
        assert_eq!(s.rank(), 2);
        assert_eq!(Shape::scalar(ValueType::Bool).rank(), 0);
    }
}
