// SPDX-License-Identifier: MIT OR Apache-2.0
//! Attribute definitions for node inputs/outputs and the values plugs hold.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a plug (an attribute instance on a node)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlugId(pub Uuid);

impl PlugId {
    /// Create a new random plug ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlugId {
    fn default() -> Self {
        Self::new()
    }
}

/// Attribute direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Writable input attribute
    Input,
    /// Computed output attribute
    Output,
}

/// Flat data/shape tag of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttrType {
    /// Boolean leaf
    Bool,
    /// Integer (or enum) leaf
    Int,
    /// Floating point leaf
    Float,
    /// 4x4 matrix leaf
    Matrix,
    /// Fixed set of named children
    Compound,
    /// Variable-length list of elements
    Array,
}

impl AttrType {
    /// Whether a value of this type holds a single number
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Bool | Self::Int | Self::Float)
    }
}

/// Shape of an attribute, including its children or element template
#[derive(Debug, Clone, PartialEq)]
pub enum AttrKind {
    /// Boolean leaf
    Bool,
    /// Integer leaf
    Int,
    /// Floating point leaf
    Float,
    /// Matrix leaf
    Matrix,
    /// Compound with named children
    Compound(Vec<AttrSpec>),
    /// Array whose elements are instantiated from a template
    Array(Box<AttrSpec>),
}

impl AttrKind {
    /// Get the flat type tag for this kind
    pub fn attr_type(&self) -> AttrType {
        match self {
            Self::Bool => AttrType::Bool,
            Self::Int => AttrType::Int,
            Self::Float => AttrType::Float,
            Self::Matrix => AttrType::Matrix,
            Self::Compound(_) => AttrType::Compound,
            Self::Array(_) => AttrType::Array,
        }
    }
}

/// Declaration of an attribute on a node type
#[derive(Debug, Clone, PartialEq)]
pub struct AttrSpec {
    /// Long attribute name
    pub name: String,
    /// Optional short alias (`t` for `translate`)
    pub short_name: Option<String>,
    /// Attribute direction
    pub direction: Direction,
    /// Shape and data type
    pub kind: AttrKind,
    /// Default value for leaves
    pub default: Option<Value>,
}

impl AttrSpec {
    fn leaf(name: impl Into<String>, kind: AttrKind, direction: Direction) -> Self {
        let default = match kind {
            AttrKind::Bool => Some(Value::Bool(false)),
            AttrKind::Int => Some(Value::Int(0)),
            AttrKind::Float => Some(Value::Float(0.0)),
            AttrKind::Matrix => Some(Value::identity()),
            AttrKind::Compound(_) | AttrKind::Array(_) => None,
        };
        Self {
            name: name.into(),
            short_name: None,
            direction,
            kind,
            default,
        }
    }

    /// Create a float input
    pub fn float(name: impl Into<String>) -> Self {
        Self::leaf(name, AttrKind::Float, Direction::Input)
    }

    /// Create an integer input
    pub fn int(name: impl Into<String>) -> Self {
        Self::leaf(name, AttrKind::Int, Direction::Input)
    }

    /// Create a boolean input
    pub fn bool(name: impl Into<String>) -> Self {
        Self::leaf(name, AttrKind::Bool, Direction::Input)
    }

    /// Create a matrix input
    pub fn matrix(name: impl Into<String>) -> Self {
        Self::leaf(name, AttrKind::Matrix, Direction::Input)
    }

    /// Create a compound input from its children
    pub fn compound(name: impl Into<String>, children: Vec<AttrSpec>) -> Self {
        Self::leaf(name, AttrKind::Compound(children), Direction::Input)
    }

    /// Create a three-float compound whose children are `name` + suffix
    pub fn float3(name: impl Into<String>, suffixes: [&str; 3]) -> Self {
        let name = name.into();
        let children = suffixes
            .iter()
            .map(|s| AttrSpec::float(format!("{name}{s}")))
            .collect();
        Self::compound(name, children)
    }

    /// Create a two-float compound whose children are `name` + suffix
    pub fn float2(name: impl Into<String>, suffixes: [&str; 2]) -> Self {
        let name = name.into();
        let children = suffixes
            .iter()
            .map(|s| AttrSpec::float(format!("{name}{s}")))
            .collect();
        Self::compound(name, children)
    }

    /// Create an array of elements shaped like `element`
    pub fn array(element: AttrSpec) -> Self {
        Self::leaf(
            element.name.clone(),
            AttrKind::Array(Box::new(element)),
            Direction::Input,
        )
    }

    /// Turn this attribute (and its children) into an output
    pub fn output(mut self) -> Self {
        self.direction = Direction::Output;
        match &mut self.kind {
            AttrKind::Compound(children) => {
                for child in children.iter_mut() {
                    child.direction = Direction::Output;
                }
            }
            AttrKind::Array(element) => element.direction = Direction::Output,
            _ => {}
        }
        self
    }

    /// Set the short alias
    pub fn with_short(mut self, short: impl Into<String>) -> Self {
        self.short_name = Some(short.into());
        self
    }

    /// Set the short aliases of compound children, in order
    pub fn with_child_shorts(mut self, shorts: &[&str]) -> Self {
        if let AttrKind::Compound(children) = &mut self.kind {
            for (child, short) in children.iter_mut().zip(shorts) {
                child.short_name = Some((*short).to_string());
            }
        }
        self
    }

    /// Set the default value; compounds spread a tuple over their children
    pub fn with_default(mut self, value: Value) -> Self {
        match (&mut self.kind, value) {
            (AttrKind::Compound(children), Value::Tuple(values)) => {
                for (child, v) in children.iter_mut().zip(values) {
                    child.default = Some(v);
                }
            }
            (AttrKind::Compound(children), v) => {
                for child in children.iter_mut() {
                    child.default = Some(v.clone());
                }
            }
            (_, v) => self.default = Some(v),
        }
        self
    }

    /// Check whether `name` is the long or short name of this attribute
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.short_name.as_deref() == Some(name)
    }
}

/// Value that can be stored in or read from a plug
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// Flat row-major 4x4 matrix, translation in elements 12..14
    Matrix([f64; 16]),
    /// Values of a compound's children or an array's elements
    Tuple(Vec<Value>),
}

impl Value {
    /// The identity matrix
    pub const IDENTITY: [f64; 16] = [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ];

    /// Identity matrix value
    pub fn identity() -> Self {
        Self::Matrix(Self::IDENTITY)
    }

    /// Read a single number; booleans map to 0.0/1.0
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Tuple(values) if values.len() == 1 => values[0].as_f64(),
            _ => None,
        }
    }

    /// Read a matrix, accepting a tuple of sixteen numbers
    pub fn as_matrix(&self) -> Option<[f64; 16]> {
        match self {
            Self::Matrix(m) => Some(*m),
            Self::Tuple(values) if values.len() == 16 => {
                let mut m = [0.0; 16];
                for (slot, v) in m.iter_mut().zip(values) {
                    *slot = v.as_f64()?;
                }
                Some(m)
            }
            _ => None,
        }
    }

    /// Flatten into a list of numbers
    pub fn to_f64s(&self) -> Option<Vec<f64>> {
        match self {
            Self::Matrix(m) => Some(m.to_vec()),
            Self::Tuple(values) => values.iter().map(Value::as_f64).collect(),
            other => other.as_f64().map(|v| vec![v]),
        }
    }

    /// Get the i-th component of a tuple
    pub fn component(&self, index: usize) -> Option<Value> {
        match self {
            Self::Tuple(values) => values.get(index).cloned(),
            Self::Matrix(m) => m.get(index).copied().map(Value::Float),
            other if index == 0 => Some(other.clone()),
            _ => None,
        }
    }

    /// Number of components this value carries
    pub fn len(&self) -> usize {
        match self {
            Self::Tuple(values) => values.len(),
            Self::Matrix(_) => 16,
            _ => 1,
        }
    }

    /// Whether this is an empty tuple
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Tuple(values) if values.is_empty())
    }

    /// Build a float tuple
    pub fn floats(values: &[f64]) -> Self {
        Self::Tuple(values.iter().copied().map(Value::Float).collect())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<[f64; 3]> for Value {
    fn from(v: [f64; 3]) -> Self {
        Self::floats(&v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float3_children_and_shorts() {
        let spec = AttrSpec::float3("translate", ["X", "Y", "Z"])
            .with_short("t")
            .with_child_shorts(&["tx", "ty", "tz"]);
        assert!(spec.matches("t"));
        assert!(spec.matches("translate"));
        let AttrKind::Compound(children) = &spec.kind else {
            panic!("expected compound");
        };
        assert_eq!(children[1].name, "translateY");
        assert!(children[2].matches("tz"));
    }

    #[test]
    fn test_compound_default_spreads() {
        let spec = AttrSpec::float3("input2", ["X", "Y", "Z"]).with_default(Value::Float(1.0));
        let AttrKind::Compound(children) = &spec.kind else {
            panic!("expected compound");
        };
        assert!(children.iter().all(|c| c.default == Some(Value::Float(1.0))));
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::Bool(true).as_f64(), Some(1.0));
        assert_eq!(Value::Tuple(vec![Value::Int(2)]).as_f64(), Some(2.0));
        assert_eq!(Value::identity().as_matrix(), Some(Value::IDENTITY));
        assert_eq!(Value::floats(&[1.0, 2.0]).component(1), Some(Value::Float(2.0)));
        assert_eq!(Value::identity().len(), 16);
    }
}
