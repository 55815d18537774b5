// SPDX-License-Identifier: MIT OR Apache-2.0
//! Datatypes and the priority-ordered resolver.
//!
//! A datatype is a predicate over normalized reference data plus a
//! conversion and an optional default. Resolution tries the caller's
//! preferred type first, then every registered type in ascending priority
//! order; the first predicate that accepts the data wins. Predicates
//! overlap (a boolean is also an integer and a float); the order keeps
//! resolution deterministic.

use crate::error::{NodexError, Result};
use crate::introspect;
use crate::reference::{Reference, Scalar};
use crate::session::Session;
use nodex_graph::{AttrType, Value};
use std::fmt;
use std::sync::Arc;

/// Kind of value a [`Nodex`](crate::Nodex) represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean scalar or attribute
    Boolean,
    /// Integer scalar or attribute
    Integer,
    /// Float scalar or attribute
    Float,
    /// Any single number
    Numerical,
    /// Three numbers
    Vector,
    /// Sixteen numbers
    Matrix,
    /// Ordered collection of typed values
    Array,
}

impl DataType {
    /// Every datatype, in default priority order
    pub const ALL: [DataType; 7] = [
        Self::Boolean,
        Self::Integer,
        Self::Float,
        Self::Numerical,
        Self::Vector,
        Self::Matrix,
        Self::Array,
    ];

    /// Default resolution priority; lower is tried first
    pub fn priority(&self) -> i32 {
        match self {
            Self::Boolean => 0,
            Self::Integer => 10,
            Self::Float => 20,
            Self::Numerical => 30,
            Self::Vector => 100,
            Self::Matrix => 110,
            Self::Array => 120,
        }
    }

    /// Dimension implied by the type itself
    pub fn fixed_dimensions(&self) -> Option<usize> {
        match self {
            Self::Vector => Some(3),
            Self::Matrix => Some(16),
            _ => None,
        }
    }

    /// Whether data of this shape is valid for the type
    pub fn accepts(&self, shape: &Shape) -> bool {
        match (self, shape) {
            (Self::Boolean, Shape::Scalar(Scalar::Bool(_))) => true,
            (Self::Integer, Shape::Scalar(Scalar::Bool(_) | Scalar::Int(_))) => true,
            (Self::Float | Self::Numerical, Shape::Scalar(_)) => true,
            (Self::Vector | Self::Matrix, Shape::Numbers(len)) => {
                Some(*len) == self.fixed_dimensions()
            }
            (Self::Vector | Self::Matrix, Shape::Tuple { len, all_scalar, .. }) => {
                *all_scalar && Some(*len) == self.fixed_dimensions()
            }
            (Self::Array, Shape::Numbers(len)) => *len > 0,
            (Self::Array, Shape::Tuple { len, all_unit, .. }) => *len > 0 && *all_unit,
            (_, Shape::Attribute { attr_type, dimensions, numeric_components }) => match self {
                Self::Boolean => *attr_type == AttrType::Bool,
                Self::Integer => matches!(attr_type, AttrType::Bool | AttrType::Int),
                Self::Float | Self::Numerical => attr_type.is_numeric(),
                Self::Vector => {
                    matches!(attr_type, AttrType::Compound | AttrType::Array)
                        && *dimensions == 3
                        && *numeric_components
                }
                Self::Matrix => *attr_type == AttrType::Matrix,
                Self::Array => matches!(attr_type, AttrType::Compound | AttrType::Array),
            },
            _ => false,
        }
    }

    /// Default reference data, if the type has one
    pub fn default_reference(&self) -> Option<Reference> {
        match self {
            Self::Boolean => Some(Reference::Scalar(Scalar::Bool(false))),
            Self::Integer => Some(Reference::Scalar(Scalar::Int(0))),
            Self::Float | Self::Numerical => Some(Reference::Scalar(Scalar::Float(0.0))),
            Self::Vector => Some(Reference::Numbers(Arc::from([0.0; 3]))),
            Self::Matrix => Some(Reference::Numbers(Arc::from(Value::IDENTITY))),
            Self::Array => None,
        }
    }

    /// Default as a plug value, if the type has one
    pub fn default_value(&self) -> Option<Value> {
        match self {
            Self::Boolean => Some(Value::Bool(false)),
            Self::Integer => Some(Value::Int(0)),
            Self::Float | Self::Numerical => Some(Value::Float(0.0)),
            Self::Vector => Some(Value::floats(&[0.0; 3])),
            Self::Matrix => Some(Value::identity()),
            Self::Array => None,
        }
    }

    /// Convert accepted reference data into this type's canonical form
    pub fn convert(&self, session: &Session, reference: Reference) -> Result<Reference> {
        Ok(match (self, reference) {
            (_, Reference::Attribute(plug)) => Reference::Attribute(plug),
            (Self::Integer, Reference::Scalar(Scalar::Bool(b))) => {
                Reference::Scalar(Scalar::Int(i64::from(b)))
            }
            (Self::Float, Reference::Scalar(s)) => Reference::Scalar(Scalar::Float(s.as_f64())),
            (Self::Vector | Self::Matrix, Reference::Tuple(items)) => {
                let numbers = items
                    .iter()
                    .map(|item| match item.reference() {
                        Reference::Scalar(s) => Ok(s.as_f64()),
                        _ => Err(NodexError::InvalidData {
                            datatype: *self,
                            data: item.to_string(),
                        }),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Reference::Numbers(numbers.into())
            }
            (Self::Array, Reference::Numbers(numbers)) => {
                let items = numbers
                    .iter()
                    .map(|n| session.nodex(*n))
                    .collect::<Result<Vec<_>>>()?;
                Reference::Tuple(items.into())
            }
            (_, other) => other,
        })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Numerical => "Numerical",
            Self::Vector => "Vector",
            Self::Matrix => "Matrix",
            Self::Array => "Array",
        };
        f.write_str(name)
    }
}

/// What the datatype predicates need to know about reference data
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Constant scalar
    Scalar(Scalar),
    /// Attribute with its type, component count and whether all components are numbers
    Attribute {
        /// Type tag
        attr_type: AttrType,
        /// Component count
        dimensions: usize,
        /// Every child/element holds a single number
        numeric_components: bool,
    },
    /// Tuple of typed values
    Tuple {
        /// Element count
        len: usize,
        /// Every element is a constant scalar
        all_scalar: bool,
        /// Every element has one component
        all_unit: bool,
    },
    /// Flat constant numbers
    Numbers(usize),
}

impl Shape {
    /// Inspect reference data
    pub fn of(session: &Session, reference: &Reference) -> Result<Self> {
        Ok(match reference {
            Reference::Scalar(s) => Shape::Scalar(*s),
            Reference::Numbers(numbers) => Shape::Numbers(numbers.len()),
            Reference::Attribute(plug) => session.with_store(|store| {
                Ok::<_, NodexError>(Shape::Attribute {
                    attr_type: store.attribute_type(*plug)?,
                    dimensions: introspect::attr_dimensions(store, *plug)?,
                    numeric_components: introspect::numeric_components(store, *plug)?,
                })
            })?,
            Reference::Tuple(items) => {
                let mut all_unit = true;
                for item in items.iter() {
                    if item.dimensions()? != 1 {
                        all_unit = false;
                        break;
                    }
                }
                Shape::Tuple {
                    len: items.len(),
                    all_scalar: items
                        .iter()
                        .all(|item| matches!(item.reference(), Reference::Scalar(_))),
                    all_unit,
                }
            }
        })
    }
}

/// Finalized, priority-ordered set of datatypes
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: Vec<DataType>,
    trace: bool,
}

impl TypeRegistry {
    /// Registry with every datatype at its default priority
    pub fn standard() -> Self {
        let mut builder = Self::builder();
        for datatype in DataType::ALL {
            builder = builder.register(datatype);
        }
        builder.finalize()
    }

    /// Start an empty registry
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// Registered types, in resolution order
    pub fn types(&self) -> &[DataType] {
        &self.types
    }

    /// Emit a trace event per tried candidate
    pub fn with_tracing(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Pick the datatype for `shape`, trying `preferred` first
    pub fn resolve(&self, shape: &Shape, preferred: Option<DataType>) -> Option<DataType> {
        if let Some(preferred) = preferred {
            if self.try_candidate(preferred, shape) {
                return Some(preferred);
            }
        }
        self.types
            .iter()
            .copied()
            .find(|candidate| self.try_candidate(*candidate, shape))
    }

    fn try_candidate(&self, candidate: DataType, shape: &Shape) -> bool {
        let accepted = candidate.accepts(shape);
        if self.trace {
            tracing::trace!(datatype = %candidate, ?shape, accepted, "resolution candidate");
        }
        accepted
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Collects datatypes before the registry is frozen
#[derive(Debug, Clone, Default)]
pub struct TypeRegistryBuilder {
    entries: Vec<(i32, DataType)>,
}

impl TypeRegistryBuilder {
    /// Register a datatype at its default priority
    pub fn register(self, datatype: DataType) -> Self {
        self.register_with_priority(datatype, datatype.priority())
    }

    /// Register a datatype at a custom priority
    pub fn register_with_priority(mut self, datatype: DataType, priority: i32) -> Self {
        self.entries.retain(|(_, existing)| *existing != datatype);
        self.entries.push((priority, datatype));
        self
    }

    /// Sort by priority and freeze
    pub fn finalize(mut self) -> TypeRegistry {
        self.entries.sort_by_key(|(priority, _)| *priority);
        TypeRegistry {
            types: self.entries.into_iter().map(|(_, datatype)| datatype).collect(),
            trace: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(len: usize) -> Shape {
        Shape::Tuple {
            len,
            all_scalar: true,
            all_unit: true,
        }
    }

    #[test]
    fn test_priority_order() {
        let registry = TypeRegistry::standard();
        assert_eq!(registry.types(), &DataType::ALL);
    }

    #[test]
    fn test_scalar_resolution() {
        let registry = TypeRegistry::standard();
        let resolve = |s| registry.resolve(&Shape::Scalar(s), None);
        assert_eq!(resolve(Scalar::Bool(true)), Some(DataType::Boolean));
        assert_eq!(resolve(Scalar::Int(2)), Some(DataType::Integer));
        assert_eq!(resolve(Scalar::Float(2.5)), Some(DataType::Float));
    }

    #[test]
    fn test_list_resolution_by_length() {
        let registry = TypeRegistry::standard();
        for len in 1..=16 {
            let expected = match len {
                3 => DataType::Vector,
                16 => DataType::Matrix,
                _ => DataType::Array,
            };
            assert_eq!(registry.resolve(&tuple(len), None), Some(expected), "len {len}");
        }
        assert_eq!(registry.resolve(&tuple(0), None), None);
    }

    #[test]
    fn test_preferred_type_wins_when_valid() {
        let registry = TypeRegistry::standard();
        assert_eq!(
            registry.resolve(&tuple(3), Some(DataType::Array)),
            Some(DataType::Array)
        );
        assert_eq!(
            registry.resolve(&Shape::Scalar(Scalar::Int(1)), Some(DataType::Float)),
            Some(DataType::Float)
        );
        assert_eq!(
            registry.resolve(&Shape::Scalar(Scalar::Int(1)), Some(DataType::Vector)),
            Some(DataType::Integer)
        );
    }

    #[test]
    fn test_attribute_shapes() {
        let registry = TypeRegistry::standard();
        let attr = |attr_type, dimensions, numeric_components| Shape::Attribute {
            attr_type,
            dimensions,
            numeric_components,
        };
        assert_eq!(registry.resolve(&attr(AttrType::Bool, 1, false), None), Some(DataType::Boolean));
        assert_eq!(registry.resolve(&attr(AttrType::Float, 1, false), None), Some(DataType::Float));
        assert_eq!(registry.resolve(&attr(AttrType::Compound, 3, true), None), Some(DataType::Vector));
        assert_eq!(registry.resolve(&attr(AttrType::Compound, 2, true), None), Some(DataType::Array));
        assert_eq!(registry.resolve(&attr(AttrType::Array, 3, false), None), Some(DataType::Array));
        assert_eq!(registry.resolve(&attr(AttrType::Matrix, 16, false), None), Some(DataType::Matrix));
    }

    #[test]
    fn test_custom_priority() {
        let registry = TypeRegistry::builder()
            .register(DataType::Array)
            .register(DataType::Numerical)
            .register_with_priority(DataType::Vector, 500)
            .finalize();
        assert_eq!(
            registry.types(),
            &[DataType::Numerical, DataType::Array, DataType::Vector]
        );
        assert_eq!(registry.resolve(&tuple(3), None), Some(DataType::Array));
        assert_eq!(
            registry.resolve(&Shape::Scalar(Scalar::Bool(true)), None),
            Some(DataType::Numerical)
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(DataType::Matrix.default_value(), Some(Value::identity()));
        assert_eq!(DataType::Vector.default_value(), Some(Value::floats(&[0.0; 3])));
        assert!(DataType::Array.default_reference().is_none());
    }
}
