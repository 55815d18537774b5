// SPDX-License-Identifier: MIT OR Apache-2.0
//! Raw inputs and the canonical references they normalize to.
//!
//! Callers hand Nodex loosely typed data: numbers, attribute paths, plug
//! handles, lists of any of these, or existing typed values. Normalization
//! turns that into a [`Reference`] the datatype predicates can inspect.

use crate::error::{NodexError, Result};
use crate::nodex::Nodex;
use crate::session::Session;
use nodex_graph::{GraphStore, NodeId, PlugId, Value};
use std::fmt;
use std::sync::Arc;

/// Constant scalar
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
}

impl Scalar {
    /// Numeric value; booleans map to 0.0/1.0
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Int(i) => *i as f64,
            Self::Float(f) => *f,
        }
    }

    /// Plug value carrying this scalar
    pub fn to_value(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Int(*i),
            Self::Float(f) => Value::Float(*f),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v:?}"),
        }
    }
}

/// Loosely typed data accepted by the Nodex constructors
#[derive(Debug, Clone)]
pub enum Input {
    /// Boolean constant
    Bool(bool),
    /// Integer constant
    Int(i64),
    /// Float constant
    Float(f64),
    /// Textual `node.attr` path
    Path(String),
    /// Plug handle
    Attribute(PlugId),
    /// Ordered list, each element normalized on its own
    List(Vec<Input>),
    /// Existing typed value, passed through unchanged
    Nodex(Nodex),
}

impl From<bool> for Input {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Input {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Input {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Input {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Input {
    fn from(v: &str) -> Self {
        Self::Path(v.to_string())
    }
}

impl From<String> for Input {
    fn from(v: String) -> Self {
        Self::Path(v)
    }
}

impl From<PlugId> for Input {
    fn from(v: PlugId) -> Self {
        Self::Attribute(v)
    }
}

impl From<Nodex> for Input {
    fn from(v: Nodex) -> Self {
        Self::Nodex(v)
    }
}

impl From<&Nodex> for Input {
    fn from(v: &Nodex) -> Self {
        Self::Nodex(v.clone())
    }
}

impl<T: Into<Input>> From<Vec<T>> for Input {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Input>, const N: usize> From<[T; N]> for Input {
    fn from(v: [T; N]) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// Canonical reference data held by a [`Nodex`]
#[derive(Debug, Clone)]
pub enum Reference {
    /// Attribute in the graph store
    Attribute(PlugId),
    /// Constant scalar
    Scalar(Scalar),
    /// Ordered tuple of typed values
    Tuple(Arc<[Nodex]>),
    /// Flat constant numbers of a vector or matrix
    Numbers(Arc<[f64]>),
}

impl Reference {
    /// Plug handle if this is a single attribute
    pub fn plug(&self) -> Option<PlugId> {
        match self {
            Self::Attribute(plug) => Some(*plug),
            _ => None,
        }
    }
}

/// What a string names in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified {
    /// An existing attribute
    Attribute(PlugId),
    /// A node, not an attribute
    NodeName(NodeId),
    /// Nothing known
    Unresolved,
}

/// Classify a string as an attribute path, a bare node name or neither.
///
/// Only existing plugs are found; array elements are never created here.
pub fn classify(store: &dyn GraphStore, text: &str) -> Classified {
    if text.contains('.') {
        return store
            .find_attribute(text)
            .map_or(Classified::Unresolved, Classified::Attribute);
    }
    match store.node_by_name(text) {
        Some(node) => Classified::NodeName(node),
        None => Classified::Unresolved,
    }
}

/// Result of normalizing raw input
#[derive(Debug, Clone)]
pub enum Normalized {
    /// Input already was a typed value
    Existing(Nodex),
    /// Fresh canonical reference
    Data(Reference),
}

/// Turn raw input into canonical reference data
pub fn normalize(session: &Session, input: Input) -> Result<Normalized> {
    let reference = match input {
        Input::Nodex(nodex) => return Ok(Normalized::Existing(nodex)),
        Input::Bool(b) => Reference::Scalar(Scalar::Bool(b)),
        Input::Int(i) => Reference::Scalar(Scalar::Int(i)),
        Input::Float(f) if f.is_finite() => Reference::Scalar(Scalar::Float(f)),
        Input::Float(f) => return Err(NodexError::UnsupportedData(f.to_string())),
        Input::Attribute(plug) => {
            session.with_store(|store| store.plug_path(plug))?;
            Reference::Attribute(plug)
        }
        Input::Path(text) => match session.with_store(|store| classify(store, &text)) {
            Classified::Attribute(plug) => Reference::Attribute(plug),
            Classified::NodeName(_) => {
                return Err(NodexError::UnresolvedReference(format!(
                    "'{text}' names a node, not an attribute"
                )))
            }
            Classified::Unresolved => return Err(NodexError::UnresolvedReference(text)),
        },
        Input::List(items) => {
            let items = items
                .into_iter()
                .map(|item| session.nodex(item))
                .collect::<Result<Vec<_>>>()?;
            Reference::Tuple(items.into())
        }
    };
    Ok(Normalized::Data(reference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::session_with_sphere;

    #[test]
    fn test_classify_strings() {
        let session = session_with_sphere();
        session.with_store(|store| {
            assert!(matches!(classify(store, "pSphere1.tx"), Classified::Attribute(_)));
            assert!(matches!(classify(store, "pSphere1"), Classified::NodeName(_)));
            assert_eq!(classify(store, "pSphere1.bogus"), Classified::Unresolved);
            assert_eq!(classify(store, "nothing"), Classified::Unresolved);
        });
    }

    #[test]
    fn test_normalize_scalars_and_lists() {
        let session = session_with_sphere();
        let Normalized::Data(Reference::Scalar(Scalar::Int(3))) =
            normalize(&session, Input::from(3)).unwrap()
        else {
            panic!("expected integer scalar");
        };

        let Normalized::Data(Reference::Tuple(items)) =
            normalize(&session, Input::from(vec![1.0, 2.0])).unwrap()
        else {
            panic!("expected tuple");
        };
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| !item.is_attribute()));
    }

    #[test]
    fn test_normalize_passes_typed_values_through() {
        let session = session_with_sphere();
        let tx = session.nodex("pSphere1.tx").unwrap();
        let Normalized::Existing(same) = normalize(&session, Input::from(&tx)).unwrap() else {
            panic!("expected passthrough");
        };
        assert_eq!(same.attr(), tx.attr());
    }

    #[test]
    fn test_normalize_rejects_node_names_and_nan() {
        let session = session_with_sphere();
        assert!(matches!(
            normalize(&session, Input::from("pSphere1")),
            Err(NodexError::UnresolvedReference(_))
        ));
        assert!(matches!(
            normalize(&session, Input::from("ghost.tx")),
            Err(NodexError::UnresolvedReference(_))
        ));
        assert!(matches!(
            normalize(&session, Input::Float(f64::NAN)),
            Err(NodexError::UnsupportedData(_))
        ));
    }

    #[test]
    fn test_normalize_leaves_arrays_untouched() {
        let session = session_with_sphere();
        let two = session.nodex(2.0).unwrap();
        let four = session.nodex(4.0).unwrap();
        let average = session.math().average(&[two, four]).unwrap();
        assert_eq!(average.as_f64().unwrap(), 3.0);

        let inputs = session
            .with_store(|store| store.attribute_by_path("average.input1D"))
            .unwrap();
        assert!(matches!(
            normalize(&session, Input::from("average.input1D[5]")),
            Err(NodexError::UnresolvedReference(_))
        ));
        assert!(normalize(&session, Input::from("average.input1D[1]")).is_ok());
        let elements = session.with_store(|store| store.num_elements(inputs)).unwrap();
        assert_eq!(elements, 2);
        assert_eq!(average.as_f64().unwrap(), 3.0);
    }
}
