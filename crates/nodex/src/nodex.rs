// SPDX-License-Identifier: MIT OR Apache-2.0
//! The typed value.
//!
//! A [`Nodex`] pairs canonical reference data (an attribute, a constant, or
//! a tuple of typed values) with the datatype that accepted it. Operations
//! on it build computation nodes in the graph store; see [`crate::ops`].

use crate::connect::{self, ConnectOptions};
use crate::datatype::DataType;
use crate::error::{NodexError, Result};
use crate::introspect;
use crate::reference::Reference;
use crate::session::Session;
use nodex_graph::{AttrType, NodeId, PlugId, Value};
use std::cell::OnceCell;
use std::fmt;
use std::ops::Range;

/// Typed value over constants or graph attributes
#[derive(Debug, Clone)]
pub struct Nodex {
    session: Session,
    reference: Reference,
    datatype: DataType,
    dimensions: OnceCell<usize>,
}

impl Nodex {
    pub(crate) fn from_parts(session: Session, reference: Reference, datatype: DataType) -> Self {
        Self {
            session,
            reference,
            datatype,
            dimensions: OnceCell::new(),
        }
    }

    /// Session this value belongs to
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Resolved datatype
    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    /// Canonical reference data
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    /// Number of scalar components; computed once
    pub fn dimensions(&self) -> Result<usize> {
        if let Some(dimensions) = self.dimensions.get() {
            return Ok(*dimensions);
        }
        let dimensions = match (self.datatype.fixed_dimensions(), &self.reference) {
            (Some(fixed), _) => fixed,
            (None, Reference::Attribute(plug)) => self
                .session
                .with_store(|store| introspect::attr_dimensions(store, *plug))?,
            (None, Reference::Scalar(_)) => 1,
            (None, Reference::Tuple(items)) => items.len(),
            (None, Reference::Numbers(numbers)) => numbers.len(),
        };
        Ok(*self.dimensions.get_or_init(|| dimensions))
    }

    /// Whether this wraps exactly one attribute
    pub fn is_attribute(&self) -> bool {
        matches!(self.reference, Reference::Attribute(_))
    }

    /// Whether this is an attribute or a tuple made only of attributes
    pub fn is_connectable(&self) -> bool {
        match &self.reference {
            Reference::Attribute(_) => true,
            Reference::Tuple(items) => items.iter().all(Nodex::is_connectable),
            _ => false,
        }
    }

    /// Whether no attribute is involved at all
    pub fn is_constant(&self) -> bool {
        match &self.reference {
            Reference::Attribute(_) => false,
            Reference::Scalar(_) | Reference::Numbers(_) => true,
            Reference::Tuple(items) => items.iter().all(Nodex::is_constant),
        }
    }

    /// Plug handle if this wraps exactly one attribute
    pub fn attr(&self) -> Option<PlugId> {
        self.reference.plug()
    }

    /// Node owning the wrapped attribute
    pub fn node(&self) -> Result<NodeId> {
        let plug = self
            .attr()
            .ok_or_else(|| NodexError::NotAnAttribute(self.to_string()))?;
        Ok(self.session.with_store(|store| store.plug_node(plug))?)
    }

    /// Name of the node owning the wrapped attribute
    pub fn node_name(&self) -> Result<String> {
        let node = self.node()?;
        Ok(self.session.with_store(|store| store.node_name(node))?)
    }

    /// Current value: evaluated for attributes, literal for constants
    pub fn value(&self) -> Result<Value> {
        match &self.reference {
            Reference::Attribute(plug) => Ok(self.session.with_store(|store| store.get_value(*plug))?),
            Reference::Scalar(s) => Ok(s.to_value()),
            Reference::Tuple(items) => items
                .iter()
                .map(Nodex::value)
                .collect::<Result<Vec<_>>>()
                .map(Value::Tuple),
            Reference::Numbers(numbers) => Ok(match self.datatype {
                DataType::Matrix => {
                    let mut m = [0.0; 16];
                    m.copy_from_slice(numbers);
                    Value::Matrix(m)
                }
                _ => Value::floats(numbers),
            }),
        }
    }

    /// Current value as a single number
    pub fn as_f64(&self) -> Result<f64> {
        let value = self.value()?;
        value
            .as_f64()
            .ok_or_else(|| NodexError::Runtime(format!("{self} is not a single number: {value:?}")))
    }

    /// Current value flattened into numbers
    pub fn as_f64s(&self) -> Result<Vec<f64>> {
        let value = self.value()?;
        value
            .to_f64s()
            .ok_or_else(|| NodexError::Runtime(format!("{self} does not hold numbers: {value:?}")))
    }

    /// Reset to the datatype default.
    ///
    /// Constants get the default as their new reference data; attributes
    /// have the default written into their plugs, replacing any incoming
    /// connection.
    pub fn clear_value(&mut self) -> Result<()> {
        if self.is_connectable() {
            return connect::reset_plugs(self);
        }
        let default = self
            .datatype
            .default_reference()
            .ok_or_else(|| NodexError::Runtime(format!("Can't clear the value for: {self}")))?;
        self.reference = default;
        self.dimensions = OnceCell::new();
        Ok(())
    }

    /// Component at `index`
    pub fn item(&self, index: usize) -> Result<Nodex> {
        let len = self.dimensions()?;
        if index >= len {
            return Err(NodexError::Index { index, len });
        }
        match &self.reference {
            Reference::Attribute(plug) => {
                let plug = *plug;
                let sub = self.session.with_store(|store| {
                    Ok::<_, NodexError>(match store.attribute_type(plug)? {
                        AttrType::Array => Some(store.element_by_index(plug, index)?),
                        AttrType::Compound => Some(store.children(plug)?[index]),
                        AttrType::Matrix => None,
                        _ => Some(plug),
                    })
                })?;
                match sub {
                    Some(sub) if sub == plug => Ok(self.clone()),
                    Some(sub) => self.session.nodex(sub),
                    None => Err(NodexError::Runtime(format!(
                        "Matrix attribute {self} has no component plugs"
                    ))),
                }
            }
            Reference::Scalar(_) => Ok(self.clone()),
            Reference::Tuple(items) => Ok(items[index].clone()),
            Reference::Numbers(numbers) => self.session.nodex(numbers[index]),
        }
    }

    /// Components in `range`, as a new typed value
    pub fn slice(&self, range: Range<usize>) -> Result<Nodex> {
        let len = self.dimensions()?;
        if range.start > range.end || range.end > len {
            return Err(NodexError::Index {
                index: range.end,
                len,
            });
        }
        let items = range
            .map(|i| self.item(i))
            .collect::<Result<Vec<_>>>()?;
        self.session.nodex(crate::reference::Input::List(
            items.into_iter().map(Into::into).collect(),
        ))
    }

    /// Connect this value into `destination` using the session defaults
    pub fn connect(&self, destination: &Nodex) -> Result<usize> {
        self.connect_with(destination, self.session.config().connect)
    }

    /// Connect this value into `destination`
    pub fn connect_with(&self, destination: &Nodex, options: ConnectOptions) -> Result<usize> {
        connect::connect(self, destination, options)
    }
}

impl fmt::Display for Nodex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.datatype)?;
        match &self.reference {
            Reference::Attribute(plug) => {
                let plug = *plug;
                match self.session.with_store(|store| store.plug_path(plug)) {
                    Ok(path) => write!(f, "{path}")?,
                    Err(_) => write!(f, "{plug:?}")?,
                }
            }
            Reference::Scalar(s) => write!(f, "{s}")?,
            Reference::Tuple(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
            }
            Reference::Numbers(numbers) => {
                for (i, n) in numbers.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{n:?}")?;
                }
            }
        }
        write!(f, ")")
    }
}
