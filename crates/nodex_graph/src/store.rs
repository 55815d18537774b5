// SPDX-License-Identifier: MIT OR Apache-2.0
//! The graph store boundary: everything Nodex needs from a host application.

use crate::attribute::{AttrType, PlugId, Value};
use crate::evaluation::EvaluationError;
use crate::node::NodeId;
use thiserror::Error;

/// Errors reported by a graph store
#[derive(Debug, Error)]
pub enum GraphError {
    /// Node type is not registered
    #[error("Unknown node type: {0}")]
    NodeTypeNotFound(String),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Attribute not found on a node
    #[error("Attribute '{attribute}' not found on node '{node}'")]
    AttributeNotFound {
        /// Node name
        node: String,
        /// Requested attribute path
        attribute: String,
    },

    /// Plug not found
    #[error("Plug not found: {0:?}")]
    PlugNotFound(PlugId),

    /// Physical array index out of range
    #[error("Index {index} out of range for '{plug}' with {len} elements")]
    IndexOutOfRange {
        /// Plug path
        plug: String,
        /// Requested index
        index: usize,
        /// Number of elements/children
        len: usize,
    },

    /// Destination already has an incoming connection
    #[error("Plug already connected: {0}")]
    AlreadyConnected(String),

    /// No such connection
    #[error("No connection from '{from}' to '{to}'")]
    NotConnected {
        /// Source plug path
        from: String,
        /// Destination plug path
        to: String,
    },

    /// Plug is locked
    #[error("Plug is locked: {0}")]
    Locked(String),

    /// Plug cannot be written (computed output or connected input)
    #[error("Plug is not writable: {0}")]
    NotWritable(String),

    /// Source and destination shapes differ
    #[error("Incompatible plugs: '{from}' -> '{to}'")]
    IncompatiblePlugs {
        /// Source plug path
        from: String,
        /// Destination plug path
        to: String,
    },

    /// Value does not fit the plug
    #[error("Cannot set '{plug}' to {value}")]
    TypeMismatch {
        /// Plug path
        plug: String,
        /// Rejected value
        value: String,
    },

    /// Node type requires a capability that is not loaded yet
    #[error("Capability '{capability}' must be loaded before creating '{node_type}'")]
    CapabilityNotLoaded {
        /// Capability name
        capability: String,
        /// Node type
        node_type: String,
    },

    /// No registered node type provides the capability
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    /// Error while evaluating a computation node
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// Result type for graph store operations
pub type Result<T> = std::result::Result<T, GraphError>;

/// Opaque node/attribute store of the host application.
///
/// Plugs are addressed by [`PlugId`]; array elements addressed through a path
/// (`node.input1D[3]`) are created on first access, while
/// [`GraphStore::find_attribute`] and [`GraphStore::element_by_index`] only
/// see existing elements.
pub trait GraphStore {
    /// Create a node; the store may rename it to keep names unique
    fn create_node(&mut self, type_name: &str, name: &str) -> Result<NodeId>;

    /// Unique name of a node
    fn node_name(&self, node: NodeId) -> Result<String>;

    /// Type id of a node
    fn node_type(&self, node: NodeId) -> Result<String>;

    /// Find a node by name
    fn node_by_name(&self, name: &str) -> Option<NodeId>;

    /// All nodes, in creation order
    fn nodes(&self) -> Vec<NodeId>;

    /// Get an attribute of a node by (possibly nested) attribute path
    fn attribute(&mut self, node: NodeId, name: &str) -> Result<PlugId>;

    /// Get an attribute from a full `node.attr` path
    fn attribute_by_path(&mut self, path: &str) -> Result<PlugId>;

    /// Look up an existing attribute from a full `node.attr` path
    fn find_attribute(&self, path: &str) -> Option<PlugId>;

    /// Enclosing compound or array of a plug
    fn parent(&self, plug: PlugId) -> Result<Option<PlugId>>;

    /// Node owning a plug
    fn plug_node(&self, plug: PlugId) -> Result<NodeId>;

    /// Full `node.attr` path of a plug
    fn plug_path(&self, plug: PlugId) -> Result<String>;

    /// Data/shape tag of a plug
    fn attribute_type(&self, plug: PlugId) -> Result<AttrType>;

    /// Whether a plug is an array
    fn is_array_attribute(&self, plug: PlugId) -> Result<bool> {
        Ok(self.attribute_type(plug)? == AttrType::Array)
    }

    /// Whether a plug is a compound
    fn is_compound_attribute(&self, plug: PlugId) -> Result<bool> {
        Ok(self.attribute_type(plug)? == AttrType::Compound)
    }

    /// Whether a plug holds a matrix
    fn is_matrix_attribute(&self, plug: PlugId) -> Result<bool> {
        Ok(self.attribute_type(plug)? == AttrType::Matrix)
    }

    /// Number of existing elements of an array plug
    fn num_elements(&self, plug: PlugId) -> Result<usize>;

    /// Number of children of a compound plug
    fn num_children(&self, plug: PlugId) -> Result<usize>;

    /// Existing array element by physical index
    fn element_by_index(&self, plug: PlugId, index: usize) -> Result<PlugId>;

    /// Children of a compound plug
    fn children(&self, plug: PlugId) -> Result<Vec<PlugId>>;

    /// Connect `src` into `dst`; `force` replaces an existing incoming connection
    fn connect(&mut self, src: PlugId, dst: PlugId, force: bool) -> Result<()>;

    /// Remove the connection from `src` into `dst`
    fn disconnect(&mut self, src: PlugId, dst: PlugId) -> Result<()>;

    /// Incoming connection source of a plug
    fn input(&self, plug: PlugId) -> Result<Option<PlugId>>;

    /// Outgoing connection destinations of a plug
    fn outputs(&self, plug: PlugId) -> Result<Vec<PlugId>>;

    /// Write a value into an unconnected input plug
    fn set_value(&mut self, plug: PlugId, value: Value) -> Result<()>;

    /// Read the current (evaluated) value of a plug
    fn get_value(&self, plug: PlugId) -> Result<Value>;

    /// Lock or unlock a plug against edits and new connections
    fn set_locked(&mut self, plug: PlugId, locked: bool) -> Result<()>;

    /// Whether a plug is locked
    fn is_locked(&self, plug: PlugId) -> Result<bool>;

    /// Load a plug-in module if it is not loaded yet
    fn ensure_capability(&mut self, name: &str) -> Result<()>;
}
