// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error taxonomy for typed values and recipes.

use crate::datatype::DataType;
use nodex_graph::GraphError;
use thiserror::Error;

/// Errors surfaced by Nodex operations
#[derive(Debug, Error)]
pub enum NodexError {
    /// Input names nothing that maps to an attribute or value
    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),

    /// No registered datatype accepts the data
    #[error("Could not determine datatype for {0}")]
    UndefinedType(String),

    /// Explicitly requested datatype rejects the data
    #[error("Given data {data} is not compatible with datatype {datatype}")]
    InvalidData {
        /// Requested datatype
        datatype: DataType,
        /// Rejected data
        data: String,
    },

    /// Input cannot be used as reference data at all
    #[error("Unsupported reference data: {0}")]
    UnsupportedData(String),

    /// Structural method called on a value that is not attribute-backed
    #[error("{0} does not reference an attribute")]
    NotAnAttribute(String),

    /// Connect destination is not attribute-backed
    #[error("Can't connect to {0}: it does not reference an attribute")]
    NotConnectable(String),

    /// Working dimension exceeds what a recipe's nodes support
    #[error("{recipe} supports at most {max} dimensions, got {dimensions}")]
    Dimension {
        /// Recipe name
        recipe: String,
        /// Requested dimension
        dimensions: usize,
        /// Ceiling
        max: usize,
    },

    /// Component index out of range
    #[error("Index {index} out of range for {len} components")]
    Index {
        /// Requested index
        index: usize,
        /// Available components
        len: usize,
    },

    /// Invariant violation or unsupported state
    #[error("{0}")]
    Runtime(String),

    /// Error reported by the graph store
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Result type for Nodex operations
pub type Result<T> = std::result::Result<T, NodexError>;
