// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host graph boundary for Nodex.
//!
//! This crate provides:
//! - [`GraphStore`], the narrow interface Nodex consumes from a host
//!   application's node/attribute graph
//! - [`Graph`], an in-memory host implementing it
//! - a built-in catalog of math, vector and matrix computation nodes
//!
//! ## Architecture
//!
//! The in-memory host is built on:
//! - Typed attributes (scalar, compound, array, matrix) instantiated as plugs
//! - Forced/unforced plug-to-plug connections
//! - Lazy pull evaluation of computed outputs
//! - Capability-gated node types

pub mod attribute;
pub mod builtin;
pub mod connection;
pub mod evaluation;
pub mod graph;
pub mod node;
pub mod store;

pub use attribute::{AttrKind, AttrSpec, AttrType, Direction, PlugId, Value};
pub use connection::{Connection, ConnectionId};
pub use evaluation::{EvaluationContext, EvaluationError, Evaluator, NodeOutput};
pub use graph::Graph;
pub use node::{Node, NodeCategory, NodeId, NodeRegistry, NodeType};
pub use store::{GraphError, GraphStore};
