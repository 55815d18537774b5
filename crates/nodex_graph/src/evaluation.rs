// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lazy evaluation of computation nodes.

use crate::attribute::{PlugId, Value};
use crate::graph::Graph;
use crate::node::NodeId;
use glam::{DMat4, DVec3};
use indexmap::IndexMap;

/// Computes a node's outputs from its inputs
pub type Evaluator = fn(&mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError>;

/// Result of evaluating a node
#[derive(Debug, Clone)]
pub struct NodeOutput {
    /// Output values by attribute path (`output3D.output3Dx`)
    pub values: IndexMap<String, Value>,
}

impl NodeOutput {
    /// Create a new empty output
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
        }
    }

    /// Set an output value
    pub fn set(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(path.into(), value.into());
    }

    /// Set the children of a compound output named `parent` + suffix
    pub fn set_children(&mut self, parent: &str, suffixes: &[&str], values: &[f64]) {
        for (suffix, component) in suffixes.iter().zip(values) {
            self.set(format!("{parent}.{parent}{suffix}"), *component);
        }
    }

    /// Set the three children of a compound output
    pub fn set_vec3(&mut self, parent: &str, suffixes: [&str; 3], v: DVec3) {
        self.set_children(parent, &suffixes, &v.to_array());
    }

    /// Set a matrix output
    pub fn set_matrix(&mut self, path: impl Into<String>, m: DMat4) {
        self.set(path, Value::Matrix(m.to_cols_array()));
    }

    /// Get an output value
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.values.get(path)
    }
}

impl Default for NodeOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Context handed to an [`Evaluator`]
pub struct EvaluationContext<'a> {
    graph: &'a Graph,
    node: NodeId,
    visiting: &'a mut Vec<NodeId>,
}

impl<'a> EvaluationContext<'a> {
    pub(crate) fn new(graph: &'a Graph, node: NodeId, visiting: &'a mut Vec<NodeId>) -> Self {
        Self {
            graph,
            node,
            visiting,
        }
    }

    /// The node being evaluated
    pub fn node(&self) -> NodeId {
        self.node
    }

    fn plug(&self, path: &str) -> Result<PlugId, EvaluationError> {
        self.graph
            .find_plug(self.node, path)
            .ok_or_else(|| EvaluationError::MissingInput(path.to_string()))
    }

    /// Read an input value by attribute path
    pub fn value(&mut self, path: &str) -> Result<Value, EvaluationError> {
        let plug = self.plug(path)?;
        self.graph.read(plug, self.visiting)
    }

    /// Read a number
    pub fn float(&mut self, path: &str) -> Result<f64, EvaluationError> {
        let value = self.value(path)?;
        value
            .as_f64()
            .ok_or_else(|| EvaluationError::TypeMismatch(path.to_string()))
    }

    /// Read an integer (enums, operation selectors)
    pub fn int(&mut self, path: &str) -> Result<i64, EvaluationError> {
        Ok(self.float(path)? as i64)
    }

    /// Read a boolean
    pub fn bool(&mut self, path: &str) -> Result<bool, EvaluationError> {
        Ok(self.float(path)? != 0.0)
    }

    /// Read a three-child compound as a vector
    pub fn vec3(&mut self, path: &str) -> Result<DVec3, EvaluationError> {
        let value = self.value(path)?;
        match value.to_f64s() {
            Some(v) if v.len() == 3 => Ok(DVec3::new(v[0], v[1], v[2])),
            _ => Err(EvaluationError::TypeMismatch(path.to_string())),
        }
    }

    /// Read a matrix
    pub fn matrix(&mut self, path: &str) -> Result<DMat4, EvaluationError> {
        let value = self.value(path)?;
        value
            .as_matrix()
            .map(|m| DMat4::from_cols_array(&m))
            .ok_or_else(|| EvaluationError::TypeMismatch(path.to_string()))
    }

    /// Read the values of all existing elements of an array
    pub fn elements(&mut self, path: &str) -> Result<Vec<Value>, EvaluationError> {
        let plug = self.plug(path)?;
        let elements = self.graph.existing_elements(plug);
        elements
            .into_iter()
            .map(|element| self.graph.read(element, self.visiting))
            .collect()
    }
}

/// Error during evaluation
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    /// Graph contains a cycle
    #[error("Graph contains a cycle through node '{0}'")]
    CycleDetected(String),

    /// Missing required input
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Type mismatch
    #[error("Type mismatch reading '{0}'")]
    TypeMismatch(String),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}
