// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the host graph.

use crate::attribute::{AttrKind, AttrSpec, PlugId};
use crate::evaluation::Evaluator;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Scalar and three-channel arithmetic
    Math,
    /// Comparison and branching
    Logic,
    /// Vector geometry
    Vector,
    /// Matrix operations
    Matrix,
    /// Scene objects
    Transform,
}

/// Node type definition
#[derive(Debug, Clone)]
pub struct NodeType {
    /// Unique type identifier (`plusMinusAverage`)
    pub id: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Top-level attributes
    pub attributes: Vec<AttrSpec>,
    /// Plug-in module that must be loaded before creation
    pub capability: Option<String>,
    /// Computes the output attributes
    pub evaluator: Option<Evaluator>,
}

impl NodeType {
    /// Create a type with no attributes
    pub fn new(id: impl Into<String>, category: NodeCategory, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category,
            description: description.into(),
            attributes: Vec::new(),
            capability: None,
            evaluator: None,
        }
    }

    /// Add an attribute
    pub fn with_attr(mut self, spec: AttrSpec) -> Self {
        self.attributes.push(spec);
        self
    }

    /// Require a capability before instances can be created
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = Some(capability.into());
        self
    }

    /// Set the evaluator
    pub fn with_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Find an attribute declaration by long or short name, searching compound
    /// children too (attribute names are unique per node)
    pub fn find_attr(&self, name: &str) -> Option<&AttrSpec> {
        fn search<'a>(specs: &'a [AttrSpec], name: &str) -> Option<&'a AttrSpec> {
            for spec in specs {
                if spec.matches(name) {
                    return Some(spec);
                }
                if let AttrKind::Compound(children) = &spec.kind {
                    if let Some(found) = search(children, name) {
                        return Some(found);
                    }
                }
            }
            None
        }
        search(&self.attributes, name)
    }
}

/// A node instance in the graph
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node type ID
    pub node_type: String,
    /// Unique node name
    pub name: String,
    /// Top-level plugs by long attribute name
    pub attributes: IndexMap<String, PlugId>,
}

impl Node {
    /// Create an empty node of the given type
    pub fn new(node_type: &NodeType, name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            node_type: node_type.id.clone(),
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Get a top-level plug by long name
    pub fn attribute(&self, name: &str) -> Option<PlugId> {
        self.attributes.get(name).copied()
    }
}

/// Registry of available node types
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    /// Registered node types by ID
    types: IndexMap<String, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    /// Register a node type
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Get types by category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.category == category)
    }

    /// Whether any registered type requires `capability`
    pub fn provides_capability(&self, capability: &str) -> bool {
        self.types
            .values()
            .any(|t| t.capability.as_deref() == Some(capability))
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_attr_searches_children() {
        let node_type = NodeType::new("transform", NodeCategory::Transform, "")
            .with_attr(
                AttrSpec::float3("translate", ["X", "Y", "Z"])
                    .with_short("t")
                    .with_child_shorts(&["tx", "ty", "tz"]),
            );
        assert_eq!(node_type.find_attr("t").map(|s| s.name.as_str()), Some("translate"));
        assert_eq!(node_type.find_attr("ty").map(|s| s.name.as_str()), Some("translateY"));
        assert!(node_type.find_attr("rotate").is_none());
    }

    #[test]
    fn test_registry_capabilities() {
        let mut registry = NodeRegistry::new();
        registry.register(
            NodeType::new("inverseMatrix", NodeCategory::Matrix, "").with_capability("matrixNodes"),
        );
        registry.register(NodeType::new("clamp", NodeCategory::Math, ""));
        assert!(registry.provides_capability("matrixNodes"));
        assert!(!registry.provides_capability("fooNodes"));
        assert_eq!(registry.types_in_category(NodeCategory::Math).count(), 1);
    }
}
