// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory host graph containing nodes, plugs and connections.

use crate::attribute::{AttrKind, AttrSpec, AttrType, Direction, PlugId, Value};
use crate::builtin;
use crate::connection::{Connection, ConnectionId};
use crate::evaluation::{EvaluationContext, EvaluationError, NodeOutput};
use crate::node::{Node, NodeId, NodeRegistry};
use crate::store::{GraphError, GraphStore, Result};
use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeMap;

/// Storage of a plug
#[derive(Debug, Clone)]
pub enum PlugKind {
    /// Single value
    Leaf {
        /// Data type
        attr_type: AttrType,
        /// Stored value (ignored for computed outputs)
        value: Value,
    },
    /// Fixed children
    Compound {
        /// Child plugs, in declaration order
        children: Vec<PlugId>,
    },
    /// Sparse elements by logical index
    Array {
        /// Shape of new elements
        template: AttrSpec,
        /// Existing elements
        elements: BTreeMap<usize, PlugId>,
    },
}

/// An attribute instance on a node
#[derive(Debug, Clone)]
pub struct Plug {
    /// Unique plug ID
    pub id: PlugId,
    /// Owning node
    pub node: NodeId,
    /// Leaf name (`input3D[2]`, `translateX`)
    pub name: String,
    /// Short alias
    pub short_name: Option<String>,
    /// Path relative to the node (`input3D[2].input3Dx`)
    pub path: String,
    /// Parent compound or array
    pub parent: Option<PlugId>,
    /// Child position or logical element index
    pub index: usize,
    /// Direction
    pub direction: Direction,
    /// Storage
    pub kind: PlugKind,
    /// Locked against edits
    pub locked: bool,
}

impl Plug {
    fn matches(&self, name: &str) -> bool {
        self.name == name || self.short_name.as_deref() == Some(name)
    }

    fn attr_type(&self) -> AttrType {
        match &self.kind {
            PlugKind::Leaf { attr_type, .. } => *attr_type,
            PlugKind::Compound { .. } => AttrType::Compound,
            PlugKind::Array { .. } => AttrType::Array,
        }
    }
}

enum Lookup {
    Found(PlugId),
    MissingElement { array: PlugId, index: usize },
    NotFound,
}

/// A host graph
#[derive(Debug, Clone)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Available node types
    registry: NodeRegistry,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// All plugs of all nodes
    plugs: IndexMap<PlugId, Plug>,
    /// Connections between plugs
    connections: IndexMap<ConnectionId, Connection>,
    /// Loaded capabilities
    capabilities: IndexSet<String>,
}

impl Graph {
    /// Create a new empty graph with the built-in node catalog
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_registry(name, builtin::create_registry())
    }

    /// Create a new empty graph with a custom node catalog
    pub fn with_registry(name: impl Into<String>, registry: NodeRegistry) -> Self {
        Self {
            name: name.into(),
            registry,
            nodes: IndexMap::new(),
            plugs: IndexMap::new(),
            connections: IndexMap::new(),
            capabilities: IndexSet::new(),
        }
    }

    /// Available node types
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get all nodes of one type
    pub fn nodes_of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.values().filter(move |n| n.node_type == type_name)
    }

    /// Get a plug by ID
    pub fn plug(&self, plug_id: PlugId) -> Option<&Plug> {
        self.plugs.get(&plug_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Whether a capability has been loaded
    pub fn is_capability_loaded(&self, name: &str) -> bool {
        self.capabilities.contains(name)
    }

    fn plug_ref(&self, plug: PlugId) -> Result<&Plug> {
        self.plugs.get(&plug).ok_or(GraphError::PlugNotFound(plug))
    }

    fn node_ref(&self, node: NodeId) -> Result<&Node> {
        self.nodes
            .get(&node)
            .ok_or_else(|| GraphError::NodeNotFound(format!("{node:?}")))
    }

    fn path_of(&self, plug: PlugId) -> String {
        self.plug_path(plug).unwrap_or_else(|_| format!("{plug:?}"))
    }

    fn unique_name(&self, base: &str) -> String {
        let taken = |candidate: &str| self.nodes.values().any(|n| n.name == candidate);
        if !taken(base) {
            return base.to_string();
        }
        let stem = base.trim_end_matches(|c: char| c.is_ascii_digit());
        (1..)
            .map(|n| format!("{stem}{n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    fn instantiate(
        &mut self,
        node: NodeId,
        spec: &AttrSpec,
        parent: Option<PlugId>,
        name: String,
        path: String,
        index: usize,
    ) -> PlugId {
        let id = PlugId::new();
        let kind = match &spec.kind {
            AttrKind::Compound(children) => {
                let children = children
                    .iter()
                    .enumerate()
                    .map(|(i, child)| {
                        let child_path = format!("{path}.{}", child.name);
                        self.instantiate(node, child, Some(id), child.name.clone(), child_path, i)
                    })
                    .collect();
                PlugKind::Compound { children }
            }
            AttrKind::Array(element) => PlugKind::Array {
                template: (**element).clone(),
                elements: BTreeMap::new(),
            },
            leaf => PlugKind::Leaf {
                attr_type: leaf.attr_type(),
                value: spec.default.clone().unwrap_or_else(|| zero(leaf.attr_type())),
            },
        };
        self.plugs.insert(
            id,
            Plug {
                id,
                node,
                name,
                short_name: spec.short_name.clone(),
                path,
                parent,
                index,
                direction: spec.direction,
                kind,
                locked: false,
            },
        );
        id
    }

    fn create_element(&mut self, array: PlugId, index: usize) -> Result<PlugId> {
        let plug = self.plug_ref(array)?;
        let PlugKind::Array { template, .. } = &plug.kind else {
            return Err(GraphError::AttributeNotFound {
                node: format!("{:?}", plug.node),
                attribute: format!("{}[{index}]", plug.path),
            });
        };
        let template = template.clone();
        let node = plug.node;
        let name = format!("{}[{index}]", plug.name);
        let path = format!("{}[{index}]", plug.path);
        let element = self.instantiate(node, &template, Some(array), name, path, index);
        if let Some(Plug {
            kind: PlugKind::Array { elements, .. },
            ..
        }) = self.plugs.get_mut(&array)
        {
            elements.insert(index, element);
        }
        Ok(element)
    }

    fn find_in_tree(&self, plug: PlugId, name: &str) -> Option<PlugId> {
        let p = self.plugs.get(&plug)?;
        if p.matches(name) {
            return Some(plug);
        }
        match &p.kind {
            PlugKind::Compound { children } => {
                children.iter().find_map(|c| self.find_in_tree(*c, name))
            }
            _ => None,
        }
    }

    fn find_child(&self, parent: PlugId, name: &str) -> Option<PlugId> {
        match &self.plugs.get(&parent)?.kind {
            PlugKind::Compound { children } => children
                .iter()
                .copied()
                .find(|c| self.plugs.get(c).is_some_and(|p| p.matches(name))),
            _ => None,
        }
    }

    fn lookup(&self, node: NodeId, path: &str) -> Lookup {
        let Some(node_ref) = self.nodes.get(&node) else {
            return Lookup::NotFound;
        };
        let mut current: Option<PlugId> = None;
        for segment in path.split('.') {
            let Some((name, index)) = parse_segment(segment) else {
                return Lookup::NotFound;
            };
            let found = match current {
                None => node_ref
                    .attributes
                    .values()
                    .find_map(|top| self.find_in_tree(*top, name)),
                Some(parent) => self.find_child(parent, name),
            };
            let Some(mut plug) = found else {
                return Lookup::NotFound;
            };
            if let Some(index) = index {
                match self.plugs.get(&plug).map(|p| &p.kind) {
                    Some(PlugKind::Array { elements, .. }) => match elements.get(&index) {
                        Some(element) => plug = *element,
                        None => return Lookup::MissingElement { array: plug, index },
                    },
                    _ => return Lookup::NotFound,
                }
            }
            current = Some(plug);
        }
        current.map_or(Lookup::NotFound, Lookup::Found)
    }

    /// Find a plug by relative path without creating array elements
    pub(crate) fn find_plug(&self, node: NodeId, path: &str) -> Option<PlugId> {
        match self.lookup(node, path) {
            Lookup::Found(plug) => Some(plug),
            _ => None,
        }
    }

    fn resolve(&mut self, node: NodeId, path: &str) -> Result<PlugId> {
        loop {
            match self.lookup(node, path) {
                Lookup::Found(plug) => return Ok(plug),
                Lookup::MissingElement { array, index } => {
                    self.create_element(array, index)?;
                }
                Lookup::NotFound => {
                    let node = self
                        .nodes
                        .get(&node)
                        .map_or_else(|| format!("{node:?}"), |n| n.name.clone());
                    return Err(GraphError::AttributeNotFound {
                        node,
                        attribute: path.to_string(),
                    });
                }
            }
        }
    }

    /// Existing elements of an array plug, in logical order
    pub(crate) fn existing_elements(&self, plug: PlugId) -> Vec<PlugId> {
        match self.plugs.get(&plug).map(|p| &p.kind) {
            Some(PlugKind::Array { elements, .. }) => elements.values().copied().collect(),
            _ => Vec::new(),
        }
    }

    fn input_plug(&self, plug: PlugId) -> Option<PlugId> {
        self.connections
            .values()
            .find(|c| c.feeds(plug))
            .map(|c| c.source)
    }

    /// Closest enclosing compound with an incoming connection
    fn connected_ancestor(&self, plug: PlugId) -> Option<PlugId> {
        let mut current = self.plugs.get(&plug)?.parent;
        while let Some(parent) = current {
            let p = self.plugs.get(&parent)?;
            if !matches!(p.kind, PlugKind::Compound { .. }) {
                return None;
            }
            if self.input_plug(parent).is_some() {
                return Some(parent);
            }
            current = p.parent;
        }
        None
    }

    /// Value arriving through a connection on an enclosing compound
    fn inherited(&self, plug: PlugId, visiting: &mut Vec<NodeId>) -> std::result::Result<Option<Value>, EvaluationError> {
        let Some(p) = self.plugs.get(&plug) else {
            return Ok(None);
        };
        let Some(parent) = p.parent else {
            return Ok(None);
        };
        if !matches!(
            self.plugs.get(&parent).map(|pp| &pp.kind),
            Some(PlugKind::Compound { .. })
        ) {
            return Ok(None);
        }
        let upstream = match self.input_plug(parent) {
            Some(src) => Some(self.read(src, visiting)?),
            None => self.inherited(parent, visiting)?,
        };
        Ok(upstream.and_then(|v| v.component(p.index)))
    }

    /// Read a plug, following connections and evaluating computed outputs
    pub(crate) fn read(&self, plug: PlugId, visiting: &mut Vec<NodeId>) -> std::result::Result<Value, EvaluationError> {
        let p = self
            .plugs
            .get(&plug)
            .ok_or_else(|| EvaluationError::MissingInput(format!("{plug:?}")))?;
        if let PlugKind::Compound { children } = &p.kind {
            // A child's own input wins over the compound's source
            if self.input_plug(plug).is_some() || self.connected_ancestor(plug).is_some() {
                return children
                    .iter()
                    .map(|child| self.read(*child, visiting))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map(Value::Tuple);
            }
        } else {
            if let Some(src) = self.input_plug(plug) {
                return self.read(src, visiting);
            }
            if let Some(value) = self.inherited(plug, visiting)? {
                return Ok(value);
            }
        }
        match &p.kind {
            PlugKind::Leaf { value, .. } => {
                if p.direction == Direction::Output {
                    let output = self.evaluate(p.node, visiting)?;
                    if let Some(computed) = output.get(&p.path) {
                        return Ok(computed.clone());
                    }
                }
                Ok(value.clone())
            }
            PlugKind::Compound { children } => {
                let computed = if p.direction == Direction::Output {
                    Some(self.evaluate(p.node, visiting)?)
                } else {
                    None
                };
                children
                    .iter()
                    .map(|child| {
                        let cached = computed.as_ref().and_then(|out| {
                            let child_path = &self.plugs.get(child)?.path;
                            out.get(child_path).cloned()
                        });
                        match cached {
                            Some(v) if self.input_plug(*child).is_none() => Ok(v),
                            _ => self.read(*child, visiting),
                        }
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map(Value::Tuple)
            }
            PlugKind::Array { elements, .. } => elements
                .values()
                .map(|element| self.read(*element, visiting))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Value::Tuple),
        }
    }

    fn evaluate(&self, node: NodeId, visiting: &mut Vec<NodeId>) -> std::result::Result<NodeOutput, EvaluationError> {
        let node_ref = self
            .nodes
            .get(&node)
            .ok_or_else(|| EvaluationError::Custom(format!("Node not found: {node:?}")))?;
        if visiting.contains(&node) {
            return Err(EvaluationError::CycleDetected(node_ref.name.clone()));
        }
        let Some(evaluator) = self
            .registry
            .get(&node_ref.node_type)
            .and_then(|t| t.evaluator)
        else {
            return Ok(NodeOutput::new());
        };
        visiting.push(node);
        let result = {
            let mut ctx = EvaluationContext::new(self, node, visiting);
            evaluator(&mut ctx)
        };
        visiting.pop();
        result
    }

    fn compatible(&self, from: &Plug, to: &Plug) -> bool {
        match (from.attr_type(), to.attr_type()) {
            (a, b) if a.is_numeric() && b.is_numeric() => true,
            (AttrType::Matrix, AttrType::Matrix) | (AttrType::Array, AttrType::Array) => true,
            (AttrType::Compound, AttrType::Compound) => {
                match (&from.kind, &to.kind) {
                    (PlugKind::Compound { children: a }, PlugKind::Compound { children: b }) => {
                        a.len() == b.len()
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

fn zero(attr_type: AttrType) -> Value {
    match attr_type {
        AttrType::Bool => Value::Bool(false),
        AttrType::Int => Value::Int(0),
        AttrType::Matrix => Value::identity(),
        AttrType::Float | AttrType::Compound | AttrType::Array => Value::Float(0.0),
    }
}

fn coerce(attr_type: AttrType, value: &Value) -> Option<Value> {
    match attr_type {
        AttrType::Bool => value.as_f64().map(|v| Value::Bool(v != 0.0)),
        AttrType::Int => value.as_f64().map(|v| Value::Int(v as i64)),
        AttrType::Float => value.as_f64().map(Value::Float),
        AttrType::Matrix => value.as_matrix().map(Value::Matrix),
        AttrType::Compound | AttrType::Array => None,
    }
}

/// Split `name[3]` into its name and logical index
fn parse_segment(segment: &str) -> Option<(&str, Option<usize>)> {
    match segment.split_once('[') {
        None if !segment.is_empty() => Some((segment, None)),
        None => None,
        Some((name, rest)) => {
            let index = rest.strip_suffix(']')?.parse().ok()?;
            Some((name, Some(index)))
        }
    }
}

impl GraphStore for Graph {
    fn create_node(&mut self, type_name: &str, name: &str) -> Result<NodeId> {
        let node_type = self
            .registry
            .get(type_name)
            .cloned()
            .ok_or_else(|| GraphError::NodeTypeNotFound(type_name.to_string()))?;
        if let Some(capability) = &node_type.capability {
            if !self.capabilities.contains(capability) {
                return Err(GraphError::CapabilityNotLoaded {
                    capability: capability.clone(),
                    node_type: type_name.to_string(),
                });
            }
        }

        let name = self.unique_name(if name.is_empty() { type_name } else { name });
        let mut node = Node::new(&node_type, name);
        let id = node.id;
        for (i, spec) in node_type.attributes.iter().enumerate() {
            let plug = self.instantiate(id, spec, None, spec.name.clone(), spec.name.clone(), i);
            node.attributes.insert(spec.name.clone(), plug);
        }
        tracing::debug!(node = %node.name, node_type = type_name, "created node");
        self.nodes.insert(id, node);
        Ok(id)
    }

    fn node_name(&self, node: NodeId) -> Result<String> {
        Ok(self.node_ref(node)?.name.clone())
    }

    fn node_type(&self, node: NodeId) -> Result<String> {
        Ok(self.node_ref(node)?.node_type.clone())
    }

    fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.values().find(|n| n.name == name).map(|n| n.id)
    }

    fn nodes(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    fn attribute(&mut self, node: NodeId, name: &str) -> Result<PlugId> {
        self.node_ref(node)?;
        self.resolve(node, name)
    }

    fn attribute_by_path(&mut self, path: &str) -> Result<PlugId> {
        let Some((node_name, attribute)) = path.split_once('.') else {
            return Err(GraphError::AttributeNotFound {
                node: path.to_string(),
                attribute: String::new(),
            });
        };
        let node = self
            .node_by_name(node_name)
            .ok_or_else(|| GraphError::NodeNotFound(node_name.to_string()))?;
        self.resolve(node, attribute)
    }

    fn find_attribute(&self, path: &str) -> Option<PlugId> {
        let (node_name, attribute) = path.split_once('.')?;
        self.find_plug(self.node_by_name(node_name)?, attribute)
    }

    fn parent(&self, plug: PlugId) -> Result<Option<PlugId>> {
        Ok(self.plug_ref(plug)?.parent)
    }

    fn plug_node(&self, plug: PlugId) -> Result<NodeId> {
        Ok(self.plug_ref(plug)?.node)
    }

    fn plug_path(&self, plug: PlugId) -> Result<String> {
        let p = self.plug_ref(plug)?;
        let node = self.node_ref(p.node)?;
        Ok(format!("{}.{}", node.name, p.path))
    }

    fn attribute_type(&self, plug: PlugId) -> Result<AttrType> {
        Ok(self.plug_ref(plug)?.attr_type())
    }

    fn num_elements(&self, plug: PlugId) -> Result<usize> {
        Ok(match &self.plug_ref(plug)?.kind {
            PlugKind::Array { elements, .. } => elements.len(),
            _ => 0,
        })
    }

    fn num_children(&self, plug: PlugId) -> Result<usize> {
        Ok(match &self.plug_ref(plug)?.kind {
            PlugKind::Compound { children } => children.len(),
            _ => 0,
        })
    }

    fn element_by_index(&self, plug: PlugId, index: usize) -> Result<PlugId> {
        let elements = match &self.plug_ref(plug)?.kind {
            PlugKind::Array { elements, .. } => elements,
            _ => {
                return Err(GraphError::IndexOutOfRange {
                    plug: self.path_of(plug),
                    index,
                    len: 0,
                })
            }
        };
        elements
            .values()
            .nth(index)
            .copied()
            .ok_or_else(|| GraphError::IndexOutOfRange {
                plug: self.path_of(plug),
                index,
                len: elements.len(),
            })
    }

    fn children(&self, plug: PlugId) -> Result<Vec<PlugId>> {
        Ok(match &self.plug_ref(plug)?.kind {
            PlugKind::Compound { children } => children.clone(),
            _ => Vec::new(),
        })
    }

    fn connect(&mut self, src: PlugId, dst: PlugId, force: bool) -> Result<()> {
        let from = self.plug_ref(src)?;
        let to = self.plug_ref(dst)?;
        if src == dst || !self.compatible(from, to) {
            return Err(GraphError::IncompatiblePlugs {
                from: self.path_of(src),
                to: self.path_of(dst),
            });
        }
        if to.locked {
            return Err(GraphError::Locked(self.path_of(dst)));
        }
        if to.direction == Direction::Output {
            return Err(GraphError::NotWritable(self.path_of(dst)));
        }
        if let Some((id, existing)) = self
            .connections
            .iter()
            .find(|(_, c)| c.feeds(dst))
            .map(|(id, c)| (*id, c.source))
        {
            if existing == src {
                return Ok(());
            }
            if !force {
                return Err(GraphError::AlreadyConnected(self.path_of(dst)));
            }
            self.connections.swap_remove(&id);
        }

        let connection = Connection::new(src, dst);
        tracing::trace!(from = %self.path_of(src), to = %self.path_of(dst), "connected");
        self.connections.insert(connection.id, connection);
        Ok(())
    }

    fn disconnect(&mut self, src: PlugId, dst: PlugId) -> Result<()> {
        let id = self
            .connections
            .iter()
            .find(|(_, c)| c.joins(src, dst))
            .map(|(id, _)| *id)
            .ok_or_else(|| GraphError::NotConnected {
                from: self.path_of(src),
                to: self.path_of(dst),
            })?;
        self.connections.swap_remove(&id);
        Ok(())
    }

    fn input(&self, plug: PlugId) -> Result<Option<PlugId>> {
        self.plug_ref(plug)?;
        Ok(self.input_plug(plug))
    }

    fn outputs(&self, plug: PlugId) -> Result<Vec<PlugId>> {
        self.plug_ref(plug)?;
        Ok(self
            .connections
            .values()
            .filter(|c| c.reads(plug))
            .map(|c| c.destination)
            .collect())
    }

    fn set_value(&mut self, plug: PlugId, value: Value) -> Result<()> {
        let p = self.plug_ref(plug)?;
        if p.locked {
            return Err(GraphError::Locked(self.path_of(plug)));
        }
        if p.direction == Direction::Output
            || self.input_plug(plug).is_some()
            || self.connected_ancestor(plug).is_some()
        {
            return Err(GraphError::NotWritable(self.path_of(plug)));
        }
        let mismatch = |graph: &Self| GraphError::TypeMismatch {
            plug: graph.path_of(plug),
            value: format!("{value:?}"),
        };

        match &p.kind {
            PlugKind::Leaf { attr_type, .. } => {
                let coerced = coerce(*attr_type, &value).ok_or_else(|| mismatch(self))?;
                if let Some(Plug {
                    kind: PlugKind::Leaf { value: stored, .. },
                    ..
                }) = self.plugs.get_mut(&plug)
                {
                    *stored = coerced;
                }
                Ok(())
            }
            PlugKind::Compound { children } => {
                let children = children.clone();
                match &value {
                    Value::Tuple(values) if values.len() == children.len() => {
                        for (child, v) in children.into_iter().zip(values.iter().cloned()) {
                            self.set_value(child, v)?;
                        }
                        Ok(())
                    }
                    _ => Err(mismatch(self)),
                }
            }
            PlugKind::Array { .. } => {
                let Value::Tuple(values) = &value else {
                    return Err(mismatch(self));
                };
                for (index, v) in values.iter().cloned().enumerate() {
                    let element = match self.lookup_element(plug, index) {
                        Some(element) => element,
                        None => self.create_element(plug, index)?,
                    };
                    self.set_value(element, v)?;
                }
                Ok(())
            }
        }
    }

    fn get_value(&self, plug: PlugId) -> Result<Value> {
        self.plug_ref(plug)?;
        let mut visiting = Vec::new();
        Ok(self.read(plug, &mut visiting)?)
    }

    fn set_locked(&mut self, plug: PlugId, locked: bool) -> Result<()> {
        let p = self
            .plugs
            .get_mut(&plug)
            .ok_or(GraphError::PlugNotFound(plug))?;
        p.locked = locked;
        Ok(())
    }

    fn is_locked(&self, plug: PlugId) -> Result<bool> {
        Ok(self.plug_ref(plug)?.locked)
    }

    fn ensure_capability(&mut self, name: &str) -> Result<()> {
        if self.capabilities.contains(name) {
            return Ok(());
        }
        if !self.registry.provides_capability(name) {
            return Err(GraphError::UnknownCapability(name.to_string()));
        }
        tracing::info!(capability = name, "loaded capability");
        self.capabilities.insert(name.to_string());
        Ok(())
    }
}

impl Graph {
    fn lookup_element(&self, array: PlugId, index: usize) -> Option<PlugId> {
        match &self.plugs.get(&array)?.kind {
            PlugKind::Array { elements, .. } => elements.get(&index).copied(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_sphere() -> (Graph, NodeId) {
        let mut graph = Graph::new("test");
        let sphere = graph.create_node("transform", "pSphere1").unwrap();
        (graph, sphere)
    }

    #[test]
    fn test_short_and_nested_names() {
        let (mut graph, sphere) = graph_with_sphere();
        let t = graph.attribute_by_path("pSphere1.t").unwrap();
        let translate = graph.attribute(sphere, "translate").unwrap();
        assert_eq!(t, translate);
        let tx = graph.attribute_by_path("pSphere1.tx").unwrap();
        assert_eq!(graph.plug_path(tx).unwrap(), "pSphere1.translate.translateX");
        assert_eq!(graph.attribute_type(t).unwrap(), AttrType::Compound);
        assert_eq!(graph.num_children(t).unwrap(), 3);
        assert!(graph.attribute_by_path("pSphere1.nope").is_err());
        assert!(matches!(
            graph.attribute_by_path("nobody.tx"),
            Err(GraphError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_unique_node_names() {
        let mut graph = Graph::new("test");
        let a = graph.create_node("plusMinusAverage", "sum").unwrap();
        let b = graph.create_node("plusMinusAverage", "sum").unwrap();
        let c = graph.create_node("plusMinusAverage", "").unwrap();
        assert_eq!(graph.node_name(a).unwrap(), "sum");
        assert_eq!(graph.node_name(b).unwrap(), "sum1");
        assert_eq!(graph.node_name(c).unwrap(), "plusMinusAverage");
        assert_eq!(graph.nodes_of_type("plusMinusAverage").count(), 3);
    }

    #[test]
    fn test_array_elements_created_by_path() {
        let mut graph = Graph::new("test");
        let node = graph.create_node("plusMinusAverage", "sum").unwrap();
        let array = graph.attribute(node, "input1D").unwrap();
        assert_eq!(graph.num_elements(array).unwrap(), 0);
        assert!(matches!(
            graph.element_by_index(array, 0),
            Err(GraphError::IndexOutOfRange { len: 0, .. })
        ));

        let second = graph.attribute(node, "input1D[4]").unwrap();
        let first = graph.attribute(node, "input1D[1]").unwrap();
        assert_eq!(graph.num_elements(array).unwrap(), 2);
        assert_eq!(graph.element_by_index(array, 0).unwrap(), first);
        assert_eq!(graph.element_by_index(array, 1).unwrap(), second);

        let child = graph.attribute(node, "input3D[0].input3Dy").unwrap();
        assert_eq!(graph.plug_path(child).unwrap(), "sum.input3D[0].input3Dy");
    }

    #[test]
    fn test_set_and_get_values() {
        let (mut graph, sphere) = graph_with_sphere();
        let t = graph.attribute(sphere, "t").unwrap();
        graph.set_value(t, Value::from([1.0, 2.0, 3.0])).unwrap();
        assert_eq!(graph.get_value(t).unwrap(), Value::floats(&[1.0, 2.0, 3.0]));

        let v = graph.attribute(sphere, "v").unwrap();
        graph.set_value(v, Value::Float(0.0)).unwrap();
        assert_eq!(graph.get_value(v).unwrap(), Value::Bool(false));

        assert!(matches!(
            graph.set_value(t, Value::Float(1.0)),
            Err(GraphError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_connections_force_and_propagation() {
        let mut graph = Graph::new("test");
        let a = graph.create_node("transform", "a").unwrap();
        let b = graph.create_node("transform", "b").unwrap();
        let at = graph.attribute(a, "t").unwrap();
        let ar = graph.attribute(a, "r").unwrap();
        let bt = graph.attribute(b, "t").unwrap();
        let bty = graph.attribute(b, "ty").unwrap();

        graph.set_value(at, Value::from([4.0, 5.0, 6.0])).unwrap();
        graph.connect(at, bt, false).unwrap();
        assert_eq!(graph.get_value(bty).unwrap(), Value::Float(5.0));
        assert!(matches!(
            graph.connect(ar, bt, false),
            Err(GraphError::AlreadyConnected(_))
        ));
        graph.connect(ar, bt, true).unwrap();
        assert_eq!(graph.input(bt).unwrap(), Some(ar));
        assert_eq!(graph.outputs(at).unwrap(), Vec::<PlugId>::new());

        assert!(matches!(
            graph.set_value(bt, Value::from([0.0, 0.0, 0.0])),
            Err(GraphError::NotWritable(_))
        ));
        graph.disconnect(ar, bt).unwrap();
        assert!(graph.disconnect(ar, bt).is_err());
    }

    #[test]
    fn test_child_input_wins_over_compound_source() {
        let (mut graph, sphere) = graph_with_sphere();
        let t = graph.attribute(sphere, "t").unwrap();
        let r = graph.attribute(sphere, "r").unwrap();
        let sx = graph.attribute(sphere, "sx").unwrap();
        let ry = graph.attribute(sphere, "ry").unwrap();
        graph.set_value(t, Value::from([1.0, 2.0, 3.0])).unwrap();
        graph.connect(t, r, false).unwrap();
        graph.connect(sx, ry, false).unwrap();
        assert_eq!(graph.get_value(ry).unwrap(), Value::Float(1.0));
        assert_eq!(graph.get_value(r).unwrap(), Value::floats(&[1.0, 1.0, 3.0]));
    }

    #[test]
    fn test_children_of_connected_compound_not_writable() {
        let (mut graph, sphere) = graph_with_sphere();
        let t = graph.attribute(sphere, "t").unwrap();
        let r = graph.attribute(sphere, "r").unwrap();
        let rx = graph.attribute(sphere, "rx").unwrap();
        graph.connect(t, r, false).unwrap();
        assert_eq!(graph.parent(rx).unwrap(), Some(r));
        assert!(matches!(
            graph.set_value(rx, Value::Float(5.0)),
            Err(GraphError::NotWritable(_))
        ));
    }

    #[test]
    fn test_find_attribute_creates_nothing() {
        let mut graph = Graph::new("test");
        let node = graph.create_node("plusMinusAverage", "sum").unwrap();
        let array = graph.attribute(node, "input1D").unwrap();
        let first = graph.attribute(node, "input1D[0]").unwrap();
        assert_eq!(graph.find_attribute("sum.input1D[0]"), Some(first));
        assert_eq!(graph.find_attribute("sum.input1D[5]"), None);
        assert_eq!(graph.find_attribute("sum"), None);
        assert_eq!(graph.num_elements(array).unwrap(), 1);
    }

    #[test]
    fn test_locked_plugs_reject_edits() {
        let (mut graph, sphere) = graph_with_sphere();
        let tx = graph.attribute(sphere, "tx").unwrap();
        let ty = graph.attribute(sphere, "ty").unwrap();
        graph.set_locked(tx, true).unwrap();
        assert!(graph.is_locked(tx).unwrap());
        assert!(matches!(graph.set_value(tx, Value::Float(1.0)), Err(GraphError::Locked(_))));
        assert!(matches!(graph.connect(ty, tx, true), Err(GraphError::Locked(_))));
    }

    #[test]
    fn test_incompatible_shapes() {
        let (mut graph, sphere) = graph_with_sphere();
        let t = graph.attribute(sphere, "t").unwrap();
        let tx = graph.attribute(sphere, "tx").unwrap();
        assert!(matches!(
            graph.connect(tx, t, false),
            Err(GraphError::IncompatiblePlugs { .. })
        ));
    }

    #[test]
    fn test_capability_gating() {
        let mut graph = Graph::new("test");
        assert!(matches!(
            graph.create_node("inverseMatrix", ""),
            Err(GraphError::CapabilityNotLoaded { .. })
        ));
        assert!(matches!(
            graph.ensure_capability("nope"),
            Err(GraphError::UnknownCapability(_))
        ));
        graph.ensure_capability("matrixNodes").unwrap();
        graph.ensure_capability("matrixNodes").unwrap();
        assert!(graph.is_capability_loaded("matrixNodes"));
        assert!(graph.create_node("inverseMatrix", "").is_ok());
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = Graph::new("test");
        let a = graph.create_node("addDoubleLinear", "a").unwrap();
        let b = graph.create_node("addDoubleLinear", "b").unwrap();
        let a_out = graph.attribute(a, "output").unwrap();
        let b_out = graph.attribute(b, "output").unwrap();
        let a_in = graph.attribute(a, "input1").unwrap();
        let b_in = graph.attribute(b, "input1").unwrap();
        graph.connect(a_out, b_in, false).unwrap();
        graph.connect(b_out, a_in, false).unwrap();
        assert!(matches!(
            graph.get_value(a_out),
            Err(GraphError::Evaluation(EvaluationError::CycleDetected(_)))
        ));
    }

    #[test]
    fn test_parse_segment() {
        assert_eq!(parse_segment("input1D[3]"), Some(("input1D", Some(3))));
        assert_eq!(parse_segment("tx"), Some(("tx", None)));
        assert_eq!(parse_segment("bad[x]"), None);
        assert_eq!(parse_segment(""), None);
    }
}
