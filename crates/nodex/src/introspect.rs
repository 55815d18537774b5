// SPDX-License-Identifier: MIT OR Apache-2.0
//! Attribute shape queries against the graph store.

use nodex_graph::{AttrType, GraphStore, PlugId};

/// Number of components an attribute carries.
///
/// Arrays count their existing elements, compounds their children and
/// matrices their sixteen entries; every other attribute is a single value.
pub fn attr_dimensions(store: &dyn GraphStore, plug: PlugId) -> nodex_graph::store::Result<usize> {
    if store.is_array_attribute(plug)? {
        store.num_elements(plug)
    } else if store.is_compound_attribute(plug)? {
        store.num_children(plug)
    } else if store.is_matrix_attribute(plug)? {
        Ok(16)
    } else {
        Ok(1)
    }
}

/// Sub-plugs of a compound (children) or array (existing elements)
pub fn components(store: &dyn GraphStore, plug: PlugId) -> nodex_graph::store::Result<Vec<PlugId>> {
    match store.attribute_type(plug)? {
        AttrType::Compound => store.children(plug),
        AttrType::Array => (0..store.num_elements(plug)?)
            .map(|i| store.element_by_index(plug, i))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

/// Whether every sub-plug of a compound or array holds a single number
pub fn numeric_components(store: &dyn GraphStore, plug: PlugId) -> nodex_graph::store::Result<bool> {
    let parts = components(store, plug)?;
    if parts.is_empty() {
        return Ok(false);
    }
    for part in parts {
        if !store.attribute_type(part)?.is_numeric() {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodex_graph::Graph;

    #[test]
    fn test_dimensions_by_shape() {
        let mut graph = Graph::new("test");
        let sphere = graph.create_node("transform", "pSphere1").unwrap();
        let pma = graph.create_node("plusMinusAverage", "").unwrap();

        let t = graph.attribute(sphere, "t").unwrap();
        let tx = graph.attribute(sphere, "tx").unwrap();
        let m = graph.attribute(sphere, "m").unwrap();
        let v = graph.attribute(sphere, "v").unwrap();
        assert_eq!(attr_dimensions(&graph, t).unwrap(), 3);
        assert_eq!(attr_dimensions(&graph, tx).unwrap(), 1);
        assert_eq!(attr_dimensions(&graph, m).unwrap(), 16);
        assert_eq!(attr_dimensions(&graph, v).unwrap(), 1);

        let input = graph.attribute(pma, "input1D").unwrap();
        assert_eq!(attr_dimensions(&graph, input).unwrap(), 0);
        graph.attribute(pma, "input1D[0]").unwrap();
        graph.attribute(pma, "input1D[4]").unwrap();
        assert_eq!(attr_dimensions(&graph, input).unwrap(), 2);
    }

    #[test]
    fn test_numeric_components() {
        let mut graph = Graph::new("test");
        let pma = graph.create_node("plusMinusAverage", "").unwrap();
        let sphere = graph.create_node("transform", "pSphere1").unwrap();

        let t = graph.attribute(sphere, "t").unwrap();
        assert!(numeric_components(&graph, t).unwrap());

        let input3d = graph.attribute(pma, "input3D").unwrap();
        assert!(!numeric_components(&graph, input3d).unwrap());
        graph.attribute(pma, "input3D[0]").unwrap();
        assert!(!numeric_components(&graph, input3d).unwrap());
        assert_eq!(components(&graph, input3d).unwrap().len(), 1);
    }
}
