// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node catalog of the reference host.
//!
//! Each submodule registers a family of node types together with the
//! evaluator that computes their outputs.

pub mod arithmetic;
pub mod matrix;
pub mod scene;
pub mod vector;

use crate::node::NodeRegistry;

/// Capability that provides the matrix utility nodes
pub const MATRIX_CAPABILITY: &str = "matrixNodes";

/// Child suffixes of vector compounds
pub const XYZ: [&str; 3] = ["X", "Y", "Z"];

/// Child suffixes of color compounds
pub const RGB: [&str; 3] = ["R", "G", "B"];

/// Create the registry with every built-in node type
pub fn create_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    arithmetic::register(&mut registry);
    vector::register(&mut registry);
    matrix::register(&mut registry);
    scene::register(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_contents() {
        let registry = create_registry();
        for id in [
            "plusMinusAverage",
            "multiplyDivide",
            "addDoubleLinear",
            "multDoubleLinear",
            "clamp",
            "condition",
            "vectorProduct",
            "distanceBetween",
            "angleBetween",
            "composeMatrix",
            "decomposeMatrix",
            "inverseMatrix",
            "transposeMatrix",
            "multMatrix",
            "holdMatrix",
            "passMatrix",
            "transform",
        ] {
            assert!(registry.get(id).is_some(), "missing node type {id}");
        }
        assert!(registry.provides_capability(MATRIX_CAPABILITY));
    }
}
