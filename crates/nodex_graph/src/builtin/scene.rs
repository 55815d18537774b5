// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene objects.

use super::matrix::compose_trs;
use super::XYZ;
use crate::attribute::{AttrSpec, Value};
use crate::evaluation::{EvaluationContext, EvaluationError, NodeOutput};
use crate::node::{NodeCategory, NodeRegistry, NodeType};

/// Register the `transform` node type
pub fn register(registry: &mut NodeRegistry) {
    registry.register(
        NodeType::new(
            "transform",
            NodeCategory::Transform,
            "Scene object with translate, rotate, scale and a local matrix",
        )
        .with_attr(
            AttrSpec::float3("translate", XYZ)
                .with_short("t")
                .with_child_shorts(&["tx", "ty", "tz"]),
        )
        .with_attr(
            AttrSpec::float3("rotate", XYZ)
                .with_short("r")
                .with_child_shorts(&["rx", "ry", "rz"]),
        )
        .with_attr(
            AttrSpec::float3("scale", XYZ)
                .with_short("s")
                .with_child_shorts(&["sx", "sy", "sz"])
                .with_default(Value::Float(1.0)),
        )
        .with_attr(
            AttrSpec::bool("visibility")
                .with_short("v")
                .with_default(Value::Bool(true)),
        )
        .with_attr(AttrSpec::matrix("matrix").with_short("m").output())
        .with_evaluator(transform),
    );
}

fn transform(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let m = compose_trs(ctx.vec3("translate")?, ctx.vec3("rotate")?, ctx.vec3("scale")?);
    let mut out = NodeOutput::new();
    out.set_matrix("matrix", m);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use crate::attribute::Value;
    use crate::graph::Graph;
    use crate::store::GraphStore;

    #[test]
    fn test_local_matrix_follows_translate() {
        let mut graph = Graph::new("test");
        let node = graph.create_node("transform", "pCube1").unwrap();
        let t = graph.attribute(node, "t").unwrap();
        graph.set_value(t, Value::from([1.0, 2.0, 3.0])).unwrap();
        let m = graph.attribute(node, "m").unwrap();
        let flat = graph.get_value(m).unwrap().as_matrix().unwrap();
        assert_eq!(&flat[12..15], &[1.0, 2.0, 3.0]);
        assert_eq!(flat[0], 1.0);
    }
}
