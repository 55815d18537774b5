// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vector geometry nodes.

use super::XYZ;
use crate::attribute::{AttrSpec, Value};
use crate::evaluation::{EvaluationContext, EvaluationError, NodeOutput};
use crate::node::{NodeCategory, NodeRegistry, NodeType};
use glam::DVec3;

/// Register the vector node types
pub fn register(registry: &mut NodeRegistry) {
    registry.register(
        NodeType::new(
            "vectorProduct",
            NodeCategory::Vector,
            "Dot, cross, vector-matrix or point-matrix product",
        )
        .with_attr(AttrSpec::int("operation").with_default(Value::Int(1)))
        .with_attr(AttrSpec::float3("input1", XYZ))
        .with_attr(AttrSpec::float3("input2", XYZ))
        .with_attr(AttrSpec::matrix("matrix"))
        .with_attr(AttrSpec::bool("normalizeOutput"))
        .with_attr(AttrSpec::float3("output", XYZ).output())
        .with_evaluator(vector_product),
    );

    registry.register(
        NodeType::new(
            "distanceBetween",
            NodeCategory::Vector,
            "Distance between two (optionally transformed) points",
        )
        .with_attr(AttrSpec::float3("point1", XYZ))
        .with_attr(AttrSpec::matrix("inMatrix1"))
        .with_attr(AttrSpec::float3("point2", XYZ))
        .with_attr(AttrSpec::matrix("inMatrix2"))
        .with_attr(AttrSpec::float("distance").output())
        .with_evaluator(distance_between),
    );

    registry.register(
        NodeType::new(
            "angleBetween",
            NodeCategory::Vector,
            "Angle in degrees and rotation axis between two vectors",
        )
        .with_attr(AttrSpec::float3("vector1", XYZ).with_default(Value::from([1.0, 0.0, 0.0])))
        .with_attr(AttrSpec::float3("vector2", XYZ).with_default(Value::from([0.0, 1.0, 0.0])))
        .with_attr(AttrSpec::float("angle").output())
        .with_attr(AttrSpec::float3("axis", XYZ).output())
        .with_evaluator(angle_between),
    );
}

fn vector_product(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let normalize = ctx.bool("normalizeOutput")?;
    let mut a = ctx.vec3("input1")?;
    let mut b = ctx.vec3("input2")?;
    let operation = ctx.int("operation")?;

    let result = match operation {
        0 => a,
        1 => {
            if normalize {
                a = a.normalize_or_zero();
                b = b.normalize_or_zero();
            }
            DVec3::splat(a.dot(b))
        }
        2 => a.cross(b),
        3 => ctx.matrix("matrix")?.transform_vector3(a),
        4 => ctx.matrix("matrix")?.transform_point3(a),
        other => {
            return Err(EvaluationError::Custom(format!(
                "vectorProduct: unknown operation {other}"
            )))
        }
    };
    let result = if normalize && operation != 1 {
        result.normalize_or_zero()
    } else {
        result
    };

    let mut out = NodeOutput::new();
    out.set_vec3("output", XYZ, result);
    Ok(out)
}

fn distance_between(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let p1 = ctx.matrix("inMatrix1")?.transform_point3(ctx.vec3("point1")?);
    let p2 = ctx.matrix("inMatrix2")?.transform_point3(ctx.vec3("point2")?);
    let mut out = NodeOutput::new();
    out.set("distance", p1.distance(p2));
    Ok(out)
}

fn angle_between(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let v1 = ctx.vec3("vector1")?.normalize_or_zero();
    let v2 = ctx.vec3("vector2")?.normalize_or_zero();
    let (angle, axis) = if v1 == DVec3::ZERO || v2 == DVec3::ZERO {
        (0.0, DVec3::ZERO)
    } else {
        (
            v1.dot(v2).clamp(-1.0, 1.0).acos().to_degrees(),
            v1.cross(v2).normalize_or_zero(),
        )
    };
    let mut out = NodeOutput::new();
    out.set("angle", angle);
    out.set_vec3("axis", XYZ, axis);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use crate::attribute::Value;
    use crate::graph::Graph;
    use crate::store::GraphStore;

    fn set(graph: &mut Graph, path: &str, value: Value) {
        let plug = graph.attribute_by_path(path).unwrap();
        graph.set_value(plug, value).unwrap();
    }

    fn get(graph: &mut Graph, path: &str) -> Vec<f64> {
        let plug = graph.attribute_by_path(path).unwrap();
        graph.get_value(plug).unwrap().to_f64s().unwrap()
    }

    #[test]
    fn test_vector_product_modes() {
        let mut graph = Graph::new("test");
        graph.create_node("vectorProduct", "vp").unwrap();
        set(&mut graph, "vp.input1", Value::from([1.0, 0.0, 0.0]));
        set(&mut graph, "vp.input2", Value::from([0.0, 1.0, 0.0]));
        assert_eq!(get(&mut graph, "vp.output"), vec![0.0, 0.0, 0.0]);
        set(&mut graph, "vp.operation", Value::Int(2));
        assert_eq!(get(&mut graph, "vp.output"), vec![0.0, 0.0, 1.0]);

        set(&mut graph, "vp.operation", Value::Int(0));
        set(&mut graph, "vp.input1", Value::from([3.0, 0.0, 4.0]));
        set(&mut graph, "vp.normalizeOutput", Value::Bool(true));
        let n = get(&mut graph, "vp.output");
        assert!((n[0] - 0.6).abs() < 1e-12 && (n[2] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_distance_and_angle() {
        let mut graph = Graph::new("test");
        graph.create_node("distanceBetween", "d").unwrap();
        set(&mut graph, "d.point1", Value::from([1.0, 2.0, 3.0]));
        set(&mut graph, "d.point2", Value::from([4.0, 6.0, 3.0]));
        assert_eq!(get(&mut graph, "d.distance"), vec![5.0]);

        graph.create_node("angleBetween", "a").unwrap();
        let angle = get(&mut graph, "a.angle")[0];
        assert!((angle - 90.0).abs() < 1e-9);
        assert_eq!(get(&mut graph, "a.axis"), vec![0.0, 0.0, 1.0]);
    }
}
