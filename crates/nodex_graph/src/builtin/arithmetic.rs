// SPDX-License-Identifier: MIT OR Apache-2.0
//! Arithmetic and branching nodes: accumulators, multiply/divide, clamp, condition.

use super::{RGB, XYZ};
use crate::attribute::{AttrSpec, Value};
use crate::evaluation::{EvaluationContext, EvaluationError, NodeOutput};
use crate::node::{NodeCategory, NodeRegistry, NodeType};

/// Register the arithmetic node types
pub fn register(registry: &mut NodeRegistry) {
    registry.register(
        NodeType::new(
            "plusMinusAverage",
            NodeCategory::Math,
            "Sum, subtract or average any number of 1D, 2D or 3D inputs",
        )
        .with_attr(AttrSpec::int("operation").with_default(Value::Int(1)))
        .with_attr(AttrSpec::array(AttrSpec::float("input1D")))
        .with_attr(AttrSpec::array(AttrSpec::float2("input2D", ["x", "y"])))
        .with_attr(AttrSpec::array(AttrSpec::float3("input3D", ["x", "y", "z"])))
        .with_attr(AttrSpec::float("output1D").output())
        .with_attr(AttrSpec::float2("output2D", ["x", "y"]).output())
        .with_attr(AttrSpec::float3("output3D", ["x", "y", "z"]).output())
        .with_evaluator(plus_minus_average),
    );

    registry.register(
        NodeType::new(
            "multiplyDivide",
            NodeCategory::Math,
            "Multiply, divide or raise to a power per channel",
        )
        .with_attr(AttrSpec::int("operation").with_default(Value::Int(1)))
        .with_attr(AttrSpec::float3("input1", XYZ))
        .with_attr(AttrSpec::float3("input2", XYZ).with_default(Value::Float(1.0)))
        .with_attr(AttrSpec::float3("output", XYZ).output())
        .with_evaluator(multiply_divide),
    );

    registry.register(
        NodeType::new("addDoubleLinear", NodeCategory::Math, "Add two scalars")
            .with_attr(AttrSpec::float("input1"))
            .with_attr(AttrSpec::float("input2"))
            .with_attr(AttrSpec::float("output").output())
            .with_evaluator(add_double_linear),
    );

    registry.register(
        NodeType::new("multDoubleLinear", NodeCategory::Math, "Multiply two scalars")
            .with_attr(AttrSpec::float("input1"))
            .with_attr(AttrSpec::float("input2"))
            .with_attr(AttrSpec::float("output").output())
            .with_evaluator(mult_double_linear),
    );

    registry.register(
        NodeType::new("clamp", NodeCategory::Math, "Clamp three channels to a range")
            .with_attr(AttrSpec::float3("min", RGB))
            .with_attr(AttrSpec::float3("max", RGB))
            .with_attr(AttrSpec::float3("input", RGB))
            .with_attr(AttrSpec::float3("output", RGB).output())
            .with_evaluator(clamp),
    );

    registry.register(
        NodeType::new(
            "condition",
            NodeCategory::Logic,
            "Compare two terms and pick one of two colors",
        )
        .with_attr(AttrSpec::int("operation"))
        .with_attr(AttrSpec::float("firstTerm"))
        .with_attr(AttrSpec::float("secondTerm"))
        .with_attr(AttrSpec::float3("colorIfTrue", RGB))
        .with_attr(AttrSpec::float3("colorIfFalse", RGB).with_default(Value::Float(1.0)))
        .with_attr(AttrSpec::float3("outColor", RGB).output())
        .with_evaluator(condition),
    );
}

fn numbers(values: &[Value], path: &str) -> Result<Vec<Vec<f64>>, EvaluationError> {
    values
        .iter()
        .map(|v| {
            v.to_f64s()
                .ok_or_else(|| EvaluationError::TypeMismatch(path.to_string()))
        })
        .collect()
}

/// Combine a channel across all inputs with a plusMinusAverage operation
fn accumulate(operation: i64, inputs: &[Vec<f64>], channel: usize) -> f64 {
    let mut values = inputs.iter().map(|v| v.get(channel).copied().unwrap_or(0.0));
    match operation {
        1 => values.sum(),
        2 => match values.next() {
            Some(first) => values.fold(first, |acc, v| acc - v),
            None => 0.0,
        },
        3 if !inputs.is_empty() => values.sum::<f64>() / inputs.len() as f64,
        3 => 0.0,
        _ => values.next().unwrap_or(0.0),
    }
}

fn plus_minus_average(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let operation = ctx.int("operation")?;
    let mut out = NodeOutput::new();

    let one = numbers(&ctx.elements("input1D")?, "input1D")?;
    out.set("output1D", accumulate(operation, &one, 0));

    let two = numbers(&ctx.elements("input2D")?, "input2D")?;
    let channels: Vec<f64> = (0..2).map(|c| accumulate(operation, &two, c)).collect();
    out.set_children("output2D", &["x", "y"], &channels);

    let three = numbers(&ctx.elements("input3D")?, "input3D")?;
    let channels: Vec<f64> = (0..3).map(|c| accumulate(operation, &three, c)).collect();
    out.set_children("output3D", &["x", "y", "z"], &channels);

    Ok(out)
}

fn multiply_divide(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let operation = ctx.int("operation")?;
    let a = ctx.vec3("input1")?;
    let b = ctx.vec3("input2")?;
    let result = match operation {
        1 => a * b,
        2 => {
            if b.to_array().contains(&0.0) {
                tracing::warn!(node = ?ctx.node(), "multiplyDivide: divide by zero");
            }
            a / b
        }
        3 => glam::DVec3::new(a.x.powf(b.x), a.y.powf(b.y), a.z.powf(b.z)),
        _ => a,
    };
    let mut out = NodeOutput::new();
    out.set_vec3("output", XYZ, result);
    Ok(out)
}

fn add_double_linear(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let mut out = NodeOutput::new();
    out.set("output", ctx.float("input1")? + ctx.float("input2")?);
    Ok(out)
}

fn mult_double_linear(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let mut out = NodeOutput::new();
    out.set("output", ctx.float("input1")? * ctx.float("input2")?);
    Ok(out)
}

fn clamp(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let min = ctx.vec3("min")?.to_array();
    let max = ctx.vec3("max")?.to_array();
    let input = ctx.vec3("input")?.to_array();
    let channels: Vec<f64> = (0..3)
        .map(|i| {
            if min[i] <= max[i] {
                input[i].clamp(min[i], max[i])
            } else {
                input[i]
            }
        })
        .collect();
    let mut out = NodeOutput::new();
    out.set_children("output", &RGB, &channels);
    Ok(out)
}

fn condition(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let first = ctx.float("firstTerm")?;
    let second = ctx.float("secondTerm")?;
    let passed = match ctx.int("operation")? {
        0 => first == second,
        1 => first != second,
        2 => first > second,
        3 => first >= second,
        4 => first < second,
        5 => first <= second,
        other => {
            return Err(EvaluationError::Custom(format!(
                "condition: unknown operation {other}"
            )))
        }
    };
    let color = if passed {
        ctx.vec3("colorIfTrue")?
    } else {
        ctx.vec3("colorIfFalse")?
    };
    let mut out = NodeOutput::new();
    out.set_vec3("outColor", RGB, color);
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

    fn get(graph: &mut Graph, path: &str) -> Value {
        let plug = graph.attribute_by_path(path).unwrap();
        graph.get_value(plug).unwrap()
    }

    #[test]
    fn test_plus_minus_average_operations() {
        let mut graph = Graph::new("test");
        graph.create_node("plusMinusAverage", "pma").unwrap();
        set(&mut graph, "pma.input1D[0]", Value::Float(10.0));
        set(&mut graph, "pma.input1D[1]", Value::Float(4.0));
        set(&mut graph, "pma.input1D[5]", Value::Float(1.0));
        assert_eq!(get(&mut graph, "pma.output1D"), Value::Float(15.0));
        set(&mut graph, "pma.operation", Value::Int(2));
        assert_eq!(get(&mut graph, "pma.output1D"), Value::Float(5.0));
        set(&mut graph, "pma.operation", Value::Int(3));
        assert_eq!(get(&mut graph, "pma.output1D"), Value::Float(5.0));

        set(&mut graph, "pma.input3D[0]", Value::from([1.0, 2.0, 3.0]));
        set(&mut graph, "pma.input3D[1]", Value::from([3.0, 2.0, 1.0]));
        assert_eq!(get(&mut graph, "pma.output3D"), Value::floats(&[2.0, 2.0, 2.0]));
    }

    #[test]
    fn test_multiply_divide_defaults_and_power() {
        let mut graph = Graph::new("test");
        graph.create_node("multiplyDivide", "md").unwrap();
        set(&mut graph, "md.input1", Value::from([2.0, 3.0, 4.0]));
        assert_eq!(get(&mut graph, "md.output"), Value::floats(&[2.0, 3.0, 4.0]));
        set(&mut graph, "md.input2", Value::from([3.0, 2.0, 0.5]));
        set(&mut graph, "md.operation", Value::Int(3));
        assert_eq!(get(&mut graph, "md.outputX"), Value::Float(8.0));
        assert_eq!(get(&mut graph, "md.outputZ"), Value::Float(2.0));
    }

    #[test]
    fn test_condition_branches() {
        let mut graph = Graph::new("test");
        graph.create_node("condition", "cond").unwrap();
        set(&mut graph, "cond.firstTerm", Value::Float(2.0));
        set(&mut graph, "cond.secondTerm", Value::Float(2.0));
        assert_eq!(get(&mut graph, "cond.outColorR"), Value::Float(0.0));
        set(&mut graph, "cond.operation", Value::Int(1));
        assert_eq!(get(&mut graph, "cond.outColorR"), Value::Float(1.0));
        set(&mut graph, "cond.operation", Value::Int(9));
        let plug = graph.attribute_by_path("cond.outColor").unwrap();
        assert!(graph.get_value(plug).is_err());
    }

    #[test]
    fn test_clamp_channels() {
        let mut graph = Graph::new("test");
        graph.create_node("clamp", "c").unwrap();
        set(&mut graph, "c.min", Value::from([0.0, 0.0, 5.0]));
        set(&mut graph, "c.max", Value::from([1.0, 1.0, 1.0]));
        set(&mut graph, "c.input", Value::from([-1.0, 0.5, 3.0]));
        assert_eq!(get(&mut graph, "c.output"), Value::floats(&[0.0, 0.5, 3.0]));
    }
}
