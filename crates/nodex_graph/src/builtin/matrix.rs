// SPDX-License-Identifier: MIT OR Apache-2.0
//! Matrix nodes.
//!
//! Matrices are exchanged as flat row-major arrays in the host's row-vector
//! convention (translation in elements 12..14). That layout is exactly the
//! column-major array of the equivalent column-vector matrix, so values map
//! onto [`DMat4::from_cols_array`] without transposition. Rotations are XYZ
//! Euler angles in degrees: X is applied first, Z last.

use super::{MATRIX_CAPABILITY, XYZ};
use crate::attribute::{AttrSpec, Value};
use crate::evaluation::{EvaluationContext, EvaluationError, NodeOutput};
use crate::node::{NodeCategory, NodeRegistry, NodeType};
use glam::{DMat3, DMat4, DQuat, DVec3};

/// Register the matrix node types
pub fn register(registry: &mut NodeRegistry) {
    registry.register(
        NodeType::new(
            "composeMatrix",
            NodeCategory::Matrix,
            "Build a matrix from translate, rotate and scale",
        )
        .with_capability(MATRIX_CAPABILITY)
        .with_attr(AttrSpec::float3("inputTranslate", XYZ))
        .with_attr(AttrSpec::float3("inputRotate", XYZ))
        .with_attr(AttrSpec::float3("inputScale", XYZ).with_default(Value::Float(1.0)))
        .with_attr(AttrSpec::matrix("outputMatrix").output())
        .with_evaluator(compose_matrix),
    );

    registry.register(
        NodeType::new(
            "decomposeMatrix",
            NodeCategory::Matrix,
            "Split a matrix into translate, rotate, scale and quaternion",
        )
        .with_capability(MATRIX_CAPABILITY)
        .with_attr(AttrSpec::matrix("inputMatrix"))
        .with_attr(AttrSpec::float3("outputTranslate", XYZ).output())
        .with_attr(AttrSpec::float3("outputRotate", XYZ).output())
        .with_attr(AttrSpec::float3("outputScale", XYZ).output())
        .with_attr(
            AttrSpec::compound(
                "outputQuat",
                ["X", "Y", "Z", "W"]
                    .iter()
                    .map(|s| AttrSpec::float(format!("outputQuat{s}")))
                    .collect(),
            )
            .output(),
        )
        .with_evaluator(decompose_matrix),
    );

    registry.register(
        NodeType::new("inverseMatrix", NodeCategory::Matrix, "Invert a matrix")
            .with_capability(MATRIX_CAPABILITY)
            .with_attr(AttrSpec::matrix("inputMatrix"))
            .with_attr(AttrSpec::matrix("outputMatrix").output())
            .with_evaluator(inverse_matrix),
    );

    registry.register(
        NodeType::new("transposeMatrix", NodeCategory::Matrix, "Transpose a matrix")
            .with_capability(MATRIX_CAPABILITY)
            .with_attr(AttrSpec::matrix("inputMatrix"))
            .with_attr(AttrSpec::matrix("outputMatrix").output())
            .with_evaluator(transpose_matrix),
    );

    registry.register(
        NodeType::new(
            "multMatrix",
            NodeCategory::Matrix,
            "Multiply a list of matrices, first element applied first",
        )
        .with_attr(AttrSpec::array(AttrSpec::matrix("matrixIn")))
        .with_attr(AttrSpec::matrix("matrixSum").output())
        .with_evaluator(mult_matrix),
    );

    registry.register(
        NodeType::new("holdMatrix", NodeCategory::Matrix, "Cache a matrix value")
            .with_attr(AttrSpec::matrix("inMatrix"))
            .with_attr(AttrSpec::matrix("outMatrix").output())
            .with_evaluator(hold_matrix),
    );

    registry.register(
        NodeType::new("passMatrix", NodeCategory::Matrix, "Scale every element of a matrix")
            .with_attr(AttrSpec::matrix("inMatrix"))
            .with_attr(AttrSpec::float("inScale").with_default(Value::Float(1.0)))
            .with_attr(AttrSpec::matrix("outMatrix").output())
            .with_evaluator(pass_matrix),
    );
}

/// Rotation matrix of XYZ Euler angles in degrees
pub fn euler_xyz(degrees: DVec3) -> DMat4 {
    DMat4::from_rotation_z(degrees.z.to_radians())
        * DMat4::from_rotation_y(degrees.y.to_radians())
        * DMat4::from_rotation_x(degrees.x.to_radians())
}

/// Matrix applying scale, then rotation, then translation
pub fn compose_trs(translate: DVec3, rotate: DVec3, scale: DVec3) -> DMat4 {
    DMat4::from_translation(translate) * euler_xyz(rotate) * DMat4::from_scale(scale)
}

/// XYZ Euler angles in degrees of a pure rotation
pub fn rotation_to_euler_xyz(rotation: DMat3) -> DVec3 {
    let y = (-rotation.x_axis.z).clamp(-1.0, 1.0).asin();
    let x = rotation.y_axis.z.atan2(rotation.z_axis.z);
    let z = rotation.x_axis.y.atan2(rotation.x_axis.x);
    DVec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

/// Split a matrix into translate, XYZ rotation in degrees, scale and quaternion
pub fn decompose_trs(m: DMat4) -> (DVec3, DVec3, DVec3, DQuat) {
    let (scale, rotation, translation) = m.to_scale_rotation_translation();
    let euler = rotation_to_euler_xyz(DMat3::from_quat(rotation));
    (translation, euler, scale, rotation)
}

fn compose_matrix(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let m = compose_trs(
        ctx.vec3("inputTranslate")?,
        ctx.vec3("inputRotate")?,
        ctx.vec3("inputScale")?,
    );
    let mut out = NodeOutput::new();
    out.set_matrix("outputMatrix", m);
    Ok(out)
}

fn decompose_matrix(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let (translate, rotate, scale, quat) = decompose_trs(ctx.matrix("inputMatrix")?);
    let mut out = NodeOutput::new();
    out.set_vec3("outputTranslate", XYZ, translate);
    out.set_vec3("outputRotate", XYZ, rotate);
    out.set_vec3("outputScale", XYZ, scale);
    out.set_children("outputQuat", &["X", "Y", "Z", "W"], &quat.to_array());
    Ok(out)
}

fn inverse_matrix(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let m = ctx.matrix("inputMatrix")?;
    if m.determinant().abs() < f64::EPSILON {
        return Err(EvaluationError::Custom(
            "inverseMatrix: matrix is singular".to_string(),
        ));
    }
    let mut out = NodeOutput::new();
    out.set_matrix("outputMatrix", m.inverse());
    Ok(out)
}

fn transpose_matrix(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let m = ctx.matrix("inputMatrix")?;
    let mut out = NodeOutput::new();
    out.set_matrix("outputMatrix", m.transpose());
    Ok(out)
}

fn mult_matrix(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let mut product = DMat4::IDENTITY;
    for value in ctx.elements("matrixIn")? {
        let m = value
            .as_matrix()
            .ok_or_else(|| EvaluationError::TypeMismatch("matrixIn".to_string()))?;
        product = DMat4::from_cols_array(&m) * product;
    }
    let mut out = NodeOutput::new();
    out.set_matrix("matrixSum", product);
    Ok(out)
}

fn hold_matrix(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let mut out = NodeOutput::new();
    out.set_matrix("outMatrix", ctx.matrix("inMatrix")?);
    Ok(out)
}

fn pass_matrix(ctx: &mut EvaluationContext<'_>) -> Result<NodeOutput, EvaluationError> {
    let m = ctx.matrix("inMatrix")? * ctx.float("inScale")?;
    let mut out = NodeOutput::new();
    out.set_matrix("outMatrix", m);
    Ok(out)
}
