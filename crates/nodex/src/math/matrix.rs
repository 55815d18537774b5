// SPDX-License-Identifier: MIT OR Apache-2.0
//! Matrix recipes.
//!
//! Every recipe here makes sure the host's matrix node capability is loaded
//! before building; compose, decompose, inverse and transpose live in it.

use super::{Math, RecipeOptions};
use crate::error::{NodexError, Result};
use crate::nodex::Nodex;

/// Translate, rotate (XYZ degrees) and scale fed into a composed matrix
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposeInputs<'a> {
    /// Translation
    pub translate: Option<&'a Nodex>,
    /// Euler rotation in degrees
    pub rotate: Option<&'a Nodex>,
    /// Scale; ones when unset
    pub scale: Option<&'a Nodex>,
}

/// Outputs of a decomposed matrix
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Translation
    pub translate: Nodex,
    /// Euler rotation in degrees
    pub rotate: Nodex,
    /// Scale
    pub scale: Nodex,
    /// Rotation quaternion (x, y, z, w)
    pub quat: Nodex,
}

impl Math<'_> {
    fn require_matrix(&self, recipe: &str, m: &Nodex) -> Result<()> {
        let dimensions = m.dimensions()?;
        if dimensions != 16 {
            return Err(NodexError::Runtime(format!(
                "{recipe} expects a 16-component matrix, got {dimensions} components from {m}"
            )));
        }
        Ok(())
    }

    /// Single-input, single-output matrix node
    fn matrix_filter(
        &self,
        node_type: &str,
        input: (&str, &Nodex),
        output: &str,
        options: &RecipeOptions,
    ) -> Result<Nodex> {
        self.ensure_matrix_nodes()?;
        self.require_matrix(node_type, input.1)?;
        let node = self.create_node(node_type, options.name_or(node_type))?;
        input.1.connect(&self.plug(node, input.0)?)?;
        self.plug(node, output)
    }

    /// Matrix from translate, rotate and scale
    pub fn compose(&self, inputs: ComposeInputs<'_>, options: RecipeOptions) -> Result<Nodex> {
        self.ensure_matrix_nodes()?;
        let node = self.create_node("composeMatrix", options.name_or("composeMatrix"))?;
        self.feed(inputs.translate, || self.plug(node, "inputTranslate"))?;
        self.feed(inputs.rotate, || self.plug(node, "inputRotate"))?;
        self.feed(inputs.scale, || self.plug(node, "inputScale"))?;
        let result = self.plug(node, "outputMatrix")?;
        self.finish(result, &options)
    }

    /// Split a matrix into translate, rotate, scale and quaternion
    pub fn decompose(&self, m: &Nodex, options: RecipeOptions) -> Result<Decomposition> {
        self.ensure_matrix_nodes()?;
        self.require_matrix("decomposeMatrix", m)?;
        let node = self.create_node("decomposeMatrix", options.name_or("decomposeMatrix"))?;
        m.connect(&self.plug(node, "inputMatrix")?)?;
        Ok(Decomposition {
            translate: self.plug(node, "outputTranslate")?,
            rotate: self.plug(node, "outputRotate")?,
            scale: self.plug(node, "outputScale")?,
            quat: self.plug(node, "outputQuat")?,
        })
    }

    /// Inverse of a matrix
    pub fn inverse(&self, m: &Nodex, options: RecipeOptions) -> Result<Nodex> {
        let result = self.matrix_filter("inverseMatrix", ("inputMatrix", m), "outputMatrix", &options)?;
        self.finish(result, &options)
    }

    /// Transpose of a matrix
    pub fn transpose(&self, m: &Nodex, options: RecipeOptions) -> Result<Nodex> {
        let result =
            self.matrix_filter("transposeMatrix", ("inputMatrix", m), "outputMatrix", &options)?;
        self.finish(result, &options)
    }

    /// Product of `matrices`, the first applied first
    pub fn mult_matrix(&self, matrices: &[Nodex], options: RecipeOptions) -> Result<Nodex> {
        if matrices.is_empty() {
            return Err(NodexError::Runtime("multMatrix needs at least one input".to_string()));
        }
        self.ensure_matrix_nodes()?;
        for m in matrices {
            self.require_matrix("multMatrix", m)?;
        }
        let node = self.create_node("multMatrix", options.name_or("multMatrix"))?;
        for (i, m) in matrices.iter().enumerate() {
            m.connect(&self.plug(node, &format!("matrixIn[{i}]"))?)?;
        }
        let result = self.plug(node, "matrixSum")?;
        self.finish(result, &options)
    }

    /// Cache a matrix in a `holdMatrix` node
    pub fn hold(&self, m: &Nodex, options: RecipeOptions) -> Result<Nodex> {
        let result = self.matrix_filter("holdMatrix", ("inMatrix", m), "outMatrix", &options)?;
        self.finish(result, &options)
    }

    /// Scale every element of a matrix through a `passMatrix` node
    pub fn pass_matrix(&self, m: &Nodex, scale: Option<&Nodex>, options: RecipeOptions) -> Result<Nodex> {
        let result = self.matrix_filter("passMatrix", ("inMatrix", m), "outMatrix", &options)?;
        let node = result.node()?;
        self.feed(scale, || self.plug(node, "inScale"))?;
        self.finish(result, &options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::session_with_sphere;
    use nodex_graph::Value;

    fn close(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-6)
    }

    #[test]
    fn test_compose_decompose_roundtrip() {
        let session = session_with_sphere();
        let t = session.nodex(vec![1.0, -2.0, 3.5]).unwrap();
        let r = session.nodex(vec![30.0, 45.0, -60.0]).unwrap();
        let s = session.nodex(vec![2.0, 1.0, 0.5]).unwrap();
        let math = session.math();
        let m = math
            .compose(
                ComposeInputs {
                    translate: Some(&t),
                    rotate: Some(&r),
                    scale: Some(&s),
                },
                RecipeOptions::default(),
            )
            .unwrap();
        assert_eq!(m.dimensions().unwrap(), 16);

        let parts = math.decompose(&m, RecipeOptions::default()).unwrap();
        assert!(close(&parts.translate.as_f64s().unwrap(), &[1.0, -2.0, 3.5]));
        assert!(close(&parts.rotate.as_f64s().unwrap(), &[30.0, 45.0, -60.0]));
        assert!(close(&parts.scale.as_f64s().unwrap(), &[2.0, 1.0, 0.5]));
        assert_eq!(parts.quat.dimensions().unwrap(), 4);
    }

    #[test]
    fn test_capability_loaded_on_demand() {
        let session = session_with_sphere();
        let m = session.attr("pSphere1", "m").unwrap();
        let direct = session.with_store(|store| store.create_node("inverseMatrix", ""));
        assert!(direct.is_err());
        session.math().inverse(&m, RecipeOptions::default()).unwrap();
        session.math().transpose(&m, RecipeOptions::default()).unwrap();
    }

    #[test]
    fn test_inverse_of_translation() {
        let session = session_with_sphere();
        let mut flat = Value::IDENTITY;
        flat[12] = 4.0;
        let m = session.nodex(flat.to_vec()).unwrap();
        let inv = session.math().inverse(&m, RecipeOptions::named("inv")).unwrap();
        assert_eq!(inv.as_f64s().unwrap()[12], -4.0);
        assert_eq!(inv.node_name().unwrap(), "inv");
    }

    #[test]
    fn test_mult_hold_and_pass() {
        let session = session_with_sphere();
        let mut a = Value::IDENTITY;
        a[12] = 1.0;
        let mut b = Value::IDENTITY;
        b[13] = 2.0;
        let a = session.nodex(a.to_vec()).unwrap();
        let b = session.nodex(b.to_vec()).unwrap();
        let math = session.math();

        let product = math.mult_matrix(&[a.clone(), b], RecipeOptions::default()).unwrap();
        let flat = product.as_f64s().unwrap();
        assert_eq!(&flat[12..15], &[1.0, 2.0, 0.0]);

        let held = math.hold(&product, RecipeOptions::default()).unwrap();
        assert_eq!(held.as_f64s().unwrap(), flat);

        let doubled = math
            .pass_matrix(&a, Some(&session.nodex(2.0).unwrap()), RecipeOptions::default())
            .unwrap();
        assert_eq!(doubled.as_f64s().unwrap()[12], 2.0);
        assert_eq!(doubled.as_f64s().unwrap()[0], 2.0);
    }

    #[test]
    fn test_vector_is_not_a_matrix() {
        let session = session_with_sphere();
        let v = session.nodex(vec![1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(
            session.math().hold(&v, RecipeOptions::default()),
            Err(NodexError::Runtime(_))
        ));
    }
}
