// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vector products, lengths, distances and angles.

use super::{Math, RecipeOptions};
use crate::error::Result;
use crate::nodex::Nodex;
use nodex_graph::Value;

/// `vectorProduct.operation`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VectorProduct {
    None = 0,
    Dot = 1,
    Cross = 2,
}

impl Math<'_> {
    fn vector_product(
        &self,
        operation: VectorProduct,
        input1: &Nodex,
        input2: Option<&Nodex>,
        normalize: bool,
        options: &RecipeOptions,
        fallback_name: &str,
    ) -> Result<(nodex_graph::NodeId, Nodex)> {
        self.working_dimensions(fallback_name, &[Some(input1), input2], None)?;
        let node = self.create_node("vectorProduct", options.name_or(fallback_name))?;
        self.set(node, "operation", Value::Int(operation as i64))?;
        if normalize {
            self.set(node, "normalizeOutput", Value::Bool(true))?;
        }
        input1.connect(&self.plug(node, "input1")?)?;
        self.feed(input2, || self.plug(node, "input2"))?;
        let output = match operation {
            VectorProduct::Dot => self.plug(node, "output.outputX")?,
            _ => self.plug(node, "output")?,
        };
        Ok((node, output))
    }

    /// Dot product, a single number
    pub fn dot(&self, a: &Nodex, b: &Nodex, options: RecipeOptions) -> Result<Nodex> {
        let (_, result) = self.vector_product(VectorProduct::Dot, a, Some(b), false, &options, "dot")?;
        self.finish(result, &options)
    }

    /// Cross product
    pub fn cross(&self, a: &Nodex, b: &Nodex, options: RecipeOptions) -> Result<Nodex> {
        let (_, result) =
            self.vector_product(VectorProduct::Cross, a, Some(b), false, &options, "cross")?;
        self.finish(result, &options)
    }

    /// Unit-length copy of `v`
    pub fn normal(&self, v: &Nodex, options: RecipeOptions) -> Result<Nodex> {
        let (node, result) =
            self.vector_product(VectorProduct::None, v, None, true, &options, "normal")?;
        self.lock_input(node, "input2")?;
        self.finish(result, &options)
    }

    /// Euclidean length of `v`
    pub fn length(&self, v: &Nodex, options: RecipeOptions) -> Result<Nodex> {
        self.working_dimensions("length", &[Some(v)], None)?;
        let node = self.create_node("distanceBetween", options.name_or("length"))?;
        v.connect(&self.plug(node, "point1")?)?;
        self.lock_input(node, "point2")?;
        let result = self.plug(node, "distance")?;
        self.finish(result, &options)
    }

    /// Distance between two points
    pub fn distance(&self, a: &Nodex, b: &Nodex, options: RecipeOptions) -> Result<Nodex> {
        self.working_dimensions("distance", &[Some(a), Some(b)], None)?;
        let node = self.create_node("distanceBetween", options.name_or("distance"))?;
        a.connect(&self.plug(node, "point1")?)?;
        b.connect(&self.plug(node, "point2")?)?;
        let result = self.plug(node, "distance")?;
        self.finish(result, &options)
    }

    /// Angle between two vectors, in degrees
    pub fn angle_between(&self, a: &Nodex, b: &Nodex, options: RecipeOptions) -> Result<Nodex> {
        self.working_dimensions("angleBetween", &[Some(a), Some(b)], None)?;
        let node = self.create_node("angleBetween", options.name_or("angleBetween"))?;
        a.connect(&self.plug(node, "vector1")?)?;
        b.connect(&self.plug(node, "vector2")?)?;
        let result = self.plug(node, "angle")?;
        self.finish(result, &options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NodexError;
    use crate::testing::session_with_sphere;

    fn close(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn test_dot_and_cross() {
        let session = session_with_sphere();
        let x = session.nodex(vec![1.0, 0.0, 0.0]).unwrap();
        let y = session.nodex(vec![0.0, 1.0, 0.0]).unwrap();
        let math = session.math();
        let d = math.dot(&x, &y, RecipeOptions::default()).unwrap();
        assert_eq!(d.dimensions().unwrap(), 1);
        assert_eq!(d.as_f64().unwrap(), 0.0);
        let z = math.cross(&x, &y, RecipeOptions::default()).unwrap();
        assert!(close(&z.as_f64s().unwrap(), &[0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_double_cross_reproduces_vector() {
        let session = session_with_sphere();
        let v = session.nodex(vec![1.0, 0.0, 0.0]).unwrap();
        let w = session.nodex(vec![0.0, 1.0, 0.0]).unwrap();
        let math = session.math();
        let vw = math.cross(&v, &w, RecipeOptions::default()).unwrap();
        let back = math.cross(&vw, &v, RecipeOptions::default()).unwrap();
        assert!(close(&back.as_f64s().unwrap(), &[0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_double_cross_oblique_pair() {
        let session = session_with_sphere();
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let v = [h, h, 0.0];
        let w = [0.5, -0.5, h];
        let math = session.math();
        let (vn, wn) = (session.nodex(v.to_vec()).unwrap(), session.nodex(w.to_vec()).unwrap());
        let vw = math.cross(&vn, &wn, RecipeOptions::default()).unwrap();
        let back = math.cross(&vw, &vn, RecipeOptions::default()).unwrap();
        let back = back.as_f64s().unwrap();
        assert!(back.iter().zip(w).all(|(a, b)| (a - b).abs() < 1e-6), "{back:?}");
    }

    #[test]
    fn test_normal_locks_second_input() {
        let session = session_with_sphere();
        let v = session.nodex(vec![3.0, 0.0, 4.0]).unwrap();
        let n = session.math().normal(&v, RecipeOptions::default()).unwrap();
        assert!(close(&n.as_f64s().unwrap(), &[0.6, 0.0, 0.8]));
        let node = n.node().unwrap();
        let locked = session
            .with_store(|store| {
                let plug = store.attribute(node, "input2")?;
                store.is_locked(plug)
            })
            .unwrap();
        assert!(locked);
    }

    #[test]
    fn test_length_distance_angle() {
        let session = session_with_sphere();
        let math = session.math();
        let v = session.nodex(vec![3.0, 4.0, 0.0]).unwrap();
        assert_eq!(math.length(&v, RecipeOptions::default()).unwrap().as_f64().unwrap(), 5.0);

        let p = session.nodex(vec![1.0, 1.0, 1.0]).unwrap();
        let q = session.nodex(vec![1.0, 1.0, 3.0]).unwrap();
        assert_eq!(math.distance(&p, &q, RecipeOptions::default()).unwrap().as_f64().unwrap(), 2.0);

        let x = session.nodex(vec![1.0, 0.0, 0.0]).unwrap();
        let y = session.nodex(vec![0.0, 5.0, 0.0]).unwrap();
        let angle = math.angle_between(&x, &y, RecipeOptions::default()).unwrap();
        assert!((angle.as_f64().unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_wide_input_rejected() {
        let session = session_with_sphere();
        let m = session.nodex(vec![0.0; 16]).unwrap();
        assert!(matches!(
            session.math().length(&m, RecipeOptions::default()),
            Err(NodexError::Dimension { dimensions: 16, .. })
        ));
    }
}
