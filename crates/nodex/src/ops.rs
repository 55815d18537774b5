// SPDX-License-Identifier: MIT OR Apache-2.0
//! Operators on typed values.
//!
//! `+ - * / ^` build `plusMinusAverage` and `multiplyDivide` nodes. Every
//! operator returns `Result<Nodex>` because node creation can fail; chain
//! with `?`:
//!
//! ```ignore
//! let total = ((&a + &b)? + 3.0)?;
//! ```
//!
//! Comparisons build `condition` nodes yielding 1 or 0 and are methods,
//! since `PartialEq`/`PartialOrd` must return plain booleans.

use crate::error::Result;
use crate::math::{Decomposition, RecipeOptions};
use crate::nodex::Nodex;
use crate::reference::Input;
use std::ops::{Add, BitXor, Div, Mul, Sub};

impl Nodex {
    fn operand(&self, other: impl Into<Input>) -> Result<Nodex> {
        self.session().nodex(other)
    }

    /// `self + other`
    pub fn sum(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session().math().sum(&[self.clone(), other])
    }

    /// `self - other`
    pub fn subtract(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session().math().subtract(&[self.clone(), other])
    }

    /// `self * other`, component-wise
    pub fn multiply(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session().math().multiply(self, &other)
    }

    /// `self / other`, component-wise
    pub fn divide(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session().math().divide(self, &other)
    }

    /// `self ^ other`, component-wise
    pub fn pow(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session().math().power(self, &other)
    }

    /// 1 when `self == other`
    pub fn equal(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session().math().equal(self, &other)
    }

    /// 1 when `self != other`
    pub fn not_equal(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session().math().not_equal(self, &other)
    }

    /// 1 when `self > other`
    pub fn greater_than(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session().math().greater_than(self, &other)
    }

    /// 1 when `self >= other`
    pub fn greater_or_equal(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session().math().greater_or_equal(self, &other)
    }

    /// 1 when `self < other`
    pub fn less_than(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session().math().less_than(self, &other)
    }

    /// 1 when `self <= other`
    pub fn less_or_equal(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session().math().less_or_equal(self, &other)
    }

    /// Dot product with `other`
    pub fn dot(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session().math().dot(self, &other, RecipeOptions::default())
    }

    /// Cross product with `other`
    pub fn cross(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session().math().cross(self, &other, RecipeOptions::default())
    }

    /// Euclidean length
    pub fn length(&self) -> Result<Nodex> {
        self.session().math().length(self, RecipeOptions::default())
    }

    /// Distance to the point `other`
    pub fn distance_to(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session().math().distance(self, &other, RecipeOptions::default())
    }

    /// Angle to `other` in degrees
    pub fn angle_to(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session()
            .math()
            .angle_between(self, &other, RecipeOptions::default())
    }

    /// Unit-length copy
    pub fn normal(&self) -> Result<Nodex> {
        self.session().math().normal(self, RecipeOptions::default())
    }

    /// Matrix inverse
    pub fn inverse(&self) -> Result<Nodex> {
        self.session().math().inverse(self, RecipeOptions::default())
    }

    /// Matrix transpose
    pub fn transpose(&self) -> Result<Nodex> {
        self.session().math().transpose(self, RecipeOptions::default())
    }

    /// Matrix product, `self` applied first
    pub fn mult_matrix(&self, other: impl Into<Input>) -> Result<Nodex> {
        let other = self.operand(other)?;
        self.session()
            .math()
            .mult_matrix(&[self.clone(), other], RecipeOptions::default())
    }

    /// Cached copy of this matrix
    pub fn hold(&self) -> Result<Nodex> {
        self.session().math().hold(self, RecipeOptions::default())
    }

    /// This matrix with every element scaled by `scale`
    pub fn pass_matrix(&self, scale: impl Into<Input>) -> Result<Nodex> {
        let scale = self.operand(scale)?;
        self.session()
            .math()
            .pass_matrix(self, Some(&scale), RecipeOptions::default())
    }

    /// Translate, rotate, scale and quaternion of a matrix
    pub fn decompose(&self) -> Result<Decomposition> {
        self.session().math().decompose(self, RecipeOptions::default())
    }
}

macro_rules! binary_operator {
    ($trait:ident, $method:ident, $recipe:ident) => {
        impl<R: Into<Input>> $trait<R> for &Nodex {
            type Output = Result<Nodex>;

            fn $method(self, rhs: R) -> Self::Output {
                self.$recipe(rhs)
            }
        }

        impl<R: Into<Input>> $trait<R> for Nodex {
            type Output = Result<Nodex>;

            fn $method(self, rhs: R) -> Self::Output {
                self.$recipe(rhs)
            }
        }
    };
}

binary_operator!(Add, add, sum);
binary_operator!(Sub, sub, subtract);
binary_operator!(Mul, mul, multiply);
binary_operator!(Div, div, divide);
binary_operator!(BitXor, bitxor, pow);
