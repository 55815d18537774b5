// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sums, products and clamping.

use super::{Math, RecipeOptions, RGB, XYZ};
use crate::error::Result;
use crate::nodex::Nodex;
use nodex_graph::Value;

/// `plusMinusAverage.operation`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlusMinusAverage {
    /// Pass the first input through
    None = 0,
    /// Add all inputs
    Sum = 1,
    /// Subtract the rest from the first input
    Subtract = 2,
    /// Mean of all inputs
    Average = 3,
}

/// `multiplyDivide.operation`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiplyDivide {
    /// Pass input1 through
    None = 0,
    /// input1 * input2
    Multiply = 1,
    /// input1 / input2
    Divide = 2,
    /// input1 ^ input2
    Power = 3,
}

/// Scalar two-input node types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoubleLinear {
    /// `addDoubleLinear`
    Add,
    /// `multDoubleLinear`
    Multiply,
}

impl DoubleLinear {
    fn node_type(&self) -> &'static str {
        match self {
            Self::Add => "addDoubleLinear",
            Self::Multiply => "multDoubleLinear",
        }
    }
}

impl Math<'_> {
    /// Build a `plusMinusAverage` node over `inputs`
    pub fn plus_minus_average(
        &self,
        operation: PlusMinusAverage,
        inputs: &[Nodex],
        options: RecipeOptions,
    ) -> Result<Nodex> {
        let refs: Vec<Option<&Nodex>> = inputs.iter().map(Some).collect();
        let d = self.working_dimensions("plusMinusAverage", &refs, options.dimensions)?;

        let node = self.create_node("plusMinusAverage", options.name_or("plusMinusAverage"))?;
        self.set(node, "operation", Value::Int(operation as i64))?;
        for (i, input) in inputs.iter().enumerate() {
            input.connect(&self.plug(node, &format!("input{d}D[{i}]"))?)?;
        }
        let result = self.plug(node, &format!("output{d}D"))?;
        self.finish(result, &options)
    }

    /// Sum of all inputs
    pub fn sum(&self, inputs: &[Nodex]) -> Result<Nodex> {
        self.plus_minus_average(PlusMinusAverage::Sum, inputs, RecipeOptions::named("sum"))
    }

    /// First input minus the rest
    pub fn subtract(&self, inputs: &[Nodex]) -> Result<Nodex> {
        self.plus_minus_average(
            PlusMinusAverage::Subtract,
            inputs,
            RecipeOptions::named("subtract"),
        )
    }

    /// Mean of all inputs
    pub fn average(&self, inputs: &[Nodex]) -> Result<Nodex> {
        self.plus_minus_average(
            PlusMinusAverage::Average,
            inputs,
            RecipeOptions::named("average"),
        )
    }

    /// Sum at a fixed working dimension
    pub fn sum_nd(&self, dimensions: usize, inputs: &[Nodex]) -> Result<Nodex> {
        self.plus_minus_average(
            PlusMinusAverage::Sum,
            inputs,
            RecipeOptions::named(format!("sum{dimensions}D")).with_dimensions(dimensions),
        )
    }

    /// Difference at a fixed working dimension
    pub fn subtract_nd(&self, dimensions: usize, inputs: &[Nodex]) -> Result<Nodex> {
        self.plus_minus_average(
            PlusMinusAverage::Subtract,
            inputs,
            RecipeOptions::named(format!("subtract{dimensions}D")).with_dimensions(dimensions),
        )
    }

    /// Mean at a fixed working dimension
    pub fn average_nd(&self, dimensions: usize, inputs: &[Nodex]) -> Result<Nodex> {
        self.plus_minus_average(
            PlusMinusAverage::Average,
            inputs,
            RecipeOptions::named(format!("average{dimensions}D")).with_dimensions(dimensions),
        )
    }

    /// Build a `multiplyDivide` node
    pub fn multiply_divide(
        &self,
        operation: MultiplyDivide,
        input1: Option<&Nodex>,
        input2: Option<&Nodex>,
        options: RecipeOptions,
    ) -> Result<Nodex> {
        let d = self.working_dimensions("multiplyDivide", &[input1, input2], options.dimensions)?;

        let node = self.create_node("multiplyDivide", options.name_or("multiplyDivide"))?;
        self.set(node, "operation", Value::Int(operation as i64))?;
        self.feed(input1, || self.channels(node, "input1", XYZ, d))?;
        self.feed(input2, || self.channels(node, "input2", XYZ, d))?;
        let result = self.channels(node, "output", XYZ, d)?;
        self.finish(result, &options)
    }

    /// Component-wise product
    pub fn multiply(&self, a: &Nodex, b: &Nodex) -> Result<Nodex> {
        self.multiply_divide(
            MultiplyDivide::Multiply,
            Some(a),
            Some(b),
            RecipeOptions::named("multiply"),
        )
    }

    /// Component-wise quotient
    pub fn divide(&self, a: &Nodex, b: &Nodex) -> Result<Nodex> {
        self.multiply_divide(
            MultiplyDivide::Divide,
            Some(a),
            Some(b),
            RecipeOptions::named("divide"),
        )
    }

    /// Component-wise power
    pub fn power(&self, a: &Nodex, b: &Nodex) -> Result<Nodex> {
        self.multiply_divide(
            MultiplyDivide::Power,
            Some(a),
            Some(b),
            RecipeOptions::named("power"),
        )
    }

    /// Build an `addDoubleLinear` or `multDoubleLinear` node
    pub fn double_linear(
        &self,
        kind: DoubleLinear,
        input1: Option<&Nodex>,
        input2: Option<&Nodex>,
        options: RecipeOptions,
    ) -> Result<Nodex> {
        let node = self.create_node(kind.node_type(), options.name_or(kind.node_type()))?;
        self.feed(input1, || self.plug(node, "input1"))?;
        self.feed(input2, || self.plug(node, "input2"))?;
        let result = self.plug(node, "output")?;
        self.finish(result, &options)
    }

    /// Scalar sum through `addDoubleLinear`
    pub fn add(&self, a: &Nodex, b: &Nodex) -> Result<Nodex> {
        self.double_linear(DoubleLinear::Add, Some(a), Some(b), RecipeOptions::named("add"))
    }

    /// Scalar product through `multDoubleLinear`
    pub fn mult_double(&self, a: &Nodex, b: &Nodex) -> Result<Nodex> {
        self.double_linear(
            DoubleLinear::Multiply,
            Some(a),
            Some(b),
            RecipeOptions::named("multDouble"),
        )
    }

    /// Clamp `input` between `min` and `max`, channel by channel
    pub fn clamp(
        &self,
        input: Option<&Nodex>,
        min: Option<&Nodex>,
        max: Option<&Nodex>,
        options: RecipeOptions,
    ) -> Result<Nodex> {
        let d = self.working_dimensions("clamp", &[input, min, max], options.dimensions)?;

        let node = self.create_node("clamp", options.name_or("clamp"))?;
        self.feed(input, || self.channels(node, "input", RGB, d))?;
        self.feed(min, || self.channels(node, "min", RGB, d))?;
        self.feed(max, || self.channels(node, "max", RGB, d))?;
        let result = self.channels(node, "output", RGB, d)?;
        self.finish(result, &options)
    }
}
