// SPDX-License-Identifier: MIT OR Apache-2.0
//! Comparisons through the `condition` node.

use super::{Math, RecipeOptions, RGB};
use crate::error::Result;
use crate::nodex::Nodex;
use nodex_graph::Value;

/// `condition.operation`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// first == second
    Equal = 0,
    /// first != second
    NotEqual = 1,
    /// first > second
    GreaterThan = 2,
    /// first >= second
    GreaterOrEqual = 3,
    /// first < second
    LessThan = 4,
    /// first <= second
    LessOrEqual = 5,
}

impl Comparison {
    /// Recipe name used for the created node
    pub fn name(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "notEqual",
            Self::GreaterThan => "greaterThan",
            Self::GreaterOrEqual => "greaterOrEqual",
            Self::LessThan => "lessThan",
            Self::LessOrEqual => "lessOrEqual",
        }
    }
}

/// Terms and branches of a condition
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionInputs<'a> {
    /// Left-hand term
    pub first_term: Option<&'a Nodex>,
    /// Right-hand term
    pub second_term: Option<&'a Nodex>,
    /// Result when the comparison holds; ones when unset
    pub if_true: Option<&'a Nodex>,
    /// Result otherwise; zeros when unset
    pub if_false: Option<&'a Nodex>,
}

impl<'a> ConditionInputs<'a> {
    /// Compare two terms, yielding 1 or 0
    pub fn compare(first_term: &'a Nodex, second_term: &'a Nodex) -> Self {
        Self {
            first_term: Some(first_term),
            second_term: Some(second_term),
            ..Self::default()
        }
    }
}

impl Math<'_> {
    /// Build a `condition` node
    pub fn condition(
        &self,
        operation: Comparison,
        inputs: ConditionInputs<'_>,
        options: RecipeOptions,
    ) -> Result<Nodex> {
        let d = self.working_dimensions(
            "condition",
            &[inputs.first_term, inputs.second_term, inputs.if_true, inputs.if_false],
            options.dimensions,
        )?;

        let node = self.create_node("condition", options.name_or("condition"))?;
        self.set(node, "operation", Value::Int(operation as i64))?;
        self.feed(inputs.first_term, || self.plug(node, "firstTerm"))?;
        self.feed(inputs.second_term, || self.plug(node, "secondTerm"))?;
        match inputs.if_true {
            Some(value) => value.connect(&self.channels(node, "colorIfTrue", RGB, d)?).map(drop)?,
            None => self.set(node, "colorIfTrue", Value::floats(&[1.0; 3]))?,
        }
        match inputs.if_false {
            Some(value) => value.connect(&self.channels(node, "colorIfFalse", RGB, d)?).map(drop)?,
            None => self.set(node, "colorIfFalse", Value::floats(&[0.0; 3]))?,
        }
        let result = self.channels(node, "outColor", RGB, d)?;
        self.finish(result, &options)
    }

    fn compare(&self, operation: Comparison, a: &Nodex, b: &Nodex) -> Result<Nodex> {
        self.condition(
            operation,
            ConditionInputs::compare(a, b),
            RecipeOptions::named(operation.name()),
        )
    }

    /// 1 when `a == b`, else 0
    pub fn equal(&self, a: &Nodex, b: &Nodex) -> Result<Nodex> {
        self.compare(Comparison::Equal, a, b)
    }

    /// 1 when `a != b`, else 0
    pub fn not_equal(&self, a: &Nodex, b: &Nodex) -> Result<Nodex> {
        self.compare(Comparison::NotEqual, a, b)
    }

    /// 1 when `a > b`, else 0
    pub fn greater_than(&self, a: &Nodex, b: &Nodex) -> Result<Nodex> {
        self.compare(Comparison::GreaterThan, a, b)
    }

    /// 1 when `a >= b`, else 0
    pub fn greater_or_equal(&self, a: &Nodex, b: &Nodex) -> Result<Nodex> {
        self.compare(Comparison::GreaterOrEqual, a, b)
    }

    /// 1 when `a < b`, else 0
    pub fn less_than(&self, a: &Nodex, b: &Nodex) -> Result<Nodex> {
        self.compare(Comparison::LessThan, a, b)
    }

    /// 1 when `a <= b`, else 0
    pub fn less_or_equal(&self, a: &Nodex, b: &Nodex) -> Result<Nodex> {
        self.compare(Comparison::LessOrEqual, a, b)
    }
}
