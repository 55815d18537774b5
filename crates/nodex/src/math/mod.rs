// SPDX-License-Identifier: MIT OR Apache-2.0
//! Math recipes: each builds one computation node, feeds typed values into
//! it and hands back a typed value over the node's result plug.
//!
//! Component-wise recipes pick a working dimension `d` (the caller's
//! override, or the widest input) and address plugs accordingly: `d == 1`
//! uses the first child of a three-channel compound, `d == 2` a tuple of
//! the first two children, `d == 3` the compound itself.

mod arithmetic;
mod condition;
mod matrix;
mod vector;

pub use arithmetic::{DoubleLinear, MultiplyDivide, PlusMinusAverage};
pub use condition::{Comparison, ConditionInputs};
pub use matrix::{ComposeInputs, Decomposition};

use crate::error::{NodexError, Result};
use crate::nodex::Nodex;
use crate::reference::Input;
use crate::session::Session;
use nodex_graph::{NodeId, Value};

/// Channel suffixes of vector compounds
pub const XYZ: [&str; 3] = ["X", "Y", "Z"];

/// Channel suffixes of color compounds
pub const RGB: [&str; 3] = ["R", "G", "B"];

/// Per-call settings shared by every recipe
#[derive(Debug, Clone, Default)]
pub struct RecipeOptions {
    /// Node name; the recipe's own name when unset
    pub name: Option<String>,
    /// Working dimension override
    pub dimensions: Option<usize>,
    /// Destination the result is connected into
    pub output: Option<Nodex>,
}

impl RecipeOptions {
    /// Options naming the created node
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Override the working dimension
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Connect the result into `output`
    pub fn with_output(mut self, output: Nodex) -> Self {
        self.output = Some(output);
        self
    }

    fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(fallback)
    }
}

/// Recipe builder bound to a session
#[derive(Debug, Clone, Copy)]
pub struct Math<'s> {
    session: &'s Session,
}

impl<'s> Math<'s> {
    pub(crate) fn new(session: &'s Session) -> Self {
        Self { session }
    }

    /// Session the recipes build into
    pub fn session(&self) -> &'s Session {
        self.session
    }

    /// Lock an input plug so nothing can be connected into it
    pub fn lock_input(&self, node: NodeId, attr: &str) -> Result<()> {
        self.session.with_store(|store| {
            let plug = store.attribute(node, attr)?;
            store.set_locked(plug, true)
        })?;
        Ok(())
    }

    /// Working dimension of a component-wise recipe
    fn working_dimensions(
        &self,
        recipe: &str,
        inputs: &[Option<&Nodex>],
        explicit: Option<usize>,
    ) -> Result<usize> {
        let dimensions = match explicit {
            Some(d) => d,
            None => {
                let mut widest = None;
                for input in inputs.iter().flatten() {
                    let d = input.dimensions()?;
                    widest = Some(widest.map_or(d, |w: usize| w.max(d)));
                }
                widest.ok_or_else(|| {
                    NodexError::Runtime(format!("{recipe} needs at least one input"))
                })?
            }
        };
        let max = self.session.config().max_math_dimensions;
        if dimensions == 0 || dimensions > max {
            return Err(NodexError::Dimension {
                recipe: recipe.to_string(),
                dimensions,
                max,
            });
        }
        Ok(dimensions)
    }

    fn create_node(&self, node_type: &str, name: &str) -> Result<NodeId> {
        let node = self
            .session
            .with_store(|store| store.create_node(node_type, name))?;
        tracing::debug!(node_type, name, "built recipe node");
        Ok(node)
    }

    /// Typed value over a plug of `node`
    fn plug(&self, node: NodeId, path: &str) -> Result<Nodex> {
        let plug = self.session.with_store(|store| store.attribute(node, path))?;
        self.session.nodex(plug)
    }

    /// Plug(s) of a three-channel compound at dimension `d`
    fn channels(&self, node: NodeId, base: &str, suffixes: [&str; 3], d: usize) -> Result<Nodex> {
        match d {
            1 => self.plug(node, &format!("{base}.{base}{}", suffixes[0])),
            2 => {
                let first = self.plug(node, &format!("{base}.{base}{}", suffixes[0]))?;
                let second = self.plug(node, &format!("{base}.{base}{}", suffixes[1]))?;
                self.session
                    .nodex(Input::List(vec![first.into(), second.into()]))
            }
            _ => self.plug(node, base),
        }
    }

    /// Write a constant into a plug of `node`
    fn set(&self, node: NodeId, path: &str, value: Value) -> Result<()> {
        self.session.with_store(|store| {
            let plug = store.attribute(node, path)?;
            store.set_value(plug, value)
        })?;
        Ok(())
    }

    /// Connect `value` into `destination` when given
    fn feed(&self, value: Option<&Nodex>, destination: impl FnOnce() -> Result<Nodex>) -> Result<()> {
        if let Some(value) = value {
            value.connect(&destination()?)?;
        }
        Ok(())
    }

    /// Connect the result into the caller's output, if any
    fn finish(&self, result: Nodex, options: &RecipeOptions) -> Result<Nodex> {
        if let Some(output) = &options.output {
            result.connect(output)?;
        }
        Ok(result)
    }

    fn ensure_matrix_nodes(&self) -> Result<()> {
        let capability = &self.session.config().matrix_capability;
        self.session
            .with_store(|store| store.ensure_capability(capability))?;
        Ok(())
    }
}
