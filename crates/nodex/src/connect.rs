// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dimension-aware connection of a typed value into attributes.
//!
//! The reconciler compares the component counts of source and destination:
//!
//! - equal: connect plug-to-plug when the shapes line up, write constants
//!   directly, otherwise recurse component by component
//! - source larger: connect only the leading components
//! - source smaller: connect into the leading components and optionally
//!   reset the rest, or broadcast a single value when growing is allowed
//!
//! Every write replaces whatever was connected into the destination.

use crate::error::{NodexError, Result};
use crate::nodex::Nodex;
use crate::reference::Reference;
use nodex_graph::{AttrType, GraphStore, PlugId, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How `connect` treats destinations with more components than the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectOptions {
    /// Broadcast a single-component source to every destination component
    pub allow_grow: bool,
    /// Reset destination components the source does not reach
    pub clear_larger: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            allow_grow: false,
            clear_larger: true,
        }
    }
}

impl ConnectOptions {
    /// Options that broadcast single values
    pub fn grow() -> Self {
        Self {
            allow_grow: true,
            ..Self::default()
        }
    }

    /// Options that leave unreached destination components alone
    pub fn keep_larger() -> Self {
        Self {
            clear_larger: false,
            ..Self::default()
        }
    }
}

/// Connect `source` into `destination`, returning the number of destination
/// components that now follow the source
pub fn connect(source: &Nodex, destination: &Nodex, options: ConnectOptions) -> Result<usize> {
    if !destination.is_connectable() {
        return Err(NodexError::NotConnectable(destination.to_string()));
    }
    let dim = source.dimensions()?;
    let other_dim = destination.dimensions()?;

    match dim.cmp(&other_dim) {
        Ordering::Equal => {
            connect_equal(source, destination, options)?;
            Ok(dim)
        }
        Ordering::Greater => {
            tracing::warn!(
                source = %source,
                destination = %destination,
                dim,
                other_dim,
                "source has more components than destination, truncating"
            );
            connect(&leading(source, other_dim)?, destination, options)
        }
        Ordering::Less if dim == 1 && options.allow_grow => {
            tracing::warn!(
                source = %source,
                destination = %destination,
                other_dim,
                "broadcasting single value to every destination component"
            );
            for i in 0..other_dim {
                connect(source, &destination.item(i)?, options)?;
            }
            Ok(other_dim)
        }
        Ordering::Less => {
            let connected = connect(source, &destination.slice(0..dim)?, options)?;
            if options.clear_larger {
                destination.slice(dim..other_dim)?.clear_value()?;
            }
            tracing::warn!(
                source = %source,
                destination = %destination,
                dim,
                other_dim,
                cleared = options.clear_larger,
                "source has fewer components than destination"
            );
            Ok(connected)
        }
    }
}

/// First `len` components of `source`.
///
/// Matrix plugs have no component plugs, so a matrix attribute yields a
/// constant copy of its current leading values.
fn leading(source: &Nodex, len: usize) -> Result<Nodex> {
    let matrix_plug = match source.attr() {
        Some(plug) => source
            .session()
            .with_store(|store| store.is_matrix_attribute(plug))?,
        None => false,
    };
    if !matrix_plug {
        return source.slice(0..len);
    }
    let mut values = source.as_f64s()?;
    values.truncate(len);
    tracing::warn!(
        source = %source,
        len,
        "matrix attribute truncated to a constant snapshot"
    );
    source.session().nodex(values)
}

fn connect_equal(source: &Nodex, destination: &Nodex, options: ConnectOptions) -> Result<()> {
    let session = destination.session();
    if let Some(dst) = destination.attr() {
        let handled = if let Some(src) = source.attr() {
            session.with_store(|store| -> Result<bool> {
                if !plugs_align(store, src, dst)? {
                    return Ok(false);
                }
                detach_from_compounds(store, dst)?;
                for child in store.children(dst)? {
                    break_inputs(store, child)?;
                }
                store.connect(src, dst, true)?;
                Ok(true)
            })?
        } else if source.is_constant() {
            let value = source.value()?;
            session.with_store(|store| -> Result<bool> {
                if store.is_array_attribute(dst)? {
                    return Ok(false);
                }
                write_value(store, dst, value)?;
                Ok(true)
            })?
        } else {
            false
        };
        if handled {
            return Ok(());
        }
    }

    for i in 0..source.dimensions()? {
        connect(&source.item(i)?, &destination.item(i)?, options)?;
    }
    Ok(())
}

/// Whether two plugs can be connected as a whole
fn plugs_align(store: &dyn GraphStore, src: PlugId, dst: PlugId) -> Result<bool> {
    let from = store.attribute_type(src)?;
    let to = store.attribute_type(dst)?;
    Ok(match (from, to) {
        (a, b) if a.is_numeric() && b.is_numeric() => true,
        (AttrType::Matrix, AttrType::Matrix) => true,
        (AttrType::Compound, AttrType::Compound) => {
            store.num_children(src)? == store.num_children(dst)?
        }
        _ => false,
    })
}

/// Disconnect whatever feeds `plug` or any of its children
fn break_inputs(store: &mut dyn GraphStore, plug: PlugId) -> nodex_graph::store::Result<()> {
    if let Some(src) = store.input(plug)? {
        store.disconnect(src, plug)?;
    }
    for child in store.children(plug)? {
        break_inputs(store, child)?;
    }
    Ok(())
}

/// Break connections into the compounds enclosing `plug`.
///
/// Components of a broken compound keep the value they had through the
/// connection, so only `plug` changes once it is rewired.
fn detach_from_compounds(store: &mut dyn GraphStore, plug: PlugId) -> nodex_graph::store::Result<()> {
    let mut ancestors = Vec::new();
    let mut current = store.parent(plug)?;
    while let Some(parent) = current {
        if !store.is_compound_attribute(parent)? {
            break;
        }
        ancestors.push(parent);
        current = store.parent(parent)?;
    }
    // Outermost first
    for ancestor in ancestors.into_iter().rev() {
        if let Some(src) = store.input(ancestor)? {
            let value = store.get_value(ancestor)?;
            store.disconnect(src, ancestor)?;
            push_down(store, ancestor, value)?;
        }
    }
    Ok(())
}

/// Store `value` in every component of `plug` not fed by its own connection
fn push_down(store: &mut dyn GraphStore, plug: PlugId, value: Value) -> nodex_graph::store::Result<()> {
    if store.input(plug)?.is_some() {
        return Ok(());
    }
    let children = store.children(plug)?;
    match value {
        Value::Tuple(values) if !children.is_empty() => {
            for (child, value) in children.into_iter().zip(values) {
                push_down(store, child, value)?;
            }
            Ok(())
        }
        value => store.set_value(plug, value),
    }
}

/// Write a constant into a plug, replacing incoming connections
fn write_value(store: &mut dyn GraphStore, plug: PlugId, value: Value) -> nodex_graph::store::Result<()> {
    detach_from_compounds(store, plug)?;
    break_inputs(store, plug)?;
    store.set_value(plug, value)
}

/// Write datatype defaults into every plug a connectable value covers
pub(crate) fn reset_plugs(nodex: &Nodex) -> Result<()> {
    match nodex.reference() {
        Reference::Attribute(plug) => {
            let plug = *plug;
            let session = nodex.session();
            let default = nodex.datatype().default_value();
            let is_array = session.with_store(|store| store.is_array_attribute(plug))?;
            match default {
                Some(value) if !is_array => {
                    session.with_store(|store| write_value(store, plug, value))?;
                }
                _ => {
                    for i in 0..nodex.dimensions()? {
                        reset_plugs(&nodex.item(i)?)?;
                    }
                }
            }
            Ok(())
        }
        Reference::Tuple(items) => items.iter().try_for_each(reset_plugs),
        _ => Err(NodexError::NotConnectable(nodex.to_string())),
    }
}
