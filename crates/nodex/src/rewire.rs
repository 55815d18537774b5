// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rewiring of existing connections around attributes.

use crate::error::{NodexError, Result};
use crate::nodex::Nodex;
use nodex_graph::PlugId;

fn plug(nodex: &Nodex) -> Result<PlugId> {
    nodex
        .attr()
        .ok_or_else(|| NodexError::NotAnAttribute(nodex.to_string()))
}

/// Insert a pass-through between `old` and everything it drives.
///
/// `old` feeds `pass_in`; every former destination of `old` is fed by
/// `pass_out` instead.
pub fn pass_through(old: &Nodex, pass_in: &Nodex, pass_out: &Nodex) -> Result<()> {
    let session = old.session();
    let (old, pass_in, pass_out) = (plug(old)?, plug(pass_in)?, plug(pass_out)?);
    session.with_store(|store| -> Result<()> {
        let destinations = store.outputs(old)?;
        store.connect(old, pass_in, true)?;
        for destination in destinations.into_iter().filter(|d| *d != pass_in) {
            store.disconnect(old, destination)?;
            store.connect(pass_out, destination, true)?;
        }
        tracing::debug!(
            from = %store.plug_path(old)?,
            through = %store.plug_path(pass_in)?,
            "inserted pass-through"
        );
        Ok(())
    })
}

/// Move every outgoing connection of `old` over to `new`
pub fn replace_outputs(old: &Nodex, new: &Nodex) -> Result<()> {
    let session = old.session();
    let (old, new) = (plug(old)?, plug(new)?);
    session.with_store(|store| -> Result<()> {
        for destination in store.outputs(old)? {
            store.disconnect(old, destination)?;
            store.connect(new, destination, true)?;
        }
        Ok(())
    })
}

/// Move the incoming connection of `old`, if any, over to `new`
pub fn replace_input(old: &Nodex, new: &Nodex) -> Result<()> {
    let session = old.session();
    let (old, new) = (plug(old)?, plug(new)?);
    session.with_store(|store| -> Result<()> {
        if let Some(source) = store.input(old)? {
            store.disconnect(source, old)?;
            store.connect(source, new, true)?;
        }
        Ok(())
    })
}
