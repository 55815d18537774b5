// SPDX-License-Identifier: MIT OR Apache-2.0
//! Plug-to-plug connections.
//!
//! A destination plug has at most one incoming connection; a source may
//! fan out to any number of destinations.

use crate::attribute::PlugId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Connection handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// An edge carrying the value of `source` into `destination`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Connection handle
    pub id: ConnectionId,
    /// Plug the value is read from
    pub source: PlugId,
    /// Plug the value flows into
    pub destination: PlugId,
}

impl Connection {
    pub(crate) fn new(source: PlugId, destination: PlugId) -> Self {
        Self {
            id: ConnectionId::new(),
            source,
            destination,
        }
    }

    /// Whether this edge drives `plug`
    pub fn feeds(&self, plug: PlugId) -> bool {
        self.destination == plug
    }

    /// Whether this edge reads from `plug`
    pub fn reads(&self, plug: PlugId) -> bool {
        self.source == plug
    }

    /// Whether this is the edge `source -> destination`
    pub fn joins(&self, source: PlugId, destination: PlugId) -> bool {
        self.reads(source) && self.feeds(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_direction() {
        let (a, b) = (PlugId::new(), PlugId::new());
        let edge = Connection::new(a, b);
        assert!(edge.reads(a) && edge.feeds(b));
        assert!(!edge.feeds(a) && !edge.reads(b));
        assert!(edge.joins(a, b));
        assert!(!edge.joins(b, a));
        assert_ne!(edge.id, Connection::new(a, b).id);
    }
}
