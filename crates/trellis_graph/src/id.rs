// SPDX-License-Identifier: MIT OR Apache-2.0
//! Identifiers for graphs, nodes, pins and connections.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// The cleared ID carried by detached items
            pub const fn nil() -> Self {
                Self(Uuid::nil())
            }

            /// Whether this is the cleared ID
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a graph
    GraphId
);
define_id!(
    /// Unique identifier for a node
    NodeId
);
define_id!(
    /// Unique identifier for a pin
    PinId
);
define_id!(
    /// Unique identifier for a connection
    ConnectionId
);

/// Old-to-new ID table filled in by ID regeneration.
///
/// Nodes, pins, connections and graphs share one table so that every
/// cross-reference can be rewritten through the same mapping.
#[derive(Debug, Clone, Default)]
pub struct IdMapping {
    map: HashMap<Uuid, Uuid>,
}

impl IdMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the replacement for `old`, allocating one on first sight
    pub fn remap(&mut self, old: Uuid) -> Uuid {
        *self.map.entry(old).or_insert_with(Uuid::new_v4)
    }

    /// Look up an already-recorded replacement
    pub fn get(&self, old: Uuid) -> Option<Uuid> {
        self.map.get(&old).copied()
    }

    /// Number of recorded IDs
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over `(old, new)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (Uuid, Uuid)> + '_ {
        self.map.iter().map(|(old, new)| (*old, *new))
    }

    pub(crate) fn remap_node(&mut self, id: NodeId) -> NodeId {
        NodeId(self.remap(id.0))
    }

    pub(crate) fn remap_pin(&mut self, id: PinId) -> PinId {
        PinId(self.remap(id.0))
    }

    pub(crate) fn remap_connection(&mut self, id: ConnectionId) -> ConnectionId {
        ConnectionId(self.remap(id.0))
    }

    pub(crate) fn remap_graph(&mut self, id: GraphId) -> GraphId {
        GraphId(self.remap(id.0))
    }
}
