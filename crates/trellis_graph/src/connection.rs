// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for flow graphs.

use crate::id::{ConnectionId, NodeId, PinId};
use serde::{Deserialize, Serialize};

/// A connection from an output pin to an input pin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source node ID
    pub from_node: NodeId,
    /// Source output pin ID
    pub output_pin: PinId,
    /// Target node ID
    pub to_node: NodeId,
    /// Target input pin ID
    pub input_pin: PinId,
}

impl Connection {
    /// Create a new connection
    pub fn new(from_node: NodeId, output_pin: PinId, to_node: NodeId, input_pin: PinId) -> Self {
        Self {
            id: ConnectionId::new(),
            from_node,
            output_pin,
            to_node,
            input_pin,
        }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }

    /// Check if this connection involves a specific pin
    pub fn involves_pin(&self, pin_id: PinId) -> bool {
        self.output_pin == pin_id || self.input_pin == pin_id
    }
}
