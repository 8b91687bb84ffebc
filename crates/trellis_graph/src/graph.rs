// SPDX-License-Identifier: MIT OR Apache-2.0
//! A single graph: its nodes, connections and remembered viewport.

use crate::connection::Connection;
use crate::id::{ConnectionId, GraphId, NodeId};
use crate::node::Node;
use crate::registry::{GraphKind, NodeClass};
use egui::Vec2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Pan offset and zoom remembered per graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Canvas position shown at the window origin
    pub offset: Vec2,
    /// Window pixels per canvas unit
    pub zoom: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

/// A node graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    pub(crate) id: GraphId,
    pub(crate) kind: GraphKind,
    /// Graph name
    pub name: String,
    /// Nodes in insertion order
    pub(crate) nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes (flow graphs only)
    pub(crate) connections: IndexMap<ConnectionId, Connection>,
    /// Entry state (state machines only)
    pub(crate) default_state: Option<NodeId>,
    /// Node owning this graph; `None` for the root graph
    pub(crate) parent_node: Option<NodeId>,
    /// Remembered viewport
    pub view: ViewState,
}

impl Graph {
    pub(crate) fn new(kind: GraphKind, name: impl Into<String>) -> Self {
        Self {
            id: GraphId::new(),
            kind,
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            default_state: None,
            parent_node: None,
            view: ViewState::default(),
        }
    }

    /// Graph ID
    pub fn id(&self) -> GraphId {
        self.id
    }

    /// Flow or state machine
    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    /// Node owning this graph
    pub fn parent_node(&self) -> Option<NodeId> {
        self.parent_node
    }

    /// Whether this is a root graph
    pub fn is_root(&self) -> bool {
        self.parent_node.is_none()
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Whether the node lives directly in this graph
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Get all nodes, oldest first
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all nodes mutably
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get nodes of one class
    pub fn nodes_of_class(&self, class: NodeClass) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.class() == class)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Entry state of a state machine
    pub fn default_state(&self) -> Option<NodeId> {
        self.default_state
    }

    pub(crate) fn name_in_use(&self, name: &str, except: Option<NodeId>) -> bool {
        self.nodes
            .values()
            .any(|n| Some(n.id) != except && n.name() == Some(name))
    }

    /// `base`, or `base N` with the lowest N that no other node uses
    pub(crate) fn unique_name(&self, base: &str, except: Option<NodeId>) -> String {
        if !self.name_in_use(base, except) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base} {n}"))
            .find(|candidate| !self.name_in_use(candidate, except))
            .unwrap_or_else(|| base.to_string())
    }
}
