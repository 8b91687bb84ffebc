// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.

use crate::comment::{resize_rect, CommentNode, ResizeHandle};
use crate::id::{GraphId, NodeId, PinId};
use crate::pin::{Pin, PinDirection};
use crate::registry::{NodeClass, NodeRegistry};
use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Size used for hit-testing before a node has been measured
pub const DEFAULT_NODE_SIZE: Vec2 = Vec2::new(120.0, 40.0);

/// Dataflow node payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowNode {
    /// Registered type ID
    pub type_id: String,
    /// Input pins, in display order
    pub inputs: Vec<Pin>,
    /// Output pins, in display order
    pub outputs: Vec<Pin>,
}

impl FlowNode {
    /// Get a pin by ID from either list
    pub fn pin(&self, pin_id: PinId) -> Option<&Pin> {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .find(|p| p.id == pin_id)
    }

    /// Get a mutable pin by ID from either list
    pub fn pin_mut(&mut self, pin_id: PinId) -> Option<&mut Pin> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut())
            .find(|p| p.id == pin_id)
    }

    /// Direction of a pin, implied by the list holding it
    pub fn pin_direction(&self, pin_id: PinId) -> Option<PinDirection> {
        if self.inputs.iter().any(|p| p.id == pin_id) {
            Some(PinDirection::Input)
        } else if self.outputs.iter().any(|p| p.id == pin_id) {
            Some(PinDirection::Output)
        } else {
            None
        }
    }

    /// Get an input pin by ID
    pub fn input(&self, pin_id: PinId) -> Option<&Pin> {
        self.inputs.iter().find(|p| p.id == pin_id)
    }

    /// Get an output pin by ID
    pub fn output(&self, pin_id: PinId) -> Option<&Pin> {
        self.outputs.iter().find(|p| p.id == pin_id)
    }

    /// All pins, inputs first
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.inputs.iter().chain(self.outputs.iter())
    }
}

/// State machine state payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateNode {
    /// Registered type ID
    pub type_id: String,
}

/// Directed transition edge between two states
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConduit {
    /// State the transition leaves
    pub start_state: NodeId,
    /// State the transition enters
    pub end_state: NodeId,
    /// Normalized progress, only used for drawing
    #[serde(skip)]
    pub progress: f32,
}

impl TransitionConduit {
    /// Whether the conduit touches `state`
    pub fn involves(&self, state: NodeId) -> bool {
        self.start_state == state || self.end_state == state
    }
}

/// Closed set of node variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeKind {
    /// Comment box
    Comment(CommentNode),
    /// Dataflow node
    Flow(FlowNode),
    /// State machine state
    State(StateNode),
    /// Transition conduit
    Conduit(TransitionConduit),
}

/// A node instance in a graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: NodeId,
    /// Owning graph; `None` once detached
    pub(crate) graph: Option<GraphId>,
    pub(crate) name: Option<String>,
    /// Position in canvas space
    pub position: Pos2,
    /// Lazily measured size, cleared when the layout changes
    #[serde(skip)]
    measured_size: Option<Vec2>,
    pub(crate) child_graph: Option<GraphId>,
    pub(crate) secondary_graph: Option<GraphId>,
    /// Variant payload
    pub kind: NodeKind,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            graph: None,
            name: None,
            position: Pos2::ZERO,
            measured_size: None,
            child_graph: None,
            secondary_graph: None,
            kind,
        }
    }

    /// Node ID; nil once the node has been destroyed
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Graph owning this node
    pub fn graph(&self) -> Option<GraphId> {
        self.graph
    }

    /// Whether the node still belongs to a graph
    pub fn is_attached(&self) -> bool {
        self.graph.is_some()
    }

    /// Owned child graph
    pub fn child_graph(&self) -> Option<GraphId> {
        self.child_graph
    }

    /// Owned secondary graph
    pub fn secondary_graph(&self) -> Option<GraphId> {
        self.secondary_graph
    }

    /// Runtime class
    pub fn class(&self) -> NodeClass {
        match self.kind {
            NodeKind::Comment(_) => NodeClass::Comment,
            NodeKind::Flow(_) => NodeClass::Flow,
            NodeKind::State(_) => NodeClass::State,
            NodeKind::Conduit(_) => NodeClass::Conduit,
        }
    }

    /// Registered type ID, for flow and state nodes
    pub fn type_id(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Flow(flow) => Some(&flow.type_id),
            NodeKind::State(state) => Some(&state.type_id),
            NodeKind::Comment(_) | NodeKind::Conduit(_) => None,
        }
    }

    /// Type display name
    pub fn type_name<'a>(&'a self, registry: &'a NodeRegistry) -> &'a str {
        match &self.kind {
            NodeKind::Comment(_) => "Comment",
            NodeKind::Conduit(_) => "Transition",
            NodeKind::Flow(_) | NodeKind::State(_) => {
                let type_id = self.type_id().unwrap_or_default();
                registry.get(type_id).map_or(type_id, |t| t.name.as_str())
            }
        }
    }

    /// Custom name, if one was set
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name to display: the custom name, falling back to the type name
    pub fn display_name<'a>(&'a self, registry: &'a NodeRegistry) -> &'a str {
        match &self.kind {
            NodeKind::Comment(comment) => &comment.text,
            _ => self.name().unwrap_or_else(|| self.type_name(registry)),
        }
    }

    /// Whether the user may rename this node
    pub fn is_renameable(&self, registry: &NodeRegistry) -> bool {
        match &self.kind {
            NodeKind::Comment(_) => true,
            NodeKind::Conduit(_) => false,
            NodeKind::Flow(_) | NodeKind::State(_) => self
                .type_id()
                .and_then(|id| registry.get(id))
                .is_some_and(|t| t.renameable),
        }
    }

    /// Whether renames must keep the name unique within the graph
    pub fn requires_unique_name(&self, registry: &NodeRegistry) -> bool {
        self.type_id()
            .and_then(|id| registry.get(id))
            .is_some_and(|t| t.requires_unique_name)
    }

    /// Whether the user may delete this node
    pub fn is_user_deletable(&self, registry: &NodeRegistry) -> bool {
        match self.type_id() {
            Some(id) => registry.get(id).map_or(true, |t| t.user_deletable),
            None => true,
        }
    }

    /// Current size in canvas units
    pub fn size(&self) -> Vec2 {
        match &self.kind {
            NodeKind::Comment(comment) => comment.size,
            _ => self.measured_size.unwrap_or(DEFAULT_NODE_SIZE),
        }
    }

    /// Measured size, if the node has been laid out since its last change
    pub fn measured_size(&self) -> Option<Vec2> {
        self.measured_size
    }

    /// Store the size computed by the view
    pub fn set_measured_size(&mut self, size: Vec2) {
        self.measured_size = Some(size);
    }

    /// Forget the measured size after a layout-affecting change
    pub fn invalidate_layout(&mut self) {
        self.measured_size = None;
    }

    /// Canvas-space rectangle
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.size())
    }

    /// Flow payload
    pub fn as_flow(&self) -> Option<&FlowNode> {
        match &self.kind {
            NodeKind::Flow(flow) => Some(flow),
            _ => None,
        }
    }

    /// Mutable flow payload
    pub fn as_flow_mut(&mut self) -> Option<&mut FlowNode> {
        match &mut self.kind {
            NodeKind::Flow(flow) => Some(flow),
            _ => None,
        }
    }

    /// Comment payload
    pub fn as_comment(&self) -> Option<&CommentNode> {
        match &self.kind {
            NodeKind::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    /// Conduit payload
    pub fn as_conduit(&self) -> Option<&TransitionConduit> {
        match &self.kind {
            NodeKind::Conduit(conduit) => Some(conduit),
            _ => None,
        }
    }

    /// Mutable conduit payload
    pub fn as_conduit_mut(&mut self) -> Option<&mut TransitionConduit> {
        match &mut self.kind {
            NodeKind::Conduit(conduit) => Some(conduit),
            _ => None,
        }
    }

    /// Drag the comment edges selected by `handle` to `target`.
    ///
    /// # Panics
    ///
    /// Panics if this node is not a comment.
    pub fn resize_comment(&mut self, handle: ResizeHandle, target: Pos2) {
        let current = self.rect();
        let class = self.class();
        let NodeKind::Comment(comment) = &mut self.kind else {
            panic!("resize_comment called on a {class:?} node");
        };
        let resized = resize_rect(current, handle, target);
        comment.size = resized.size();
        self.position = resized.min;
    }

    pub(crate) fn detach(&mut self) {
        self.graph = None;
        self.id = NodeId::nil();
    }
}
