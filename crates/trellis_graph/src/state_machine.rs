// SPDX-License-Identifier: MIT OR Apache-2.0
//! State machine specialization: transition conduits and the entry state.

use crate::document::{GraphDocument, OwnedGraphs};
use crate::error::{GraphError, Result};
use crate::id::{GraphId, NodeId};
use crate::node::{Node, NodeKind, TransitionConduit};
use crate::registry::{GraphKind, NodeClass};

/// Name of the flow graph holding a conduit's transition condition
pub const CONDITION_GRAPH_NAME: &str = "Condition";

impl GraphDocument {
    /// Whether a conduit `start -> end` may be created.
    ///
    /// Both nodes must be distinct states of the same state machine, and no
    /// conduit may already exist for this ordered pair.
    pub fn can_create_transition_conduit(&self, graph_id: GraphId, start: NodeId, end: NodeId) -> bool {
        let Some(graph) = self.graph(graph_id) else {
            return false;
        };
        let is_state = |id| graph.node(id).is_some_and(|n: &Node| n.class() == NodeClass::State);

        graph.kind() == GraphKind::StateMachine
            && start != end
            && is_state(start)
            && is_state(end)
            && self.find_transition_conduit(graph_id, start, end).is_none()
    }

    /// Create a conduit from `start` to `end`, with its own condition graph
    pub fn create_transition_conduit(&mut self, graph_id: GraphId, start: NodeId, end: NodeId) -> Result<NodeId> {
        if !self.can_create_transition_conduit(graph_id, start, end) {
            return Err(GraphError::InvalidTransition { from: start, to: end });
        }
        let midpoint = self
            .graph(graph_id)
            .and_then(|g| Some(g.node(start)?.rect().center().lerp(g.node(end)?.rect().center(), 0.5)))
            .unwrap_or_default();

        let mut node = Node::new(NodeKind::Conduit(TransitionConduit {
            start_state: start,
            end_state: end,
            progress: 0.0,
        }));
        node.position = midpoint;
        let owned = OwnedGraphs {
            child: None,
            secondary: Some((GraphKind::Flow, CONDITION_GRAPH_NAME.to_string())),
        };

        let conduit = self.attach_node(graph_id, node, owned);
        tracing::debug!("Created transition {} -> {} ({})", start, end, conduit);
        Ok(conduit)
    }

    /// Conduit joining `start -> end`, if any
    pub fn find_transition_conduit(&self, graph_id: GraphId, start: NodeId, end: NodeId) -> Option<NodeId> {
        self.graph(graph_id)?
            .nodes()
            .find(|n| {
                n.as_conduit()
                    .is_some_and(|c| c.start_state == start && c.end_state == end)
            })
            .map(Node::id)
    }

    /// Every conduit leaving or entering `state`
    pub fn conduits_for_state(&self, graph_id: GraphId, state: NodeId) -> Vec<NodeId> {
        self.graph(graph_id)
            .map(|g| {
                g.nodes()
                    .filter(|n| n.as_conduit().is_some_and(|c| c.involves(state)))
                    .map(Node::id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Make `state` the machine's entry state
    pub fn set_default_state(&mut self, graph_id: GraphId, state: NodeId) -> Result<()> {
        let graph = self.graph(graph_id).ok_or(GraphError::GraphNotFound(graph_id))?;
        let class = graph.node(state).ok_or(GraphError::NodeNotFound(state))?.class();
        if class != NodeClass::State {
            return Err(GraphError::NodeNotAllowed {
                kind: graph.kind(),
                class,
            });
        }

        self.begin_modification();
        if let Some(graph) = self.graph_mut(graph_id) {
            graph.default_state = Some(state);
        }
        self.end_modification();
        Ok(())
    }

    /// Set the drawn progress of a conduit, clamped to `0..=1`
    pub fn set_transition_progress(&mut self, conduit: NodeId, progress: f32) {
        if let Some(c) = self.node_mut(conduit).and_then(Node::as_conduit_mut) {
            c.progress = progress.clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::document::tests::test_registry;
    use crate::document::{GraphDocument, NewNode};
    use crate::error::GraphError;
    use crate::id::NodeId;
    use crate::registry::{GraphKind, NodeClass};
    use egui::Pos2;

    fn machine() -> (GraphDocument, NodeId, NodeId) {
        let mut doc = GraphDocument::new(test_registry(), GraphKind::StateMachine, "Machine");
        let root = doc.root();
        let s1 = doc.create_node(root, NewNode::Typed("state"), Pos2::ZERO).unwrap();
        let s2 = doc.create_node(root, NewNode::Typed("state"), Pos2::new(300.0, 0.0)).unwrap();
        (doc, s1, s2)
    }

    #[test]
    fn test_transition_direction_matters() {
        let (mut doc, s1, s2) = machine();
        let root = doc.root();
        assert!(doc.can_create_transition_conduit(root, s1, s2));

        let conduit = doc.create_transition_conduit(root, s1, s2).unwrap();
        assert!(!doc.can_create_transition_conduit(root, s1, s2));
        assert!(doc.can_create_transition_conduit(root, s2, s1));
        assert_eq!(doc.find_transition_conduit(root, s1, s2), Some(conduit));
        assert!(matches!(
            doc.create_transition_conduit(root, s1, s2),
            Err(GraphError::InvalidTransition { .. })
        ));
        assert!(!doc.can_create_transition_conduit(root, s1, s1));
    }

    #[test]
    fn test_conduit_owns_condition_graph() {
        let (mut doc, s1, s2) = machine();
        let root = doc.root();
        let conduit = doc.create_transition_conduit(root, s1, s2).unwrap();
        let condition = doc.node(conduit).unwrap().secondary_graph().unwrap();
        assert_eq!(doc.graph(condition).unwrap().kind(), GraphKind::Flow);
        assert_eq!(doc.graph(condition).unwrap().parent_node(), Some(conduit));
        assert_eq!(doc.parent_graph(condition), Some(root));
    }

    #[test]
    fn test_destroying_state_destroys_conduits() {
        let (mut doc, s1, s2) = machine();
        let root = doc.root();
        let forward = doc.create_transition_conduit(root, s1, s2).unwrap();
        let back = doc.create_transition_conduit(root, s2, s1).unwrap();
        let graphs_before = doc.graph_count();
        assert_eq!(doc.conduits_for_state(root, s1), vec![forward, back]);

        doc.destroy_node(s2);
        assert!(doc.node(forward).is_none());
        assert!(doc.node(back).is_none());
        let mut remaining = Vec::new();
        doc.find_all_nodes_of_class(root, NodeClass::Conduit, false, &mut remaining);
        assert!(remaining.is_empty());
        assert_eq!(doc.graph_count(), graphs_before - 3);
    }

    #[test]
    fn test_default_state_follows_destruction() {
        let (mut doc, s1, s2) = machine();
        let root = doc.root();
        assert_eq!(doc.root_graph().default_state(), Some(s1));

        doc.set_default_state(root, s2).unwrap();
        assert_eq!(doc.root_graph().default_state(), Some(s2));
        doc.destroy_node(s2);
        assert_eq!(doc.root_graph().default_state(), Some(s1));
        doc.destroy_node(s1);
        assert_eq!(doc.root_graph().default_state(), None);
    }

    #[test]
    fn test_transitions_need_states() {
        let (mut doc, s1, _) = machine();
        let root = doc.root();
        let comment = doc.create_node(root, NewNode::Comment, Pos2::ZERO).unwrap();
        assert!(!doc.can_create_transition_conduit(root, s1, comment));
        assert!(doc.set_default_state(root, comment).is_err());
    }
}
