// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph document: an arena owning a root graph and every nested graph.
//!
//! Graphs and nodes refer to each other by ID only. A node may own a child
//! graph and a secondary graph; those graphs record the owning node as their
//! parent. Destroying a node destroys what it owns.

use crate::comment::CommentNode;
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::id::{GraphId, IdMapping, NodeId};
use crate::modification::{ModificationEvent, ModificationEvents, SubscriptionId};
use crate::node::{FlowNode, Node, NodeKind, StateNode};
use crate::pin::Pin;
use crate::registry::{can_host, GraphKind, NodeClass, NodeRegistry};
use egui::Pos2;
use indexmap::IndexMap;
use std::sync::Arc;

/// What to create with [`GraphDocument::create_node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewNode<'a> {
    /// A comment box
    Comment,
    /// A registered flow or state node type
    Typed(&'a str),
}

/// Arena of graphs with one root, plus the session's modification bus
#[derive(Debug)]
pub struct GraphDocument {
    registry: Arc<NodeRegistry>,
    root: GraphId,
    pub(crate) graphs: IndexMap<GraphId, Graph>,
    events: ModificationEvents,
}

impl GraphDocument {
    /// Create a document with an empty root graph
    pub fn new(registry: Arc<NodeRegistry>, root_kind: GraphKind, name: impl Into<String>) -> Self {
        let root = Graph::new(root_kind, name);
        let root_id = root.id;
        let mut graphs = IndexMap::new();
        graphs.insert(root_id, root);
        Self {
            registry,
            root: root_id,
            graphs,
            events: ModificationEvents::new(),
        }
    }

    pub(crate) fn from_parts(
        registry: Arc<NodeRegistry>,
        root: GraphId,
        graphs: IndexMap<GraphId, Graph>,
    ) -> Self {
        Self {
            registry,
            root,
            graphs,
            events: ModificationEvents::new(),
        }
    }

    /// Node type catalog
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Root graph ID
    pub fn root(&self) -> GraphId {
        self.root
    }

    /// Root graph
    pub fn root_graph(&self) -> &Graph {
        &self.graphs[&self.root]
    }

    /// Get a graph by ID
    pub fn graph(&self, graph_id: GraphId) -> Option<&Graph> {
        self.graphs.get(&graph_id)
    }

    /// Get a mutable graph by ID
    pub fn graph_mut(&mut self, graph_id: GraphId) -> Option<&mut Graph> {
        self.graphs.get_mut(&graph_id)
    }

    /// Get all graphs
    pub fn graphs(&self) -> impl Iterator<Item = &Graph> {
        self.graphs.values()
    }

    /// Get the number of graphs, the root included
    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    /// Graph directly containing a node
    pub fn owning_graph(&self, node_id: NodeId) -> Option<GraphId> {
        self.graphs
            .values()
            .find(|g| g.contains_node(node_id))
            .map(|g| g.id)
    }

    /// Graph containing the node that owns `graph_id`
    pub fn parent_graph(&self, graph_id: GraphId) -> Option<GraphId> {
        let parent_node = self.graph(graph_id)?.parent_node?;
        self.owning_graph(parent_node)
    }

    /// Get a node anywhere in the document
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.graphs.values().find_map(|g| g.node(node_id))
    }

    /// Get a mutable node anywhere in the document
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.graphs.values_mut().find_map(|g| g.node_mut(node_id))
    }

    // ------------------------------------------------------------------
    // Modification scopes
    // ------------------------------------------------------------------

    /// Register an observer of outermost modification scopes
    pub fn subscribe(&mut self, observer: impl FnMut(&ModificationEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(observer)
    }

    /// Remove a modification observer
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Open a modification scope
    pub fn begin_modification(&mut self) {
        self.events.begin(self.root);
    }

    /// Close a modification scope.
    ///
    /// # Panics
    ///
    /// Panics if no scope is open.
    pub fn end_modification(&mut self) {
        self.events.end(self.root);
    }

    /// Whether a modification scope is open
    pub fn is_modifying(&self) -> bool {
        self.events.is_modifying()
    }

    /// Current modification nesting depth
    pub fn modification_depth(&self) -> u32 {
        self.events.depth()
    }

    /// Run `f` inside one modification scope
    pub fn modify<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_modification();
        let result = f(self);
        self.end_modification();
        result
    }

    // ------------------------------------------------------------------
    // Node lifecycle
    // ------------------------------------------------------------------

    /// Capability check: whether a graph accepts nodes of `class`
    pub fn can_create_node(&self, graph_id: GraphId, class: NodeClass) -> bool {
        self.graph(graph_id).is_some_and(|g| can_host(g.kind, class))
    }

    /// Create a node in a graph at `position`
    pub fn create_node(&mut self, graph_id: GraphId, node: NewNode<'_>, position: Pos2) -> Result<NodeId> {
        let kind = self.graph(graph_id).ok_or(GraphError::GraphNotFound(graph_id))?.kind;

        let mut owned = OwnedGraphs::default();
        let (payload, unique_base) = match node {
            NewNode::Comment => (NodeKind::Comment(CommentNode::default()), None),
            NewNode::Typed(type_id) => {
                let node_type = self
                    .registry
                    .get(type_id)
                    .ok_or_else(|| GraphError::NodeTypeNotFound(type_id.to_string()))?;
                let payload = match node_type.class {
                    NodeClass::State => NodeKind::State(StateNode {
                        type_id: node_type.id.clone(),
                    }),
                    NodeClass::Flow => NodeKind::Flow(FlowNode {
                        type_id: node_type.id.clone(),
                        inputs: node_type.inputs.iter().map(Pin::from_template).collect(),
                        outputs: node_type.outputs.iter().map(Pin::from_template).collect(),
                    }),
                    class @ (NodeClass::Comment | NodeClass::Conduit) => {
                        return Err(GraphError::NodeNotAllowed { kind, class });
                    }
                };
                owned.child = node_type.child_graph.map(|k| (k, node_type.name.clone()));
                owned.secondary = node_type.secondary_graph.map(|k| (k, node_type.name.clone()));
                let unique_base = node_type.requires_unique_name.then(|| node_type.name.clone());
                (payload, unique_base)
            }
        };

        let mut node = Node::new(payload);
        if !can_host(kind, node.class()) {
            return Err(GraphError::NodeNotAllowed {
                kind,
                class: node.class(),
            });
        }
        node.position = position;
        if let Some(base) = unique_base {
            node.name = Some(self.graphs[&graph_id].unique_name(&base, None));
        }

        Ok(self.attach_node(graph_id, node, owned))
    }

    pub(crate) fn attach_node(&mut self, graph_id: GraphId, mut node: Node, owned: OwnedGraphs) -> NodeId {
        self.begin_modification();

        let node_id = node.id;
        node.graph = Some(graph_id);
        node.child_graph = owned.child.map(|(kind, name)| self.create_owned_graph(node_id, kind, name));
        node.secondary_graph = owned
            .secondary
            .map(|(kind, name)| self.create_owned_graph(node_id, kind, name));

        tracing::debug!("Created {:?} node {} in graph {}", node.class(), node_id, graph_id);
        if let Some(graph) = self.graphs.get_mut(&graph_id) {
            graph.nodes.insert(node_id, node);
        }
        self.on_node_added(graph_id, node_id);

        self.end_modification();
        node_id
    }

    fn create_owned_graph(&mut self, owner: NodeId, kind: GraphKind, name: String) -> GraphId {
        let mut graph = Graph::new(kind, name);
        graph.parent_node = Some(owner);
        let id = graph.id;
        self.graphs.insert(id, graph);
        id
    }

    /// Destroy a node and everything that depends on it.
    ///
    /// Returns the detached node, whose ID and graph back-reference have been
    /// cleared, or `None` if no such node exists.
    pub fn destroy_node(&mut self, node_id: NodeId) -> Option<Node> {
        let graph_id = self.owning_graph(node_id)?;
        self.begin_modification();

        self.pre_destroy_node(graph_id, node_id);

        let removed = self
            .graphs
            .get_mut(&graph_id)
            .and_then(|g| g.nodes.shift_remove(&node_id));
        let Some(mut node) = removed else {
            self.end_modification();
            return None;
        };
        for owned in [node.child_graph.take(), node.secondary_graph.take()].into_iter().flatten() {
            self.destroy_graph(owned);
        }
        node.detach();

        self.post_destroy_node(graph_id, node_id);
        tracing::debug!("Destroyed node {} from graph {}", node_id, graph_id);

        self.end_modification();
        Some(node)
    }

    fn destroy_graph(&mut self, graph_id: GraphId) {
        let Some(graph) = self.graphs.get(&graph_id) else {
            return;
        };
        let node_ids: Vec<_> = graph.node_ids().collect();
        for node_id in node_ids {
            self.destroy_node(node_id);
        }
        self.graphs.shift_remove(&graph_id);
    }

    fn on_node_added(&mut self, graph_id: GraphId, node_id: NodeId) {
        let Some(graph) = self.graphs.get_mut(&graph_id) else {
            return;
        };
        if graph.kind == GraphKind::StateMachine
            && graph.default_state.is_none()
            && graph.node(node_id).is_some_and(|n| n.class() == NodeClass::State)
        {
            graph.default_state = Some(node_id);
        }
    }

    fn pre_destroy_node(&mut self, graph_id: GraphId, node_id: NodeId) {
        let Some(kind) = self.graph(graph_id).map(|g| g.kind) else {
            return;
        };
        match kind {
            GraphKind::Flow => {
                self.break_all_connections_for_node(graph_id, node_id);
            }
            GraphKind::StateMachine => {
                for conduit in self.conduits_for_state(graph_id, node_id) {
                    self.destroy_node(conduit);
                }
            }
        }
    }

    fn post_destroy_node(&mut self, graph_id: GraphId, node_id: NodeId) {
        let Some(graph) = self.graphs.get_mut(&graph_id) else {
            return;
        };
        if graph.default_state == Some(node_id) {
            let next = graph.nodes_of_class(NodeClass::State).map(|n| n.id).next();
            graph.default_state = next;
        }
    }

    /// Rename a node, resolving clashes if the type requires unique names.
    ///
    /// # Panics
    ///
    /// Panics if the node cannot be renamed.
    pub fn rename_node(&mut self, node_id: NodeId, new_name: &str) -> Result<()> {
        let graph_id = self.owning_graph(node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        let registry = Arc::clone(&self.registry);
        let graph = &self.graphs[&graph_id];
        let node = &graph.nodes[&node_id];
        assert!(
            node.is_renameable(&registry),
            "rename_node called on non-renameable node {node_id}"
        );
        let name = if node.requires_unique_name(&registry) {
            graph.unique_name(new_name, Some(node_id))
        } else {
            new_name.to_string()
        };

        self.begin_modification();
        if let Some(node) = self.node_mut(node_id) {
            match &mut node.kind {
                NodeKind::Comment(comment) => comment.text = name,
                _ => node.name = Some(name),
            }
            node.invalidate_layout();
        }
        self.end_modification();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Find a node in a graph, optionally descending into child and
    /// secondary graphs depth-first
    pub fn find_node(&self, graph_id: GraphId, node_id: NodeId, recursive: bool) -> Option<&Node> {
        let graph = self.graph(graph_id)?;
        if let Some(node) = graph.node(node_id) {
            return Some(node);
        }
        if !recursive {
            return None;
        }
        graph.nodes().find_map(|n| {
            [n.child_graph, n.secondary_graph]
                .into_iter()
                .flatten()
                .find_map(|owned| self.find_node(owned, node_id, true))
        })
    }

    /// Collect the IDs of all nodes of `class` into `out`
    pub fn find_all_nodes_of_class(
        &self,
        graph_id: GraphId,
        class: NodeClass,
        recursive: bool,
        out: &mut Vec<NodeId>,
    ) {
        self.find_all_nodes_matching(graph_id, class, recursive, |_| true, out);
    }

    /// Collect the IDs of all nodes of `class` accepted by `predicate` into `out`
    pub fn find_all_nodes_matching(
        &self,
        graph_id: GraphId,
        class: NodeClass,
        recursive: bool,
        predicate: impl Fn(&Node) -> bool,
        out: &mut Vec<NodeId>,
    ) {
        self.collect_nodes(graph_id, class, recursive, &predicate, out);
    }

    fn collect_nodes(
        &self,
        graph_id: GraphId,
        class: NodeClass,
        recursive: bool,
        predicate: &dyn Fn(&Node) -> bool,
        out: &mut Vec<NodeId>,
    ) {
        let Some(graph) = self.graph(graph_id) else {
            return;
        };
        for node in graph.nodes() {
            if node.class() == class && predicate(node) {
                out.push(node.id);
            }
            if recursive {
                for owned in [node.child_graph, node.secondary_graph].into_iter().flatten() {
                    self.collect_nodes(owned, class, true, predicate, out);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // ID regeneration
    // ------------------------------------------------------------------

    /// Give every node, pin and connection under `graph_id` a fresh ID.
    ///
    /// Nested graphs are regenerated too. `graph_id` itself keeps its ID so the
    /// node owning it stays valid. Every old ID is recorded in `mapping`, and
    /// all cross-references (connections, conduit endpoints, owned graphs,
    /// default states) are rewritten through it.
    pub fn regenerate_ids(&mut self, graph_id: GraphId, mapping: &mut IdMapping) -> Result<()> {
        if !self.graphs.contains_key(&graph_id) {
            return Err(GraphError::GraphNotFound(graph_id));
        }

        let mut subtree = vec![graph_id];
        let mut i = 0;
        while i < subtree.len() {
            let graph = &self.graphs[&subtree[i]];
            for node in graph.nodes() {
                subtree.extend([node.child_graph, node.secondary_graph].into_iter().flatten());
            }
            i += 1;
        }

        self.begin_modification();
        let graphs = std::mem::take(&mut self.graphs);
        self.graphs = graphs
            .into_iter()
            .map(|(id, graph)| {
                if !subtree.contains(&id) {
                    return (id, graph);
                }
                let graph = regenerate_graph(graph, id == graph_id, mapping);
                (graph.id, graph)
            })
            .collect();
        self.end_modification();

        tracing::debug!("Regenerated IDs for {} graphs ({} IDs)", subtree.len(), mapping.len());
        Ok(())
    }
}

/// Graphs created alongside a node
#[derive(Debug, Default)]
pub(crate) struct OwnedGraphs {
    pub(crate) child: Option<(GraphKind, String)>,
    pub(crate) secondary: Option<(GraphKind, String)>,
}

fn regenerate_graph(mut graph: Graph, is_subtree_root: bool, mapping: &mut IdMapping) -> Graph {
    if !is_subtree_root {
        graph.id = mapping.remap_graph(graph.id);
        graph.parent_node = graph.parent_node.map(|n| mapping.remap_node(n));
    }
    let graph_id = graph.id;

    let nodes = std::mem::take(&mut graph.nodes);
    graph.nodes = nodes
        .into_values()
        .map(|mut node| {
            node.id = mapping.remap_node(node.id);
            node.graph = Some(graph_id);
            node.child_graph = node.child_graph.map(|g| mapping.remap_graph(g));
            node.secondary_graph = node.secondary_graph.map(|g| mapping.remap_graph(g));
            match &mut node.kind {
                NodeKind::Flow(flow) => {
                    for pin in flow.inputs.iter_mut().chain(flow.outputs.iter_mut()) {
                        pin.id = mapping.remap_pin(pin.id);
                    }
                }
                NodeKind::Conduit(conduit) => {
                    conduit.start_state = mapping.remap_node(conduit.start_state);
                    conduit.end_state = mapping.remap_node(conduit.end_state);
                }
                NodeKind::Comment(_) | NodeKind::State(_) => {}
            }
            (node.id, node)
        })
        .collect();

    let connections = std::mem::take(&mut graph.connections);
    graph.connections = connections
        .into_values()
        .map(|mut c| {
            c.id = mapping.remap_connection(c.id);
            c.from_node = mapping.remap_node(c.from_node);
            c.output_pin = mapping.remap_pin(c.output_pin);
            c.to_node = mapping.remap_node(c.to_node);
            c.input_pin = mapping.remap_pin(c.input_pin);
            (c.id, c)
        })
        .collect();

    graph.default_state = graph.default_state.map(|n| mapping.remap_node(n));
    graph
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pin::PinTemplate;
    use crate::registry::NodeType;
    use std::cell::RefCell;
    use std::rc::Rc;

    pub(crate) fn test_registry() -> Arc<NodeRegistry> {
        let mut registry = NodeRegistry::new();
        registry.register(
            NodeType::flow("float", "Float")
                .with_output(PinTemplate::new("out", "float").multi_out()),
        );
        registry.register(
            NodeType::flow("pass", "Pass")
                .with_input(PinTemplate::new("in", "float"))
                .with_output(PinTemplate::new("out", "float")),
        );
        registry.register(
            NodeType::flow("sink", "Sink")
                .with_input(PinTemplate::new("in", "float"))
                .undeletable(),
        );
        registry.register(
            NodeType::flow("blend", "Blend")
                .with_input(PinTemplate::new("a", "float"))
                .with_output(PinTemplate::new("out", "float"))
                .with_dynamic_input(PinTemplate::new("Input", "float")),
        );
        registry.register(
            NodeType::flow("pose", "Pose Output")
                .with_input(PinTemplate::new("pose", "pose")),
        );
        registry.register(
            NodeType::flow("machine", "State Machine")
                .with_output(PinTemplate::new("pose", "pose"))
                .with_child_graph(GraphKind::StateMachine),
        );
        registry.register(
            NodeType::state("state", "State")
                .renameable(true)
                .with_child_graph(GraphKind::Flow),
        );
        Arc::new(registry)
    }

    pub(crate) fn flow_document() -> GraphDocument {
        GraphDocument::new(test_registry(), GraphKind::Flow, "Root")
    }

    #[test]
    fn test_create_and_find_node() {
        let mut doc = flow_document();
        let root = doc.root();
        let id = doc.create_node(root, NewNode::Typed("pass"), Pos2::new(10.0, 20.0)).unwrap();

        let node = doc.find_node(root, id, false).unwrap();
        assert_eq!(node.id(), id);
        assert_eq!(node.graph(), Some(root));
        assert_eq!(node.position, Pos2::new(10.0, 20.0));
        assert_eq!(node.as_flow().unwrap().inputs.len(), 1);
    }

    #[test]
    fn test_destroy_node_clears_identity() {
        let mut doc = flow_document();
        let root = doc.root();
        let id = doc.create_node(root, NewNode::Typed("pass"), Pos2::ZERO).unwrap();

        let destroyed = doc.destroy_node(id).unwrap();
        assert!(destroyed.id().is_nil());
        assert!(!destroyed.is_attached());
        assert!(doc.find_node(root, id, true).is_none());
        assert!(doc.destroy_node(id).is_none());
    }

    #[test]
    fn test_capability_check() {
        let mut doc = flow_document();
        let root = doc.root();
        assert!(doc.can_create_node(root, NodeClass::Comment));
        assert!(!doc.can_create_node(root, NodeClass::State));
        let err = doc.create_node(root, NewNode::Typed("state"), Pos2::ZERO).unwrap_err();
        assert!(matches!(err, GraphError::NodeNotAllowed { .. }));
        assert!(matches!(
            doc.create_node(root, NewNode::Typed("nope"), Pos2::ZERO),
            Err(GraphError::NodeTypeNotFound(_))
        ));
    }

    #[test]
    fn test_types_must_be_flow_or_state() {
        let mut registry = NodeRegistry::new();
        let mut conduit = NodeType::flow("edge", "Edge");
        conduit.class = NodeClass::Conduit;
        registry.register(conduit);
        let mut doc = GraphDocument::new(Arc::new(registry), GraphKind::Flow, "Root");
        let root = doc.root();

        let err = doc.create_node(root, NewNode::Typed("edge"), Pos2::ZERO).unwrap_err();
        assert!(matches!(
            err,
            GraphError::NodeNotAllowed {
                class: NodeClass::Conduit,
                ..
            }
        ));
        assert_eq!(doc.root_graph().node_count(), 0);
    }

    #[test]
    fn test_recursive_search_and_cascade() {
        let mut doc = flow_document();
        let root = doc.root();
        let machine = doc.create_node(root, NewNode::Typed("machine"), Pos2::ZERO).unwrap();
        let sm_graph = doc.node(machine).unwrap().child_graph().unwrap();
        assert_eq!(doc.parent_graph(sm_graph), Some(root));

        let state = doc.create_node(sm_graph, NewNode::Typed("state"), Pos2::ZERO).unwrap();
        let state_graph = doc.node(state).unwrap().child_graph().unwrap();
        let inner = doc.create_node(state_graph, NewNode::Typed("pose"), Pos2::ZERO).unwrap();

        assert!(doc.find_node(root, inner, false).is_none());
        assert_eq!(doc.find_node(root, inner, true).map(Node::id), Some(inner));

        let mut flow_nodes = Vec::new();
        doc.find_all_nodes_of_class(root, NodeClass::Flow, true, &mut flow_nodes);
        assert_eq!(flow_nodes, vec![machine, inner]);

        let mut named = Vec::new();
        doc.find_all_nodes_matching(root, NodeClass::Flow, true, |n| n.type_id() == Some("pose"), &mut named);
        assert_eq!(named, vec![inner]);

        assert_eq!(doc.graph_count(), 3);
        doc.destroy_node(machine);
        assert_eq!(doc.graph_count(), 1);
        assert!(doc.node(inner).is_none());
        assert!(doc.graph(state_graph).is_none());
    }

    #[test]
    fn test_unique_names() {
        let mut doc = GraphDocument::new(test_registry(), GraphKind::StateMachine, "Root");
        let root = doc.root();
        let a = doc.create_node(root, NewNode::Typed("state"), Pos2::ZERO).unwrap();
        let b = doc.create_node(root, NewNode::Typed("state"), Pos2::ZERO).unwrap();
        let c = doc.create_node(root, NewNode::Typed("state"), Pos2::ZERO).unwrap();
        assert_eq!(doc.node(a).unwrap().name(), Some("State"));
        assert_eq!(doc.node(b).unwrap().name(), Some("State 1"));
        assert_eq!(doc.node(c).unwrap().name(), Some("State 2"));

        doc.rename_node(c, "State").unwrap();
        assert_eq!(doc.node(c).unwrap().name(), Some("State 2"));
        doc.rename_node(c, "Idle").unwrap();
        assert_eq!(doc.node(c).unwrap().name(), Some("Idle"));
    }

    #[test]
    #[should_panic(expected = "non-renameable")]
    fn test_rename_non_renameable_panics() {
        let mut doc = flow_document();
        let root = doc.root();
        let id = doc.create_node(root, NewNode::Typed("pass"), Pos2::ZERO).unwrap();
        let _ = doc.rename_node(id, "Nope");
    }

    #[test]
    fn test_modification_notifications_from_nested_graphs() {
        let mut doc = flow_document();
        let root = doc.root();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        doc.subscribe(move |e| sink.borrow_mut().push(*e));

        let machine = doc.create_node(root, NewNode::Typed("machine"), Pos2::ZERO).unwrap();
        assert_eq!(log.borrow().len(), 2);

        let sm_graph = doc.node(machine).unwrap().child_graph().unwrap();
        log.borrow_mut().clear();
        doc.modify(|doc| {
            doc.create_node(sm_graph, NewNode::Typed("state"), Pos2::ZERO).unwrap();
            doc.create_node(sm_graph, NewNode::Typed("state"), Pos2::ZERO).unwrap();
            doc.destroy_node(machine);
        });

        assert_eq!(
            *log.borrow(),
            vec![ModificationEvent::Began { root }, ModificationEvent::Ended { root }]
        );
        assert_eq!(doc.modification_depth(), 0);
    }

    #[test]
    fn test_regenerate_ids_is_consistent() {
        let mut doc = flow_document();
        let root = doc.root();
        let a = doc.create_node(root, NewNode::Typed("float"), Pos2::ZERO).unwrap();
        let b = doc.create_node(root, NewNode::Typed("pass"), Pos2::ZERO).unwrap();
        let machine = doc.create_node(root, NewNode::Typed("machine"), Pos2::ZERO).unwrap();
        let sm_graph = doc.node(machine).unwrap().child_graph().unwrap();
        let s1 = doc.create_node(sm_graph, NewNode::Typed("state"), Pos2::ZERO).unwrap();
        let s2 = doc.create_node(sm_graph, NewNode::Typed("state"), Pos2::ZERO).unwrap();
        let conduit = doc.create_transition_conduit(sm_graph, s1, s2).unwrap();

        let out = doc.node(a).unwrap().as_flow().unwrap().outputs[0].id;
        let input = doc.node(b).unwrap().as_flow().unwrap().inputs[0].id;
        assert!(doc.try_make_connection(root, a, out, b, input));
        let old_connection = doc.root_graph().connections().next().unwrap().id;

        let mut mapping = IdMapping::new();
        doc.regenerate_ids(root, &mut mapping).unwrap();

        // Injective: every old ID maps to a distinct new one.
        let new_ids: std::collections::HashSet<_> = mapping.iter().map(|(_, new)| new).collect();
        assert_eq!(new_ids.len(), mapping.len());
        for (old, new) in mapping.iter() {
            assert_ne!(old, new);
        }

        let new_a = NodeId(mapping.get(a.0).unwrap());
        let new_b = NodeId(mapping.get(b.0).unwrap());
        assert!(doc.node(a).is_none());
        assert_eq!(doc.node(new_a).unwrap().id(), new_a);

        let connection = doc.root_graph().connections().next().unwrap();
        assert_eq!(connection.id.0, mapping.get(old_connection.0).unwrap());
        assert_eq!(connection.from_node, new_a);
        assert_eq!(connection.to_node, new_b);
        assert_eq!(connection.output_pin.0, mapping.get(out.0).unwrap());
        assert_eq!(connection.input_pin.0, mapping.get(input.0).unwrap());

        let new_sm_graph = doc.node(NodeId(mapping.get(machine.0).unwrap())).unwrap().child_graph().unwrap();
        assert_eq!(new_sm_graph.0, mapping.get(sm_graph.0).unwrap());
        let new_conduit = doc.node(NodeId(mapping.get(conduit.0).unwrap())).unwrap();
        let c = new_conduit.as_conduit().unwrap();
        assert_eq!(c.start_state.0, mapping.get(s1.0).unwrap());
        assert_eq!(c.end_state.0, mapping.get(s2.0).unwrap());
        assert_eq!(doc.graph(new_sm_graph).unwrap().default_state().map(|n| n.0), mapping.get(s1.0));
        assert_eq!(doc.root(), root);
    }
}
