// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dataflow specialization: connection validation and pin bookkeeping.
//!
//! Invariants kept by every operation here:
//! - an input pin has at most one connection
//! - an output pin has at most one connection unless it allows fan-out
//! - the node-level dependency graph stays acyclic

use crate::connection::Connection;
use crate::document::GraphDocument;
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::id::{ConnectionId, GraphId, NodeId, PinId};
use crate::pin::{value_types_compatible, Pin, PinDirection};
use crate::registry::{ConnectionRule, GraphKind};
use std::collections::HashSet;

impl GraphDocument {
    /// Whether `from_node.output_pin -> to_node.input_pin` may be connected
    pub fn is_valid_connection(
        &self,
        graph_id: GraphId,
        from_node: NodeId,
        output_pin: PinId,
        to_node: NodeId,
        input_pin: PinId,
    ) -> bool {
        let Some(graph) = self.graph(graph_id) else {
            return false;
        };
        if graph.kind() != GraphKind::Flow || from_node == to_node {
            return false;
        }

        let (Some(from), Some(to)) = (
            graph.node(from_node).and_then(|n| n.as_flow()),
            graph.node(to_node).and_then(|n| n.as_flow()),
        ) else {
            return false;
        };
        let (Some(output), Some(input)) = (from.output(output_pin), to.input(input_pin)) else {
            return false;
        };

        let rule: ConnectionRule = self
            .registry()
            .get(&to.type_id)
            .map_or(value_types_compatible, |t| t.connection_rule);
        if !rule(output, input) {
            return false;
        }

        !creates_cycle(graph, from_node, to_node)
    }

    /// Whether the pins can be joined, given them in either drag order
    pub fn is_valid_pin_pairing(
        &self,
        graph_id: GraphId,
        node_a: NodeId,
        pin_a: PinId,
        node_b: NodeId,
        pin_b: PinId,
    ) -> bool {
        match self.pin_direction(graph_id, node_a, pin_a) {
            Some(PinDirection::Output) => self.is_valid_connection(graph_id, node_a, pin_a, node_b, pin_b),
            Some(PinDirection::Input) => self.is_valid_connection(graph_id, node_b, pin_b, node_a, pin_a),
            None => false,
        }
    }

    /// Connect an output to an input, replacing what the pins were wired to.
    ///
    /// The input pin's existing connection is always broken first. The
    /// output pin's existing connection is broken unless it allows fan-out.
    /// Returns `false` and changes nothing if the connection is invalid.
    pub fn try_make_connection(
        &mut self,
        graph_id: GraphId,
        from_node: NodeId,
        output_pin: PinId,
        to_node: NodeId,
        input_pin: PinId,
    ) -> bool {
        if !self.is_valid_connection(graph_id, from_node, output_pin, to_node, input_pin) {
            return false;
        }
        let allow_fan_out = self
            .pin(graph_id, from_node, output_pin)
            .is_some_and(|p| p.allow_multiple_out_connections);

        self.begin_modification();
        if let Some(graph) = self.graph_mut(graph_id) {
            graph
                .connections
                .retain(|_, c| c.input_pin != input_pin && (allow_fan_out || c.output_pin != output_pin));
            let connection = Connection::new(from_node, output_pin, to_node, input_pin);
            tracing::debug!("Connected {}:{} -> {}:{}", from_node, output_pin, to_node, input_pin);
            graph.connections.insert(connection.id, connection);
        }
        self.end_modification();
        true
    }

    /// Remove one connection
    pub fn break_connection(&mut self, graph_id: GraphId, connection_id: ConnectionId) -> bool {
        self.remove_connections(graph_id, |c| c.id == connection_id) > 0
    }

    /// Remove every connection touching a pin; returns how many were removed
    pub fn break_any_connections_for_pin(&mut self, graph_id: GraphId, pin_id: PinId) -> usize {
        self.remove_connections(graph_id, |c| c.involves_pin(pin_id))
    }

    /// Remove every connection touching a node; returns how many were removed
    pub fn break_all_connections_for_node(&mut self, graph_id: GraphId, node_id: NodeId) -> usize {
        self.remove_connections(graph_id, |c| c.involves_node(node_id))
    }

    fn remove_connections(&mut self, graph_id: GraphId, doomed: impl Fn(&Connection) -> bool) -> usize {
        let Some(graph) = self.graph(graph_id) else {
            return 0;
        };
        if !graph.connections().any(&doomed) {
            return 0;
        }

        self.begin_modification();
        let mut removed = 0;
        if let Some(graph) = self.graph_mut(graph_id) {
            let before = graph.connections.len();
            graph.connections.retain(|_, c| !doomed(c));
            removed = before - graph.connections.len();
        }
        self.end_modification();
        tracing::debug!("Broke {} connection(s) in graph {}", removed, graph_id);
        removed
    }

    /// Look up a pin on a flow node
    pub fn pin(&self, graph_id: GraphId, node_id: NodeId, pin_id: PinId) -> Option<&Pin> {
        self.graph(graph_id)?.node(node_id)?.as_flow()?.pin(pin_id)
    }

    /// Direction of a pin on a flow node
    pub fn pin_direction(&self, graph_id: GraphId, node_id: NodeId, pin_id: PinId) -> Option<PinDirection> {
        self.graph(graph_id)?
            .node(node_id)?
            .as_flow()?
            .pin_direction(pin_id)
    }

    /// Append a user-added input pin stamped from the node type's template
    pub fn create_dynamic_input_pin(&mut self, graph_id: GraphId, node_id: NodeId) -> Result<PinId> {
        let node = self
            .graph(graph_id)
            .ok_or(GraphError::GraphNotFound(graph_id))?
            .node(node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        let flow = node.as_flow().ok_or(GraphError::NoDynamicInputs(node_id))?;
        let template = self
            .registry()
            .get(&flow.type_id)
            .and_then(|t| t.dynamic_input.clone())
            .ok_or(GraphError::NoDynamicInputs(node_id))?;
        let name = (1..)
            .map(|ordinal| format!("{} {}", template.name, ordinal))
            .find(|name| flow.inputs.iter().all(|p| p.name != *name))
            .unwrap_or_else(|| template.name.clone());

        let mut pin = Pin::from_template(&template).dynamic();
        pin.name = name;
        let pin_id = pin.id;

        self.begin_modification();
        if let Some(node) = self.graph_mut(graph_id).and_then(|g| g.node_mut(node_id)) {
            if let Some(flow) = node.as_flow_mut() {
                flow.inputs.push(pin);
            }
            node.invalidate_layout();
        }
        self.end_modification();
        Ok(pin_id)
    }

    /// Remove a user-added input pin, breaking its connection first
    pub fn destroy_dynamic_input_pin(&mut self, graph_id: GraphId, node_id: NodeId, pin_id: PinId) -> Result<()> {
        let node = self
            .graph(graph_id)
            .ok_or(GraphError::GraphNotFound(graph_id))?
            .node(node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        let pin = node
            .as_flow()
            .and_then(|f| f.input(pin_id))
            .ok_or(GraphError::PinNotFound(pin_id))?;
        if !pin.dynamic {
            return Err(GraphError::PinNotDynamic(pin_id));
        }

        self.begin_modification();
        self.break_any_connections_for_pin(graph_id, pin_id);
        if let Some(node) = self.graph_mut(graph_id).and_then(|g| g.node_mut(node_id)) {
            if let Some(flow) = node.as_flow_mut() {
                flow.inputs.retain(|p| p.id != pin_id);
            }
            node.invalidate_layout();
        }
        self.end_modification();
        Ok(())
    }
}

/// Whether adding `from -> to` would close a loop.
///
/// Walks upstream from `from` along input connections. Reaching `to` means
/// `to` already feeds `from`. Re-entering a node on the current walk means
/// the graph already holds a cycle, which is rejected as well.
fn creates_cycle(graph: &Graph, from: NodeId, to: NodeId) -> bool {
    struct Walk<'a> {
        graph: &'a Graph,
        target: NodeId,
        on_path: HashSet<NodeId>,
        finished: HashSet<NodeId>,
    }

    impl Walk<'_> {
        fn reaches_target(&mut self, node: NodeId) -> bool {
            if node == self.target {
                return true;
            }
            if self.finished.contains(&node) {
                return false;
            }
            if !self.on_path.insert(node) {
                return true;
            }
            let feeders: Vec<_> = self
                .graph
                .connections()
                .filter(|c| c.to_node == node)
                .map(|c| c.from_node)
                .collect();
            for feeder in feeders {
                if self.reaches_target(feeder) {
                    return true;
                }
            }
            self.on_path.remove(&node);
            self.finished.insert(node);
            false
        }
    }

    Walk {
        graph,
        target: to,
        on_path: HashSet::new(),
        finished: HashSet::new(),
    }
    .reaches_target(from)
}

#[cfg(test)]
mod tests {
    use crate::document::tests::flow_document;
    use crate::document::{GraphDocument, NewNode};
    use crate::error::GraphError;
    use crate::id::{GraphId, NodeId, PinId};
    use egui::Pos2;

    fn add(doc: &mut GraphDocument, type_id: &str) -> NodeId {
        let root = doc.root();
        doc.create_node(root, NewNode::Typed(type_id), Pos2::ZERO).unwrap()
    }

    fn output(doc: &GraphDocument, node: NodeId) -> PinId {
        doc.node(node).unwrap().as_flow().unwrap().outputs[0].id
    }

    fn input(doc: &GraphDocument, node: NodeId) -> PinId {
        doc.node(node).unwrap().as_flow().unwrap().inputs[0].id
    }

    fn connect(doc: &mut GraphDocument, from: NodeId, to: NodeId) -> bool {
        let root = doc.root();
        let (out, inp) = (output(doc, from), input(doc, to));
        doc.try_make_connection(root, from, out, to, inp)
    }

    fn input_connection_counts(doc: &GraphDocument, graph: GraphId) -> bool {
        let graph = doc.graph(graph).unwrap();
        graph
            .connections()
            .all(|c| graph.connections().filter(|o| o.input_pin == c.input_pin).count() == 1)
    }

    #[test]
    fn test_connect_and_replace_input() {
        let mut doc = flow_document();
        let root = doc.root();
        let a = add(&mut doc, "pass");
        let b = add(&mut doc, "pass");
        let c = add(&mut doc, "pass");

        assert!(connect(&mut doc, a, b));
        let connections: Vec<_> = doc.root_graph().connections().cloned().collect();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].from_node, a);
        assert_eq!(connections[0].output_pin, output(&doc, a));
        assert_eq!(connections[0].to_node, b);
        assert_eq!(connections[0].input_pin, input(&doc, b));

        assert!(connect(&mut doc, c, b));
        let connections: Vec<_> = doc.root_graph().connections().cloned().collect();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].from_node, c);
        assert!(input_connection_counts(&doc, root));
    }

    #[test]
    fn test_single_output_is_replaced_unless_fan_out() {
        let mut doc = flow_document();
        let a = add(&mut doc, "pass");
        let b = add(&mut doc, "pass");
        let c = add(&mut doc, "pass");
        assert!(connect(&mut doc, a, b));
        assert!(connect(&mut doc, a, c));
        assert_eq!(doc.root_graph().connection_count(), 1);

        let f = add(&mut doc, "float");
        assert!(connect(&mut doc, f, b));
        assert!(connect(&mut doc, f, c));
        let out = output(&doc, f);
        assert_eq!(doc.root_graph().connections().filter(|c| c.output_pin == out).count(), 2);
    }

    #[test]
    fn test_rejects_cycles_and_self_loops() {
        let mut doc = flow_document();
        let a = add(&mut doc, "pass");
        let b = add(&mut doc, "pass");
        let c = add(&mut doc, "pass");
        assert!(connect(&mut doc, a, b));
        assert!(connect(&mut doc, b, c));
        assert!(!connect(&mut doc, c, a));
        assert!(!connect(&mut doc, a, a));
        assert_eq!(doc.root_graph().connection_count(), 2);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut doc = flow_document();
        let root = doc.root();
        let source = add(&mut doc, "float");
        let left = add(&mut doc, "pass");
        let right = add(&mut doc, "pass");
        let join = add(&mut doc, "blend");
        let extra = doc.create_dynamic_input_pin(root, join).unwrap();

        assert!(connect(&mut doc, source, left));
        assert!(connect(&mut doc, source, right));
        assert!(connect(&mut doc, left, join));
        let right_out = output(&doc, right);
        assert!(doc.try_make_connection(root, right, right_out, join, extra));
        assert_eq!(doc.root_graph().connection_count(), 4);
    }

    #[test]
    fn test_rejects_type_mismatch_and_wrong_direction() {
        let mut doc = flow_document();
        let root = doc.root();
        let a = add(&mut doc, "pass");
        let pose = add(&mut doc, "pose");
        assert!(!connect(&mut doc, a, pose));

        let b = add(&mut doc, "pass");
        let (a_in, b_out) = (input(&doc, a), output(&doc, b));
        assert!(!doc.is_valid_connection(root, a, a_in, b, b_out));
        assert!(doc.is_valid_pin_pairing(root, a, a_in, b, b_out));
    }

    #[test]
    fn test_destroy_node_breaks_connections() {
        let mut doc = flow_document();
        let a = add(&mut doc, "pass");
        let b = add(&mut doc, "pass");
        assert!(connect(&mut doc, a, b));
        doc.destroy_node(a);
        assert_eq!(doc.root_graph().connection_count(), 0);
    }

    #[test]
    fn test_break_connections() {
        let mut doc = flow_document();
        let root = doc.root();
        let f = add(&mut doc, "float");
        let a = add(&mut doc, "pass");
        let b = add(&mut doc, "pass");
        assert!(connect(&mut doc, f, a));
        assert!(connect(&mut doc, f, b));

        let out = output(&doc, f);
        assert_eq!(doc.break_any_connections_for_pin(root, out), 2);
        assert_eq!(doc.break_any_connections_for_pin(root, out), 0);
        assert_eq!(doc.root_graph().connection_count(), 0);

        assert!(connect(&mut doc, f, a));
        let id = doc.root_graph().connections().next().unwrap().id;
        assert!(doc.break_connection(root, id));
        assert!(!doc.break_connection(root, id));
    }

    #[test]
    fn test_dynamic_pins() {
        let mut doc = flow_document();
        let root = doc.root();
        let f = add(&mut doc, "float");
        let blend = add(&mut doc, "blend");
        let pin = doc.create_dynamic_input_pin(root, blend).unwrap();
        assert_eq!(doc.pin(root, blend, pin).unwrap().name, "Input 1");

        let out = output(&doc, f);
        assert!(doc.try_make_connection(root, f, out, blend, pin));
        doc.destroy_dynamic_input_pin(root, blend, pin).unwrap();
        assert_eq!(doc.root_graph().connection_count(), 0);
        assert!(doc.pin(root, blend, pin).is_none());

        let fixed = input(&doc, blend);
        assert!(matches!(
            doc.destroy_dynamic_input_pin(root, blend, fixed),
            Err(GraphError::PinNotDynamic(_))
        ));
        let pass = add(&mut doc, "pass");
        assert!(matches!(
            doc.create_dynamic_input_pin(root, pass),
            Err(GraphError::NoDynamicInputs(_))
        ));
    }

    #[test]
    fn test_dynamic_pin_names_stay_unique() {
        let mut doc = flow_document();
        let root = doc.root();
        let blend = add(&mut doc, "blend");
        let first = doc.create_dynamic_input_pin(root, blend).unwrap();
        doc.create_dynamic_input_pin(root, blend).unwrap();
        doc.destroy_dynamic_input_pin(root, blend, first).unwrap();
        doc.create_dynamic_input_pin(root, blend).unwrap();
        doc.create_dynamic_input_pin(root, blend).unwrap();

        let names: Vec<_> = doc
            .node(blend)
            .unwrap()
            .as_flow()
            .unwrap()
            .inputs
            .iter()
            .filter(|p| p.dynamic)
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names, ["Input 2", "Input 1", "Input 3"]);
    }
}
