// SPDX-License-Identifier: MIT OR Apache-2.0
//! RON snapshots of a whole document.
//!
//! Loading runs a repair pass so a hand-edited or partially written file
//! still yields a document that satisfies the graph invariants.

use crate::document::GraphDocument;
use crate::error::SnapshotError;
use crate::graph::Graph;
use crate::id::{GraphId, NodeId};
use crate::registry::{NodeClass, NodeRegistry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    root: GraphId,
    graphs: Vec<&'a Graph>,
}

#[derive(Deserialize)]
struct DocumentSnapshot {
    root: GraphId,
    graphs: Vec<Graph>,
}

impl GraphDocument {
    /// Serialize every graph in the document to RON
    pub fn to_ron(&self) -> Result<String, SnapshotError> {
        let snapshot = SnapshotRef {
            root: self.root(),
            graphs: self.graphs().collect(),
        };
        Ok(ron::ser::to_string_pretty(&snapshot, ron::ser::PrettyConfig::default())?)
    }

    /// Load a document saved with [`GraphDocument::to_ron`], repairing
    /// dangling references
    pub fn from_ron(s: &str, registry: Arc<NodeRegistry>) -> Result<Self, SnapshotError> {
        let snapshot: DocumentSnapshot = ron::from_str(s)?;
        let mut graphs: IndexMap<GraphId, Graph> = snapshot.graphs.into_iter().map(|g| (g.id, g)).collect();
        if !graphs.contains_key(&snapshot.root) {
            return Err(SnapshotError::MissingRoot(snapshot.root));
        }

        repair(&mut graphs, snapshot.root);
        Ok(Self::from_parts(registry, snapshot.root, graphs))
    }
}

fn repair(graphs: &mut IndexMap<GraphId, Graph>, root: GraphId) {
    let graph_ids: HashSet<GraphId> = graphs.keys().copied().collect();

    for graph in graphs.values_mut() {
        let graph_id = graph.id;
        if graph_id == root {
            graph.parent_node = None;
        }

        for node in graph.nodes.values_mut() {
            node.graph = Some(graph_id);
            for (slot, label) in [(&mut node.child_graph, "child"), (&mut node.secondary_graph, "secondary")] {
                if slot.is_some_and(|g| !graph_ids.contains(&g)) {
                    tracing::warn!("Dropping missing {} graph reference on node {}", label, node.id);
                    *slot = None;
                }
            }
        }

        let states: HashSet<NodeId> = graph
            .nodes_of_class(NodeClass::State)
            .map(|n| n.id)
            .collect();
        graph.nodes.retain(|id, node| match node.as_conduit() {
            Some(c) if !states.contains(&c.start_state) || !states.contains(&c.end_state) => {
                tracing::warn!("Dropping transition {} with a missing state", id);
                false
            }
            _ => true,
        });

        let nodes = &graph.nodes;
        let mut fed_inputs = HashSet::new();
        graph.connections.retain(|id, c| {
            let output_ok = nodes
                .get(&c.from_node)
                .and_then(|n| n.as_flow())
                .is_some_and(|f| f.output(c.output_pin).is_some());
            let input_ok = nodes
                .get(&c.to_node)
                .and_then(|n| n.as_flow())
                .is_some_and(|f| f.input(c.input_pin).is_some());
            if !output_ok || !input_ok {
                tracing::warn!("Dropping dangling connection {}", id);
                return false;
            }
            if !fed_inputs.insert(c.input_pin) {
                tracing::warn!("Dropping connection {} to an already connected input", id);
                return false;
            }
            true
        });

        if graph.default_state.is_some_and(|s| !states.contains(&s)) {
            graph.default_state = None;
        }
        if graph.default_state.is_none() {
            let first = graph.nodes_of_class(NodeClass::State).map(|n| n.id).next();
            graph.default_state = first;
        }
    }

    // Graphs no longer reachable from the root through owning nodes.
    let mut reachable = vec![root];
    let mut i = 0;
    while i < reachable.len() {
        if let Some(graph) = graphs.get(&reachable[i]) {
            for node in graph.nodes() {
                for owned in [node.child_graph, node.secondary_graph].into_iter().flatten() {
                    if !reachable.contains(&owned) {
                        reachable.push(owned);
                    }
                }
            }
        }
        i += 1;
    }
    graphs.retain(|id, _| {
        let keep = reachable.contains(id);
        if !keep {
            tracing::warn!("Dropping orphaned graph {}", id);
        }
        keep
    });
}
