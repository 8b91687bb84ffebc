// SPDX-License-Identifier: MIT OR Apache-2.0
//! Callbacks from the view to the embedding tool.

use trellis_graph::{GraphId, NodeId};

/// Host side of a [`GraphView`](crate::GraphView).
///
/// Every method has an empty default so hosts only implement what they use.
/// Modifier keys reach the view through [`FrameInput`](crate::FrameInput),
/// which the host snapshots once per frame.
pub trait UserContext {
    /// The selection changed from `old` to `new`
    fn on_selection_changed(&mut self, old: &[NodeId], new: &[NodeId]) {
        let _ = (old, new);
    }

    /// A node was double-clicked
    fn on_double_click(&mut self, node: NodeId) {
        let _ = node;
    }

    /// The user asked to open `graph`, a child or the parent of the shown
    /// graph. The host switches with [`GraphView::show_graph`](crate::GraphView::show_graph).
    fn request_navigation(&mut self, graph: GraphId) {
        let _ = graph;
    }
}

/// Host that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullUserContext;

impl UserContext for NullUserContext {}
