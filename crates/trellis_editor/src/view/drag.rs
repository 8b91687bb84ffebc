// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drag operations: start, per-frame update and commit for each drag mode.

use super::GraphView;
use crate::gesture::{DragCandidate, DragMode, DragReady};
use crate::surface::{FrameInput, MouseButton};
use crate::user_context::UserContext;
use egui::{Pos2, Rect, Vec2};
use trellis_graph::geometry::rect;
use trellis_graph::{GraphDocument, NodeClass, NodeId, PinDirection, PinId, ResizeHandle};

/// One end of a connection or transition being drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LinkEnd {
    /// A flow node pin
    Pin { node: NodeId, pin: PinId },
    /// A state node
    State(NodeId),
}

/// Active drag operation
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) enum DragState {
    #[default]
    None,
    View {
        button: MouseButton,
        /// Screen position of the press
        origin: Pos2,
        start_offset: Vec2,
    },
    Selection {
        button: MouseButton,
        /// Canvas position of the press
        start: Pos2,
    },
    Node {
        button: MouseButton,
        nodes: Vec<NodeId>,
        last: Pos2,
    },
    Connection {
        button: MouseButton,
        origin: LinkEnd,
        target: Option<LinkEnd>,
        valid: bool,
    },
    ResizeComment {
        button: MouseButton,
        node: NodeId,
        handle: ResizeHandle,
        /// Canvas offset from the pointer to the grabbed edges
        grab: Vec2,
    },
}

impl DragState {
    pub(super) fn mode(&self) -> DragMode {
        match self {
            Self::None => DragMode::None,
            Self::View { .. } => DragMode::View,
            Self::Selection { .. } => DragMode::Selection,
            Self::Node { .. } => DragMode::Node,
            Self::Connection { .. } => DragMode::Connection,
            Self::ResizeComment { .. } => DragMode::ResizeComment,
        }
    }

    fn button(&self) -> Option<MouseButton> {
        match *self {
            Self::None => None,
            Self::View { button, .. }
            | Self::Selection { button, .. }
            | Self::Node { button, .. }
            | Self::Connection { button, .. }
            | Self::ResizeComment { button, .. } => Some(button),
        }
    }
}

impl GraphView {
    pub(super) fn start_drag(
        &mut self,
        doc: &mut GraphDocument,
        mode: DragMode,
        ready: DragReady,
        ctx: &mut dyn UserContext,
    ) {
        let dc = self.drawing_context(doc, self.window);
        let button = ready.button;
        let press = dc.screen_to_canvas(ready.origin);

        self.drag = match (mode, ready.candidate) {
            (DragMode::View, _) => DragState::View {
                button,
                origin: ready.origin,
                start_offset: dc.offset,
            },
            (DragMode::Selection, _) => DragState::Selection { button, start: press },
            (DragMode::Node, DragCandidate::Node(node)) => {
                if !self.is_selected(node) {
                    self.set_selection(vec![node], ctx);
                }
                let nodes = self.drag_closure(doc);
                doc.begin_modification();
                DragState::Node {
                    button,
                    nodes,
                    last: press,
                }
            }
            (DragMode::Connection, DragCandidate::Pin { node, pin }) => DragState::Connection {
                button,
                origin: LinkEnd::Pin { node, pin },
                target: None,
                valid: false,
            },
            (DragMode::Connection, DragCandidate::TransitionSource(node)) => DragState::Connection {
                button,
                origin: LinkEnd::State(node),
                target: None,
                valid: false,
            },
            (DragMode::ResizeComment, DragCandidate::CommentEdge { node, handle }) => {
                let grab = doc
                    .node(node)
                    .map_or(Vec2::ZERO, |n| handle.grab_offset(n.rect(), press));
                doc.begin_modification();
                DragState::ResizeComment {
                    button,
                    node,
                    handle,
                    grab,
                }
            }
            (mode, candidate) => {
                tracing::warn!("Cannot start {:?} drag on {:?}", mode, candidate);
                return;
            }
        };
        tracing::debug!("Started {:?} drag", mode);
    }

    /// Update the active drag, committing it once its button is released
    pub(super) fn handle_drag(&mut self, doc: &mut GraphDocument, input: &FrameInput, ctx: &mut dyn UserContext) {
        let Some(button) = self.drag.button() else {
            return;
        };
        self.on_drag(doc);
        if !input.is_down(button) {
            self.stop_dragging(doc, ctx);
        }
    }

    fn on_drag(&mut self, doc: &mut GraphDocument) {
        let dc = self.drawing_context(doc, self.window);
        let mouse = self.mouse_canvas;

        if let DragState::Connection { origin, .. } = self.drag {
            let (new_target, new_valid) = self.connection_target(doc, origin);
            if let DragState::Connection { target, valid, .. } = &mut self.drag {
                *target = new_target;
                *valid = new_valid;
            }
            return;
        }

        match &mut self.drag {
            DragState::None | DragState::Selection { .. } | DragState::Connection { .. } => {}
            DragState::View {
                origin, start_offset, ..
            } => {
                let offset = *start_offset - dc.canvas_delta(self.mouse_screen - *origin);
                if let Some(graph) = doc.graph_mut(self.graph) {
                    graph.view.offset = offset;
                }
            }
            DragState::Node { nodes, last, .. } => {
                let delta = mouse - *last;
                *last = mouse;
                if let Some(graph) = doc.graph_mut(self.graph) {
                    for id in nodes.iter() {
                        if let Some(node) = graph.node_mut(*id) {
                            node.position += delta;
                        }
                    }
                }
            }
            DragState::ResizeComment { node, handle, grab, .. } => {
                if let Some(comment) = doc
                    .graph_mut(self.graph)
                    .and_then(|g| g.node_mut(*node))
                    .filter(|n| n.class() == NodeClass::Comment)
                {
                    comment.resize_comment(*handle, mouse + *grab);
                }
            }
        }
    }

    /// Commit the active drag
    pub(super) fn stop_dragging(&mut self, doc: &mut GraphDocument, ctx: &mut dyn UserContext) {
        let mode = self.drag.mode();
        match mode {
            DragMode::None => {}
            DragMode::View => self.stop_dragging_view(),
            DragMode::Selection => self.stop_dragging_selection(doc, ctx),
            DragMode::Node => self.stop_dragging_node(doc),
            DragMode::Connection => self.stop_dragging_connection(doc),
            DragMode::ResizeComment => self.stop_dragging_comment(doc),
        }
        tracing::debug!("Stopped {:?} drag", mode);
    }

    /// Abandon the active drag without committing it
    pub(super) fn cancel_drag(&mut self, doc: &mut GraphDocument) {
        let mode = self.drag.mode();
        self.drag = DragState::None;
        if matches!(mode, DragMode::Node | DragMode::ResizeComment) {
            doc.end_modification();
        }
    }

    fn take_drag(&mut self, expected: DragMode) -> DragState {
        let mode = self.drag.mode();
        assert_eq!(mode, expected, "cannot stop a {expected:?} drag while in {mode:?} mode");
        std::mem::take(&mut self.drag)
    }

    pub(super) fn stop_dragging_view(&mut self) {
        self.take_drag(DragMode::View);
    }

    /// Select nodes whose window rect overlaps the band, skipping nodes that
    /// wholly contain it. Shift extends the current selection.
    pub(super) fn stop_dragging_selection(&mut self, doc: &GraphDocument, ctx: &mut dyn UserContext) {
        let DragState::Selection { start, .. } = self.take_drag(DragMode::Selection) else {
            return;
        };
        let dc = self.drawing_context(doc, self.window);
        let band = dc.canvas_rect_to_window(Rect::from_two_pos(start, self.mouse_canvas));

        let mut selected = if self.modifiers.shift {
            self.selection.clone()
        } else {
            Vec::new()
        };
        if let Some(graph) = doc.graph(self.graph) {
            for node in graph.nodes().filter(|n| n.class() != NodeClass::Conduit) {
                let r = dc.canvas_rect_to_window(node.rect());
                if rect::overlaps(r, band) && !rect::contains_rect(r, band) && !selected.contains(&node.id()) {
                    selected.push(node.id());
                }
            }
        }
        self.set_selection(selected, ctx);
    }

    pub(super) fn stop_dragging_node(&mut self, doc: &mut GraphDocument) {
        if let DragState::Node { nodes, .. } = self.take_drag(DragMode::Node) {
            tracing::debug!("Moved {} node(s)", nodes.len());
            doc.end_modification();
        }
    }

    pub(super) fn stop_dragging_connection(&mut self, doc: &mut GraphDocument) {
        let DragState::Connection {
            origin,
            target: Some(target),
            valid: true,
            ..
        } = self.take_drag(DragMode::Connection)
        else {
            return;
        };

        match (origin, target) {
            (LinkEnd::Pin { node: a, pin: pa }, LinkEnd::Pin { node: b, pin: pb }) => {
                let connected = match doc.pin_direction(self.graph, a, pa) {
                    Some(PinDirection::Output) => doc.try_make_connection(self.graph, a, pa, b, pb),
                    Some(PinDirection::Input) => doc.try_make_connection(self.graph, b, pb, a, pa),
                    None => false,
                };
                if !connected {
                    tracing::debug!("Connection from {} rejected", pa);
                }
            }
            (LinkEnd::State(start), LinkEnd::State(end)) => {
                if let Err(err) = doc.create_transition_conduit(self.graph, start, end) {
                    tracing::warn!("Failed to create transition: {}", err);
                }
            }
            _ => {}
        }
    }

    pub(super) fn stop_dragging_comment(&mut self, doc: &mut GraphDocument) {
        self.take_drag(DragMode::ResizeComment);
        doc.end_modification();
    }

    /// Selected nodes plus everything inside selected comments, recursively.
    /// Transitions follow their states and are never moved directly.
    fn drag_closure(&self, doc: &GraphDocument) -> Vec<NodeId> {
        let Some(graph) = doc.graph(self.graph) else {
            return Vec::new();
        };
        let mut nodes: Vec<NodeId> = self
            .selection
            .iter()
            .copied()
            .filter(|id| graph.node(*id).is_some_and(|n| n.class() != NodeClass::Conduit))
            .collect();

        let mut i = 0;
        while i < nodes.len() {
            if let Some(comment) = graph.node(nodes[i]).filter(|n| n.class() == NodeClass::Comment) {
                let bounds = comment.rect();
                for node in graph.nodes() {
                    if node.class() != NodeClass::Conduit
                        && !nodes.contains(&node.id())
                        && rect::contains_rect(bounds, node.rect())
                    {
                        nodes.push(node.id());
                    }
                }
            }
            i += 1;
        }
        nodes
    }

    /// Where a connection drag would land, and whether it may
    fn connection_target(&self, doc: &GraphDocument, origin: LinkEnd) -> (Option<LinkEnd>, bool) {
        match origin {
            LinkEnd::Pin { node, pin } => {
                if let Some((other, other_pin)) = self.hover.pin.filter(|(n, _)| *n != node) {
                    let valid = doc.is_valid_pin_pairing(self.graph, node, pin, other, other_pin);
                    return (Some(LinkEnd::Pin { node: other, pin: other_pin }), valid);
                }
                if self.modifiers.ctrl {
                    if let Some(target) = self.auto_connect_target(doc, node, pin) {
                        return (Some(target), true);
                    }
                }
                (None, false)
            }
            LinkEnd::State(start) => {
                let end = self
                    .hover
                    .node
                    .filter(|n| *n != start)
                    .filter(|n| doc.node(*n).is_some_and(|n| n.class() == NodeClass::State));
                match end {
                    Some(end) => (
                        Some(LinkEnd::State(end)),
                        doc.can_create_transition_conduit(self.graph, start, end),
                    ),
                    None => (None, false),
                }
            }
        }
    }

    /// Nearest pin that `node.pin` could be wired to, on nodes within
    /// auto-connect reach of the pointer
    fn auto_connect_target(&self, doc: &GraphDocument, node: NodeId, pin: PinId) -> Option<LinkEnd> {
        let graph = doc.graph(self.graph)?;
        let direction = graph.node(node)?.as_flow()?.pin_direction(pin)?;
        let reach = self.settings.auto_connect_distance;
        let mouse = self.mouse_canvas;

        graph
            .nodes()
            .filter(|n| n.id() != node && rect::distance_to_point(n.rect(), mouse) <= reach)
            .filter_map(|n| n.as_flow().map(|flow| (n.id(), flow)))
            .flat_map(|(id, flow)| {
                let pins = match direction.opposite() {
                    PinDirection::Input => &flow.inputs,
                    PinDirection::Output => &flow.outputs,
                };
                pins.iter().map(move |p| (id, p))
            })
            .filter(|(id, p)| doc.is_valid_pin_pairing(self.graph, node, pin, *id, p.id))
            .map(|(id, p)| (id, p.id, p.layout.position.distance(mouse)))
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(node, pin, _)| LinkEnd::Pin { node, pin })
    }
}
