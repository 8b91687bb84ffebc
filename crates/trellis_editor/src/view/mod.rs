// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interactive graph view.
//!
//! Features:
//! - Flow node, state node, comment and transition rendering
//! - Pan/zoom navigation with a per-graph remembered viewport
//! - Click, shift-click and rubber-band selection
//! - Node dragging, carrying the contents of dragged comments
//! - Connection and transition drag-to-create, with auto-connect
//! - Comment resizing
//! - Navigation into child graphs and back out
//!
//! Each frame runs layout, hover, input, drag and draw, in that order.

mod drag;
mod draw;
mod hover;
mod layout;

pub use hover::Hover;

use self::drag::DragState;
use crate::drawing_context::DrawingContext;
use crate::gesture::{DragCandidate, DragMode, DragReady, GestureEvent, GestureTracker};
use crate::settings::ViewSettings;
use crate::surface::{DrawSurface, FrameInput, MouseButton};
use crate::user_context::UserContext;
use egui::{Key, Modifiers, Pos2, Rect};
use trellis_graph::geometry::rect;
use trellis_graph::{GraphDocument, GraphId, NodeClass, NodeId, ViewState};

/// Editor view over one graph of a [`GraphDocument`]
#[derive(Debug)]
pub struct GraphView {
    graph: GraphId,
    settings: ViewSettings,
    selection: Vec<NodeId>,
    hover: Hover,
    gesture: GestureTracker,
    drag: DragState,
    window: Rect,
    mouse_screen: Pos2,
    mouse_canvas: Pos2,
    modifiers: Modifiers,
}

impl GraphView {
    /// Create a view showing `graph`
    pub fn new(graph: GraphId, settings: ViewSettings) -> Self {
        Self {
            graph,
            settings,
            selection: Vec::new(),
            hover: Hover::default(),
            gesture: GestureTracker::new(),
            drag: DragState::None,
            window: Rect::NOTHING,
            mouse_screen: Pos2::ZERO,
            mouse_canvas: Pos2::ZERO,
            modifiers: Modifiers::NONE,
        }
    }

    /// Graph being shown
    pub fn graph(&self) -> GraphId {
        self.graph
    }

    /// View settings
    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    /// Mutable view settings
    pub fn settings_mut(&mut self) -> &mut ViewSettings {
        &mut self.settings
    }

    /// Selected nodes, in selection order
    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    /// Whether a node is selected
    pub fn is_selected(&self, node: NodeId) -> bool {
        self.selection.contains(&node)
    }

    /// Hit-test result from the last frame
    pub fn hover(&self) -> &Hover {
        &self.hover
    }

    /// Current drag mode
    pub fn drag_mode(&self) -> DragMode {
        self.drag.mode()
    }

    /// Whether a drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.drag.mode() != DragMode::None
    }

    /// Pointer position in canvas space as of the last frame
    pub fn mouse_canvas_pos(&self) -> Pos2 {
        self.mouse_canvas
    }

    /// Coordinate converter for the shown graph in `window`
    pub fn drawing_context(&self, doc: &GraphDocument, window: Rect) -> DrawingContext {
        let view = doc.graph(self.graph).map(|g| g.view).unwrap_or_default();
        DrawingContext::new(window, view)
    }

    /// Switch to another graph, dropping the selection and any drag
    pub fn show_graph(&mut self, doc: &mut GraphDocument, graph: GraphId, ctx: &mut dyn UserContext) {
        if graph == self.graph {
            return;
        }
        self.cancel_drag(doc);
        self.gesture.cancel();
        self.set_selection(Vec::new(), ctx);
        self.hover = Hover::default();
        tracing::debug!("Showing graph {}", graph);
        self.graph = graph;
    }

    /// Replace the selection, notifying the host if it changed
    pub fn set_selection(&mut self, selection: Vec<NodeId>, ctx: &mut dyn UserContext) {
        if selection == self.selection {
            return;
        }
        let old = std::mem::replace(&mut self.selection, selection);
        ctx.on_selection_changed(&old, &self.selection);
    }

    /// Clear the selection
    pub fn clear_selection(&mut self, ctx: &mut dyn UserContext) {
        self.set_selection(Vec::new(), ctx);
    }

    /// Select every node in the shown graph
    pub fn select_all(&mut self, doc: &GraphDocument, ctx: &mut dyn UserContext) {
        let all = doc
            .graph(self.graph)
            .map(|g| g.node_ids().collect())
            .unwrap_or_default();
        self.set_selection(all, ctx);
    }

    /// Destroy selected nodes the user may delete; others stay selected
    pub fn delete_selection(&mut self, doc: &mut GraphDocument, ctx: &mut dyn UserContext) {
        let doomed: Vec<_> = self
            .selection
            .iter()
            .copied()
            .filter(|id| doc.node(*id).is_some_and(|n| n.is_user_deletable(doc.registry())))
            .collect();
        if doomed.is_empty() {
            return;
        }

        doc.modify(|doc| {
            for id in &doomed {
                doc.destroy_node(*id);
            }
        });
        let remaining = self
            .selection
            .iter()
            .copied()
            .filter(|id| doc.node(*id).is_some())
            .collect();
        self.set_selection(remaining, ctx);
    }

    /// Reset the shown graph's pan and zoom
    pub fn reset_view(&mut self, doc: &mut GraphDocument) {
        if let Some(graph) = doc.graph_mut(self.graph) {
            graph.view = ViewState::default();
        }
    }

    /// Run one frame: layout, hover, input, drag, then draw.
    ///
    /// `window` is the editor's area in screen space.
    pub fn update(
        &mut self,
        doc: &mut GraphDocument,
        surface: &mut dyn DrawSurface,
        input: &FrameInput,
        window: Rect,
        ctx: &mut dyn UserContext,
    ) {
        if doc.graph(self.graph).is_none() {
            tracing::warn!("Graph {} no longer exists, showing the root graph", self.graph);
            let root = doc.root();
            self.show_graph(doc, root, ctx);
        }
        self.window = window;
        if let Some(p) = input.mouse_pos {
            self.mouse_screen = p;
        }
        self.modifiers = input.modifiers;

        layout::layout_graph(doc, self.graph, &*surface);

        self.apply_zoom(doc, input);
        let dc = self.drawing_context(doc, window);
        self.mouse_canvas = dc.screen_to_canvas(self.mouse_screen);

        self.hover = match doc.graph(self.graph) {
            Some(graph) if rect::contains_point(window, self.mouse_screen) => {
                hover::hit_test(graph, &dc, &self.settings, self.mouse_canvas)
            }
            _ => Hover::default(),
        };

        self.handle_input(doc, input, ctx);
        self.handle_drag(doc, input, ctx);

        let dc = self.drawing_context(doc, window);
        self.draw(doc, surface, &dc);
    }

    fn apply_zoom(&mut self, doc: &mut GraphDocument, input: &FrameInput) {
        if input.wheel_delta == 0.0 || self.is_dragging() || !rect::contains_point(self.window, self.mouse_screen) {
            return;
        }
        let dc = self.drawing_context(doc, self.window);
        let new_zoom = self
            .settings
            .clamp_zoom(dc.zoom * (1.0 + self.settings.zoom_step).powf(input.wheel_delta));
        if new_zoom == dc.zoom {
            return;
        }
        let anchor = dc.screen_to_canvas(self.mouse_screen);
        if let Some(graph) = doc.graph_mut(self.graph) {
            graph.view.offset = dc.zoomed_offset(anchor, new_zoom);
            graph.view.zoom = new_zoom;
        }
    }

    fn handle_input(&mut self, doc: &mut GraphDocument, input: &FrameInput, ctx: &mut dyn UserContext) {
        if !self.is_dragging() {
            if input.key_pressed(Key::Delete) || input.key_pressed(Key::Backspace) {
                self.delete_selection(doc, ctx);
            }
            if input.key_pressed(Key::A) && input.modifiers.command {
                self.select_all(doc, ctx);
            }
            if input.key_pressed(Key::Home) {
                self.reset_view(doc);
            }
        }

        if input.is_double_clicked(MouseButton::Primary) && !self.is_dragging() {
            self.double_click(doc, ctx);
        }

        let inside = rect::contains_point(self.window, self.mouse_screen);
        for button in MouseButton::ALL {
            if !input.is_pressed(button) || !inside || self.is_dragging() {
                continue;
            }
            if let Some(candidate) = self.press_candidate(doc, button) {
                self.gesture.press(button, self.mouse_screen, candidate);
            }
        }

        let Some(ready) = self.gesture.ready().copied() else {
            return;
        };
        let held = input.is_down(ready.button);
        match self.gesture.step(self.mouse_screen, held, self.settings.drag_threshold) {
            GestureEvent::Idle => {}
            GestureEvent::Click(ready) => self.click(ready, ctx),
            GestureEvent::DragStarted { mode, ready } => self.start_drag(doc, mode, ready, ctx),
        }
    }

    /// Decide what a press grabs. Alt-presses on pins and wires break them
    /// on the spot and grab nothing.
    fn press_candidate(&mut self, doc: &mut GraphDocument, button: MouseButton) -> Option<DragCandidate> {
        let hover = self.hover;
        if button == MouseButton::Primary && self.modifiers.alt {
            if let Some((_, pin)) = hover.pin {
                doc.break_any_connections_for_pin(self.graph, pin);
                return None;
            }
            if let Some(connection) = hover.connection {
                doc.break_connection(self.graph, connection);
                return None;
            }
            if let Some(node) = hover.node.filter(|n| doc.node(*n).is_some_and(|n| n.class() == NodeClass::State)) {
                return Some(DragCandidate::TransitionSource(node));
            }
        }

        Some(match (hover.resize, hover.pin, hover.node) {
            (Some((node, handle)), _, _) => DragCandidate::CommentEdge { node, handle },
            (_, Some((node, pin)), _) => DragCandidate::Pin { node, pin },
            (_, _, Some(node)) => DragCandidate::Node(node),
            _ => DragCandidate::Canvas,
        })
    }

    fn click(&mut self, ready: DragReady, ctx: &mut dyn UserContext) {
        if ready.button != MouseButton::Primary {
            return;
        }
        let additive = self.modifiers.shift || self.modifiers.command;
        match ready.candidate.node() {
            Some(node) if additive => {
                let mut selection = self.selection.clone();
                if let Some(i) = selection.iter().position(|n| *n == node) {
                    selection.remove(i);
                } else {
                    selection.push(node);
                }
                self.set_selection(selection, ctx);
            }
            Some(node) => self.set_selection(vec![node], ctx),
            None if additive => {}
            None => self.clear_selection(ctx),
        }
    }

    fn double_click(&mut self, doc: &GraphDocument, ctx: &mut dyn UserContext) {
        match self.hover.node {
            Some(node_id) => {
                ctx.on_double_click(node_id);
                let target = doc
                    .node(node_id)
                    .and_then(|n| n.child_graph().or_else(|| n.secondary_graph()));
                if let Some(target) = target {
                    tracing::debug!("Requesting navigation into graph {}", target);
                    ctx.request_navigation(target);
                }
            }
            None => {
                if let Some(parent) = doc.parent_graph(self.graph) {
                    tracing::debug!("Requesting navigation out to graph {}", parent);
                    ctx.request_navigation(parent);
                }
            }
        }
    }
}
