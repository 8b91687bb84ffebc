// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rendering of the shown graph through a [`DrawSurface`].

use super::drag::{DragState, LinkEnd};
use super::layout::{
    conduit_segment, connection_curve, pin_position, title, COMMENT_TITLE_HEIGHT, NODE_HEADER_HEIGHT,
    NODE_ROUNDING, PIN_FONT_SIZE, PIN_PADDING, PIN_RADIUS, TITLE_FONT_SIZE,
};
use super::GraphView;
use crate::drawing_context::{DrawingContext, BACKGROUND_CHANNEL, CHANNEL_COUNT, FOREGROUND_CHANNEL};
use crate::surface::DrawSurface;
use egui::{Align2, Color32, Pos2, Rect, Stroke, Vec2};
use trellis_graph::{Graph, GraphDocument, Node, NodeClass, NodeKind, NodeRegistry, Pin};

const NODE_SHADOW_OFFSET: f32 = 3.0;
const CONNECTION_THICKNESS: f32 = 2.5;
const CONDUIT_THICKNESS: f32 = 2.0;
const ARROW_SIZE: f32 = 10.0;

const GRID_MINOR: Color32 = Color32::from_rgba_premultiplied(24, 24, 24, 100);
const GRID_MAJOR: Color32 = Color32::from_rgba_premultiplied(47, 47, 47, 150);
const GRID_AXIS: Color32 = Color32::from_rgba_premultiplied(70, 70, 106, 180);
const NODE_BODY: Color32 = Color32::from_rgb(45, 45, 48);
const NODE_BODY_SELECTED: Color32 = Color32::from_rgb(60, 70, 90);
const NODE_HEADER: Color32 = Color32::from_rgb(70, 100, 130);
const STATE_BODY: Color32 = Color32::from_rgb(55, 60, 70);
const SELECTION_COLOR: Color32 = Color32::from_rgb(100, 150, 255);
const HOVER_COLOR: Color32 = Color32::from_rgb(230, 230, 120);
pub(super) const VALID_COLOR: Color32 = Color32::from_rgb(90, 200, 110);
pub(super) const INVALID_COLOR: Color32 = Color32::from_rgb(220, 80, 70);
pub(super) const PENDING_COLOR: Color32 = Color32::from_gray(200);
const CONDUIT_COLOR: Color32 = Color32::from_gray(190);
const PROGRESS_COLOR: Color32 = Color32::from_rgb(250, 180, 60);
const DEFAULT_STATE_COLOR: Color32 = Color32::from_rgb(220, 140, 50);

fn rgb([r, g, b]: [u8; 3]) -> Color32 {
    Color32::from_rgb(r, g, b)
}

impl GraphView {
    pub(super) fn draw(&self, doc: &GraphDocument, surface: &mut dyn DrawSurface, dc: &DrawingContext) {
        let Some(graph) = doc.graph(self.graph) else {
            return;
        };
        let registry = doc.registry();

        if self.settings.show_grid {
            self.draw_grid(surface, dc);
        }
        for node in graph.nodes_of_class(NodeClass::Comment) {
            self.draw_comment(surface, dc, node);
        }
        self.draw_connections(surface, dc, graph, registry);
        for node in graph.nodes_of_class(NodeClass::Conduit) {
            self.draw_conduit(surface, dc, graph, node);
        }
        for node in graph
            .nodes()
            .filter(|n| matches!(n.class(), NodeClass::Flow | NodeClass::State))
        {
            if dc.is_visible(node.rect()) {
                self.draw_node(surface, dc, graph, registry, node);
            }
        }
        self.draw_drag_preview(surface, dc, graph);
    }

    fn draw_grid(&self, surface: &mut dyn DrawSurface, dc: &DrawingContext) {
        let spacing = self.settings.grid_spacing;
        if spacing <= 0.0 {
            return;
        }
        let visible = dc.visible_canvas_rect();
        let window = dc.window;
        // Skip minor lines once they would be denser than every 4 pixels
        let show_minor = dc.screen_length(spacing) >= 4.0;

        let first = (visible.min.x / spacing).floor() as i64;
        let last = (visible.max.x / spacing).ceil() as i64;
        for i in first..=last {
            let major = i % 5 == 0;
            if !major && !show_minor {
                continue;
            }
            let x = dc.canvas_to_screen(Pos2::new(i as f32 * spacing, 0.0)).x;
            let color = if major { GRID_MAJOR } else { GRID_MINOR };
            surface.line(Pos2::new(x, window.top()), Pos2::new(x, window.bottom()), Stroke::new(1.0, color));
        }

        let first = (visible.min.y / spacing).floor() as i64;
        let last = (visible.max.y / spacing).ceil() as i64;
        for i in first..=last {
            let major = i % 5 == 0;
            if !major && !show_minor {
                continue;
            }
            let y = dc.canvas_to_screen(Pos2::new(0.0, i as f32 * spacing)).y;
            let color = if major { GRID_MAJOR } else { GRID_MINOR };
            surface.line(Pos2::new(window.left(), y), Pos2::new(window.right(), y), Stroke::new(1.0, color));
        }

        let origin = dc.canvas_to_screen(Pos2::ZERO);
        if window.contains(origin) {
            let axis = Stroke::new(2.0, GRID_AXIS);
            surface.line(Pos2::new(origin.x, window.top()), Pos2::new(origin.x, window.bottom()), axis);
            surface.line(Pos2::new(window.left(), origin.y), Pos2::new(window.right(), origin.y), axis);
        }
    }

    fn draw_comment(&self, surface: &mut dyn DrawSurface, dc: &DrawingContext, node: &Node) {
        let Some(comment) = node.as_comment() else {
            return;
        };
        if !dc.is_visible(node.rect()) {
            return;
        }
        let screen = dc.canvas_rect_to_screen(node.rect());
        let [r, g, b] = comment.color;
        let rounding = NODE_ROUNDING * dc.zoom;

        surface.rect_filled(screen, rounding, Color32::from_rgba_unmultiplied(r, g, b, 60));
        let band = Rect::from_min_size(screen.min, Vec2::new(screen.width(), COMMENT_TITLE_HEIGHT * dc.zoom));
        surface.rect_filled(band, rounding, Color32::from_rgba_unmultiplied(r, g, b, 160));
        surface.text(
            band.left_center() + Vec2::new(PIN_PADDING * dc.zoom, 0.0),
            Align2::LEFT_CENTER,
            &comment.text,
            TITLE_FONT_SIZE * dc.zoom,
            Color32::WHITE,
        );

        let outline = match self.hover.resize {
            _ if self.is_selected(node.id()) => Stroke::new(2.0, SELECTION_COLOR),
            Some((id, _)) if id == node.id() => Stroke::new(2.0, HOVER_COLOR),
            _ => Stroke::new(1.0, rgb(comment.color)),
        };
        surface.rect_stroke(screen, rounding, outline);
    }

    fn draw_connections(
        &self,
        surface: &mut dyn DrawSurface,
        dc: &DrawingContext,
        graph: &Graph,
        registry: &NodeRegistry,
    ) {
        for connection in graph.connections() {
            let (Some(from), Some(to)) = (
                pin_position(graph, connection.from_node, connection.output_pin),
                pin_position(graph, connection.to_node, connection.input_pin),
            ) else {
                continue;
            };
            let color = graph
                .node(connection.from_node)
                .and_then(|n| n.as_flow())
                .and_then(|f| f.output(connection.output_pin))
                .map_or(PENDING_COLOR, |p| rgb(registry.pin_color(&p.value_type)));
            let stroke = if self.hover.connection == Some(connection.id) {
                Stroke::new(CONNECTION_THICKNESS * 1.6, HOVER_COLOR)
            } else {
                Stroke::new(CONNECTION_THICKNESS, color)
            };
            surface.cubic_bezier(connection_curve(from, to).map(|p| dc.canvas_to_screen(p)), stroke);
        }
    }

    fn draw_conduit(&self, surface: &mut dyn DrawSurface, dc: &DrawingContext, graph: &Graph, node: &Node) {
        let (Some(conduit), Some((from, to))) = (node.as_conduit(), conduit_segment(graph, node.id())) else {
            return;
        };
        let from = dc.canvas_to_screen(from);
        let to = dc.canvas_to_screen(to);

        let color = if self.is_selected(node.id()) {
            SELECTION_COLOR
        } else if self.hover.node == Some(node.id()) {
            HOVER_COLOR
        } else {
            CONDUIT_COLOR
        };
        surface.line(from, to, Stroke::new(CONDUIT_THICKNESS, color));
        if conduit.progress > 0.0 {
            let reached = from + (to - from) * conduit.progress;
            surface.line(from, reached, Stroke::new(CONDUIT_THICKNESS * 2.0, PROGRESS_COLOR));
        }
        draw_arrow_head(surface, from, to, ARROW_SIZE * dc.zoom, color);
    }

    fn draw_node(
        &self,
        surface: &mut dyn DrawSurface,
        dc: &DrawingContext,
        graph: &Graph,
        registry: &NodeRegistry,
        node: &Node,
    ) {
        let screen = dc.canvas_rect_to_screen(node.rect());
        let zoom = dc.zoom;
        let rounding = NODE_ROUNDING * zoom;
        let selected = self.is_selected(node.id());
        let header_color = node
            .type_id()
            .and_then(|id| registry.get(id))
            .and_then(|t| t.color)
            .map_or(NODE_HEADER, rgb);

        // Labels and pins go on top of fills issued afterwards.
        surface.split_channels(CHANNEL_COUNT);
        surface.set_channel(FOREGROUND_CHANNEL);

        match &node.kind {
            NodeKind::Flow(flow) => {
                let header = Rect::from_min_size(screen.min, Vec2::new(screen.width(), NODE_HEADER_HEIGHT * zoom));
                surface.text(
                    header.center(),
                    Align2::CENTER_CENTER,
                    &title(node, registry),
                    TITLE_FONT_SIZE * zoom,
                    Color32::WHITE,
                );
                for pin in &flow.inputs {
                    self.draw_pin(surface, dc, graph, registry, node, pin, Align2::LEFT_CENTER);
                }
                for pin in &flow.outputs {
                    self.draw_pin(surface, dc, graph, registry, node, pin, Align2::RIGHT_CENTER);
                }

                surface.set_channel(BACKGROUND_CHANNEL);
                surface.rect_filled(
                    screen.translate(Vec2::splat(NODE_SHADOW_OFFSET)),
                    rounding,
                    Color32::from_black_alpha(60),
                );
                surface.rect_filled(screen, rounding, if selected { NODE_BODY_SELECTED } else { NODE_BODY });
                surface.rect_filled(header, rounding, header_color);
            }
            NodeKind::State(_) => {
                surface.text(
                    screen.center(),
                    Align2::CENTER_CENTER,
                    &title(node, registry),
                    TITLE_FONT_SIZE * zoom,
                    Color32::WHITE,
                );

                surface.set_channel(BACKGROUND_CHANNEL);
                surface.rect_filled(
                    screen.translate(Vec2::splat(NODE_SHADOW_OFFSET)),
                    rounding,
                    Color32::from_black_alpha(60),
                );
                surface.rect_filled(screen, rounding, if selected { NODE_BODY_SELECTED } else { STATE_BODY });
                if graph.default_state() == Some(node.id()) {
                    surface.rect_stroke(screen, rounding, Stroke::new(2.0, DEFAULT_STATE_COLOR));
                } else {
                    surface.rect_stroke(screen, rounding, Stroke::new(1.0, header_color));
                }
            }
            NodeKind::Comment(_) | NodeKind::Conduit(_) => {}
        }

        surface.merge_channels();

        if selected {
            surface.rect_stroke(screen, rounding, Stroke::new(2.0, SELECTION_COLOR));
        } else if self.hover.node == Some(node.id()) && self.hover.pin.is_none() {
            surface.rect_stroke(screen, rounding, Stroke::new(1.0, HOVER_COLOR));
        }
    }

    fn draw_pin(
        &self,
        surface: &mut dyn DrawSurface,
        dc: &DrawingContext,
        graph: &Graph,
        registry: &NodeRegistry,
        node: &Node,
        pin: &Pin,
        label_anchor: Align2,
    ) {
        let pos = dc.canvas_to_screen(pin.layout.position);
        let radius = PIN_RADIUS * dc.zoom;
        let color = rgb(registry.pin_color(&pin.value_type));
        let hovered = self.hover.pin == Some((node.id(), pin.id));
        let connected = graph.connections().any(|c| c.involves_pin(pin.id));

        let radius = if hovered { radius * 1.3 } else { radius };
        if connected || hovered {
            surface.circle_filled(pos, radius, color);
        } else {
            surface.circle_filled(pos, radius, NODE_BODY);
            surface.circle_stroke(pos, radius, Stroke::new(1.5, color));
        }

        let inset = PIN_PADDING * dc.zoom;
        let label_pos = if label_anchor == Align2::LEFT_CENTER {
            pos + Vec2::new(inset, 0.0)
        } else {
            pos - Vec2::new(inset, 0.0)
        };
        surface.text(label_pos, label_anchor, &pin.name, PIN_FONT_SIZE * dc.zoom, Color32::from_gray(200));
    }

    fn draw_drag_preview(&self, surface: &mut dyn DrawSurface, dc: &DrawingContext, graph: &Graph) {
        let mouse = self.mouse_canvas;
        match &self.drag {
            DragState::Selection { start, .. } => {
                let band = dc.canvas_rect_to_screen(Rect::from_two_pos(*start, mouse));
                surface.rect_filled(band, 0.0, Color32::from_rgba_unmultiplied(100, 150, 255, 30));
                surface.rect_stroke(band, 0.0, Stroke::new(1.0, SELECTION_COLOR));
            }
            DragState::Connection {
                origin, target, valid, ..
            } => {
                let color = match (target, valid) {
                    (None, _) => PENDING_COLOR,
                    (Some(_), true) => VALID_COLOR,
                    (Some(_), false) => INVALID_COLOR,
                };
                match *origin {
                    LinkEnd::Pin { node, pin } => {
                        let Some(anchor) = pin_position(graph, node, pin) else {
                            return;
                        };
                        let end = match target {
                            Some(LinkEnd::Pin { node, pin }) => pin_position(graph, *node, *pin).unwrap_or(mouse),
                            _ => mouse,
                        };
                        let is_output = graph
                            .node(node)
                            .and_then(|n| n.as_flow())
                            .is_some_and(|f| f.output(pin).is_some());
                        let curve = if is_output {
                            connection_curve(anchor, end)
                        } else {
                            connection_curve(end, anchor)
                        };
                        surface.cubic_bezier(
                            curve.map(|p| dc.canvas_to_screen(p)),
                            Stroke::new(CONNECTION_THICKNESS, color),
                        );
                    }
                    LinkEnd::State(start) => {
                        let Some(start_rect) = graph.node(start).map(|n| n.rect()) else {
                            return;
                        };
                        let from = dc.canvas_to_screen(start_rect.center());
                        let to = match target {
                            Some(LinkEnd::State(end)) => graph
                                .node(*end)
                                .map_or(mouse, |n| n.rect().center()),
                            _ => mouse,
                        };
                        let to = dc.canvas_to_screen(to);
                        surface.line(from, to, Stroke::new(CONDUIT_THICKNESS, color));
                        draw_arrow_head(surface, from, to, ARROW_SIZE * dc.zoom, color);
                    }
                }
            }
            DragState::None | DragState::View { .. } | DragState::Node { .. } | DragState::ResizeComment { .. } => {}
        }
    }
}

/// Filled arrowhead with its tip at the midpoint of `from -> to`
fn draw_arrow_head(surface: &mut dyn DrawSurface, from: Pos2, to: Pos2, size: f32, color: Color32) {
    let direction = (to - from).normalized();
    if direction == Vec2::ZERO || !direction.is_finite() {
        return;
    }
    let tip = from + (to - from) * 0.5 + direction * size * 0.5;
    let back = tip - direction * size;
    let side = Vec2::new(-direction.y, direction.x) * size * 0.5;
    surface.triangle_filled([tip, back + side, back - side], color);
}
