// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node measurement and the canvas geometry of pins, wires and transitions.

use crate::surface::DrawSurface;
use egui::{Pos2, Rect, Vec2};
use trellis_graph::geometry::rectangle_closest_border_point;
use trellis_graph::{Graph, GraphDocument, GraphId, NodeId, NodeKind, PinId, PinLayout};

/// Node header height
pub(crate) const NODE_HEADER_HEIGHT: f32 = 24.0;
/// Height of one pin row
pub(crate) const PIN_ROW_HEIGHT: f32 = 22.0;
/// Pin circle radius
pub(crate) const PIN_RADIUS: f32 = 6.0;
/// Gap between a pin and its label
pub(crate) const PIN_PADDING: f32 = 12.0;
/// Narrowest node
pub(crate) const NODE_MIN_WIDTH: f32 = 120.0;
/// Space left below the last pin row
pub(crate) const NODE_BOTTOM_PADDING: f32 = 6.0;
/// State node height
pub(crate) const STATE_HEIGHT: f32 = 40.0;
/// Corner rounding
pub(crate) const NODE_ROUNDING: f32 = 6.0;
/// Title font size
pub(crate) const TITLE_FONT_SIZE: f32 = 12.0;
/// Pin label font size
pub(crate) const PIN_FONT_SIZE: f32 = 10.0;
/// Height of the draggable band at the top of a comment
pub(crate) const COMMENT_TITLE_HEIGHT: f32 = 24.0;
/// Minimum horizontal reach of wire control points
pub(crate) const BEZIER_CURVATURE: f32 = 50.0;
/// Sideways shift of a transition that has a reverse twin
pub(crate) const CONDUIT_OFFSET: f32 = 8.0;

/// Lay out every node of a graph: measure nodes whose size was invalidated
/// and place pin anchors.
pub(crate) fn layout_graph(doc: &mut GraphDocument, graph_id: GraphId, surface: &dyn DrawSurface) {
    let Some(graph) = doc.graph(graph_id) else {
        return;
    };
    let registry = doc.registry();

    let mut sizes = Vec::new();
    for node in graph.nodes() {
        if node.measured_size().is_some() {
            continue;
        }
        let title_width = surface.measure_text(&title(node, registry), TITLE_FONT_SIZE).x + 2.0 * PIN_PADDING;
        let size = match &node.kind {
            NodeKind::Flow(flow) => {
                let widest = |pins: &[trellis_graph::Pin]| {
                    pins.iter()
                        .map(|p| surface.measure_text(&p.name, PIN_FONT_SIZE).x)
                        .fold(0.0_f32, f32::max)
                };
                let labels = widest(flow.inputs.as_slice()) + widest(flow.outputs.as_slice()) + 4.0 * PIN_PADDING;
                let rows = flow.inputs.len().max(flow.outputs.len()) as f32;
                Vec2::new(
                    NODE_MIN_WIDTH.max(title_width).max(labels),
                    NODE_HEADER_HEIGHT + rows * PIN_ROW_HEIGHT + NODE_BOTTOM_PADDING,
                )
            }
            NodeKind::State(_) => Vec2::new(NODE_MIN_WIDTH.max(title_width), STATE_HEIGHT),
            NodeKind::Comment(_) | NodeKind::Conduit(_) => continue,
        };
        sizes.push((node.id(), size));
    }

    for (node_id, size) in sizes {
        if let Some(node) = doc.graph_mut(graph_id).and_then(|g| g.node_mut(node_id)) {
            node.set_measured_size(size);
        }
    }

    let Some(graph) = doc.graph_mut(graph_id) else {
        return;
    };
    for node in graph.nodes_mut() {
        let rect = node.rect();
        if let NodeKind::Flow(flow) = &mut node.kind {
            for (i, pin) in flow.inputs.iter_mut().enumerate() {
                pin.layout = pin_layout(rect, i, rect.left());
            }
            for (i, pin) in flow.outputs.iter_mut().enumerate() {
                pin.layout = pin_layout(rect, i, rect.right());
            }
        }
    }
}

fn pin_layout(node_rect: Rect, row: usize, x: f32) -> PinLayout {
    let y = node_rect.top() + NODE_HEADER_HEIGHT + (row as f32 + 0.5) * PIN_ROW_HEIGHT;
    PinLayout {
        position: Pos2::new(x, y),
        size: Vec2::new(node_rect.width() * 0.5, PIN_ROW_HEIGHT),
    }
}

/// Header text: icon glyph, then the display name
pub(crate) fn title(node: &trellis_graph::Node, registry: &trellis_graph::NodeRegistry) -> String {
    let icon = node
        .type_id()
        .and_then(|id| registry.get(id))
        .and_then(|t| t.icon);
    match icon {
        Some(icon) => format!("{icon} {}", node.display_name(registry)),
        None => node.display_name(registry).to_string(),
    }
}

/// Canvas anchor of a pin
pub(crate) fn pin_position(graph: &Graph, node: NodeId, pin: PinId) -> Option<Pos2> {
    Some(graph.node(node)?.as_flow()?.pin(pin)?.layout.position)
}

/// Control points of a wire from an output anchor to an input anchor
pub(crate) fn connection_curve(from: Pos2, to: Pos2) -> [Pos2; 4] {
    let reach = ((to.x - from.x).abs() * 0.5).max(BEZIER_CURVATURE);
    [from, from + Vec2::new(reach, 0.0), to - Vec2::new(reach, 0.0), to]
}

/// Endpoints of the arrow joining two node rectangles, anchored on their
/// borders and pushed sideways by `shift`
pub(crate) fn arrow_between(start: Rect, end: Rect, shift: f32) -> (Pos2, Pos2) {
    let from = rectangle_closest_border_point(start, end.center());
    let to = rectangle_closest_border_point(end, start.center());
    let direction = (to - from).normalized();
    let side = Vec2::new(-direction.y, direction.x) * shift;
    (from + side, to + side)
}

/// Canvas segment of a transition conduit, offset when a reverse twin exists
pub(crate) fn conduit_segment(graph: &Graph, conduit: NodeId) -> Option<(Pos2, Pos2)> {
    let c = graph.node(conduit)?.as_conduit()?;
    let start = graph.node(c.start_state)?.rect();
    let end = graph.node(c.end_state)?.rect();
    let has_reverse = graph.nodes().any(|n| {
        n.as_conduit()
            .is_some_and(|o| o.start_state == c.end_state && o.end_state == c.start_state)
    });
    let shift = if has_reverse { CONDUIT_OFFSET } else { 0.0 };
    Some(arrow_between(start, end, shift))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_curve_reaches_sideways() {
        let [p0, p1, p2, p3] = connection_curve(Pos2::new(0.0, 0.0), Pos2::new(300.0, 40.0));
        assert_eq!(p0, Pos2::new(0.0, 0.0));
        assert_eq!(p1, Pos2::new(150.0, 0.0));
        assert_eq!(p2, Pos2::new(150.0, 40.0));
        assert_eq!(p3, Pos2::new(300.0, 40.0));

        let [_, p1, ..] = connection_curve(Pos2::ZERO, Pos2::new(10.0, 0.0));
        assert_eq!(p1.x, BEZIER_CURVATURE);
    }

    #[test]
    fn test_reverse_arrows_separate() {
        let a = Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(100.0, 40.0));
        let b = Rect::from_min_size(Pos2::new(300.0, 0.0), Vec2::new(100.0, 40.0));
        let (from, to) = arrow_between(a, b, 0.0);
        assert_eq!(from, Pos2::new(100.0, 20.0));
        assert_eq!(to, Pos2::new(300.0, 20.0));

        let (forward, _) = arrow_between(a, b, CONDUIT_OFFSET);
        let (_, back_end) = arrow_between(b, a, CONDUIT_OFFSET);
        assert!((forward.y - back_end.y).abs() > CONDUIT_OFFSET);
    }
}
