// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-frame hit-testing in canvas space.

use super::layout::{conduit_segment, connection_curve, pin_position, COMMENT_TITLE_HEIGHT};
use crate::drawing_context::DrawingContext;
use crate::settings::ViewSettings;
use egui::{Pos2, Rect};
use trellis_graph::geometry::{closest_point_on_cubic_bezier, distance_to_segment, rect};
use trellis_graph::{ConnectionId, Graph, NodeClass, NodeId, PinId, ResizeHandle};

/// What the pointer is over this frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Hover {
    /// Topmost node under the pointer
    pub node: Option<NodeId>,
    /// Pin under the pointer, with its node
    pub pin: Option<(NodeId, PinId)>,
    /// Wire under the pointer
    pub connection: Option<ConnectionId>,
    /// Comment border handle under the pointer
    pub resize: Option<(NodeId, ResizeHandle)>,
}

/// Hit-test `graph` at the canvas point `p`.
///
/// Pins win over node bodies, flow and state nodes over transitions, and
/// transitions over comments, matching draw order. Comments only react on
/// their title band and border so rubber-band selections can start inside
/// them. Wires are only hovered where no node is.
pub(crate) fn hit_test(graph: &Graph, dc: &DrawingContext, settings: &ViewSettings, p: Pos2) -> Hover {
    let mut hover = Hover::default();

    let pin_radius = dc.canvas_length(settings.pin_hover_radius);
    hover.pin = graph.nodes().rev().find_map(|node| {
        let flow = node.as_flow()?;
        flow.pins()
            .find(|pin| rect::contains_point(pin.hit_rect(pin_radius), p))
            .map(|pin| (node.id(), pin.id))
    });
    if let Some((node, _)) = hover.pin {
        hover.node = Some(node);
        return hover;
    }

    hover.node = graph
        .nodes()
        .rev()
        .filter(|n| matches!(n.class(), NodeClass::Flow | NodeClass::State))
        .find(|n| rect::contains_point(n.rect(), p))
        .map(|n| n.id());
    if hover.node.is_some() {
        return hover;
    }

    let wire_radius = dc.canvas_length(settings.connection_hover_radius);
    hover.node = graph
        .nodes_of_class(NodeClass::Conduit)
        .filter_map(|n| {
            let (from, to) = conduit_segment(graph, n.id())?;
            let distance = distance_to_segment(from, to, p);
            (distance <= wire_radius).then_some((n.id(), distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id);
    if hover.node.is_some() {
        return hover;
    }

    for comment in graph.nodes_of_class(NodeClass::Comment).collect::<Vec<_>>().into_iter().rev() {
        let r = comment.rect();
        if let Some(handle) = ResizeHandle::detect(r, p, settings.resize_border) {
            hover.node = Some(comment.id());
            hover.resize = Some((comment.id(), handle));
            return hover;
        }
        let title_band = Rect::from_min_size(r.min, egui::vec2(r.width(), COMMENT_TITLE_HEIGHT));
        if rect::contains_point(title_band, p) {
            hover.node = Some(comment.id());
            return hover;
        }
    }

    let tolerance = dc.canvas_length(settings.tessellation_tolerance);
    hover.connection = graph
        .connections()
        .filter_map(|c| {
            let from = pin_position(graph, c.from_node, c.output_pin)?;
            let to = pin_position(graph, c.to_node, c.input_pin)?;
            let [p0, p1, p2, p3] = connection_curve(from, to);
            let closest = closest_point_on_cubic_bezier(p0, p1, p2, p3, p, tolerance);
            let distance = closest.distance(p);
            (distance <= wire_radius).then_some((c.id, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id);

    hover
}
