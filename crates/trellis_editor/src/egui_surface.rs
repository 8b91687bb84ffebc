// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`DrawSurface`] over an `egui` painter, plus the glue that feeds a
//! [`GraphView`] from an `egui::Ui`.

use crate::surface::{DrawSurface, FrameInput, MouseButton};
use crate::user_context::UserContext;
use crate::view::GraphView;
use egui::epaint::CubicBezierShape;
use egui::{Align2, Color32, FontId, PointerButton, Pos2, Rect, Shape, Stroke, Vec2};
use trellis_graph::GraphDocument;

/// Wheel travel in points that counts as one notch
const POINTS_PER_WHEEL_NOTCH: f32 = 50.0;

/// Draws into an `egui::Painter`, buffering shapes while channels are split
pub struct EguiSurface {
    painter: egui::Painter,
    channels: Vec<Vec<Shape>>,
    current: usize,
}

impl EguiSurface {
    /// Wrap a painter
    pub fn new(painter: egui::Painter) -> Self {
        Self {
            painter,
            channels: Vec::new(),
            current: 0,
        }
    }

    fn add(&mut self, shape: Shape) {
        match self.channels.get_mut(self.current) {
            Some(channel) => channel.push(shape),
            None => {
                self.painter.add(shape);
            }
        }
    }
}

impl DrawSurface for EguiSurface {
    fn line(&mut self, a: Pos2, b: Pos2, stroke: Stroke) {
        self.add(Shape::line_segment([a, b], stroke));
    }

    fn rect_filled(&mut self, rect: Rect, rounding: f32, color: Color32) {
        self.add(Shape::rect_filled(rect, rounding, color));
    }

    fn rect_stroke(&mut self, rect: Rect, rounding: f32, stroke: Stroke) {
        self.add(Shape::rect_stroke(rect, rounding, stroke));
    }

    fn circle_filled(&mut self, center: Pos2, radius: f32, color: Color32) {
        self.add(Shape::circle_filled(center, radius, color));
    }

    fn circle_stroke(&mut self, center: Pos2, radius: f32, stroke: Stroke) {
        self.add(Shape::circle_stroke(center, radius, stroke));
    }

    fn triangle_filled(&mut self, points: [Pos2; 3], color: Color32) {
        self.add(Shape::convex_polygon(points.to_vec(), color, Stroke::NONE));
    }

    fn cubic_bezier(&mut self, points: [Pos2; 4], stroke: Stroke) {
        let curve = CubicBezierShape::from_points_stroke(points, false, Color32::TRANSPARENT, stroke);
        self.add(curve.into());
    }

    fn text(&mut self, pos: Pos2, anchor: Align2, text: &str, size: f32, color: Color32) {
        let galley = self
            .painter
            .layout_no_wrap(text.to_owned(), FontId::proportional(size), color);
        let rect = anchor.anchor_size(pos, galley.size());
        self.add(Shape::galley(rect.min, galley, color));
    }

    fn measure_text(&self, text: &str, size: f32) -> Vec2 {
        self.painter
            .layout_no_wrap(text.to_owned(), FontId::proportional(size), Color32::WHITE)
            .size()
    }

    fn split_channels(&mut self, count: usize) {
        self.channels = (0..count).map(|_| Vec::new()).collect();
        self.current = 0;
    }

    fn set_channel(&mut self, index: usize) {
        self.current = index;
    }

    fn merge_channels(&mut self) {
        for channel in std::mem::take(&mut self.channels) {
            self.painter.extend(channel);
        }
        self.current = 0;
    }
}

impl FrameInput {
    /// Snapshot `egui`'s input state
    pub fn from_egui(input: &egui::InputState) -> Self {
        let mut frame = Self {
            mouse_pos: input.pointer.hover_pos(),
            wheel_delta: input.raw_scroll_delta.y / POINTS_PER_WHEEL_NOTCH,
            modifiers: input.modifiers,
            keys_pressed: input
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key { key, pressed: true, .. } => Some(*key),
                    _ => None,
                })
                .collect(),
            ..Default::default()
        };

        for button in MouseButton::ALL {
            let pointer_button = match button {
                MouseButton::Primary => PointerButton::Primary,
                MouseButton::Secondary => PointerButton::Secondary,
                MouseButton::Middle => PointerButton::Middle,
            };
            if input.pointer.button_down(pointer_button) {
                frame = frame.with_down(button);
            }
            if input.pointer.button_pressed(pointer_button) {
                frame = frame.with_press(button);
            }
            if input.pointer.button_released(pointer_button) {
                frame = frame.with_release(button);
            }
            if input.pointer.button_double_clicked(pointer_button) {
                frame = frame.with_double_click(button);
            }
        }
        frame
    }
}

impl GraphView {
    /// Run one frame inside the remaining space of `ui`
    pub fn ui(&mut self, ui: &mut egui::Ui, doc: &mut GraphDocument, ctx: &mut dyn UserContext) {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        let mut input = ui.input(FrameInput::from_egui);
        if !response.hovered() && !self.is_dragging() {
            input.wheel_delta = 0.0;
        }

        let mut surface = EguiSurface::new(ui.painter_at(rect));
        self.update(doc, &mut surface, &input, rect, ctx);
    }
}
