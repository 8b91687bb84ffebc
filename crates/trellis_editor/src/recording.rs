// SPDX-License-Identifier: MIT OR Apache-2.0
//! A [`DrawSurface`] that records primitives instead of drawing them.
//!
//! Used to run a [`GraphView`](crate::GraphView) without a GUI host. Text is
//! measured with a fixed advance of half the font size per character.

use crate::surface::DrawSurface;
use egui::{Align2, Color32, Pos2, Rect, Stroke, Vec2};

/// One recorded primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Straight line
    Line(Pos2, Pos2, Stroke),
    /// Filled rectangle
    RectFilled(Rect, Color32),
    /// Rectangle outline
    RectStroke(Rect, Stroke),
    /// Filled circle
    CircleFilled(Pos2, f32, Color32),
    /// Circle outline
    CircleStroke(Pos2, f32, Stroke),
    /// Filled triangle
    Triangle([Pos2; 3], Color32),
    /// Cubic bezier
    Bezier([Pos2; 4], Stroke),
    /// Text
    Text(Pos2, String, Color32),
}

/// Surface that keeps everything drawn
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    channels: Vec<Vec<DrawCommand>>,
    current: usize,
}

impl RecordingSurface {
    /// Create an empty surface
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything drawn since the last [`clear`](Self::clear), in
    /// composited order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Text drawn so far
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text(_, text, _) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Beziers drawn so far
    pub fn beziers(&self) -> impl Iterator<Item = ([Pos2; 4], Stroke)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Bezier(points, stroke) => Some((*points, *stroke)),
            _ => None,
        })
    }

    /// Forget recorded commands
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    fn push(&mut self, command: DrawCommand) {
        match self.channels.get_mut(self.current) {
            Some(channel) => channel.push(command),
            None => self.commands.push(command),
        }
    }
}

impl DrawSurface for RecordingSurface {
    fn line(&mut self, a: Pos2, b: Pos2, stroke: Stroke) {
        self.push(DrawCommand::Line(a, b, stroke));
    }

    fn rect_filled(&mut self, rect: Rect, _rounding: f32, color: Color32) {
        self.push(DrawCommand::RectFilled(rect, color));
    }

    fn rect_stroke(&mut self, rect: Rect, _rounding: f32, stroke: Stroke) {
        self.push(DrawCommand::RectStroke(rect, stroke));
    }

    fn circle_filled(&mut self, center: Pos2, radius: f32, color: Color32) {
        self.push(DrawCommand::CircleFilled(center, radius, color));
    }

    fn circle_stroke(&mut self, center: Pos2, radius: f32, stroke: Stroke) {
        self.push(DrawCommand::CircleStroke(center, radius, stroke));
    }

    fn triangle_filled(&mut self, points: [Pos2; 3], color: Color32) {
        self.push(DrawCommand::Triangle(points, color));
    }

    fn cubic_bezier(&mut self, points: [Pos2; 4], stroke: Stroke) {
        self.push(DrawCommand::Bezier(points, stroke));
    }

    fn text(&mut self, pos: Pos2, anchor: Align2, text: &str, size: f32, color: Color32) {
        let rect = anchor.anchor_size(pos, self.measure_text(text, size));
        self.push(DrawCommand::Text(rect.min, text.to_owned(), color));
    }

    fn measure_text(&self, text: &str, size: f32) -> Vec2 {
        Vec2::new(text.chars().count() as f32 * size * 0.5, size)
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
            self.commands.extend(channel);
        }
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_composite_in_index_order() {
        let mut surface = RecordingSurface::new();
        surface.split_channels(2);
        surface.set_channel(1);
        surface.text(Pos2::ZERO, Align2::LEFT_TOP, "front", 10.0, Color32::WHITE);
        surface.set_channel(0);
        surface.rect_filled(Rect::from_min_size(Pos2::ZERO, Vec2::splat(4.0)), 0.0, Color32::BLACK);
        surface.merge_channels();

        assert!(matches!(surface.commands()[0], DrawCommand::RectFilled(..)));
        assert!(matches!(surface.commands()[1], DrawCommand::Text(..)));
        assert_eq!(surface.measure_text("abcd", 10.0), Vec2::new(20.0, 10.0));
    }
}
