// SPDX-License-Identifier: MIT OR Apache-2.0
//! Screen, window and canvas coordinate spaces.
//!
//! - screen: absolute surface pixels
//! - window: `screen - window origin`
//! - canvas: `window / zoom + offset`, the space nodes are stored in
//!
//! Hit-testing happens in canvas space; primitives are converted to screen
//! space right before they are issued.

use egui::{Pos2, Rect, Vec2};
use trellis_graph::ViewState;

/// Draw channel for fills composited behind foreground content
pub const BACKGROUND_CHANNEL: usize = 0;
/// Draw channel for content measured before its background is known
pub const FOREGROUND_CHANNEL: usize = 1;
/// Number of channels used when splitting
pub const CHANNEL_COUNT: usize = 2;

/// Coordinate converter for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingContext {
    /// Window rectangle in screen space
    pub window: Rect,
    /// Canvas position shown at the window origin
    pub offset: Vec2,
    /// Window pixels per canvas unit
    pub zoom: f32,
}

impl DrawingContext {
    /// Converter for `window` showing a graph's remembered viewport
    pub fn new(window: Rect, view: ViewState) -> Self {
        Self {
            window,
            offset: view.offset,
            zoom: view.zoom,
        }
    }

    /// Screen to window
    pub fn screen_to_window(&self, p: Pos2) -> Pos2 {
        p - self.window.min.to_vec2()
    }

    /// Window to screen
    pub fn window_to_screen(&self, p: Pos2) -> Pos2 {
        p + self.window.min.to_vec2()
    }

    /// Window to canvas
    pub fn window_to_canvas(&self, p: Pos2) -> Pos2 {
        (p.to_vec2() / self.zoom + self.offset).to_pos2()
    }

    /// Canvas to window
    pub fn canvas_to_window(&self, p: Pos2) -> Pos2 {
        ((p.to_vec2() - self.offset) * self.zoom).to_pos2()
    }

    /// Screen to canvas
    pub fn screen_to_canvas(&self, p: Pos2) -> Pos2 {
        self.window_to_canvas(self.screen_to_window(p))
    }

    /// Canvas to screen
    pub fn canvas_to_screen(&self, p: Pos2) -> Pos2 {
        self.window_to_screen(self.canvas_to_window(p))
    }

    /// Window-space distance to canvas-space distance
    pub fn canvas_delta(&self, window_delta: Vec2) -> Vec2 {
        window_delta / self.zoom
    }

    /// Pixel length to canvas length
    pub fn canvas_length(&self, pixels: f32) -> f32 {
        pixels / self.zoom
    }

    /// Canvas length to pixel length
    pub fn screen_length(&self, canvas: f32) -> f32 {
        canvas * self.zoom
    }

    /// Canvas rectangle to window space
    pub fn canvas_rect_to_window(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.canvas_to_window(rect.min), self.canvas_to_window(rect.max))
    }

    /// Canvas rectangle to screen space
    pub fn canvas_rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.canvas_to_screen(rect.min), self.canvas_to_screen(rect.max))
    }

    /// Canvas area currently shown in the window
    pub fn visible_canvas_rect(&self) -> Rect {
        Rect::from_min_max(
            self.screen_to_canvas(self.window.min),
            self.screen_to_canvas(self.window.max),
        )
    }

    /// Whether any part of a canvas rectangle is on screen
    pub fn is_visible(&self, canvas_rect: Rect) -> bool {
        self.visible_canvas_rect().intersects(canvas_rect)
    }

    /// Offset that keeps `anchor` (canvas) under the cursor when zooming to
    /// `new_zoom`
    pub fn zoomed_offset(&self, anchor: Pos2, new_zoom: f32) -> Vec2 {
        let delta = new_zoom - self.zoom;
        self.offset + (anchor.to_vec2() - self.offset) * (delta / new_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(offset: Vec2, zoom: f32) -> DrawingContext {
        DrawingContext {
            window: Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::new(800.0, 600.0)),
            offset,
            zoom,
        }
    }

    #[test]
    fn test_conversion_round_trip() {
        for (offset, zoom) in [
            (Vec2::ZERO, 1.0),
            (Vec2::new(-35.5, 120.0), 0.25),
            (Vec2::new(1000.0, -7.0), 2.75),
        ] {
            let ctx = context(offset, zoom);
            for p in [Pos2::ZERO, Pos2::new(13.0, -42.5), Pos2::new(640.0, 480.0)] {
                let back = ctx.canvas_to_window(ctx.window_to_canvas(p));
                assert!((back - p).length() < 1e-3, "{p:?} -> {back:?}");
                let back = ctx.screen_to_canvas(ctx.canvas_to_screen(p));
                assert!((back - p).length() < 1e-3, "{p:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn test_canvas_formula() {
        let ctx = context(Vec2::new(10.0, 20.0), 2.0);
        assert_eq!(ctx.screen_to_window(Pos2::new(100.0, 50.0)), Pos2::ZERO);
        assert_eq!(ctx.window_to_canvas(Pos2::new(40.0, 60.0)), Pos2::new(30.0, 50.0));
        assert_eq!(ctx.canvas_delta(Vec2::new(8.0, 4.0)), Vec2::new(4.0, 2.0));
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let ctx = context(Vec2::new(30.0, -10.0), 1.0);
        let cursor = Pos2::new(400.0, 300.0);
        let anchor = ctx.screen_to_canvas(cursor);

        let zoomed = DrawingContext {
            offset: ctx.zoomed_offset(anchor, 1.5),
            zoom: 1.5,
            ..ctx
        };
        assert!((zoomed.screen_to_canvas(cursor) - anchor).length() < 1e-3);
    }
}
