// SPDX-License-Identifier: MIT OR Apache-2.0
//! Comment nodes: resizable boxes that group the nodes they enclose.

use crate::geometry::rect;
use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest size a comment can be resized to
pub const MIN_COMMENT_SIZE: Vec2 = Vec2::new(100.0, 60.0);

/// Default comment size
pub const DEFAULT_COMMENT_SIZE: Vec2 = Vec2::new(300.0, 200.0);

/// Default comment tint
pub const DEFAULT_COMMENT_COLOR: [u8; 3] = [90, 110, 140];

/// Comment payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    /// Comment text shown in the title band
    pub text: String,
    /// Tint
    pub color: [u8; 3],
    /// User-controlled size in canvas units
    pub size: Vec2,
}

impl Default for CommentNode {
    fn default() -> Self {
        Self {
            text: String::from("Comment"),
            color: DEFAULT_COMMENT_COLOR,
            size: DEFAULT_COMMENT_SIZE,
        }
    }
}

/// One of the eight compass handles on a comment border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    /// Top edge
    N,
    /// Top-right corner
    NE,
    /// Right edge
    E,
    /// Bottom-right corner
    SE,
    /// Bottom edge
    S,
    /// Bottom-left corner
    SW,
    /// Left edge
    W,
    /// Top-left corner
    NW,
}

impl ResizeHandle {
    /// Find the handle under `p`, if it lies within `border` of the edge of `rect`
    pub fn detect(node_rect: Rect, p: Pos2, border: f32) -> Option<Self> {
        if !rect::contains_point(rect::expanded(node_rect, border), p) {
            return None;
        }

        let left = (p.x - node_rect.min.x).abs() <= border;
        let right = (p.x - node_rect.max.x).abs() <= border;
        let top = (p.y - node_rect.min.y).abs() <= border;
        let bottom = (p.y - node_rect.max.y).abs() <= border;

        match (top, bottom, left, right) {
            (true, _, true, _) => Some(Self::NW),
            (true, _, _, true) => Some(Self::NE),
            (_, true, true, _) => Some(Self::SW),
            (_, true, _, true) => Some(Self::SE),
            (true, _, _, _) => Some(Self::N),
            (_, true, _, _) => Some(Self::S),
            (_, _, true, _) => Some(Self::W),
            (_, _, _, true) => Some(Self::E),
            _ => None,
        }
    }

    /// Offset from `p` to the edges this handle moves, zero on fixed axes
    pub fn grab_offset(self, node_rect: Rect, p: Pos2) -> Vec2 {
        let x = if self.moves_left() {
            node_rect.min.x - p.x
        } else if self.moves_right() {
            node_rect.max.x - p.x
        } else {
            0.0
        };
        let y = if self.moves_top() {
            node_rect.min.y - p.y
        } else if self.moves_bottom() {
            node_rect.max.y - p.y
        } else {
            0.0
        };
        Vec2::new(x, y)
    }

    fn moves_top(self) -> bool {
        matches!(self, Self::N | Self::NE | Self::NW)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::S | Self::SE | Self::SW)
    }

    fn moves_left(self) -> bool {
        matches!(self, Self::W | Self::NW | Self::SW)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::E | Self::NE | Self::SE)
    }
}

/// Drag the edges selected by `handle` to `target`, keeping the minimum size.
///
/// Returns the new comment rectangle.
pub fn resize_rect(current: Rect, handle: ResizeHandle, target: Pos2) -> Rect {
    let mut r = current;
    if handle.moves_top() {
        r.min.y = target.y.min(r.max.y - MIN_COMMENT_SIZE.y);
    }
    if handle.moves_bottom() {
        r.max.y = target.y.max(r.min.y + MIN_COMMENT_SIZE.y);
    }
    if handle.moves_left() {
        r.min.x = target.x.min(r.max.x - MIN_COMMENT_SIZE.x);
    }
    if handle.moves_right() {
        r.max.x = target.x.max(r.min.x + MIN_COMMENT_SIZE.x);
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment_rect() -> Rect {
        Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(300.0, 200.0))
    }

    #[test]
    fn test_grab_offset_only_on_moving_axes() {
        let r = comment_rect();
        assert_eq!(ResizeHandle::SE.grab_offset(r, Pos2::new(294.0, 194.0)), Vec2::new(6.0, 6.0));
        assert_eq!(ResizeHandle::NW.grab_offset(r, Pos2::new(3.0, 2.0)), Vec2::new(-3.0, -2.0));
        assert_eq!(ResizeHandle::E.grab_offset(r, Pos2::new(297.0, 90.0)), Vec2::new(3.0, 0.0));
    }

    #[test]
    fn test_detect_handles() {
        let r = comment_rect();
        assert_eq!(ResizeHandle::detect(r, Pos2::new(1.0, 1.0), 4.0), Some(ResizeHandle::NW));
        assert_eq!(ResizeHandle::detect(r, Pos2::new(150.0, 202.0), 4.0), Some(ResizeHandle::S));
        assert_eq!(ResizeHandle::detect(r, Pos2::new(299.0, 100.0), 4.0), Some(ResizeHandle::E));
        assert_eq!(ResizeHandle::detect(r, Pos2::new(150.0, 100.0), 4.0), None);
        assert_eq!(ResizeHandle::detect(r, Pos2::new(400.0, 100.0), 4.0), None);
    }

    #[test]
    fn test_resize_respects_minimum() {
        let r = resize_rect(comment_rect(), ResizeHandle::SE, Pos2::new(10.0, 10.0));
        assert_eq!(r.size(), MIN_COMMENT_SIZE);
        assert_eq!(r.min, Pos2::ZERO);
    }

    #[test]
    fn test_resize_from_top_left_moves_origin() {
        let r = resize_rect(comment_rect(), ResizeHandle::NW, Pos2::new(-50.0, -20.0));
        assert_eq!(r.min, Pos2::new(-50.0, -20.0));
        assert_eq!(r.max, Pos2::new(300.0, 200.0));
    }
}
