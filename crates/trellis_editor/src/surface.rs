// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host-facing drawing surface and per-frame input snapshot.
//!
//! All coordinates passed to a [`DrawSurface`] are in screen space.

use egui::{Align2, Color32, Key, Modifiers, Pos2, Rect, Stroke, Vec2};

/// Immediate-mode drawing primitives supplied by the host
pub trait DrawSurface {
    /// Straight line
    fn line(&mut self, a: Pos2, b: Pos2, stroke: Stroke);

    /// Filled rectangle
    fn rect_filled(&mut self, rect: Rect, rounding: f32, color: Color32);

    /// Rectangle outline
    fn rect_stroke(&mut self, rect: Rect, rounding: f32, stroke: Stroke);

    /// Filled circle
    fn circle_filled(&mut self, center: Pos2, radius: f32, color: Color32);

    /// Circle outline
    fn circle_stroke(&mut self, center: Pos2, radius: f32, stroke: Stroke);

    /// Filled triangle
    fn triangle_filled(&mut self, points: [Pos2; 3], color: Color32);

    /// Cubic bezier curve through four control points
    fn cubic_bezier(&mut self, points: [Pos2; 4], stroke: Stroke);

    /// Single line of text anchored at `pos`
    fn text(&mut self, pos: Pos2, anchor: Align2, text: &str, size: f32, color: Color32);

    /// Size `text` would take at font `size`
    fn measure_text(&self, text: &str, size: f32) -> Vec2;

    /// Start recording into `count` separate channels
    fn split_channels(&mut self, count: usize);

    /// Direct following primitives to `index`
    fn set_channel(&mut self, index: usize);

    /// Composite the channels back in index order, lowest first
    fn merge_channels(&mut self);
}

/// Mouse buttons the view reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button
    Primary,
    /// Right button
    Secondary,
    /// Wheel button
    Middle,
}

impl MouseButton {
    /// All buttons, in index order
    pub const ALL: [Self; 3] = [Self::Primary, Self::Secondary, Self::Middle];

    fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
            Self::Middle => 2,
        }
    }
}

/// Input sampled once at the start of a frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Pointer position in screen space, if the pointer is over the host
    pub mouse_pos: Option<Pos2>,
    pub(crate) down: [bool; 3],
    pub(crate) pressed: [bool; 3],
    pub(crate) released: [bool; 3],
    pub(crate) double_clicked: [bool; 3],
    /// Wheel movement in notches, positive away from the user
    pub wheel_delta: f32,
    /// Modifier keys
    pub modifiers: Modifiers,
    /// Keys pressed this frame
    pub keys_pressed: Vec<Key>,
}

impl FrameInput {
    /// Input with the pointer at `pos` and nothing else happening
    pub fn at(pos: Pos2) -> Self {
        Self {
            mouse_pos: Some(pos),
            ..Default::default()
        }
    }

    /// Whether `button` is held
    pub fn is_down(&self, button: MouseButton) -> bool {
        self.down[button.index()]
    }

    /// Whether `button` went down this frame
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.pressed[button.index()]
    }

    /// Whether `button` went up this frame
    pub fn is_released(&self, button: MouseButton) -> bool {
        self.released[button.index()]
    }

    /// Whether `button` was double-clicked this frame
    pub fn is_double_clicked(&self, button: MouseButton) -> bool {
        self.double_clicked[button.index()]
    }

    /// Whether `key` was pressed this frame
    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Mark `button` as held
    pub fn with_down(mut self, button: MouseButton) -> Self {
        self.down[button.index()] = true;
        self
    }

    /// Mark `button` as pressed this frame, which also holds it
    pub fn with_press(mut self, button: MouseButton) -> Self {
        self.pressed[button.index()] = true;
        self.down[button.index()] = true;
        self
    }

    /// Mark `button` as released this frame
    pub fn with_release(mut self, button: MouseButton) -> Self {
        self.released[button.index()] = true;
        self.down[button.index()] = false;
        self
    }

    /// Mark `button` as double-clicked this frame
    pub fn with_double_click(mut self, button: MouseButton) -> Self {
        self.double_clicked[button.index()] = true;
        self
    }

    /// Set the modifier keys
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Add a key press
    pub fn with_key(mut self, key: Key) -> Self {
        self.keys_pressed.push(key);
        self
    }

    /// Set the wheel movement
    pub fn with_wheel(mut self, notches: f32) -> Self {
        self.wheel_delta = notches;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_implies_down() {
        let input = FrameInput::at(Pos2::new(1.0, 2.0)).with_press(MouseButton::Middle);
        assert!(input.is_down(MouseButton::Middle));
        assert!(input.is_pressed(MouseButton::Middle));
        assert!(!input.is_down(MouseButton::Primary));

        let input = input.with_release(MouseButton::Middle);
        assert!(!input.is_down(MouseButton::Middle));
        assert!(input.is_released(MouseButton::Middle));
    }
}
