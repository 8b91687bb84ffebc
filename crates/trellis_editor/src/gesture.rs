// SPDX-License-Identifier: MIT OR Apache-2.0
//! Two-phase drag detection.
//!
//! A press only records a drag-ready candidate. The drag mode is decided once
//! the pointer has moved past the threshold with the button still held; a
//! release before that is a click. Nothing here knows about drawing.

use crate::surface::MouseButton;
use egui::Pos2;
use trellis_graph::{NodeId, PinId, ResizeHandle};

/// What the view is currently dragging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    /// Not dragging
    #[default]
    None,
    /// Panning the canvas
    View,
    /// Rubber-band selection
    Selection,
    /// Moving nodes
    Node,
    /// Drawing a connection or transition
    Connection,
    /// Resizing a comment
    ResizeComment,
}

/// What was under the pointer when a button went down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragCandidate {
    /// Empty canvas
    Canvas,
    /// A node body
    Node(NodeId),
    /// A flow node pin
    Pin {
        /// Node owning the pin
        node: NodeId,
        /// Pin
        pin: PinId,
    },
    /// A state node picked as the source of a new transition
    TransitionSource(NodeId),
    /// A comment border
    CommentEdge {
        /// Comment node
        node: NodeId,
        /// Handle under the pointer
        handle: ResizeHandle,
    },
}

impl DragCandidate {
    /// Node under the pointer, if any
    pub fn node(&self) -> Option<NodeId> {
        match *self {
            Self::Canvas => None,
            Self::Node(node)
            | Self::TransitionSource(node)
            | Self::Pin { node, .. }
            | Self::CommentEdge { node, .. } => Some(node),
        }
    }
}

/// Drag mode entered when `candidate` is dragged with `button`
pub fn resolve_drag_mode(candidate: DragCandidate, button: MouseButton) -> DragMode {
    match (button, candidate) {
        (MouseButton::Secondary | MouseButton::Middle, _) => DragMode::View,
        (MouseButton::Primary, DragCandidate::CommentEdge { .. }) => DragMode::ResizeComment,
        (MouseButton::Primary, DragCandidate::Pin { .. } | DragCandidate::TransitionSource(_)) => {
            DragMode::Connection
        }
        (MouseButton::Primary, DragCandidate::Node(_)) => DragMode::Node,
        (MouseButton::Primary, DragCandidate::Canvas) => DragMode::Selection,
    }
}

/// A press that has not yet become a drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragReady {
    /// Button that went down
    pub button: MouseButton,
    /// Pointer position at the press, in screen space
    pub origin: Pos2,
    /// What was under the pointer
    pub candidate: DragCandidate,
}

/// Outcome of feeding one frame to a [`GestureTracker`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Nothing changed
    Idle,
    /// The pointer left the threshold; the view should enter `mode`
    DragStarted {
        /// Mode to enter
        mode: DragMode,
        /// The press that started it
        ready: DragReady,
    },
    /// The button was released before the threshold was crossed
    Click(DragReady),
}

/// Watches presses and decides between clicks and drags
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    ready: Option<DragReady>,
}

impl GestureTracker {
    /// Create an idle tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending press, if any
    pub fn ready(&self) -> Option<&DragReady> {
        self.ready.as_ref()
    }

    /// Record a press. Ignored while another press is pending.
    pub fn press(&mut self, button: MouseButton, origin: Pos2, candidate: DragCandidate) {
        if self.ready.is_none() {
            self.ready = Some(DragReady {
                button,
                origin,
                candidate,
            });
        }
    }

    /// Forget the pending press
    pub fn cancel(&mut self) {
        self.ready = None;
    }

    /// Advance one frame.
    ///
    /// `button_down` reports whether the pending press's button is still
    /// held; `threshold` is in the same units as the positions.
    pub fn step(&mut self, pointer: Pos2, button_down: bool, threshold: f32) -> GestureEvent {
        let Some(ready) = self.ready else {
            return GestureEvent::Idle;
        };
        if !button_down {
            self.ready = None;
            return GestureEvent::Click(ready);
        }
        if pointer.distance(ready.origin) > threshold {
            self.ready = None;
            return GestureEvent::DragStarted {
                mode: resolve_drag_mode(ready.candidate, ready.button),
                ready,
            };
        }
        GestureEvent::Idle
    }
}
