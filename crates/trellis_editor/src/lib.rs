// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interactive view for Trellis graphs.
//!
//! The view owns no model state beyond selection, hover and the active drag.
//! It reads and edits a [`trellis_graph::GraphDocument`] each frame, draws
//! through the [`DrawSurface`] trait and reports back through
//! [`UserContext`]. [`EguiSurface`] and [`GraphView::ui`] plug it into `egui`;
//! [`RecordingSurface`] runs it headless.

pub mod drawing_context;
pub mod egui_surface;
pub mod gesture;
pub mod recording;
pub mod settings;
pub mod surface;
pub mod user_context;
pub mod view;

pub use drawing_context::DrawingContext;
pub use egui_surface::EguiSurface;
pub use gesture::{DragCandidate, DragMode, GestureEvent, GestureTracker};
pub use recording::{DrawCommand, RecordingSurface};
pub use settings::{SettingsError, ViewSettings};
pub use surface::{DrawSurface, FrameInput, MouseButton};
pub use user_context::{NullUserContext, UserContext};
pub use view::{GraphView, Hover};
