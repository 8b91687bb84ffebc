// SPDX-License-Identifier: MIT OR Apache-2.0
//! View tuning, loadable from RON.

use serde::{Deserialize, Serialize};
use trellis_graph::geometry::DEFAULT_TESSELLATION_TOLERANCE;

/// Error when reading or writing view settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Serialization failed
    #[error("Failed to serialize view settings: {0}")]
    Serialize(#[from] ron::Error),

    /// Deserialization failed
    #[error("Failed to parse view settings: {0}")]
    Deserialize(#[from] ron::error::SpannedError),
}

/// Tunables used by [`GraphView`](crate::GraphView)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Smallest zoom factor
    pub min_zoom: f32,
    /// Largest zoom factor
    pub max_zoom: f32,
    /// Relative zoom change per wheel notch
    pub zoom_step: f32,
    /// Pointer travel in pixels before a press becomes a drag
    pub drag_threshold: f32,
    /// Pin hover radius in pixels
    pub pin_hover_radius: f32,
    /// Connection hover radius in pixels
    pub connection_hover_radius: f32,
    /// Canvas distance searched for auto-connect targets
    pub auto_connect_distance: f32,
    /// Tolerance for bezier proximity queries
    pub tessellation_tolerance: f32,
    /// Width of the comment border that grabs resize handles, in canvas units
    pub resize_border: f32,
    /// Grid cell size in canvas units
    pub grid_spacing: f32,
    /// Draw the background grid
    pub show_grid: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            min_zoom: 0.2,
            max_zoom: 3.0,
            zoom_step: 0.1,
            drag_threshold: 4.0,
            pin_hover_radius: 8.0,
            connection_hover_radius: 6.0,
            auto_connect_distance: 100.0,
            tessellation_tolerance: DEFAULT_TESSELLATION_TOLERANCE,
            resize_border: 8.0,
            grid_spacing: 20.0,
            show_grid: true,
        }
    }
}

impl ViewSettings {
    /// Clamp a zoom factor into the configured range
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Serialize to RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Deserialize from RON; missing fields take their defaults
    pub fn from_ron(s: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(s)?)
    }
}
