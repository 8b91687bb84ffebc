// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pin definitions for node inputs/outputs.
//!
//! A pin does not store its direction: whether it is an input or an output is
//! decided by which list of its node holds it.

use crate::id::PinId;
use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Value-type tag accepted by every pin under the default connection rule
pub const ANY_VALUE_TYPE: &str = "any";

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    /// Input pin
    Input,
    /// Output pin
    Output,
}

impl PinDirection {
    /// The direction a compatible pin must have
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

/// Per-frame layout cache written by the view while drawing
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PinLayout {
    /// Anchor point in canvas space
    pub position: Pos2,
    /// Size of the pin label row in canvas space
    pub size: Vec2,
}

/// Template a node type uses to stamp out pins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinTemplate {
    /// Pin name
    pub name: String,
    /// Value-type tag
    pub value_type: String,
    /// Whether an output may feed more than one input
    pub allow_multiple_out_connections: bool,
}

impl PinTemplate {
    /// Create a template for a single-connection pin
    pub fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: value_type.into(),
            allow_multiple_out_connections: false,
        }
    }

    /// Allow the output to fan out to many inputs
    pub fn multi_out(mut self) -> Self {
        self.allow_multiple_out_connections = true;
        self
    }
}

/// A pin on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    /// Unique pin ID
    pub id: PinId,
    /// Pin name
    pub name: String,
    /// Declared value-type tag
    pub value_type: String,
    /// Only meaningful on outputs
    pub allow_multiple_out_connections: bool,
    /// Whether the user added this pin at runtime
    pub dynamic: bool,
    /// Last laid-out position, rebuilt every frame
    #[serde(skip)]
    pub layout: PinLayout,
}

impl Pin {
    /// Create a new pin
    pub fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            id: PinId::new(),
            name: name.into(),
            value_type: value_type.into(),
            allow_multiple_out_connections: false,
            dynamic: false,
            layout: PinLayout::default(),
        }
    }

    /// Stamp out a pin from a template with a fresh ID
    pub fn from_template(template: &PinTemplate) -> Self {
        Self {
            allow_multiple_out_connections: template.allow_multiple_out_connections,
            ..Self::new(template.name.clone(), template.value_type.clone())
        }
    }

    /// Mark as a runtime-added pin
    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    /// Canvas-space hit rectangle around the anchor
    pub fn hit_rect(&self, radius: f32) -> Rect {
        Rect::from_center_size(self.layout.position, Vec2::splat(radius * 2.0))
    }
}

/// Default connection rule: equal tags, or either side is [`ANY_VALUE_TYPE`]
pub fn value_types_compatible(output: &Pin, input: &Pin) -> bool {
    output.value_type == input.value_type
        || output.value_type == ANY_VALUE_TYPE
        || input.value_type == ANY_VALUE_TYPE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_stamps_fresh_ids() {
        let template = PinTemplate::new("Out", "float").multi_out();
        let a = Pin::from_template(&template);
        let b = Pin::from_template(&template);
        assert_ne!(a.id, b.id);
        assert!(a.allow_multiple_out_connections);
        assert_eq!(a.value_type, "float");
    }

    #[test]
    fn test_default_compatibility() {
        let float = Pin::new("a", "float");
        let int = Pin::new("b", "int");
        let any = Pin::new("c", ANY_VALUE_TYPE);
        assert!(value_types_compatible(&float, &Pin::new("d", "float")));
        assert!(!value_types_compatible(&float, &int));
        assert!(value_types_compatible(&any, &int));
    }
}
