// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node type catalog supplied by the embedding tool.

use crate::pin::{value_types_compatible, Pin, PinTemplate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Pin color used when a value type has no registered color
pub const DEFAULT_PIN_COLOR: [u8; 3] = [150, 150, 150];

/// Decides whether an output pin may feed an input pin
pub type ConnectionRule = fn(output: &Pin, input: &Pin) -> bool;

/// Which specialization a graph belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphKind {
    /// Dataflow graph of nodes with typed pins
    Flow,
    /// State machine of states joined by transition conduits
    StateMachine,
}

/// Runtime class of a node, resolved once instead of probing types per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeClass {
    /// Resizable comment box that groups other nodes
    Comment,
    /// Dataflow node with input/output pins
    Flow,
    /// State machine state
    State,
    /// Directed transition between two states
    Conduit,
}

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Input nodes (constants, parameters)
    Input,
    /// Output nodes (results, poses)
    Output,
    /// Math operations
    Math,
    /// Logic/flow control
    Logic,
    /// State machine states
    State,
    /// Utility nodes
    Utility,
    /// Custom/user-defined
    Custom,
}

/// Node type definition
#[derive(Debug, Clone)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Display name, also the fallback node name
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Optional icon glyph drawn before the title
    pub icon: Option<char>,
    /// Description
    pub description: String,
    /// Flow or State
    pub class: NodeClass,
    /// Default input pins
    pub inputs: Vec<PinTemplate>,
    /// Default output pins
    pub outputs: Vec<PinTemplate>,
    /// Template for user-added inputs, if the node is variadic
    pub dynamic_input: Option<PinTemplate>,
    /// Whether the user may rename instances
    pub renameable: bool,
    /// Whether instance names must be unique within their graph
    pub requires_unique_name: bool,
    /// Whether the user may delete instances
    pub user_deletable: bool,
    /// Child graph created alongside each instance
    pub child_graph: Option<GraphKind>,
    /// Secondary graph created alongside each instance
    pub secondary_graph: Option<GraphKind>,
    /// Header color
    pub color: Option<[u8; 3]>,
    /// Rule applied when this type is the target of a connection
    pub connection_rule: ConnectionRule,
}

impl NodeType {
    fn with_class(id: impl Into<String>, name: impl Into<String>, class: NodeClass, category: NodeCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            icon: None,
            description: String::new(),
            class,
            inputs: Vec::new(),
            outputs: Vec::new(),
            dynamic_input: None,
            renameable: false,
            requires_unique_name: false,
            user_deletable: true,
            child_graph: None,
            secondary_graph: None,
            color: None,
            connection_rule: value_types_compatible,
        }
    }

    /// Define a dataflow node type
    pub fn flow(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_class(id, name, NodeClass::Flow, NodeCategory::Custom)
    }

    /// Define a state node type
    pub fn state(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_class(id, name, NodeClass::State, NodeCategory::State)
    }

    /// Add an input pin
    pub fn with_input(mut self, pin: PinTemplate) -> Self {
        self.inputs.push(pin);
        self
    }

    /// Add an output pin
    pub fn with_output(mut self, pin: PinTemplate) -> Self {
        self.outputs.push(pin);
        self
    }

    /// Allow user-added input pins stamped from `pin`
    pub fn with_dynamic_input(mut self, pin: PinTemplate) -> Self {
        self.dynamic_input = Some(pin);
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: NodeCategory) -> Self {
        self.category = category;
        self
    }

    /// Set the icon
    pub fn with_icon(mut self, icon: char) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the header color
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = Some(color);
        self
    }

    /// Allow renaming, optionally enforcing unique names
    pub fn renameable(mut self, requires_unique_name: bool) -> Self {
        self.renameable = true;
        self.requires_unique_name = requires_unique_name;
        self
    }

    /// Forbid user deletion
    pub fn undeletable(mut self) -> Self {
        self.user_deletable = false;
        self
    }

    /// Create a child graph with every instance
    pub fn with_child_graph(mut self, kind: GraphKind) -> Self {
        self.child_graph = Some(kind);
        self
    }

    /// Create a secondary graph with every instance
    pub fn with_secondary_graph(mut self, kind: GraphKind) -> Self {
        self.secondary_graph = Some(kind);
        self
    }

    /// Override the pin compatibility check
    pub fn with_connection_rule(mut self, rule: ConnectionRule) -> Self {
        self.connection_rule = rule;
        self
    }
}

/// Registry of available node types
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    /// Registered node types by ID
    types: IndexMap<String, NodeType>,
    /// Pin colors by value-type tag
    pin_colors: IndexMap<String, [u8; 3]>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Get types by category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.category == category)
    }

    /// Get types a graph of `kind` can host
    pub fn types_for_graph(&self, kind: GraphKind) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| can_host(kind, t.class))
    }

    /// Assign a display color to a value-type tag
    pub fn set_pin_color(&mut self, value_type: impl Into<String>, color: [u8; 3]) {
        self.pin_colors.insert(value_type.into(), color);
    }

    /// Display color for a value-type tag
    pub fn pin_color(&self, value_type: &str) -> [u8; 3] {
        self.pin_colors.get(value_type).copied().unwrap_or(DEFAULT_PIN_COLOR)
    }
}

/// Capability predicate: which node classes a graph kind accepts
pub fn can_host(kind: GraphKind, class: NodeClass) -> bool {
    match kind {
        GraphKind::Flow => matches!(class, NodeClass::Comment | NodeClass::Flow),
        GraphKind::StateMachine => {
            matches!(class, NodeClass::Comment | NodeClass::State | NodeClass::Conduit)
        }
    }
}
