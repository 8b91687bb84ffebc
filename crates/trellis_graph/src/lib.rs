// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph model for the Trellis node editor.
//!
//! This crate holds everything the editor draws and edits, without any
//! dependency on a windowing host:
//! - Geometry kernel (segments, cubic beziers, rectangles)
//! - Graph documents owning a root graph and the graphs nested under nodes
//! - Dataflow graphs with typed, directional pins
//! - State machines with transition conduits
//! - Modification scopes with begin/end notifications
//! - RON snapshots
//!
//! ## Architecture
//!
//! A [`GraphDocument`] is an arena of [`Graph`]s keyed by [`GraphId`]. Nodes
//! live inside their graph and refer to owned child graphs by ID, so the
//! hierarchy is a tree of IDs rather than of pointers. Node types come from a
//! [`NodeRegistry`] supplied by the embedding tool.

pub mod comment;
pub mod connection;
pub mod document;
pub mod error;
pub mod flow;
pub mod geometry;
pub mod graph;
pub mod id;
pub mod modification;
pub mod node;
pub mod pin;
pub mod registry;
pub mod snapshot;
pub mod state_machine;

pub use comment::{CommentNode, ResizeHandle};
pub use connection::Connection;
pub use document::{GraphDocument, NewNode};
pub use error::{GraphError, Result, SnapshotError};
pub use graph::{Graph, ViewState};
pub use id::{ConnectionId, GraphId, IdMapping, NodeId, PinId};
pub use modification::{ModificationEvent, ModificationEvents, SubscriptionId};
pub use node::{FlowNode, Node, NodeKind, StateNode, TransitionConduit};
pub use pin::{Pin, PinDirection, PinLayout, PinTemplate};
pub use registry::{GraphKind, NodeCategory, NodeClass, NodeRegistry, NodeType};
