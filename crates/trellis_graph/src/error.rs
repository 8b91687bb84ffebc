// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for graph mutation and snapshots.

use crate::id::{GraphId, NodeId, PinId};
use crate::registry::{GraphKind, NodeClass};

/// Error when mutating a graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Graph not found
    #[error("Graph not found: {0}")]
    GraphNotFound(GraphId),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Pin not found
    #[error("Pin not found: {0}")]
    PinNotFound(PinId),

    /// No node type registered under this ID
    #[error("Unknown node type: {0}")]
    NodeTypeNotFound(String),

    /// The graph cannot host this class of node
    #[error("{kind:?} graph cannot contain {class:?} nodes")]
    NodeNotAllowed {
        /// Graph kind
        kind: GraphKind,
        /// Rejected node class
        class: NodeClass,
    },

    /// The pin was declared by the node type and cannot be removed
    #[error("Pin is not dynamic: {0}")]
    PinNotDynamic(PinId),

    /// The node type has no dynamic input template
    #[error("Node does not accept dynamic inputs: {0}")]
    NoDynamicInputs(NodeId),

    /// A transition conduit cannot join these states
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        /// Start state
        from: NodeId,
        /// End state
        to: NodeId,
    },
}

/// Error when saving or loading a document snapshot
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Serialization failed
    #[error("Failed to serialize graph: {0}")]
    Serialize(#[from] ron::Error),

    /// Deserialization failed
    #[error("Failed to parse graph: {0}")]
    Deserialize(#[from] ron::error::SpannedError),

    /// The root graph referenced by the snapshot is missing
    #[error("Snapshot has no root graph {0}")]
    MissingRoot(GraphId),
}

/// Result type for graph mutation
pub type Result<T> = std::result::Result<T, GraphError>;
