//! Error types for document operations.

use thiserror::Error;

use crate::node::NodeId;

/// Errors raised by [`Document`](crate::Document) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The node id is not (or no longer) part of the arena
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    /// The operation needs an element node
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    /// The operation needs a text node
    #[error("node {0} is not a text node")]
    NotAText(NodeId),

    /// The reference node is not a child of the given parent
    #[error("node {child} is not a child of node {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// Inserting the node would make it its own ancestor
    #[error("node {0} cannot be inserted into its own subtree")]
    HierarchyRequest(NodeId),
}

/// Result type for document operations.
pub type DomResult<T> = Result<T, DomError>;
