use thiserror::Error;

use crate::{Dir, Key, NodeId};

/// Errors returned at the public boundary of an [`AvlTree`](crate::AvlTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A range query was issued against a tree with no nodes.
    #[error("range query on an empty tree")]
    EmptyTree,

    /// The key is already present; the tree was left unchanged.
    #[error("key {0} is already present in the tree")]
    DuplicateKey(Key),

    /// A rotation needed a child that the node does not have.
    #[error("node {node:?} has no {dir:?} child to rotate")]
    MissingChild { node: NodeId, dir: Dir },

    /// The handle does not refer to a live node of this tree.
    #[error("node {0:?} is not a live node of this tree")]
    StaleNode(NodeId),
}
