//! Error types for model validation and structural edits.

use crate::model::node::NodeId;
use thiserror::Error;

/// Classification of a validation violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Missing/duplicate id, illegal shape, depth or node-count limit
    Structural,
    /// Bad operand: non-positive divisor, inverted range bounds, excessive
    /// precision
    Operand,
}

/// One validation violation, attributed to a node.
///
/// Validation returns every violation it finds as a flat list, never just
/// the first, so an editor can highlight all problems in one pass.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{node_id}: {message}")]
pub struct ValidationError {
    pub node_id: NodeId,
    pub kind: ViolationKind,
    pub message: String,
}

impl ValidationError {
    pub fn structural(node_id: impl Into<NodeId>, message: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            kind: ViolationKind::Structural,
            message: message.into(),
        }
    }

    pub fn operand(node_id: impl Into<NodeId>, message: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            kind: ViolationKind::Operand,
            message: message.into(),
        }
    }
}

/// Errors raised by the structural edit API. A failed edit leaves the
/// model untouched (version is not bumped).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("No group with id '{0}'")]
    GroupNotFound(String),

    #[error("No condition with id '{0}'")]
    ConditionNotFound(String),

    #[error("No node with id '{0}'")]
    NodeNotFound(String),

    #[error("The root group cannot be removed")]
    CannotRemoveRoot,

    #[error("Child index {index} out of bounds for group with {len} children")]
    IndexOutOfBounds { index: usize, len: usize },
}
