//! Diagnostics for partially-expressible filters.

use crate::model::NodeId;

/// A node the compiler could not express in the target language.
///
/// Compilation never fails for this: the node degrades to a tautology and
/// lands here so the caller can surface a warning.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedNode {
    pub node_id: NodeId,
    pub detail: String,
}

impl UnsupportedNode {
    pub fn new(node_id: impl Into<NodeId>, detail: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            detail: detail.into(),
        }
    }
}
