//! Engine limits, passed explicitly into validation and optimization.

/// Externally configured engine limits.
///
/// An explicit value object rather than ambient module state, so two
/// callers with different limits can share the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum nesting depth of the tree (root group = depth 1)
    pub max_filter_depth: usize,
    /// Maximum total node count, root included
    pub max_filter_nodes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_filter_depth: 16,
            max_filter_nodes: 256,
        }
    }
}

impl EngineConfig {
    pub fn new(max_filter_depth: usize, max_filter_nodes: usize) -> Self {
        Self {
            max_filter_depth,
            max_filter_nodes,
        }
    }
}
