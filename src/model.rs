//! The filter tree model.
//!
//! This module provides:
//! - The closed `FilterNode` sum type and `MultiFilterModel` lifecycle
//! - The structural edit API (add/remove/reorder, operator and predicate
//!   changes) with per-edit versioning
//! - Exhaustive validation against explicit `EngineConfig` limits

pub mod config;
pub mod error;
pub mod node;
pub mod validate;

pub use config::EngineConfig;
pub use error::{EditError, ValidationError, ViolationKind};
pub use node::{
    ConditionNode, FilterNode, FormulaNode, GroupNode, LogicalOperator, MultiFilterModel,
    NaturalNode, NodeId,
};
pub use validate::validate;
