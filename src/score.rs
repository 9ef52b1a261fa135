//! Static complexity scoring.
//!
//! Every node costs 1 point plus an operator-specific surcharge; opaque
//! delegate nodes carry flat surcharges of their own since their cost is
//! inherently uncertain. The score is advisory: it drives UI warnings and
//! nothing else.

use crate::model::{FilterNode, LogicalOperator, MultiFilterModel};

/// Coarse classification of a score for UI warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexityBand {
    Low,
    Moderate,
    High,
}

impl ComplexityBand {
    /// Band boundaries: below 15 is low, below 40 moderate, else high
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=14 => ComplexityBand::Low,
            15..=39 => ComplexityBand::Moderate,
            _ => ComplexityBand::High,
        }
    }
}

/// Surcharge added on top of the per-node point
fn operator_surcharge(operator: LogicalOperator) -> u32 {
    match operator {
        LogicalOperator::And | LogicalOperator::Or | LogicalOperator::Not => 1,
        LogicalOperator::Xor | LogicalOperator::Nand | LogicalOperator::Nor => 2,
        LogicalOperator::IfThen | LogicalOperator::Implies => 3,
        LogicalOperator::IfThenElse | LogicalOperator::Biconditional => 4,
        LogicalOperator::Custom => 5,
    }
}

const FORMULA_SURCHARGE: u32 = 5;
const NATURAL_SURCHARGE: u32 = 3;

/// Complexity estimate for a whole model
pub fn score(model: &MultiFilterModel) -> u32 {
    1 + operator_surcharge(model.root.operator)
        + model.root.children.iter().map(score_node).sum::<u32>()
}

/// Complexity estimate for a subtree
pub fn score_node(node: &FilterNode) -> u32 {
    match node {
        FilterNode::Condition(_) => 1,
        FilterNode::Group(g) => {
            1 + operator_surcharge(g.operator)
                + g.children.iter().map(score_node).sum::<u32>()
        }
        FilterNode::Formula(_) => 1 + FORMULA_SURCHARGE,
        FilterNode::Natural(n) => {
            1 + NATURAL_SURCHARGE
                + n.parsed_interpretation.as_deref().map_or(0, score_node)
        }
    }
}

/// Advisory band for a model
pub fn band(model: &MultiFilterModel) -> ComplexityBand {
    ComplexityBand::from_score(score(model))
}
