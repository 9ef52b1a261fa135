//! Static selectivity heuristics.
//!
//! Selectivity is the estimated fraction of rows a node passes; lower is
//! more restrictive. The table is a fixed heuristic with no feedback from
//! actual evaluation results; it only steers child ordering, never
//! correctness.

use crate::model::FilterNode;
use crate::predicate::{
    BooleanPredicate, DatePredicate, NumberPredicate, Predicate, TextPredicate,
};

/// Fallback for nodes the table has no opinion on
pub const DEFAULT_SELECTIVITY: f64 = 0.5;

/// Estimated selectivity of a node
pub fn estimate(node: &FilterNode) -> f64 {
    match node {
        FilterNode::Condition(c) => {
            if c.enabled {
                predicate_selectivity(&c.predicate)
            } else {
                // Disabled conditions pass every row
                1.0
            }
        }
        FilterNode::Group(_) | FilterNode::Formula(_) => DEFAULT_SELECTIVITY,
        FilterNode::Natural(n) => n
            .parsed_interpretation
            .as_deref()
            .map_or(DEFAULT_SELECTIVITY, estimate),
    }
}

/// Estimated selectivity of a leaf predicate
pub fn predicate_selectivity(predicate: &Predicate) -> f64 {
    match predicate {
        Predicate::Text(p) => match p {
            TextPredicate::Equals { .. } => 0.1,
            TextPredicate::NotEquals { .. } => 0.9,
            TextPredicate::Contains { .. } => 0.4,
            TextPredicate::NotContains { .. } => 0.6,
            TextPredicate::StartsWith { .. } | TextPredicate::EndsWith { .. } => 0.25,
            TextPredicate::IsEmpty => 0.05,
            TextPredicate::IsNotEmpty => 0.95,
        },
        Predicate::Number(p) => match p {
            NumberPredicate::Equals { .. } => 0.1,
            NumberPredicate::NotEquals { .. } => 0.9,
            NumberPredicate::GreaterThan { .. }
            | NumberPredicate::GreaterThanOrEqual { .. }
            | NumberPredicate::LessThan { .. }
            | NumberPredicate::LessThanOrEqual { .. } => 0.4,
            NumberPredicate::InRange { .. } => 0.3,
            NumberPredicate::NotInRange { .. } => 0.7,
            NumberPredicate::IsEmpty => 0.05,
            NumberPredicate::IsNotEmpty => 0.95,
            NumberPredicate::IsEven | NumberPredicate::IsOdd => 0.5,
            NumberPredicate::IsDivisibleBy { .. } => 0.2,
            NumberPredicate::IsPrime => 0.15,
            NumberPredicate::IsInteger => 0.8,
            NumberPredicate::IsDecimal => 0.2,
        },
        Predicate::Date(p) => match p {
            DatePredicate::Equals { .. } => 0.1,
            DatePredicate::NotEquals { .. } => 0.9,
            DatePredicate::Before { .. } | DatePredicate::After { .. } => 0.4,
            DatePredicate::InRange { .. } => 0.3,
            DatePredicate::IsEmpty => 0.05,
            DatePredicate::IsNotEmpty => 0.95,
        },
        Predicate::Boolean(p) => match p {
            BooleanPredicate::IsTrue | BooleanPredicate::IsFalse => DEFAULT_SELECTIVITY,
            BooleanPredicate::IsEmpty => 0.05,
            BooleanPredicate::IsNotEmpty => 0.95,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_orders_operators_sensibly() {
        let equals: Predicate = NumberPredicate::equals(1.0).into();
        let not_equals: Predicate = NumberPredicate::not_equals(1.0).into();
        let is_empty: Predicate = NumberPredicate::IsEmpty.into();
        assert!(predicate_selectivity(&is_empty) < predicate_selectivity(&equals));
        assert!(predicate_selectivity(&equals) < predicate_selectivity(&not_equals));
    }

    #[test]
    fn test_disabled_conditions_pass_everything() {
        let mut node = FilterNode::condition("c", "x", NumberPredicate::equals(1.0));
        assert_eq!(estimate(&node), 0.1);
        if let FilterNode::Condition(c) = &mut node {
            c.enabled = false;
        }
        assert_eq!(estimate(&node), 1.0);
    }

    #[test]
    fn test_opaque_nodes_use_the_default() {
        assert_eq!(estimate(&FilterNode::formula("f", "x")), DEFAULT_SELECTIVITY);
        assert_eq!(estimate(&FilterNode::natural("n", "query")), DEFAULT_SELECTIVITY);
    }
}
