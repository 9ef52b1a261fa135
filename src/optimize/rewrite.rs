//! Structure-preserving tree rewrites.

use crate::model::{FilterNode, GroupNode};
use crate::optimize::selectivity;

/// Pass 1: remove empty groups, bottom-up.
///
/// Returns `None` when the node is a group left with no children after its
/// own subtree was cleaned. The evaluator already treats such groups as
/// contributing nothing, so dropping them cannot change results.
pub fn remove_empty_groups(node: FilterNode) -> Option<FilterNode> {
    match node {
        FilterNode::Group(mut group) => {
            group.children = group
                .children
                .into_iter()
                .filter_map(remove_empty_groups)
                .collect();
            if group.children.is_empty() {
                None
            } else {
                Some(FilterNode::Group(group))
            }
        }
        other => Some(other),
    }
}

/// Pass 2: flatten single-child groups, bottom-up.
///
/// Only applies when the sole child is not itself a group (explicit
/// operator boundaries between nested groups are preserved), and only for
/// operators where a one-child group is equivalent to the child itself
/// (AND/OR/XOR). Arity-constrained operators never match the shape, and
/// NAND/NOR of one child is a negation that must stay.
pub fn flatten_single_child(node: FilterNode) -> FilterNode {
    match node {
        FilterNode::Group(mut group) => {
            group.children = group
                .children
                .into_iter()
                .map(flatten_single_child)
                .collect();

            let flattenable = matches!(
                group.operator,
                crate::model::LogicalOperator::And
                    | crate::model::LogicalOperator::Or
                    | crate::model::LogicalOperator::Xor
            );
            if flattenable
                && group.children.len() == 1
                && !matches!(group.children[0], FilterNode::Group(_))
            {
                if let Some(child) = group.children.pop() {
                    return child;
                }
            }
            FilterNode::Group(group)
        }
        other => other,
    }
}

/// Pass 3: reorder children by estimated selectivity.
///
/// AND-family groups put the most selective (lowest-scoring) children
/// first so short-circuit evaluation rejects rows cheaply; OR-family
/// groups put the least selective first for cheap acceptance. Positional
/// operators (NOT, conditionals, CUSTOM) are left untouched. The sort is
/// stable, which makes the pass idempotent.
pub fn reorder_by_selectivity(group: &mut GroupNode) {
    for child in &mut group.children {
        if let FilterNode::Group(g) = child {
            reorder_by_selectivity(g);
        }
    }

    if group.operator.is_positional() {
        return;
    }
    if group.operator.is_and_family() {
        group
            .children
            .sort_by(|a, b| selectivity::estimate(a).total_cmp(&selectivity::estimate(b)));
    } else if group.operator.is_or_family() {
        group
            .children
            .sort_by(|a, b| selectivity::estimate(b).total_cmp(&selectivity::estimate(a)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LogicalOperator;
    use crate::predicate::NumberPredicate;

    fn cond(id: &str) -> FilterNode {
        FilterNode::condition(id, "x", NumberPredicate::equals(1.0))
    }

    #[test]
    fn test_nested_empty_groups_collapse() {
        let node = FilterNode::group(
            "outer",
            LogicalOperator::And,
            vec![FilterNode::group(
                "inner",
                LogicalOperator::Or,
                vec![FilterNode::group("innermost", LogicalOperator::And, vec![])],
            )],
        );
        assert!(remove_empty_groups(node).is_none());
    }

    #[test]
    fn test_survivors_are_kept() {
        let node = FilterNode::group(
            "outer",
            LogicalOperator::And,
            vec![
                FilterNode::group("empty", LogicalOperator::Or, vec![]),
                cond("c1"),
            ],
        );
        let cleaned = remove_empty_groups(node).unwrap();
        let group = cleaned.as_group().unwrap();
        assert_eq!(group.children.len(), 1);
        assert_eq!(group.children[0].id(), &crate::model::NodeId::from("c1"));
    }

    #[test]
    fn test_flatten_replaces_single_leaf_child() {
        let node = FilterNode::group("g", LogicalOperator::Or, vec![cond("c1")]);
        let flattened = flatten_single_child(node);
        assert_eq!(flattened.id(), &crate::model::NodeId::from("c1"));
    }

    #[test]
    fn test_flatten_keeps_nested_group_boundaries() {
        // A group whose sole child is itself a group is not flattened
        let node = FilterNode::group(
            "g",
            LogicalOperator::And,
            vec![FilterNode::group("h", LogicalOperator::Or, vec![cond("c1"), cond("c2")])],
        );
        let flattened = flatten_single_child(node);
        let group = flattened.as_group().unwrap();
        assert_eq!(group.id, crate::model::NodeId::from("g"));
        assert_eq!(group.children.len(), 1);
    }

    #[test]
    fn test_flatten_leaves_negating_operators_alone() {
        let node = FilterNode::group("g", LogicalOperator::Nand, vec![cond("c1")]);
        assert!(matches!(flatten_single_child(node), FilterNode::Group(_)));
        let node = FilterNode::group("g", LogicalOperator::Not, vec![cond("c1")]);
        assert!(matches!(flatten_single_child(node), FilterNode::Group(_)));
    }

    #[test]
    fn test_and_group_sorts_most_selective_first() {
        let mut group = GroupNode {
            id: "g".into(),
            operator: LogicalOperator::And,
            children: vec![
                FilterNode::condition("ne", "x", NumberPredicate::not_equals(1.0)), // 0.9
                FilterNode::condition("eq", "x", NumberPredicate::equals(1.0)),     // 0.1
                FilterNode::condition("gt", "x", NumberPredicate::GreaterThan { value: 0.0 }), // 0.4
            ],
            combinator: None,
        };
        reorder_by_selectivity(&mut group);
        let ids: Vec<&str> = group.children.iter().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, ["eq", "gt", "ne"]);
    }

    #[test]
    fn test_or_group_sorts_least_selective_first() {
        let mut group = GroupNode {
            id: "g".into(),
            operator: LogicalOperator::Or,
            children: vec![
                FilterNode::condition("eq", "x", NumberPredicate::equals(1.0)), // 0.1
                FilterNode::condition("ne", "x", NumberPredicate::not_equals(1.0)), // 0.9
            ],
            combinator: None,
        };
        reorder_by_selectivity(&mut group);
        let ids: Vec<&str> = group.children.iter().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, ["ne", "eq"]);
    }

    #[test]
    fn test_positional_groups_are_never_reordered() {
        let mut group = GroupNode {
            id: "g".into(),
            operator: LogicalOperator::IfThen,
            children: vec![
                FilterNode::condition("ne", "x", NumberPredicate::not_equals(1.0)),
                FilterNode::condition("eq", "x", NumberPredicate::equals(1.0)),
            ],
            combinator: None,
        };
        reorder_by_selectivity(&mut group);
        let ids: Vec<&str> = group.children.iter().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, ["ne", "eq"]);
    }
}
