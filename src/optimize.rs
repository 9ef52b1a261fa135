//! Cost-based tree optimization.
//!
//! Three passes, applied in a fixed order, each assuming the previous has
//! already run on the subtree:
//! 1. Remove empty groups (dead editor leftovers)
//! 2. Flatten single-child groups where that is an identity rewrite
//! 3. Reorder children by estimated selectivity as a short-circuit hint
//!
//! The transformation is pure: the input model is untouched and the result
//! is a new model with `version + 1`. Re-running it reaches a fixed point
//! immediately (`optimize(optimize(m)).root == optimize(m).root`), and for
//! every row the optimized tree evaluates to the same boolean as the
//! original.

pub mod rewrite;
pub mod selectivity;

pub use selectivity::{estimate, predicate_selectivity, DEFAULT_SELECTIVITY};

use crate::model::node::now_millis;
use crate::model::MultiFilterModel;

/// Produce an optimized copy of a model
pub fn optimize(model: &MultiFilterModel) -> MultiFilterModel {
    let mut root = model.root.clone();

    root.children = root
        .children
        .into_iter()
        .filter_map(rewrite::remove_empty_groups)
        .collect();

    root.children = root
        .children
        .into_iter()
        .map(rewrite::flatten_single_child)
        .collect();

    rewrite::reorder_by_selectivity(&mut root);

    MultiFilterModel {
        target_id: model.target_id.clone(),
        root,
        version: model.version + 1,
        created_at: model.created_at,
        modified_at: now_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Evaluator;
    use crate::model::{FilterNode, LogicalOperator, NodeId};
    use crate::predicate::{NumberPredicate, TextPredicate};
    use crate::row::Row;

    #[test]
    fn test_empty_inner_group_is_removed() {
        // OR group holding an empty AND group and one condition: the empty
        // group disappears and the survivor is flattened into place.
        let mut model = MultiFilterModel::new("grid");
        model.root.children = vec![FilterNode::group(
            "or",
            LogicalOperator::Or,
            vec![
                FilterNode::group("empty-and", LogicalOperator::And, vec![]),
                FilterNode::condition("c1", "dept", TextPredicate::equals("Eng")),
            ],
        )];

        let optimized = optimize(&model);
        assert_eq!(optimized.version, model.version + 1);
        assert_eq!(optimized.root.children.len(), 1);
        assert_eq!(optimized.root.children[0].id(), &NodeId::from("c1"));
        // The original is untouched
        assert_eq!(model.root.children[0].as_group().unwrap().children.len(), 2);
    }

    #[test]
    fn test_optimize_is_idempotent() {
        let mut model = MultiFilterModel::new("grid");
        model.root.children = vec![
            FilterNode::condition("ne", "x", NumberPredicate::not_equals(5.0)),
            FilterNode::group(
                "g1",
                LogicalOperator::Or,
                vec![
                    FilterNode::group("g2", LogicalOperator::And, vec![]),
                    FilterNode::condition("eq", "x", NumberPredicate::equals(5.0)),
                    FilterNode::condition("prime", "x", NumberPredicate::IsPrime),
                ],
            ),
        ];

        let once = optimize(&model);
        let twice = optimize(&once);
        assert_eq!(once.root, twice.root);
    }

    #[test]
    fn test_optimization_preserves_semantics() {
        let mut model = MultiFilterModel::new("grid");
        model.root.children = vec![
            FilterNode::group(
                "or",
                LogicalOperator::Or,
                vec![
                    FilterNode::group("dead", LogicalOperator::And, vec![]),
                    FilterNode::condition("c1", "age", NumberPredicate::LessThan { value: 18.0 }),
                    FilterNode::condition("c2", "age", NumberPredicate::GreaterThan { value: 65.0 }),
                ],
            ),
            FilterNode::condition("c3", "dept", TextPredicate::equals("Eng")),
        ];
        let optimized = optimize(&model);

        let evaluator = Evaluator::new();
        for age in [10.0, 18.0, 40.0, 66.0] {
            for dept in ["Eng", "Sales"] {
                let row = Row::new().with("age", age).with("dept", dept);
                assert_eq!(
                    evaluator.evaluate_model(&model, &row),
                    evaluator.evaluate_model(&optimized, &row),
                    "age={} dept={}",
                    age,
                    dept
                );
            }
        }
    }

    #[test]
    fn test_root_and_group_is_reordered() {
        let mut model = MultiFilterModel::new("grid");
        model.root.children = vec![
            FilterNode::condition("ne", "x", NumberPredicate::not_equals(1.0)),
            FilterNode::condition("eq", "x", NumberPredicate::equals(1.0)),
        ];
        let optimized = optimize(&model);
        let ids: Vec<&str> = optimized.root.children.iter().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, ["eq", "ne"]);
    }

    #[test]
    fn test_empty_model_stays_empty() {
        let model = MultiFilterModel::new("grid");
        let optimized = optimize(&model);
        assert!(optimized.root.children.is_empty());
        assert_eq!(optimized.root.id, NodeId::from("root"));
    }
}
