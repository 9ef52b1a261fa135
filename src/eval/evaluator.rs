//! Recursive tree-walking evaluation.

use crate::eval::delegate::DelegateRegistry;
use crate::model::{FilterNode, GroupNode, LogicalOperator, MultiFilterModel};
use crate::row::Row;

/// Evaluates filter trees against rows.
///
/// Evaluation is pure and deterministic: neither the tree nor the row is
/// mutated, so one evaluator (or many) can run over a shared model
/// concurrently.
#[derive(Default)]
pub struct Evaluator<'a> {
    delegates: Option<&'a DelegateRegistry>,
}

impl<'a> Evaluator<'a> {
    /// An evaluator with no delegates attached; `CUSTOM` groups and
    /// `Formula` nodes will evaluate fail-open
    pub fn new() -> Self {
        Self { delegates: None }
    }

    pub fn with_delegates(registry: &'a DelegateRegistry) -> Self {
        Self {
            delegates: Some(registry),
        }
    }

    /// Evaluate a whole model against one row
    pub fn evaluate_model(&self, model: &MultiFilterModel, row: &Row) -> bool {
        self.eval_group(&model.root, row)
    }

    /// Evaluate a single node against one row
    pub fn evaluate(&self, node: &FilterNode, row: &Row) -> bool {
        match node {
            FilterNode::Condition(c) => {
                // Disabled conditions never exclude rows
                if !c.enabled {
                    return true;
                }
                c.predicate.matches(row.get(&c.column_id))
            }
            FilterNode::Group(g) => self.eval_group(g, row),
            FilterNode::Formula(f) => match self.delegates.and_then(DelegateRegistry::formula_evaluator) {
                Some(evaluator) => evaluator.evaluate(&f.expression_text, row),
                None => {
                    log::debug!("Formula node '{}' has no evaluator attached; failing open", f.id);
                    true
                }
            },
            FilterNode::Natural(n) => match &n.parsed_interpretation {
                Some(interpretation) => self.evaluate(interpretation, row),
                // An uninterpreted query never hides rows
                None => true,
            },
        }
    }

    fn eval_group(&self, group: &GroupNode, row: &Row) -> bool {
        // Vacuous children (empty groups, transitively) contribute nothing.
        // Skipping them here is what makes the optimizer's empty-group
        // removal invisible to evaluation results.
        let children: Vec<&FilterNode> = group
            .children
            .iter()
            .filter(|c| !c.is_vacuous())
            .collect();

        if children.is_empty() {
            return group.operator.empty_group_value();
        }

        match group.operator {
            LogicalOperator::And => children.iter().all(|c| self.evaluate(c, row)),
            LogicalOperator::Or => children.iter().any(|c| self.evaluate(c, row)),
            LogicalOperator::Nand => !children.iter().all(|c| self.evaluate(c, row)),
            LogicalOperator::Nor => !children.iter().any(|c| self.evaluate(c, row)),
            // True iff an odd number of children are true
            LogicalOperator::Xor => {
                children.iter().filter(|c| self.evaluate(c, row)).count() % 2 == 1
            }
            LogicalOperator::Not => match children.as_slice() {
                [only] => !self.evaluate(only, row),
                _ => true,
            },
            LogicalOperator::IfThen | LogicalOperator::Implies => match children.as_slice() {
                [condition, consequent] => {
                    !self.evaluate(condition, row) || self.evaluate(consequent, row)
                }
                _ => true,
            },
            LogicalOperator::IfThenElse => match children.as_slice() {
                [condition, then_branch, else_branch] => {
                    if self.evaluate(condition, row) {
                        self.evaluate(then_branch, row)
                    } else {
                        self.evaluate(else_branch, row)
                    }
                }
                _ => true,
            },
            LogicalOperator::Biconditional => match children.as_slice() {
                [left, right] => self.evaluate(left, row) == self.evaluate(right, row),
                _ => true,
            },
            LogicalOperator::Custom => {
                let results: Vec<bool> = children.iter().map(|c| self.evaluate(c, row)).collect();
                let combinator = group
                    .combinator
                    .as_deref()
                    .and_then(|key| self.delegates.and_then(|d| d.combinator(key)));
                match combinator {
                    Some(combinator) => combinator.combine(&results),
                    None => {
                        log::debug!(
                            "CUSTOM group '{}' has no combinator registered; failing open",
                            group.id
                        );
                        true
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{NumberPredicate, TextPredicate};
    use std::sync::Arc;

    fn lit(id: &str, value: bool) -> FilterNode {
        // A boolean literal in tree form: flag == true / flag == false
        FilterNode::condition(
            id,
            "flag",
            if value {
                crate::predicate::BooleanPredicate::IsTrue
            } else {
                crate::predicate::BooleanPredicate::IsFalse
            },
        )
    }

    fn flag_row() -> Row {
        Row::new().with("flag", true)
    }

    fn eval_op(op: LogicalOperator, inputs: &[bool]) -> bool {
        let children = inputs
            .iter()
            .enumerate()
            .map(|(i, v)| lit(&format!("l{}", i), *v))
            .collect();
        let group = FilterNode::group("g", op, children);
        Evaluator::new().evaluate(&group, &flag_row())
    }

    #[test]
    fn test_scenario_two_conditions_under_and() {
        let group = FilterNode::group(
            "root",
            LogicalOperator::And,
            vec![
                FilterNode::condition("c1", "age", NumberPredicate::equals(30.0)),
                FilterNode::condition("c2", "dept", TextPredicate::equals("Eng")),
            ],
        );
        let evaluator = Evaluator::new();
        let matching = Row::new().with("age", 30.0).with("dept", "Eng");
        let off_by_one = Row::new().with("age", 31.0).with("dept", "Eng");
        assert!(evaluator.evaluate(&group, &matching));
        assert!(!evaluator.evaluate(&group, &off_by_one));
    }

    #[test]
    fn test_classical_operators() {
        assert!(eval_op(LogicalOperator::And, &[true, true]));
        assert!(!eval_op(LogicalOperator::And, &[true, false]));
        assert!(eval_op(LogicalOperator::Or, &[false, true]));
        assert!(!eval_op(LogicalOperator::Or, &[false, false]));
        assert!(!eval_op(LogicalOperator::Not, &[true]));
        assert!(eval_op(LogicalOperator::Not, &[false]));
    }

    #[test]
    fn test_non_classical_operators() {
        // XOR is true iff an odd number of children are true
        assert!(eval_op(LogicalOperator::Xor, &[true, false, false]));
        assert!(!eval_op(LogicalOperator::Xor, &[true, true, false]));
        assert!(eval_op(LogicalOperator::Xor, &[true, true, true]));

        assert!(eval_op(LogicalOperator::Nand, &[true, false]));
        assert!(!eval_op(LogicalOperator::Nand, &[true, true]));
        assert!(eval_op(LogicalOperator::Nor, &[false, false]));
        assert!(!eval_op(LogicalOperator::Nor, &[false, true]));
    }

    #[test]
    fn test_conditional_operators() {
        // IF_THEN / IMPLIES: !A || B
        for op in [LogicalOperator::IfThen, LogicalOperator::Implies] {
            assert!(eval_op(op, &[false, false]));
            assert!(eval_op(op, &[false, true]));
            assert!(!eval_op(op, &[true, false]));
            assert!(eval_op(op, &[true, true]));
        }

        assert!(eval_op(LogicalOperator::IfThenElse, &[true, true, false]));
        assert!(!eval_op(LogicalOperator::IfThenElse, &[true, false, true]));
        assert!(eval_op(LogicalOperator::IfThenElse, &[false, false, true]));

        assert!(eval_op(LogicalOperator::Biconditional, &[true, true]));
        assert!(eval_op(LogicalOperator::Biconditional, &[false, false]));
        assert!(!eval_op(LogicalOperator::Biconditional, &[true, false]));
    }

    #[test]
    fn test_empty_group_identities() {
        for op in [LogicalOperator::And, LogicalOperator::Nand] {
            assert!(eval_op(op, &[]), "empty {} should be true", op);
        }
        for op in [LogicalOperator::Or, LogicalOperator::Xor, LogicalOperator::Nor] {
            assert!(!eval_op(op, &[]), "empty {} should be false", op);
        }
    }

    #[test]
    fn test_vacuous_children_are_skipped() {
        // OR([empty AND group, false]) == false: the empty group does not
        // contribute an identity value as a child
        let group = FilterNode::group(
            "g",
            LogicalOperator::Or,
            vec![
                FilterNode::group("empty", LogicalOperator::And, vec![]),
                lit("l0", false),
            ],
        );
        assert!(!Evaluator::new().evaluate(&group, &flag_row()));
    }

    #[test]
    fn test_disabled_condition_is_transparent() {
        let mut node = FilterNode::condition("c1", "age", NumberPredicate::equals(99.0));
        if let FilterNode::Condition(c) = &mut node {
            c.enabled = false;
        }
        let row = Row::new().with("age", 30.0);
        assert!(Evaluator::new().evaluate(&node, &row));
    }

    #[test]
    fn test_null_cells() {
        let evaluator = Evaluator::new();
        let empty = FilterNode::condition("c1", "age", NumberPredicate::IsEmpty);
        let not_empty = FilterNode::condition("c2", "age", NumberPredicate::IsNotEmpty);
        let gt = FilterNode::condition("c3", "age", NumberPredicate::GreaterThan { value: 0.0 });

        let absent = Row::new();
        let null = Row::new().with("age", crate::row::Value::Null);
        let present = Row::new().with("age", 5.0);

        assert!(evaluator.evaluate(&empty, &absent));
        assert!(evaluator.evaluate(&empty, &null));
        assert!(!evaluator.evaluate(&empty, &present));
        assert!(!evaluator.evaluate(&not_empty, &absent));
        assert!(evaluator.evaluate(&not_empty, &present));
        assert!(!evaluator.evaluate(&gt, &null));
    }

    #[test]
    fn test_delegates_fail_open_when_missing() {
        let evaluator = Evaluator::new();
        let row = Row::new();
        assert!(evaluator.evaluate(&FilterNode::formula("f1", "a > b"), &row));
        assert!(evaluator.evaluate(&FilterNode::natural("n1", "recent rows"), &row));
        assert!(evaluator.evaluate(&FilterNode::custom_group("g1", "vote", vec![]), &row));
    }

    #[test]
    fn test_custom_combinator_delegation() {
        let registry = DelegateRegistry::new();
        registry.register_combinator(
            "exactly-one",
            Arc::new(|results: &[bool]| results.iter().filter(|r| **r).count() == 1),
        );
        let evaluator = Evaluator::with_delegates(&registry);

        let group = FilterNode::custom_group(
            "g1",
            "exactly-one",
            vec![lit("a", true), lit("b", false), lit("c", false)],
        );
        assert!(evaluator.evaluate(&group, &flag_row()));

        let group2 =
            FilterNode::custom_group("g2", "exactly-one", vec![lit("a", true), lit("b", true)]);
        assert!(!evaluator.evaluate(&group2, &flag_row()));
    }

    #[test]
    fn test_formula_delegation() {
        let registry = DelegateRegistry::new();
        registry.set_formula_evaluator(Arc::new(|expr: &str, row: &Row| {
            // Toy engine understanding a single expression
            expr == "flag" && row.get("flag").and_then(crate::row::Value::as_bool) == Some(true)
        }));
        let evaluator = Evaluator::with_delegates(&registry);
        assert!(evaluator.evaluate(&FilterNode::formula("f1", "flag"), &flag_row()));
        assert!(!evaluator.evaluate(&FilterNode::formula("f2", "other"), &flag_row()));
    }

    #[test]
    fn test_resolved_natural_node() {
        let mut natural = FilterNode::natural("n1", "age is thirty");
        if let FilterNode::Natural(n) = &mut natural {
            n.parsed_interpretation = Some(Box::new(FilterNode::condition(
                "n1-parsed",
                "age",
                NumberPredicate::equals(30.0),
            )));
        }
        let evaluator = Evaluator::new();
        assert!(evaluator.evaluate(&natural, &Row::new().with("age", 30.0)));
        assert!(!evaluator.evaluate(&natural, &Row::new().with("age", 31.0)));
    }
}
