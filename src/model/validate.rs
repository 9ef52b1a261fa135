//! Tree validation.
//!
//! A single walk that collects every violation it finds. Depth and node
//! count are checked here rather than at construction time, so transient
//! editor states (mid-drag, half-built groups) are representable; they just
//! do not validate until fixed.

use crate::model::config::EngineConfig;
use crate::model::error::ValidationError;
use crate::model::node::{ConditionNode, FilterNode, GroupNode, MultiFilterModel, NodeId};
use crate::predicate::{DatePredicate, NumberPredicate, Predicate, MAX_PRECISION};
use std::collections::HashSet;

/// Validate a model against the configured limits.
///
/// Returns `Ok(())` or the complete list of violations; never stops at the
/// first problem.
pub fn validate(model: &MultiFilterModel, config: &EngineConfig) -> Result<(), Vec<ValidationError>> {
    let mut walk = Walk {
        config,
        seen_ids: HashSet::new(),
        errors: Vec::new(),
    };
    walk.group(&model.root, 1);

    let count = model.node_count();
    if count > config.max_filter_nodes {
        walk.errors.push(ValidationError::structural(
            model.root.id.clone(),
            format!(
                "Filter has {} nodes, exceeding the limit of {}",
                count, config.max_filter_nodes
            ),
        ));
    }

    if walk.errors.is_empty() {
        Ok(())
    } else {
        Err(walk.errors)
    }
}

struct Walk<'a> {
    config: &'a EngineConfig,
    seen_ids: HashSet<NodeId>,
    errors: Vec<ValidationError>,
}

impl Walk<'_> {
    fn node(&mut self, node: &FilterNode, depth: usize) {
        match node {
            FilterNode::Condition(c) => {
                self.common(node.id(), depth);
                self.condition(c);
            }
            FilterNode::Group(g) => self.group(g, depth),
            FilterNode::Formula(f) => {
                self.common(node.id(), depth);
                if f.expression_text.trim().is_empty() {
                    self.errors.push(ValidationError::structural(
                        f.id.clone(),
                        "Formula expression must not be empty",
                    ));
                }
            }
            FilterNode::Natural(n) => {
                self.common(node.id(), depth);
                if let Some(interpretation) = &n.parsed_interpretation {
                    self.node(interpretation, depth + 1);
                }
            }
        }
    }

    fn group(&mut self, group: &GroupNode, depth: usize) {
        self.common(&group.id, depth);

        if let Some(required) = group.operator.required_arity() {
            let found = group.children.len();
            if found != required {
                self.errors.push(ValidationError::structural(
                    group.id.clone(),
                    format!(
                        "{} group requires exactly {} child(ren), found {}",
                        group.operator, required, found
                    ),
                ));
            }
        }

        for child in &group.children {
            self.node(child, depth + 1);
        }
    }

    fn common(&mut self, id: &NodeId, depth: usize) {
        if id.as_str().is_empty() {
            self.errors
                .push(ValidationError::structural(id.clone(), "Node id must not be empty"));
        } else if !self.seen_ids.insert(id.clone()) {
            self.errors.push(ValidationError::structural(
                id.clone(),
                format!("Duplicate node id '{}'", id),
            ));
        }

        if depth > self.config.max_filter_depth {
            self.errors.push(ValidationError::structural(
                id.clone(),
                format!(
                    "Node at depth {} exceeds the maximum filter depth of {}",
                    depth, self.config.max_filter_depth
                ),
            ));
        }
    }

    fn condition(&mut self, condition: &ConditionNode) {
        if condition.column_id.is_empty() {
            self.errors.push(ValidationError::structural(
                condition.id.clone(),
                "Condition column id must not be empty",
            ));
        }
        self.predicate(&condition.id, &condition.predicate);
    }

    fn predicate(&mut self, id: &NodeId, predicate: &Predicate) {
        match predicate {
            Predicate::Number(p) => self.number_predicate(id, p),
            Predicate::Date(DatePredicate::InRange { low, high }) if low > high => {
                self.errors.push(ValidationError::operand(
                    id.clone(),
                    "Range lower bound must not exceed upper bound",
                ));
            }
            _ => {}
        }
    }

    fn finite_operand(&mut self, id: &NodeId, value: f64) {
        if !value.is_finite() {
            self.errors.push(ValidationError::operand(
                id.clone(),
                "Operand must be a finite number",
            ));
        }
    }

    fn number_predicate(&mut self, id: &NodeId, predicate: &NumberPredicate) {
        match *predicate {
            NumberPredicate::Equals { value, precision }
            | NumberPredicate::NotEquals { value, precision } => {
                self.finite_operand(id, value);
                if precision > MAX_PRECISION {
                    self.errors.push(ValidationError::operand(
                        id.clone(),
                        format!("Precision must be at most {}", MAX_PRECISION),
                    ));
                }
            }
            NumberPredicate::GreaterThan { value }
            | NumberPredicate::GreaterThanOrEqual { value }
            | NumberPredicate::LessThan { value }
            | NumberPredicate::LessThanOrEqual { value } => self.finite_operand(id, value),
            NumberPredicate::InRange { low, high } | NumberPredicate::NotInRange { low, high } => {
                self.finite_operand(id, low);
                self.finite_operand(id, high);
                if low > high {
                    self.errors.push(ValidationError::operand(
                        id.clone(),
                        "Range lower bound must not exceed upper bound",
                    ));
                }
            }
            NumberPredicate::IsDivisibleBy { divisor } => {
                if divisor <= 0 {
                    self.errors.push(ValidationError::operand(
                        id.clone(),
                        "Divisor must be greater than zero",
                    ));
                }
            }
            NumberPredicate::IsEmpty
            | NumberPredicate::IsNotEmpty
            | NumberPredicate::IsEven
            | NumberPredicate::IsOdd
            | NumberPredicate::IsPrime
            | NumberPredicate::IsInteger
            | NumberPredicate::IsDecimal => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::error::ViolationKind;
    use crate::model::node::LogicalOperator;
    use crate::predicate::TextPredicate;

    fn model_with(children: Vec<FilterNode>) -> MultiFilterModel {
        let mut model = MultiFilterModel::new("grid");
        model.root.children = children;
        model
    }

    #[test]
    fn test_valid_model_passes() {
        let model = model_with(vec![
            FilterNode::condition("c1", "age", NumberPredicate::equals(30.0)),
            FilterNode::group(
                "g1",
                LogicalOperator::Not,
                vec![FilterNode::condition("c2", "dept", TextPredicate::equals("Eng"))],
            ),
        ]);
        assert!(validate(&model, &EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_divisor_is_an_operand_error() {
        let model = model_with(vec![FilterNode::condition(
            "c1",
            "n",
            NumberPredicate::IsDivisibleBy { divisor: 0 },
        )]);
        let errors = validate(&model, &EngineConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ViolationKind::Operand);
        assert_eq!(errors[0].message, "Divisor must be greater than zero");
        assert_eq!(errors[0].node_id, NodeId::from("c1"));
    }

    #[test]
    fn test_inverted_range_is_rejected_not_repaired() {
        let model = model_with(vec![FilterNode::condition(
            "c1",
            "n",
            NumberPredicate::InRange { low: 10.0, high: 1.0 },
        )]);
        let errors = validate(&model, &EngineConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ViolationKind::Operand);
    }

    #[test]
    fn test_arity_violations() {
        let model = model_with(vec![
            FilterNode::group("not", LogicalOperator::Not, vec![]),
            FilterNode::group(
                "ite",
                LogicalOperator::IfThenElse,
                vec![FilterNode::formula("f1", "a"), FilterNode::formula("f2", "b")],
            ),
        ]);
        let errors = validate(&model, &EngineConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("NOT group requires exactly 1"));
        assert!(errors[1].message.contains("IF_THEN_ELSE group requires exactly 3"));
    }

    #[test]
    fn test_every_violation_is_reported() {
        // Four independent problems: duplicate id, empty column id, zero
        // divisor, inverted range.
        let model = model_with(vec![
            FilterNode::condition("c1", "a", NumberPredicate::equals(1.0)),
            FilterNode::condition("c1", "", NumberPredicate::equals(1.0)),
            FilterNode::condition("c2", "n", NumberPredicate::IsDivisibleBy { divisor: -3 }),
            FilterNode::condition("c3", "n", NumberPredicate::NotInRange { low: 5.0, high: 0.0 }),
        ]);
        let errors = validate(&model, &EngineConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_depth_limit() {
        let mut node = FilterNode::condition("leaf", "x", NumberPredicate::equals(1.0));
        for i in 0..5 {
            node = FilterNode::group(format!("g{}", i), LogicalOperator::And, vec![node]);
        }
        let model = model_with(vec![node]);
        assert!(validate(&model, &EngineConfig::new(10, 256)).is_ok());
        let errors = validate(&model, &EngineConfig::new(3, 256)).unwrap_err();
        // Everything below the cut-off is reported
        assert!(!errors.is_empty());
        assert!(errors.iter().all(|e| e.kind == ViolationKind::Structural));
    }

    #[test]
    fn test_node_count_limit() {
        let children = (0..20)
            .map(|i| {
                FilterNode::condition(format!("c{}", i), "x", NumberPredicate::equals(f64::from(i)))
            })
            .collect();
        let model = model_with(children);
        assert!(validate(&model, &EngineConfig::default()).is_ok());
        let errors = validate(&model, &EngineConfig::new(16, 10)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("exceeding the limit"));
    }

    #[test]
    fn test_natural_interpretation_is_validated() {
        let mut natural = FilterNode::natural("n1", "age under 0");
        if let FilterNode::Natural(n) = &mut natural {
            n.parsed_interpretation = Some(Box::new(FilterNode::condition(
                "n1-parsed",
                "age",
                NumberPredicate::InRange { low: 1.0, high: 0.0 },
            )));
        }
        let model = model_with(vec![natural]);
        let errors = validate(&model, &EngineConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].node_id, NodeId::from("n1-parsed"));
    }

    #[test]
    fn test_nan_operand_rejected() {
        let model = model_with(vec![FilterNode::condition(
            "c1",
            "n",
            NumberPredicate::GreaterThan { value: f64::NAN },
        )]);
        let errors = validate(&model, &EngineConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Operand must be a finite number");
    }
}
