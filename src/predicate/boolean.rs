//! Boolean predicates.

use crate::row::Value;
use serde::{Deserialize, Serialize};

/// Predicate over boolean cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum BooleanPredicate {
    IsTrue,
    IsFalse,
    IsEmpty,
    IsNotEmpty,
}

impl BooleanPredicate {
    /// Operator name as it appears in the JSON schema
    pub fn op_name(&self) -> &'static str {
        match self {
            BooleanPredicate::IsTrue => "isTrue",
            BooleanPredicate::IsFalse => "isFalse",
            BooleanPredicate::IsEmpty => "isEmpty",
            BooleanPredicate::IsNotEmpty => "isNotEmpty",
        }
    }

    /// Apply this predicate to a cell
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let cell = value.filter(|v| !v.is_null());
        match self {
            BooleanPredicate::IsEmpty => cell.is_none(),
            BooleanPredicate::IsNotEmpty => cell.is_some(),
            BooleanPredicate::IsTrue => cell.and_then(Value::as_bool) == Some(true),
            BooleanPredicate::IsFalse => cell.and_then(Value::as_bool) == Some(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truth_checks() {
        assert!(BooleanPredicate::IsTrue.matches(Some(&Value::Bool(true))));
        assert!(!BooleanPredicate::IsTrue.matches(Some(&Value::Bool(false))));
        assert!(BooleanPredicate::IsFalse.matches(Some(&Value::Bool(false))));
        // Non-boolean cells satisfy neither truth check
        assert!(!BooleanPredicate::IsTrue.matches(Some(&Value::Number(1.0))));
        assert!(!BooleanPredicate::IsFalse.matches(Some(&Value::Number(0.0))));
    }

    #[test]
    fn test_null_handling() {
        assert!(BooleanPredicate::IsEmpty.matches(None));
        assert!(BooleanPredicate::IsEmpty.matches(Some(&Value::Null)));
        assert!(!BooleanPredicate::IsTrue.matches(None));
        assert!(!BooleanPredicate::IsFalse.matches(Some(&Value::Null)));
    }
}
