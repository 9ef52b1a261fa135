//! Date predicates over epoch-millisecond timestamps.

use crate::row::Value;
use serde::{Deserialize, Serialize};

/// Predicate over date cells (epoch milliseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DatePredicate {
    Equals { value: i64 },
    NotEquals { value: i64 },
    Before { value: i64 },
    After { value: i64 },
    InRange { low: i64, high: i64 },
    IsEmpty,
    IsNotEmpty,
}

impl DatePredicate {
    /// Operator name as it appears in the JSON schema
    pub fn op_name(&self) -> &'static str {
        match self {
            DatePredicate::Equals { .. } => "equals",
            DatePredicate::NotEquals { .. } => "notEquals",
            DatePredicate::Before { .. } => "before",
            DatePredicate::After { .. } => "after",
            DatePredicate::InRange { .. } => "inRange",
            DatePredicate::IsEmpty => "isEmpty",
            DatePredicate::IsNotEmpty => "isNotEmpty",
        }
    }

    /// Apply this predicate to a cell. Empty-cell semantics match the
    /// other predicate kinds.
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let cell = value.filter(|v| !v.is_null());
        match self {
            DatePredicate::IsEmpty => return cell.is_none(),
            DatePredicate::IsNotEmpty => return cell.is_some(),
            _ => {}
        }
        let ts = match cell.and_then(Value::as_date) {
            Some(ts) => ts,
            None => return false,
        };

        match *self {
            DatePredicate::Equals { value } => ts == value,
            DatePredicate::NotEquals { value } => ts != value,
            DatePredicate::Before { value } => ts < value,
            DatePredicate::After { value } => ts > value,
            DatePredicate::InRange { low, high } => ts >= low && ts <= high,
            DatePredicate::IsEmpty | DatePredicate::IsNotEmpty => unreachable!(),
        }
    }
}
