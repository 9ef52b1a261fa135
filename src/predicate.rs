//! Per-data-kind leaf predicates.
//!
//! This module provides:
//! - Typed predicate specs for text, number, date, and boolean columns
//! - Pure `matches(value, spec) -> bool` evaluation for each kind
//! - The extended numeric operators (parity, divisibility, primality,
//!   integer/decimal classification)
//!
//! The set of predicate kinds is closed: the evaluator, the compilers, and
//! the complexity scorer all match over it exhaustively, so adding a kind
//! is a compile-checked change at every call site.

pub mod boolean;
pub mod date;
pub mod number;
pub mod text;

pub use boolean::BooleanPredicate;
pub use date::DatePredicate;
pub use number::{is_prime, NumberPredicate, DEFAULT_PRECISION, MAX_PRECISION};
pub use text::TextPredicate;

use crate::row::{DataKind, Value};
use serde::{Deserialize, Serialize};

/// A typed leaf predicate.
///
/// The data kind is part of the type, so a numeric predicate can never
/// carry a string operand; the operand-type invariant holds by
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Predicate {
    Text(TextPredicate),
    Number(NumberPredicate),
    Date(DatePredicate),
    Boolean(BooleanPredicate),
}

impl Predicate {
    /// Data kind this predicate applies to
    pub fn data_kind(&self) -> DataKind {
        match self {
            Predicate::Text(_) => DataKind::Text,
            Predicate::Number(_) => DataKind::Number,
            Predicate::Date(_) => DataKind::Date,
            Predicate::Boolean(_) => DataKind::Bool,
        }
    }

    /// Operator name as it appears in the JSON schema
    pub fn op_name(&self) -> &'static str {
        match self {
            Predicate::Text(p) => p.op_name(),
            Predicate::Number(p) => p.op_name(),
            Predicate::Date(p) => p.op_name(),
            Predicate::Boolean(p) => p.op_name(),
        }
    }

    /// Apply this predicate to a cell value
    pub fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            Predicate::Text(p) => p.matches(value),
            Predicate::Number(p) => p.matches(value),
            Predicate::Date(p) => p.matches(value),
            Predicate::Boolean(p) => p.matches(value),
        }
    }
}

impl From<TextPredicate> for Predicate {
    fn from(p: TextPredicate) -> Self {
        Predicate::Text(p)
    }
}

impl From<NumberPredicate> for Predicate {
    fn from(p: NumberPredicate) -> Self {
        Predicate::Number(p)
    }
}

impl From<DatePredicate> for Predicate {
    fn from(p: DatePredicate) -> Self {
        Predicate::Date(p)
    }
}

impl From<BooleanPredicate> for Predicate {
    fn from(p: BooleanPredicate) -> Self {
        Predicate::Boolean(p)
    }
}
