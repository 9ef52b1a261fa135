//! Numeric predicates, including the extended number-theory operators.

use crate::row::Value;
use serde::{Deserialize, Serialize};

/// Decimal places used by precision-aware equality when none is given
pub const DEFAULT_PRECISION: u32 = 2;

/// Largest precision accepted by validation; beyond this the scale factor
/// no longer fits the exactly-representable integer range of f64
pub const MAX_PRECISION: u32 = 15;

fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

/// Predicate over numeric cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum NumberPredicate {
    Equals {
        value: f64,
        #[serde(default = "default_precision")]
        precision: u32,
    },
    NotEquals {
        value: f64,
        #[serde(default = "default_precision")]
        precision: u32,
    },
    GreaterThan { value: f64 },
    GreaterThanOrEqual { value: f64 },
    LessThan { value: f64 },
    LessThanOrEqual { value: f64 },
    InRange { low: f64, high: f64 },
    NotInRange { low: f64, high: f64 },
    IsEmpty,
    IsNotEmpty,
    IsEven,
    IsOdd,
    IsDivisibleBy { divisor: i64 },
    IsPrime,
    IsInteger,
    IsDecimal,
}

impl NumberPredicate {
    /// Equality at the default precision
    pub fn equals(value: f64) -> Self {
        NumberPredicate::Equals {
            value,
            precision: DEFAULT_PRECISION,
        }
    }

    /// Inequality at the default precision
    pub fn not_equals(value: f64) -> Self {
        NumberPredicate::NotEquals {
            value,
            precision: DEFAULT_PRECISION,
        }
    }

    /// Operator name as it appears in the JSON schema
    pub fn op_name(&self) -> &'static str {
        match self {
            NumberPredicate::Equals { .. } => "equals",
            NumberPredicate::NotEquals { .. } => "notEquals",
            NumberPredicate::GreaterThan { .. } => "greaterThan",
            NumberPredicate::GreaterThanOrEqual { .. } => "greaterThanOrEqual",
            NumberPredicate::LessThan { .. } => "lessThan",
            NumberPredicate::LessThanOrEqual { .. } => "lessThanOrEqual",
            NumberPredicate::InRange { .. } => "inRange",
            NumberPredicate::NotInRange { .. } => "notInRange",
            NumberPredicate::IsEmpty => "isEmpty",
            NumberPredicate::IsNotEmpty => "isNotEmpty",
            NumberPredicate::IsEven => "isEven",
            NumberPredicate::IsOdd => "isOdd",
            NumberPredicate::IsDivisibleBy { .. } => "isDivisibleBy",
            NumberPredicate::IsPrime => "isPrime",
            NumberPredicate::IsInteger => "isInteger",
            NumberPredicate::IsDecimal => "isDecimal",
        }
    }

    /// Apply this predicate to a cell.
    ///
    /// `None` and `Value::Null` both count as an empty cell: only `IsEmpty`
    /// accepts them, and `IsNotEmpty` accepts everything else. Non-numeric
    /// cells fail every numeric check.
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let cell = value.filter(|v| !v.is_null());
        match self {
            NumberPredicate::IsEmpty => return cell.is_none(),
            NumberPredicate::IsNotEmpty => return cell.is_some(),
            _ => {}
        }
        let n = match cell.and_then(Value::as_number) {
            Some(n) => n,
            None => return false,
        };

        match *self {
            NumberPredicate::Equals { value, precision } => approx_eq(n, value, precision),
            NumberPredicate::NotEquals { value, precision } => !approx_eq(n, value, precision),
            NumberPredicate::GreaterThan { value } => n > value,
            NumberPredicate::GreaterThanOrEqual { value } => n >= value,
            NumberPredicate::LessThan { value } => n < value,
            NumberPredicate::LessThanOrEqual { value } => n <= value,
            NumberPredicate::InRange { low, high } => n >= low && n <= high,
            NumberPredicate::NotInRange { low, high } => n < low || n > high,
            NumberPredicate::IsEven => is_integral(n) && (n as i64) % 2 == 0,
            NumberPredicate::IsOdd => is_integral(n) && (n as i64) % 2 != 0,
            NumberPredicate::IsDivisibleBy { divisor } => {
                divisor > 0 && is_integral(n) && (n as i64) % divisor == 0
            }
            NumberPredicate::IsPrime => is_integral(n) && is_prime(n as i64),
            NumberPredicate::IsInteger => is_integral(n),
            NumberPredicate::IsDecimal => !is_integral(n),
            NumberPredicate::IsEmpty | NumberPredicate::IsNotEmpty => unreachable!(),
        }
    }
}

/// Precision-aware float equality: scale both sides by 10^precision, round,
/// compare as integers. Avoids binary floating-point artifacts like
/// `0.1 + 0.2 != 0.3`.
pub fn approx_eq(a: f64, b: f64, precision: u32) -> bool {
    if !a.is_finite() || !b.is_finite() {
        return a == b;
    }
    let scale = 10f64.powi(precision as i32);
    (a * scale).round() == (b * scale).round()
}

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0
}

/// Deterministic trial division up to sqrt(n). Operands are row-scale
/// numbers, not cryptographic magnitudes.
pub fn is_prime(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    if n == 2 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut d = 3i64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
