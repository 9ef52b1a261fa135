//! Text predicates.

use crate::row::Value;
use serde::{Deserialize, Serialize};

fn default_case_sensitive() -> bool {
    true
}

/// Predicate over text cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum TextPredicate {
    Equals {
        value: String,
        #[serde(default = "default_case_sensitive")]
        case_sensitive: bool,
    },
    NotEquals {
        value: String,
        #[serde(default = "default_case_sensitive")]
        case_sensitive: bool,
    },
    Contains {
        value: String,
        #[serde(default = "default_case_sensitive")]
        case_sensitive: bool,
    },
    NotContains {
        value: String,
        #[serde(default = "default_case_sensitive")]
        case_sensitive: bool,
    },
    StartsWith {
        value: String,
        #[serde(default = "default_case_sensitive")]
        case_sensitive: bool,
    },
    EndsWith {
        value: String,
        #[serde(default = "default_case_sensitive")]
        case_sensitive: bool,
    },
    IsEmpty,
    IsNotEmpty,
}

impl TextPredicate {
    /// Case-sensitive equality
    pub fn equals(value: impl Into<String>) -> Self {
        TextPredicate::Equals {
            value: value.into(),
            case_sensitive: true,
        }
    }

    pub fn contains(value: impl Into<String>) -> Self {
        TextPredicate::Contains {
            value: value.into(),
            case_sensitive: true,
        }
    }

    /// Operator name as it appears in the JSON schema
    pub fn op_name(&self) -> &'static str {
        match self {
            TextPredicate::Equals { .. } => "equals",
            TextPredicate::NotEquals { .. } => "notEquals",
            TextPredicate::Contains { .. } => "contains",
            TextPredicate::NotContains { .. } => "notContains",
            TextPredicate::StartsWith { .. } => "startsWith",
            TextPredicate::EndsWith { .. } => "endsWith",
            TextPredicate::IsEmpty => "isEmpty",
            TextPredicate::IsNotEmpty => "isNotEmpty",
        }
    }

    /// Apply this predicate to a cell. Empty-cell semantics match the
    /// numeric predicates: only `IsEmpty`/`IsNotEmpty` see null cells.
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let cell = value.filter(|v| !v.is_null());
        match self {
            TextPredicate::IsEmpty => return cell.is_none(),
            TextPredicate::IsNotEmpty => return cell.is_some(),
            _ => {}
        }
        let text = match cell.and_then(Value::as_text) {
            Some(t) => t,
            None => return false,
        };

        match self {
            TextPredicate::Equals { value, case_sensitive } => {
                fold(text, *case_sensitive) == fold(value, *case_sensitive)
            }
            TextPredicate::NotEquals { value, case_sensitive } => {
                fold(text, *case_sensitive) != fold(value, *case_sensitive)
            }
            TextPredicate::Contains { value, case_sensitive } => {
                fold(text, *case_sensitive).contains(&fold(value, *case_sensitive))
            }
            TextPredicate::NotContains { value, case_sensitive } => {
                !fold(text, *case_sensitive).contains(&fold(value, *case_sensitive))
            }
            TextPredicate::StartsWith { value, case_sensitive } => {
                fold(text, *case_sensitive).starts_with(&fold(value, *case_sensitive))
            }
            TextPredicate::EndsWith { value, case_sensitive } => {
                fold(text, *case_sensitive).ends_with(&fold(value, *case_sensitive))
            }
            TextPredicate::IsEmpty | TextPredicate::IsNotEmpty => unreachable!(),
        }
    }
}

fn fold(s: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        s.to_string()
    } else {
        s.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_equality() {
        assert!(TextPredicate::equals("Eng").matches(Some(&text("Eng"))));
        assert!(!TextPredicate::equals("Eng").matches(Some(&text("eng"))));
        let ci = TextPredicate::Equals { value: "Eng".into(), case_sensitive: false };
        assert!(ci.matches(Some(&text("ENG"))));
    }

    #[test]
    fn test_substring_operators() {
        assert!(TextPredicate::contains("gin").matches(Some(&text("Engineering"))));
        let p = TextPredicate::NotContains { value: "x".into(), case_sensitive: true };
        assert!(p.matches(Some(&text("Engineering"))));
        let sw = TextPredicate::StartsWith { value: "Eng".into(), case_sensitive: true };
        assert!(sw.matches(Some(&text("Engineering"))));
        assert!(!sw.matches(Some(&text("engineering"))));
        let ew = TextPredicate::EndsWith { value: "ing".into(), case_sensitive: true };
        assert!(ew.matches(Some(&text("Engineering"))));
    }

    #[test]
    fn test_null_handling() {
        assert!(TextPredicate::IsEmpty.matches(None));
        assert!(TextPredicate::IsEmpty.matches(Some(&Value::Null)));
        assert!(!TextPredicate::IsNotEmpty.matches(Some(&Value::Null)));
        assert!(!TextPredicate::equals("a").matches(None));
        // The empty string is a present value, not an empty cell
        assert!(!TextPredicate::IsEmpty.matches(Some(&text(""))));
        assert!(TextPredicate::IsNotEmpty.matches(Some(&text(""))));
    }

    #[test]
    fn test_non_text_cells_fail() {
        assert!(!TextPredicate::equals("1").matches(Some(&Value::Number(1.0))));
        assert!(TextPredicate::IsNotEmpty.matches(Some(&Value::Number(1.0))));
    }
}
