//! SQL `WHERE`-clause compilation.
//!
//! The output is a clause fragment (no leading `WHERE`) with `?`
//! placeholders for every operand; literals are never inlined, so the
//! fragment is injection-safe. Logic the target cannot express degrades to
//! the tautology `1=1` and is listed in the unsupported report instead of
//! aborting the compilation.

use crate::compile::report::UnsupportedNode;
use crate::model::{FilterNode, GroupNode, LogicalOperator, MultiFilterModel};
use crate::predicate::{
    BooleanPredicate, DatePredicate, NumberPredicate, Predicate, TextPredicate,
};
use crate::row::Value;

/// Fragment that matches every row
pub const SQL_TAUTOLOGY: &str = "1=1";

/// Result of compiling a model to SQL
#[derive(Debug, Clone, PartialEq)]
pub struct SqlCompilation {
    /// `WHERE`-clause-compatible fragment
    pub clause: String,
    /// Operand values, in placeholder order
    pub params: Vec<Value>,
    /// Nodes that degraded to a tautology
    pub unsupported: Vec<UnsupportedNode>,
}

/// Compile a model into a parameterized SQL fragment
pub fn to_sql(model: &MultiFilterModel) -> SqlCompilation {
    let mut ctx = Context {
        params: Vec::new(),
        unsupported: Vec::new(),
    };
    let clause = ctx
        .group(&model.root)
        .unwrap_or_else(|| SQL_TAUTOLOGY.to_string());
    SqlCompilation {
        clause,
        params: ctx.params,
        unsupported: ctx.unsupported,
    }
}

struct Context {
    params: Vec<Value>,
    unsupported: Vec<UnsupportedNode>,
}

impl Context {
    /// Compile a node; `None` means the node contributes nothing
    /// (vacuous group or disabled condition) and is simply skipped.
    fn node(&mut self, node: &FilterNode) -> Option<String> {
        if node.is_vacuous() {
            return None;
        }
        match node {
            FilterNode::Condition(c) => {
                if !c.enabled {
                    return None;
                }
                Some(self.condition(&c.id, &c.column_id, &c.predicate))
            }
            FilterNode::Group(g) => self.group(g),
            FilterNode::Formula(f) => {
                self.unsupported.push(UnsupportedNode::new(
                    f.id.clone(),
                    "Opaque formula expressions cannot be compiled to SQL",
                ));
                Some(SQL_TAUTOLOGY.to_string())
            }
            FilterNode::Natural(n) => match &n.parsed_interpretation {
                Some(interpretation) => self.node(interpretation),
                None => {
                    self.unsupported.push(UnsupportedNode::new(
                        n.id.clone(),
                        "Unresolved natural-language query",
                    ));
                    Some(SQL_TAUTOLOGY.to_string())
                }
            },
        }
    }

    fn group(&mut self, group: &GroupNode) -> Option<String> {
        match group.operator {
            LogicalOperator::And | LogicalOperator::Or => {
                let joiner = if group.operator == LogicalOperator::And {
                    " AND "
                } else {
                    " OR "
                };
                let fragments: Vec<String> =
                    group.children.iter().filter_map(|c| self.node(c)).collect();
                match fragments.len() {
                    0 => None,
                    1 => Some(fragments.into_iter().next().unwrap_or_default()),
                    _ => Some(format!("({})", fragments.join(joiner))),
                }
            }
            LogicalOperator::Not => {
                let inner = group.children.first().and_then(|c| self.node(c))?;
                Some(format!("NOT ({})", inner))
            }
            _ => {
                // XOR, NAND, NOR, conditionals, CUSTOM: no faithful WHERE
                // clause form; degrade to a tautology and report it.
                self.unsupported.push(UnsupportedNode::new(
                    group.id.clone(),
                    format!("{} groups have no SQL representation", group.operator),
                ));
                Some(SQL_TAUTOLOGY.to_string())
            }
        }
    }

    fn condition(&mut self, id: &crate::model::NodeId, column_id: &str, predicate: &Predicate) -> String {
        let col = quote_ident(column_id);
        match predicate {
            Predicate::Number(p) => self.number(id, &col, p),
            Predicate::Text(p) => self.text(&col, p),
            Predicate::Date(p) => self.date(&col, p),
            Predicate::Boolean(p) => self.boolean(&col, p),
        }
    }

    fn number(&mut self, id: &crate::model::NodeId, col: &str, p: &NumberPredicate) -> String {
        match *p {
            NumberPredicate::Equals { value, .. } => self.binary(col, "=", Value::Number(value)),
            NumberPredicate::NotEquals { value, .. } => self.binary(col, "<>", Value::Number(value)),
            NumberPredicate::GreaterThan { value } => self.binary(col, ">", Value::Number(value)),
            NumberPredicate::GreaterThanOrEqual { value } => {
                self.binary(col, ">=", Value::Number(value))
            }
            NumberPredicate::LessThan { value } => self.binary(col, "<", Value::Number(value)),
            NumberPredicate::LessThanOrEqual { value } => {
                self.binary(col, "<=", Value::Number(value))
            }
            NumberPredicate::InRange { low, high } => {
                self.params.push(Value::Number(low));
                self.params.push(Value::Number(high));
                format!("{} BETWEEN ? AND ?", col)
            }
            NumberPredicate::NotInRange { low, high } => {
                self.params.push(Value::Number(low));
                self.params.push(Value::Number(high));
                format!("{} NOT BETWEEN ? AND ?", col)
            }
            NumberPredicate::IsEmpty => format!("{} IS NULL", col),
            NumberPredicate::IsNotEmpty => format!("{} IS NOT NULL", col),
            NumberPredicate::IsEven => format!("MOD({}, 2) = 0", col),
            NumberPredicate::IsOdd => format!("MOD({}, 2) <> 0", col),
            NumberPredicate::IsDivisibleBy { divisor } => {
                self.params.push(Value::Number(divisor as f64));
                format!("MOD({}, ?) = 0", col)
            }
            NumberPredicate::IsPrime
            | NumberPredicate::IsInteger
            | NumberPredicate::IsDecimal => {
                self.unsupported.push(UnsupportedNode::new(
                    id.clone(),
                    format!("Predicate '{}' has no SQL representation", p.op_name()),
                ));
                SQL_TAUTOLOGY.to_string()
            }
        }
    }

    fn text(&mut self, col: &str, p: &TextPredicate) -> String {
        match p {
            TextPredicate::Equals { value, case_sensitive } => {
                self.params.push(Value::Text(value.clone()));
                if *case_sensitive {
                    format!("{} = ?", col)
                } else {
                    format!("LOWER({}) = LOWER(?)", col)
                }
            }
            TextPredicate::NotEquals { value, case_sensitive } => {
                self.params.push(Value::Text(value.clone()));
                if *case_sensitive {
                    format!("{} <> ?", col)
                } else {
                    format!("LOWER({}) <> LOWER(?)", col)
                }
            }
            TextPredicate::Contains { value, case_sensitive } => {
                self.like(col, &format!("%{}%", escape_like(value)), *case_sensitive, false)
            }
            TextPredicate::NotContains { value, case_sensitive } => {
                self.like(col, &format!("%{}%", escape_like(value)), *case_sensitive, true)
            }
            TextPredicate::StartsWith { value, case_sensitive } => {
                self.like(col, &format!("{}%", escape_like(value)), *case_sensitive, false)
            }
            TextPredicate::EndsWith { value, case_sensitive } => {
                self.like(col, &format!("%{}", escape_like(value)), *case_sensitive, false)
            }
            TextPredicate::IsEmpty => format!("{} IS NULL", col),
            TextPredicate::IsNotEmpty => format!("{} IS NOT NULL", col),
        }
    }

    fn date(&mut self, col: &str, p: &DatePredicate) -> String {
        match *p {
            DatePredicate::Equals { value } => self.binary(col, "=", Value::Date(value)),
            DatePredicate::NotEquals { value } => self.binary(col, "<>", Value::Date(value)),
            DatePredicate::Before { value } => self.binary(col, "<", Value::Date(value)),
            DatePredicate::After { value } => self.binary(col, ">", Value::Date(value)),
            DatePredicate::InRange { low, high } => {
                self.params.push(Value::Date(low));
                self.params.push(Value::Date(high));
                format!("{} BETWEEN ? AND ?", col)
            }
            DatePredicate::IsEmpty => format!("{} IS NULL", col),
            DatePredicate::IsNotEmpty => format!("{} IS NOT NULL", col),
        }
    }

    fn boolean(&mut self, col: &str, p: &BooleanPredicate) -> String {
        match p {
            BooleanPredicate::IsTrue => self.binary(col, "=", Value::Bool(true)),
            BooleanPredicate::IsFalse => self.binary(col, "=", Value::Bool(false)),
            BooleanPredicate::IsEmpty => format!("{} IS NULL", col),
            BooleanPredicate::IsNotEmpty => format!("{} IS NOT NULL", col),
        }
    }

    fn binary(&mut self, col: &str, op: &str, param: Value) -> String {
        self.params.push(param);
        format!("{} {} ?", col, op)
    }

    fn like(&mut self, col: &str, pattern: &str, case_sensitive: bool, negated: bool) -> String {
        self.params.push(Value::Text(pattern.to_string()));
        let keyword = if negated { "NOT LIKE" } else { "LIKE" };
        if case_sensitive {
            format!("{} {} ? ESCAPE '\\'", col, keyword)
        } else {
            format!("LOWER({}) {} LOWER(?) ESCAPE '\\'", col, keyword)
        }
    }
}

/// Quote a column identifier, doubling embedded quotes
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Escape LIKE metacharacters so operand text matches literally
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
