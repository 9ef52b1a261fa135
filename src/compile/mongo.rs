//! MongoDB query document compilation.
//!
//! Groups map to `$and`/`$or`/`$not`/`$nor`; leaves become
//! `{ column: { $op: value } }` documents. Logic with no Mongo form
//! degrades to the empty document (match-all) and is reported.

use crate::compile::report::UnsupportedNode;
use crate::model::{FilterNode, GroupNode, LogicalOperator, MultiFilterModel, NodeId};
use crate::predicate::{
    BooleanPredicate, DatePredicate, NumberPredicate, Predicate, TextPredicate,
};
use serde_json::{json, Value as Json};

/// Result of compiling a model to a Mongo query document
#[derive(Debug, Clone, PartialEq)]
pub struct MongoCompilation {
    pub document: Json,
    /// Nodes that degraded to the match-all document
    pub unsupported: Vec<UnsupportedNode>,
}

/// Compile a model into a MongoDB-style query document
pub fn to_mongo(model: &MultiFilterModel) -> MongoCompilation {
    let mut unsupported = Vec::new();
    let document = compile_group(&model.root, &mut unsupported).unwrap_or_else(|| json!({}));
    MongoCompilation {
        document,
        unsupported,
    }
}

fn compile_node(node: &FilterNode, unsupported: &mut Vec<UnsupportedNode>) -> Option<Json> {
    if node.is_vacuous() {
        return None;
    }
    match node {
        FilterNode::Condition(c) => {
            if !c.enabled {
                return None;
            }
            Some(compile_condition(&c.id, &c.column_id, &c.predicate, unsupported))
        }
        FilterNode::Group(g) => compile_group(g, unsupported),
        FilterNode::Formula(f) => {
            unsupported.push(UnsupportedNode::new(
                f.id.clone(),
                "Opaque formula expressions cannot be compiled to a Mongo query",
            ));
            Some(json!({}))
        }
        FilterNode::Natural(n) => match &n.parsed_interpretation {
            Some(interpretation) => compile_node(interpretation, unsupported),
            None => {
                unsupported.push(UnsupportedNode::new(
                    n.id.clone(),
                    "Unresolved natural-language query",
                ));
                Some(json!({}))
            }
        },
    }
}

fn compile_group(group: &GroupNode, unsupported: &mut Vec<UnsupportedNode>) -> Option<Json> {
    match group.operator {
        LogicalOperator::And | LogicalOperator::Or | LogicalOperator::Nor => {
            let key = match group.operator {
                LogicalOperator::And => "$and",
                LogicalOperator::Or => "$or",
                _ => "$nor",
            };
            let docs: Vec<Json> = group
                .children
                .iter()
                .filter_map(|c| compile_node(c, unsupported))
                .collect();
            match docs.len() {
                0 => None,
                // A one-element $and/$or is just its element; $nor still
                // negates and must keep its wrapper
                1 if group.operator != LogicalOperator::Nor => docs.into_iter().next(),
                _ => Some(json!({ key: docs })),
            }
        }
        LogicalOperator::Not => {
            let inner = group
                .children
                .first()
                .and_then(|c| compile_node(c, unsupported))?;
            Some(json!({ "$not": inner }))
        }
        _ => {
            unsupported.push(UnsupportedNode::new(
                group.id.clone(),
                format!("{} groups have no Mongo representation", group.operator),
            ));
            Some(json!({}))
        }
    }
}

fn compile_condition(
    id: &NodeId,
    column_id: &str,
    predicate: &Predicate,
    unsupported: &mut Vec<UnsupportedNode>,
) -> Json {
    match predicate {
        Predicate::Number(p) => compile_number(id, column_id, p, unsupported),
        Predicate::Text(p) => compile_text(column_id, p),
        Predicate::Date(p) => compile_date(column_id, p),
        Predicate::Boolean(p) => compile_boolean(column_id, p),
    }
}

fn compile_number(
    id: &NodeId,
    col: &str,
    p: &NumberPredicate,
    unsupported: &mut Vec<UnsupportedNode>,
) -> Json {
    match *p {
        NumberPredicate::Equals { value, .. } => json!({ col: { "$eq": value } }),
        NumberPredicate::NotEquals { value, .. } => json!({ col: { "$ne": value } }),
        NumberPredicate::GreaterThan { value } => json!({ col: { "$gt": value } }),
        NumberPredicate::GreaterThanOrEqual { value } => json!({ col: { "$gte": value } }),
        NumberPredicate::LessThan { value } => json!({ col: { "$lt": value } }),
        NumberPredicate::LessThanOrEqual { value } => json!({ col: { "$lte": value } }),
        NumberPredicate::InRange { low, high } => json!({ col: { "$gte": low, "$lte": high } }),
        NumberPredicate::NotInRange { low, high } => {
            json!({ col: { "$not": { "$gte": low, "$lte": high } } })
        }
        NumberPredicate::IsEmpty => json!({ col: { "$exists": false } }),
        NumberPredicate::IsNotEmpty => json!({ col: { "$exists": true } }),
        NumberPredicate::IsEven => json!({ col: { "$mod": [2, 0] } }),
        NumberPredicate::IsOdd => json!({ col: { "$mod": [2, 1] } }),
        NumberPredicate::IsDivisibleBy { divisor } => json!({ col: { "$mod": [divisor, 0] } }),
        NumberPredicate::IsInteger => json!({ col: { "$mod": [1, 0] } }),
        NumberPredicate::IsDecimal => json!({ col: { "$not": { "$mod": [1, 0] } } }),
        NumberPredicate::IsPrime => {
            unsupported.push(UnsupportedNode::new(
                id.clone(),
                "Predicate 'isPrime' has no Mongo representation",
            ));
            json!({})
        }
    }
}

fn compile_text(col: &str, p: &TextPredicate) -> Json {
    let regex = |value: &str, anchor_start: bool, anchor_end: bool, case_sensitive: bool| {
        let mut pattern = String::new();
        if anchor_start {
            pattern.push('^');
        }
        pattern.push_str(&escape_regex(value));
        if anchor_end {
            pattern.push('$');
        }
        if case_sensitive {
            json!({ "$regex": pattern })
        } else {
            json!({ "$regex": pattern, "$options": "i" })
        }
    };

    match p {
        TextPredicate::Equals { value, case_sensitive } => {
            if *case_sensitive {
                json!({ col: { "$eq": value } })
            } else {
                json!({ col: regex(value, true, true, false) })
            }
        }
        TextPredicate::NotEquals { value, case_sensitive } => {
            if *case_sensitive {
                json!({ col: { "$ne": value } })
            } else {
                json!({ col: { "$not": regex(value, true, true, false) } })
            }
        }
        TextPredicate::Contains { value, case_sensitive } => {
            json!({ col: regex(value, false, false, *case_sensitive) })
        }
        TextPredicate::NotContains { value, case_sensitive } => {
            json!({ col: { "$not": regex(value, false, false, *case_sensitive) } })
        }
        TextPredicate::StartsWith { value, case_sensitive } => {
            json!({ col: regex(value, true, false, *case_sensitive) })
        }
        TextPredicate::EndsWith { value, case_sensitive } => {
            json!({ col: regex(value, false, true, *case_sensitive) })
        }
        TextPredicate::IsEmpty => json!({ col: { "$exists": false } }),
        TextPredicate::IsNotEmpty => json!({ col: { "$exists": true } }),
    }
}

fn compile_date(col: &str, p: &DatePredicate) -> Json {
    match *p {
        DatePredicate::Equals { value } => json!({ col: { "$eq": value } }),
        DatePredicate::NotEquals { value } => json!({ col: { "$ne": value } }),
        DatePredicate::Before { value } => json!({ col: { "$lt": value } }),
        DatePredicate::After { value } => json!({ col: { "$gt": value } }),
        DatePredicate::InRange { low, high } => json!({ col: { "$gte": low, "$lte": high } }),
        DatePredicate::IsEmpty => json!({ col: { "$exists": false } }),
        DatePredicate::IsNotEmpty => json!({ col: { "$exists": true } }),
    }
}

fn compile_boolean(col: &str, p: &BooleanPredicate) -> Json {
    match p {
        BooleanPredicate::IsTrue => json!({ col: { "$eq": true } }),
        BooleanPredicate::IsFalse => json!({ col: { "$eq": false } }),
        BooleanPredicate::IsEmpty => json!({ col: { "$exists": false } }),
        BooleanPredicate::IsNotEmpty => json!({ col: { "$exists": true } }),
    }
}

/// Escape regex metacharacters so operand text matches literally
fn escape_regex(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(
            ch,
            '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
        ) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
