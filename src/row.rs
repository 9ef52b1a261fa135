//! Row data consumed by the evaluator.
//!
//! A row is an opaque mapping from column id to a dynamically typed cell
//! value. The engine never sees the dataset it came from; the surrounding
//! grid (or any other producer) hands rows in one at a time.

use anyhow::{bail, Result};
use std::collections::HashMap;

/// Column data kinds the predicate library understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Bool,
    Number,
    Text,
    Date,
}

/// A single cell value.
///
/// `Date` carries epoch milliseconds; JSON rows deliver dates as plain
/// numbers, so the date predicates accept either representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(i64),
}

impl Value {
    /// Get the data kind of this value, if any (`Null` has none)
    pub fn kind(&self) -> Option<DataKind> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(DataKind::Bool),
            Value::Number(_) => Some(DataKind::Number),
            Value::Text(_) => Some(DataKind::Text),
            Value::Date(_) => Some(DataKind::Date),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Extract a timestamp in epoch milliseconds.
    ///
    /// Accepts both `Date` cells and plain `Number` cells, since JSON row
    /// sources have no dedicated date representation.
    pub fn as_date(&self) -> Option<i64> {
        match self {
            Value::Date(ms) => Some(*ms),
            Value::Number(n) => Some(*n as i64),
            _ => None,
        }
    }

    /// Convert a JSON scalar into a cell value.
    ///
    /// Arrays and objects have no cell representation and yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Value> {
        match value {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Convert this value into its JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::json!(n),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Date(ms) => serde_json::json!(ms),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// One data row: column id to cell value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: HashMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        self.cells.insert(column_id.into(), value.into());
        self
    }

    pub fn insert(&mut self, column_id: impl Into<String>, value: impl Into<Value>) {
        self.cells.insert(column_id.into(), value.into());
    }

    /// Look up a cell; absent columns are indistinguishable from `Null`
    /// as far as predicates are concerned
    pub fn get(&self, column_id: &str) -> Option<&Value> {
        self.cells.get(column_id)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Build a row from a JSON object, e.g. one line of a JSON-lines file
    pub fn from_json(value: &serde_json::Value) -> Result<Row> {
        let obj = match value {
            serde_json::Value::Object(obj) => obj,
            other => bail!("Expected a JSON object for a row, got {}", other),
        };

        let mut row = Row::new();
        for (column_id, cell) in obj {
            match Value::from_json(cell) {
                Some(v) => row.insert(column_id.clone(), v),
                None => bail!(
                    "Column '{}' holds a nested JSON value, which is not a valid cell",
                    column_id
                ),
            }
        }
        Ok(row)
    }
}
