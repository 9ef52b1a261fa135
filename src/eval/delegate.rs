//! External delegates the evaluator hands off to.
//!
//! `CUSTOM` groups and `Formula` nodes are capabilities supplied by the
//! caller; the engine only knows their boundary. A node whose delegate is
//! missing evaluates fail-open (true), so an incomplete registration never
//! silently hides rows.

use crate::row::Row;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Combinator backing a `CUSTOM` group: folds the children's boolean
/// results into one
pub trait CustomCombinator: Send + Sync {
    fn combine(&self, results: &[bool]) -> bool;
}

impl<F> CustomCombinator for F
where
    F: Fn(&[bool]) -> bool + Send + Sync,
{
    fn combine(&self, results: &[bool]) -> bool {
        self(results)
    }
}

/// External engine evaluating opaque `Formula` expressions against a row
pub trait FormulaEvaluator: Send + Sync {
    fn evaluate(&self, expression_text: &str, row: &Row) -> bool;
}

impl<F> FormulaEvaluator for F
where
    F: Fn(&str, &Row) -> bool + Send + Sync,
{
    fn evaluate(&self, expression_text: &str, row: &Row) -> bool {
        self(expression_text, row)
    }
}

/// Registry of externally supplied delegates, shared across evaluators.
///
/// Combinators are keyed by the `combinator` field of `CUSTOM` groups.
/// Registration may happen concurrently with evaluation.
#[derive(Default)]
pub struct DelegateRegistry {
    combinators: DashMap<String, Arc<dyn CustomCombinator>>,
    formula: RwLock<Option<Arc<dyn FormulaEvaluator>>>,
}

impl DelegateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_combinator(
        &self,
        key: impl Into<String>,
        combinator: Arc<dyn CustomCombinator>,
    ) {
        self.combinators.insert(key.into(), combinator);
    }

    pub fn combinator(&self, key: &str) -> Option<Arc<dyn CustomCombinator>> {
        self.combinators.get(key).map(|entry| Arc::clone(&entry))
    }

    pub fn set_formula_evaluator(&self, evaluator: Arc<dyn FormulaEvaluator>) {
        *self.formula.write() = Some(evaluator);
    }

    pub fn formula_evaluator(&self) -> Option<Arc<dyn FormulaEvaluator>> {
        self.formula.read().clone()
    }
}
