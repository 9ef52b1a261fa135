//! Data-parallel evaluation over whole datasets.
//!
//! Rows are independent and the tree is read-only during evaluation, so a
//! dataset splits cleanly across worker threads. No shared mutable state is
//! touched; cancellation is the caller dropping the result.

use crate::eval::delegate::DelegateRegistry;
use crate::eval::evaluator::Evaluator;
use crate::model::MultiFilterModel;
use crate::row::Row;
use rayon::prelude::*;

/// Datasets below this size are evaluated on the calling thread; the
/// fork-join overhead would dominate otherwise
const PARALLEL_THRESHOLD: usize = 1024;

/// Evaluate a model against every row, preserving row order.
///
/// Large datasets are chunked across the rayon thread pool; small ones run
/// sequentially.
pub fn evaluate_rows(
    model: &MultiFilterModel,
    rows: &[Row],
    delegates: Option<&DelegateRegistry>,
) -> Vec<bool> {
    let make_evaluator = || match delegates {
        Some(registry) => Evaluator::with_delegates(registry),
        None => Evaluator::new(),
    };

    if rows.len() < PARALLEL_THRESHOLD {
        let evaluator = make_evaluator();
        return rows.iter().map(|row| evaluator.evaluate_model(model, row)).collect();
    }

    rows.par_iter()
        .map(|row| make_evaluator().evaluate_model(model, row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FilterNode, MultiFilterModel};
    use crate::predicate::NumberPredicate;

    fn even_model() -> MultiFilterModel {
        let mut model = MultiFilterModel::new("grid");
        model
            .add_child("root", FilterNode::condition("c1", "n", NumberPredicate::IsEven))
            .unwrap();
        model
    }

    #[test]
    fn test_order_is_preserved() {
        let model = even_model();
        let rows: Vec<Row> = (0..10).map(|i| Row::new().with("n", f64::from(i))).collect();
        let results = evaluate_rows(&model, &rows, None);
        let expected: Vec<bool> = (0..10).map(|i| i % 2 == 0).collect();
        assert_eq!(results, expected);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let model = even_model();
        let rows: Vec<Row> = (0..5000).map(|i| Row::new().with("n", f64::from(i))).collect();

        let evaluator = Evaluator::new();
        let sequential: Vec<bool> =
            rows.iter().map(|row| evaluator.evaluate_model(&model, row)).collect();
        let parallel = evaluate_rows(&model, &rows, None);
        assert_eq!(parallel, sequential);
    }
}
