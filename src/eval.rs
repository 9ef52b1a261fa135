//! Filter evaluation.
//!
//! This module provides:
//! - The recursive tree-walking evaluator (`row -> bool`)
//! - Delegate traits and registry for `CUSTOM` combinators and `Formula`
//!   expressions
//! - Data-parallel evaluation over whole datasets

pub mod delegate;
pub mod evaluator;
pub mod parallel;

pub use delegate::{CustomCombinator, DelegateRegistry, FormulaEvaluator};
pub use evaluator::Evaluator;
pub use parallel::evaluate_rows;
