pub mod compile;
pub mod eval;
pub mod model;
pub mod optimize;
pub mod predicate;
pub mod row;
pub mod score;
