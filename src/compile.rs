//! Compilation targets for validated filter trees.
//!
//! This module provides:
//! - Parameterized SQL `WHERE`-clause fragments
//! - MongoDB-style query documents
//! - The versioned JSON schema serializer/deserializer
//! - The unsupported-nodes report both compilers feed
//!
//! Compilation is best-effort: whatever the target cannot express degrades
//! to a tautology so partial filters stay usable, and the degradation is
//! observable through the report.

pub mod json;
pub mod mongo;
pub mod report;
pub mod sql;

pub use json::{from_json, from_json_str, to_json, to_json_string, ImportError};
pub use mongo::{to_mongo, MongoCompilation};
pub use report::UnsupportedNode;
pub use sql::{to_sql, SqlCompilation, SQL_TAUTOLOGY};
