//! The versioned JSON model schema.
//!
//! `{ target_id, root, version, createdAt, modifiedAt }`, with nodes tagged
//! by `type` and predicates by `kind`/`op`. Unknown fields are rejected
//! rather than preserved: imports always pass through validation, and a
//! silently dropped field on re-export would be worse than a hard error.
//! Every import is validated before the model is handed back.

use crate::model::{validate, EngineConfig, MultiFilterModel, ValidationError};
use thiserror::Error;

/// Errors raised while importing a filter document
#[derive(Debug, Error)]
pub enum ImportError {
    /// The document does not match the schema (bad shape, unknown field,
    /// unknown operator)
    #[error("Malformed filter document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The document parsed but the tree violates the model invariants
    #[error("Imported filter failed validation")]
    Invalid(Vec<ValidationError>),
}

/// Serialize a model to its JSON document
pub fn to_json(model: &MultiFilterModel) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(model)
}

/// Serialize a model to pretty-printed JSON text
pub fn to_json_string(model: &MultiFilterModel) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(model)
}

/// Reconstruct a model from its JSON document.
///
/// The result is always validated against `config` before being returned;
/// a tree that parses but breaks an invariant is an error, never a usable
/// model.
pub fn from_json(
    document: &serde_json::Value,
    config: &EngineConfig,
) -> Result<MultiFilterModel, ImportError> {
    let model: MultiFilterModel = serde_json::from_value(document.clone())?;
    validate(&model, config).map_err(ImportError::Invalid)?;
    Ok(model)
}

/// Reconstruct a model from JSON text
pub fn from_json_str(text: &str, config: &EngineConfig) -> Result<MultiFilterModel, ImportError> {
    let model: MultiFilterModel = serde_json::from_str(text)?;
    validate(&model, config).map_err(ImportError::Invalid)?;
    Ok(model)
}
