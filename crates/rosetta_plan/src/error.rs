//! Error types for the plan document model.

use thiserror::Error;

/// Result type alias for plan document operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors that can occur while parsing or serializing a plan document.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Malformed plan document: {0}")]
    MalformedDocument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
