//! Error types for the mapping store.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
///
/// A query that simply finds no record is not an error; store queries return
/// `Ok(None)` or an empty list for that case. Every variant here is fatal to
/// a translation run. Payloads are plain strings so errors stay `Clone`-able
/// and resolver outcomes can be memoized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Mapping store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid mapping definition: {0}")]
    InvalidMapping(String),

    #[error("Duplicate record: {0}")]
    DuplicateRecord(String),

    #[error("Malformed store snapshot: {0}")]
    Snapshot(String),
}

impl From<serde_yaml::Error> for StoreError {
    fn from(err: serde_yaml::Error) -> Self {
        StoreError::Snapshot(err.to_string())
    }
}
