//! Error types for the translation engine.

use thiserror::Error;

use rosetta_store::StoreError;

/// Result type alias for engine operations.
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Fatal, whole-run translation errors.
///
/// Per-resource and per-field problems never surface here; they degrade the
/// affected resource and land in the
/// [`TranslationReport`](crate::TranslationReport). The caller either gets a
/// complete translated document with a report enumerating every
/// imperfection, or exactly one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// Raised before any resource is touched when a provider identifier has
    /// no records in the mapping store. Identifiers are matched exactly,
    /// case-sensitively.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// The backing store could not answer, or served an invalid mapping.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
