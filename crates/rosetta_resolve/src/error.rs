//! Error types for equivalence resolution.

use thiserror::Error;

use rosetta_store::StoreError;

/// Result type alias for resolver operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors that can occur during equivalence resolution.
///
/// Every variant except [`ResolveError::Store`] is local to one field of one
/// resource: the caller leaves the field untranslated, records the miss, and
/// the run continues. A store failure is fatal to the whole run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Instance type {provider}:{type_id} is not in the catalog")]
    UnknownInstanceType { provider: String, type_id: String },

    #[error("Region {provider}:{region_code} is not in the catalog")]
    UnknownRegion {
        provider: String,
        region_code: String,
    },

    #[error("Image {provider}:{image_name} is not in the catalog")]
    UnknownImage {
        provider: String,
        image_name: String,
    },

    #[error("No {provider} image matches {os_family} {os_version}")]
    NoImageEquivalent {
        provider: String,
        os_family: String,
        os_version: String,
    },

    #[error("Provider {provider} has an empty catalog")]
    EmptyCatalog { provider: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ResolveError {
    /// Whether this failure degrades a single field (run continues) as
    /// opposed to aborting the whole translation run.
    pub fn is_local(&self) -> bool {
        !matches!(self, ResolveError::Store(_))
    }
}
