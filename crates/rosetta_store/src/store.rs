//! The read-only query surface over mapping data.

use crate::error::StoreResult;
use crate::models::{Image, InstanceType, Region, ResourceMapping};

/// Read-only query surface over the four record kinds a translation run
/// consumes: resource type mappings, the instance type catalog, the region
/// catalog, and the image catalog.
///
/// Implementations must be safe for concurrent read access; no writes occur
/// during a run. A backing store that cannot answer fails with
/// [`StoreError::Unavailable`](crate::StoreError::Unavailable), which aborts
/// the whole run. "No record" is `Ok(None)` (or an empty list) and is the
/// normal signal for untranslated passthrough, never an error.
pub trait MappingStore: Send + Sync {
    /// Look up the resource type mapping for
    /// `(source_provider, source_type, target_provider)`.
    fn resource_mapping(
        &self,
        source_provider: &str,
        source_type: &str,
        target_provider: &str,
    ) -> StoreResult<Option<ResourceMapping>>;

    /// All instance types of one provider, ordered by `type_id`.
    fn instance_types(&self, provider: &str) -> StoreResult<Vec<InstanceType>>;

    /// Look up one region by code.
    fn region(&self, provider: &str, region_code: &str) -> StoreResult<Option<Region>>;

    /// All regions of one provider, ordered by `region_code`.
    fn regions(&self, provider: &str) -> StoreResult<Vec<Region>>;

    /// Look up one image by name.
    fn image(&self, provider: &str, image_name: &str) -> StoreResult<Option<Image>>;

    /// Cross-provider image equivalence: the image of `provider` matching
    /// `(os_family, os_version)`. Candidates with an architecture tag equal
    /// to `architecture` are preferred when both sides are tagged; remaining
    /// ties resolve to the lexicographically smallest image name.
    fn image_by_os(
        &self,
        provider: &str,
        os_family: &str,
        os_version: &str,
        architecture: Option<&str>,
    ) -> StoreResult<Option<Image>>;

    /// Every provider the store knows about, sorted and deduplicated.
    /// Provider identifiers are opaque and matched case-sensitively.
    fn providers(&self) -> StoreResult<Vec<String>>;
}
