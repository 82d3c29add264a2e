//! In-memory mapping store.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::models::{Image, InstanceType, Region, ResourceMapping};
use crate::store::MappingStore;

/// An in-memory [`MappingStore`] backed by ordered maps.
///
/// Records are inserted up front and the store is read-only afterwards, so
/// shared references are safe across worker threads. Insertion enforces the
/// uniqueness keys of the record schema and validates mapping field rules;
/// an invalid mapping never becomes visible to a translation run.
#[derive(Debug, Default)]
pub struct MemoryStore {
    mappings: BTreeMap<(String, String, String), ResourceMapping>,
    instances: BTreeMap<(String, String), InstanceType>,
    regions: BTreeMap<(String, String), Region>,
    images: BTreeMap<(String, String), Image>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource type mapping.
    ///
    /// Validates the mapping's field rules; a conflict on an output key is a
    /// data-authoring bug and is rejected here rather than surfacing during
    /// translation.
    pub fn add_mapping(&mut self, mapping: ResourceMapping) -> StoreResult<()> {
        mapping.validate()?;
        let key = (
            mapping.source_provider.clone(),
            mapping.source_type.clone(),
            mapping.target_provider.clone(),
        );
        if self.mappings.contains_key(&key) {
            return Err(StoreError::DuplicateRecord(format!(
                "resource mapping ({}, {}, {})",
                key.0, key.1, key.2
            )));
        }
        debug!(
            "Adding mapping {}:{} -> {}:{}",
            mapping.source_provider, mapping.source_type, mapping.target_provider, mapping.target_type
        );
        self.mappings.insert(key, mapping);
        Ok(())
    }

    /// Insert an instance type record.
    pub fn add_instance_type(&mut self, instance: InstanceType) -> StoreResult<()> {
        if instance.vcpu == 0 {
            return Err(StoreError::InvalidMapping(format!(
                "instance type {}:{} declares zero vCPUs",
                instance.provider, instance.type_id
            )));
        }
        if instance.memory_gb <= 0.0 {
            return Err(StoreError::InvalidMapping(format!(
                "instance type {}:{} declares non-positive memory",
                instance.provider, instance.type_id
            )));
        }
        if instance.hourly_price < 0.0 {
            return Err(StoreError::InvalidMapping(format!(
                "instance type {}:{} declares a negative hourly price",
                instance.provider, instance.type_id
            )));
        }
        let key = (instance.provider.clone(), instance.type_id.clone());
        if self.instances.contains_key(&key) {
            return Err(StoreError::DuplicateRecord(format!(
                "instance type ({}, {})",
                key.0, key.1
            )));
        }
        self.instances.insert(key, instance);
        Ok(())
    }

    /// Insert a region record.
    pub fn add_region(&mut self, region: Region) -> StoreResult<()> {
        let key = (region.provider.clone(), region.region_code.clone());
        if self.regions.contains_key(&key) {
            return Err(StoreError::DuplicateRecord(format!(
                "region ({}, {})",
                key.0, key.1
            )));
        }
        self.regions.insert(key, region);
        Ok(())
    }

    /// Insert an image record.
    pub fn add_image(&mut self, image: Image) -> StoreResult<()> {
        let key = (image.provider.clone(), image.image_name.clone());
        if self.images.contains_key(&key) {
            return Err(StoreError::DuplicateRecord(format!(
                "image ({}, {})",
                key.0, key.1
            )));
        }
        self.images.insert(key, image);
        Ok(())
    }
}

impl MappingStore for MemoryStore {
    fn resource_mapping(
        &self,
        source_provider: &str,
        source_type: &str,
        target_provider: &str,
    ) -> StoreResult<Option<ResourceMapping>> {
        let key = (
            source_provider.to_string(),
            source_type.to_string(),
            target_provider.to_string(),
        );
        Ok(self.mappings.get(&key).cloned())
    }

    fn instance_types(&self, provider: &str) -> StoreResult<Vec<InstanceType>> {
        Ok(self
            .instances
            .values()
            .filter(|i| i.provider == provider)
            .cloned()
            .collect())
    }

    fn region(&self, provider: &str, region_code: &str) -> StoreResult<Option<Region>> {
        let key = (provider.to_string(), region_code.to_string());
        Ok(self.regions.get(&key).cloned())
    }

    fn regions(&self, provider: &str) -> StoreResult<Vec<Region>> {
        Ok(self
            .regions
            .values()
            .filter(|r| r.provider == provider)
            .cloned()
            .collect())
    }

    fn image(&self, provider: &str, image_name: &str) -> StoreResult<Option<Image>> {
        let key = (provider.to_string(), image_name.to_string());
        Ok(self.images.get(&key).cloned())
    }

    fn image_by_os(
        &self,
        provider: &str,
        os_family: &str,
        os_version: &str,
        architecture: Option<&str>,
    ) -> StoreResult<Option<Image>> {
        // Candidates come out of a BTreeMap, so they are already ordered by
        // image name; the first architecture-equal candidate wins, else the
        // first candidate overall.
        let candidates: Vec<&Image> = self
            .images
            .values()
            .filter(|i| {
                i.provider == provider && i.os_family == os_family && i.os_version == os_version
            })
            .collect();

        if let Some(arch) = architecture {
            if let Some(found) = candidates
                .iter()
                .find(|i| i.architecture.as_deref() == Some(arch))
            {
                return Ok(Some((*found).clone()));
            }
        }

        Ok(candidates.first().map(|i| (*i).clone()))
    }

    fn providers(&self) -> StoreResult<Vec<String>> {
        let mut providers: Vec<String> = self
            .instances
            .values()
            .map(|i| i.provider.clone())
            .chain(self.regions.values().map(|r| r.provider.clone()))
            .chain(self.images.values().map(|i| i.provider.clone()))
            .chain(
                self.mappings
                    .values()
                    .flat_map(|m| [m.source_provider.clone(), m.target_provider.clone()]),
            )
            .collect();
        providers.sort();
        providers.dedup();
        Ok(providers)
    }
}
