//! Store snapshot deserialization.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreResult;
use crate::memory::MemoryStore;
use crate::models::{Image, InstanceType, Region, ResourceMapping};

/// Serde model for a complete store content snapshot.
///
/// How snapshots are authored, refreshed, or transported is out of scope;
/// this type only gives callers a way to hand a fully populated store to the
/// engine without going through the insertion API record by record.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub mappings: Vec<ResourceMapping>,
    #[serde(default)]
    pub instance_types: Vec<InstanceType>,
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl MemoryStore {
    /// Build a store from a snapshot, running the same validation as the
    /// insertion API.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> StoreResult<Self> {
        debug!(
            "Loading store snapshot: {} mappings, {} instance types, {} regions, {} images",
            snapshot.mappings.len(),
            snapshot.instance_types.len(),
            snapshot.regions.len(),
            snapshot.images.len()
        );

        let mut store = MemoryStore::new();
        for mapping in snapshot.mappings {
            store.add_mapping(mapping)?;
        }
        for instance in snapshot.instance_types {
            store.add_instance_type(instance)?;
        }
        for region in snapshot.regions {
            store.add_region(region)?;
        }
        for image in snapshot.images {
            store.add_image(image)?;
        }
        Ok(store)
    }

    /// Deserialize a YAML snapshot string into a validated store.
    pub fn from_yaml_str(content: &str) -> StoreResult<Self> {
        let snapshot: StoreSnapshot = serde_yaml::from_str(content)?;
        Self::from_snapshot(snapshot)
    }
}
