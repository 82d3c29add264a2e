//! # rosetta_store
//!
//! Read-only mapping store interface for cloud-rosetta.
//!
//! This crate defines the four record kinds a translation run consumes
//! (resource type mappings, instance types, regions, images), the
//! [`MappingStore`] query trait, and an in-memory implementation with
//! insert-time validation.
//!
//! ## Example
//!
//! ```rust
//! use rosetta_store::{MappingStore, MemoryStore, InstanceType};
//!
//! let mut store = MemoryStore::new();
//! store.add_instance_type(InstanceType {
//!     provider: "ovh".to_string(),
//!     type_id: "d2-2".to_string(),
//!     vcpu: 1,
//!     memory_gb: 2.0,
//!     family: Some("general".to_string()),
//!     generation: 1,
//!     hourly_price: 0.0084,
//! }).unwrap();
//!
//! assert_eq!(store.providers().unwrap(), vec!["ovh".to_string()]);
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod snapshot;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use models::{FieldRule, Image, InstanceType, Region, ResourceMapping};
pub use snapshot::StoreSnapshot;
pub use store::MappingStore;
