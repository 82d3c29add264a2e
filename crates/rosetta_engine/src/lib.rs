//! # rosetta_engine
//!
//! Plan translation engine for cloud-rosetta.
//!
//! Translates a parsed deployment plan from one cloud provider's resource
//! vocabulary into another's so a cost estimation tool that only recognizes
//! the target provider can price it. The engine rewrites resource type
//! identifiers and attribute fields through a [`MappingStore`], resolving
//! instance types, regions, and images by equivalence rather than name.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rosetta_engine::Translator;
//! use rosetta_plan::PlanDocument;
//! use rosetta_store::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::from_yaml_str("{}").unwrap());
//! let plan = PlanDocument::from_json_str("{}").unwrap();
//!
//! let translation = Translator::new(store).translate(&plan, "ovh", "aws").unwrap();
//! println!("{}", translation.report.render());
//! ```

pub mod error;
pub mod report;
pub mod translator;

pub use error::{TranslateError, TranslateResult};
pub use report::{PartialResource, ResourceStatus, TranslationReport, UntranslatedResource};
pub use translator::{TranslateOptions, Translation, Translator};

// Re-exported so engine callers can assemble a run from one crate.
pub use rosetta_plan::PlanDocument;
pub use rosetta_store::MappingStore;
