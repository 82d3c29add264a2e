//! # rosetta_plan
//!
//! In-memory deployment plan model for cloud-rosetta.
//!
//! A [`PlanDocument`] holds the ordered resource instances a translation run
//! rewrites plus the opaque remainder it passes through. Attribute values
//! are tagged ([`AttrValue`]) so structural references between resources can
//! be preserved without runtime shape-sniffing.
//!
//! No file I/O happens here; callers hand in parsed JSON (or a JSON string)
//! and serialize the result themselves.

pub mod document;
pub mod error;
pub mod value;

pub use document::{substitute_provider_tokens, AttrSlot, PlanDocument, ResourceInstance};
pub use error::{PlanError, PlanResult};
pub use value::AttrValue;
