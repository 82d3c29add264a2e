//! Record models for the mapping store.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// A single attribute-rewrite rule inside a resource mapping.
///
/// Rules are applied in definition order, but no two rules of one mapping
/// may write the same output key; that conflict is a data-authoring bug and
/// is rejected when the mapping enters a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FieldRule {
    /// Move a value from one attribute key to another, unchanged.
    Rename { from: String, to: String },
    /// Resolve an instance type through the equivalence resolver.
    InstanceType { from: String, to: String },
    /// Resolve a region code through the region resolver.
    Region { from: String, to: String },
    /// Resolve an image identifier through the image catalog.
    Image { from: String, to: String },
    /// Set a fixed value with no source analog.
    Constant {
        key: String,
        value: serde_json::Value,
    },
    /// Remove an attribute with no analog and no safe default.
    Drop { key: String },
}

impl FieldRule {
    /// The attribute key this rule writes, if any.
    pub fn output_key(&self) -> Option<&str> {
        match self {
            FieldRule::Rename { to, .. }
            | FieldRule::InstanceType { to, .. }
            | FieldRule::Region { to, .. }
            | FieldRule::Image { to, .. } => Some(to),
            FieldRule::Constant { key, .. } => Some(key),
            FieldRule::Drop { .. } => None,
        }
    }

    /// Short label used in diagnostics and report entries.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldRule::Rename { .. } => "rename",
            FieldRule::InstanceType { .. } => "instance_type",
            FieldRule::Region { .. } => "region",
            FieldRule::Image { .. } => "image",
            FieldRule::Constant { .. } => "constant",
            FieldRule::Drop { .. } => "drop",
        }
    }
}

/// A resource type mapping between two providers.
///
/// Unique on `(source_provider, source_type, target_provider)`. Loaded once
/// per translation run and immutable while the run lasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMapping {
    /// Coarse resource class (`compute`, `storage`, `network`, ...).
    pub category: String,
    pub source_provider: String,
    pub source_type: String,
    pub target_provider: String,
    pub target_type: String,
    #[serde(default)]
    pub field_rules: Vec<FieldRule>,
}

impl ResourceMapping {
    /// Reject mappings where two rules write the same output key.
    pub fn validate(&self) -> StoreResult<()> {
        let mut written = BTreeSet::new();
        for rule in &self.field_rules {
            if let Some(key) = rule.output_key() {
                if !written.insert(key.to_string()) {
                    return Err(StoreError::InvalidMapping(format!(
                        "mapping {} -> {} ({} -> {}): two rules write output key '{}'",
                        self.source_provider,
                        self.target_provider,
                        self.source_type,
                        self.target_type,
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

/// An instance type offered by one provider, described by hardware specs.
///
/// Unique on `(provider, type_id)`. The equivalence resolver reads these;
/// nothing in the engine writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceType {
    pub provider: String,
    pub type_id: String,
    pub vcpu: u32,
    pub memory_gb: f64,
    /// Workload classification (`general`, `compute`, `memory`, ...).
    /// The resolver prefers a matching family only when both sides are tagged.
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub generation: u32,
    #[serde(default)]
    pub hourly_price: f64,
}

/// A provider region with its geographic location.
///
/// Unique on `(provider, region_code)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub provider: String,
    pub region_code: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// Operator-assigned continent tag; when present on both sides the
    /// region resolver restricts to same-continent candidates first.
    #[serde(default)]
    pub continent: Option<String>,
}

/// A machine image identified by name, classified by operating system.
///
/// Unique on `(provider, image_name)`. Cross-provider equivalence matches
/// `(os_family, os_version)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub provider: String,
    pub image_name: String,
    pub os_family: String,
    pub os_version: String,
    #[serde(default)]
    pub architecture: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping_with_rules(rules: Vec<FieldRule>) -> ResourceMapping {
        ResourceMapping {
            category: "compute".to_string(),
            source_provider: "ovh".to_string(),
            source_type: "openstack_compute_instance_v2".to_string(),
            target_provider: "aws".to_string(),
            target_type: "aws_instance".to_string(),
            field_rules: rules,
        }
    }

    #[test]
    fn test_validate_accepts_distinct_output_keys() {
        let mapping = mapping_with_rules(vec![
            FieldRule::InstanceType {
                from: "flavor_name".to_string(),
                to: "instance_type".to_string(),
            },
            FieldRule::Region {
                from: "region".to_string(),
                to: "availability_zone".to_string(),
            },
            FieldRule::Drop {
                key: "config_drive".to_string(),
            },
        ]);

        assert!(mapping.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_conflicting_output_keys() {
        let mapping = mapping_with_rules(vec![
            FieldRule::Rename {
                from: "name".to_string(),
                to: "instance_type".to_string(),
            },
            FieldRule::InstanceType {
                from: "flavor_name".to_string(),
                to: "instance_type".to_string(),
            },
        ]);

        let err = mapping.validate().unwrap_err();
        assert!(matches!(err, StoreError::InvalidMapping(_)));
        assert!(err.to_string().contains("instance_type"));
    }

    #[test]
    fn test_drop_rules_never_conflict() {
        let mapping = mapping_with_rules(vec![
            FieldRule::Drop {
                key: "metadata".to_string(),
            },
            FieldRule::Drop {
                key: "metadata".to_string(),
            },
        ]);

        assert!(mapping.validate().is_ok());
    }

    #[test]
    fn test_field_rule_yaml_round_trip() {
        let yaml = r#"
rule: instance_type
from: flavor_name
to: instance_type
"#;
        let rule: FieldRule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            rule,
            FieldRule::InstanceType {
                from: "flavor_name".to_string(),
                to: "instance_type".to_string(),
            }
        );
    }
}
