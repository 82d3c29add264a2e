//! Plan document model.
//!
//! A plan document is an ordered sequence of resource instances plus an
//! opaque remainder (provider configuration, metadata, anything this engine
//! does not recognize). The remainder passes through translation untouched
//! except for a provider-name substitution; instances are the unit the
//! translator rewrites.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{PlanError, PlanResult};
use crate::value::AttrValue;

/// Where an instance's attributes live in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrSlot {
    /// `planned_values.root_module.resources[*].values`
    PlannedValues,
    /// `resource_changes[*].change.after`
    ResourceChange,
}

/// One declared infrastructure object within a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceInstance {
    /// Stable identifier, used only for reporting.
    pub address: String,
    /// Provider resource type identifier; rewritten by translation.
    pub type_name: String,
    /// Open attribute map; rewritten by field rules.
    pub attributes: BTreeMap<String, AttrValue>,
    /// Unrecognized sibling fields (mode, name, provider_name, ...), passed
    /// through untouched apart from provider-name substitution on translated
    /// instances.
    pub extra: BTreeMap<String, Value>,
    /// Which document slot the attributes came from.
    pub slot: AttrSlot,
    /// Whether the source document carried an attribute block at all.
    /// Controls re-serialization when the attribute map is empty, so a
    /// `"after": null` change entry survives byte-for-byte.
    pub has_attr_block: bool,
}

/// A parsed plan document.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDocument {
    /// Resource instances in document order: planned values first, then
    /// resource change entries.
    pub resources: Vec<ResourceInstance>,
    /// Everything else, verbatim.
    pub remainder: Value,
}

impl PlanDocument {
    /// Parse a plan document from a JSON string.
    pub fn from_json_str(content: &str) -> PlanResult<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(&value)
    }

    /// Parse a plan document from an already-deserialized JSON value.
    pub fn from_value(value: &Value) -> PlanResult<Self> {
        if !value.is_object() {
            return Err(PlanError::MalformedDocument(
                "document root must be an object".to_string(),
            ));
        }

        let mut remainder = value.clone();
        let mut resources = Vec::new();

        if let Some(entries) =
            take_array(&mut remainder, &["planned_values", "root_module", "resources"])
        {
            for entry in entries {
                resources.push(parse_planned_entry(entry)?);
            }
        }

        if let Some(entries) = take_array(&mut remainder, &["resource_changes"]) {
            for entry in entries {
                resources.push(parse_change_entry(entry)?);
            }
        }

        debug!("Parsed plan document with {} resource instances", resources.len());
        Ok(Self {
            resources,
            remainder,
        })
    }

    /// Serialize back into a JSON value of the same structural shape as the
    /// input.
    pub fn to_value(&self) -> Value {
        let mut root = self.remainder.clone();

        let planned: Vec<Value> = self
            .resources
            .iter()
            .filter(|r| r.slot == AttrSlot::PlannedValues)
            .map(serialize_planned_entry)
            .collect();
        if !planned.is_empty() {
            set_array(
                &mut root,
                &["planned_values", "root_module", "resources"],
                planned,
            );
        }

        let changes: Vec<Value> = self
            .resources
            .iter()
            .filter(|r| r.slot == AttrSlot::ResourceChange)
            .map(serialize_change_entry)
            .collect();
        if !changes.is_empty() {
            set_array(&mut root, &["resource_changes"], changes);
        }

        root
    }

    /// Serialize to a pretty-printed JSON string.
    pub fn to_json_string(&self) -> PlanResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }

    /// Apply provider-name substitution to the opaque remainder.
    pub fn substitute_provider(&mut self, from: &str, to: &str) {
        substitute_provider_tokens(&mut self.remainder, from, to);
    }
}

/// Replace provider-name tokens inside an opaque JSON subtree: map keys
/// equal to `from`, string values equal to `from`, and `/`-separated path
/// segments equal to `from` (registry-style full names). Anything else is
/// left alone.
pub fn substitute_provider_tokens(value: &mut Value, from: &str, to: &str) {
    match value {
        Value::String(s) => {
            if let Some(replaced) = replace_tokens(s, from, to) {
                *s = replaced;
            }
        }
        Value::Array(items) => {
            for item in items {
                substitute_provider_tokens(item, from, to);
            }
        }
        Value::Object(map) => {
            if map.contains_key(from) {
                if let Some(moved) = map.remove(from) {
                    map.insert(to.to_string(), moved);
                }
            }
            for (_, item) in map.iter_mut() {
                substitute_provider_tokens(item, from, to);
            }
        }
        _ => {}
    }
}

fn replace_tokens(s: &str, from: &str, to: &str) -> Option<String> {
    if s == from {
        return Some(to.to_string());
    }
    if !s.contains('/') {
        return None;
    }
    let segments: Vec<&str> = s.split('/').collect();
    if !segments.iter().any(|seg| *seg == from) {
        return None;
    }
    Some(
        segments
            .into_iter()
            .map(|seg| if seg == from { to } else { seg })
            .collect::<Vec<_>>()
            .join("/"),
    )
}

/// Remove the array at `path`, leaving an empty array behind so the
/// document keeps its shape when the sequence stays empty.
fn take_array(root: &mut Value, path: &[&str]) -> Option<Vec<Value>> {
    let mut current = root;
    for key in &path[..path.len() - 1] {
        current = current.as_object_mut()?.get_mut(*key)?;
    }
    let map = current.as_object_mut()?;
    let last = *path.last().expect("path is never empty");
    match map.get_mut(last)? {
        Value::Array(items) => Some(std::mem::take(items)),
        _ => None,
    }
}

/// Write `items` at `path`, creating intermediate objects as needed.
fn set_array(root: &mut Value, path: &[&str], items: Vec<Value>) {
    let mut current = root;
    for key in &path[..path.len() - 1] {
        let map = match current.as_object_mut() {
            Some(map) => map,
            None => return,
        };
        current = map
            .entry((*key).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if let Some(map) = current.as_object_mut() {
        let last = *path.last().expect("path is never empty");
        map.insert(last.to_string(), Value::Array(items));
    }
}

fn string_field(obj: &mut Map<String, Value>, key: &str) -> PlanResult<String> {
    match obj.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(PlanError::MalformedDocument(format!(
            "resource field '{key}' must be a string"
        ))),
        None => Err(PlanError::MalformedDocument(format!(
            "resource entry is missing '{key}'"
        ))),
    }
}

fn attrs_from_object(map: Map<String, Value>) -> BTreeMap<String, AttrValue> {
    map.into_iter()
        .map(|(k, v)| (k, AttrValue::from_json(&v)))
        .collect()
}

fn attrs_to_object(attrs: &BTreeMap<String, AttrValue>) -> Value {
    Value::Object(attrs.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
}

fn parse_planned_entry(entry: Value) -> PlanResult<ResourceInstance> {
    let Value::Object(mut obj) = entry else {
        return Err(PlanError::MalformedDocument(
            "planned resource entry must be an object".to_string(),
        ));
    };
    let address = string_field(&mut obj, "address")?;
    let type_name = string_field(&mut obj, "type")?;

    let (attributes, has_attr_block) = match obj.remove("values") {
        Some(Value::Object(values)) => (attrs_from_object(values), true),
        Some(other) => {
            // Restore and pass through anything that is not an object.
            obj.insert("values".to_string(), other);
            (BTreeMap::new(), false)
        }
        None => (BTreeMap::new(), false),
    };

    Ok(ResourceInstance {
        address,
        type_name,
        attributes,
        extra: obj.into_iter().collect(),
        slot: AttrSlot::PlannedValues,
        has_attr_block,
    })
}

fn parse_change_entry(entry: Value) -> PlanResult<ResourceInstance> {
    let Value::Object(mut obj) = entry else {
        return Err(PlanError::MalformedDocument(
            "resource change entry must be an object".to_string(),
        ));
    };
    let address = string_field(&mut obj, "address")?;
    let type_name = string_field(&mut obj, "type")?;

    let mut attributes = BTreeMap::new();
    let mut has_attr_block = false;
    if let Some(Value::Object(mut change)) = obj.remove("change") {
        // Only an object-shaped "after" becomes the attribute map; a null
        // "after" (destroy actions) stays inside the change block verbatim.
        if matches!(change.get("after"), Some(Value::Object(_))) {
            if let Some(Value::Object(after)) = change.remove("after") {
                attributes = attrs_from_object(after);
                has_attr_block = true;
            }
        }
        obj.insert("change".to_string(), Value::Object(change));
    }

    Ok(ResourceInstance {
        address,
        type_name,
        attributes,
        extra: obj.into_iter().collect(),
        slot: AttrSlot::ResourceChange,
        has_attr_block,
    })
}

fn serialize_planned_entry(resource: &ResourceInstance) -> Value {
    let mut obj: Map<String, Value> = resource
        .extra
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    obj.insert(
        "address".to_string(),
        Value::String(resource.address.clone()),
    );
    obj.insert("type".to_string(), Value::String(resource.type_name.clone()));
    if resource.has_attr_block || !resource.attributes.is_empty() {
        obj.insert("values".to_string(), attrs_to_object(&resource.attributes));
    }
    Value::Object(obj)
}

fn serialize_change_entry(resource: &ResourceInstance) -> Value {
    let mut obj: Map<String, Value> = resource
        .extra
        .iter()
        .filter(|(k, _)| k.as_str() != "change")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut change = match resource.extra.get("change") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    let write_after = resource.has_attr_block || !resource.attributes.is_empty();
    if write_after {
        change.insert("after".to_string(), attrs_to_object(&resource.attributes));
    }
    if resource.extra.contains_key("change") || write_after {
        obj.insert("change".to_string(), Value::Object(change));
    }

    obj.insert(
        "address".to_string(),
        Value::String(resource.address.clone()),
    );
    obj.insert("type".to_string(), Value::String(resource.type_name.clone()));
    Value::Object(obj)
}
