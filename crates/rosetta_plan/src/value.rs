//! Tagged attribute values.

use std::collections::BTreeMap;

use serde_json::Value;

/// An attribute value inside a resource instance.
///
/// Plans carry loosely typed attribute maps; tagging the shapes here lets
/// reference preservation and rule dispatch be checked statically instead of
/// shape-sniffing JSON at every use site. An [`AttrValue::Reference`] is the
/// structural encoding a plan uses for a pointer at another resource's
/// attribute (a JSON object whose only key is `"references"`); references
/// are carried verbatim and never resolved or flattened.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<AttrValue>),
    Map(BTreeMap<String, AttrValue>),
    Reference(Vec<String>),
}

impl AttrValue {
    /// Whether this value is a structural reference to another resource.
    pub fn is_reference(&self) -> bool {
        matches!(self, AttrValue::Reference(_))
    }

    /// The string content, for scalar strings only.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON value into the tagged representation.
    pub fn from_json(value: &Value) -> AttrValue {
        match value {
            Value::Null => AttrValue::Null,
            Value::Bool(b) => AttrValue::Bool(*b),
            Value::Number(n) => AttrValue::Number(n.clone()),
            Value::String(s) => AttrValue::String(s.clone()),
            Value::Array(items) => {
                AttrValue::List(items.iter().map(AttrValue::from_json).collect())
            }
            Value::Object(map) => {
                if let Some(addresses) = reference_addresses(map) {
                    return AttrValue::Reference(addresses);
                }
                AttrValue::Map(
                    map.iter()
                        .map(|(k, v)| (k.clone(), AttrValue::from_json(v)))
                        .collect(),
                )
            }
        }
    }

    /// Convert back into a JSON value, restoring reference structure.
    pub fn to_json(&self) -> Value {
        match self {
            AttrValue::Null => Value::Null,
            AttrValue::Bool(b) => Value::Bool(*b),
            AttrValue::Number(n) => Value::Number(n.clone()),
            AttrValue::String(s) => Value::String(s.clone()),
            AttrValue::List(items) => Value::Array(items.iter().map(AttrValue::to_json).collect()),
            AttrValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            AttrValue::Reference(addresses) => {
                let mut obj = serde_json::Map::new();
                obj.insert(
                    "references".to_string(),
                    Value::Array(addresses.iter().cloned().map(Value::String).collect()),
                );
                Value::Object(obj)
            }
        }
    }
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        AttrValue::from_json(&value)
    }
}

impl From<&AttrValue> for Value {
    fn from(value: &AttrValue) -> Self {
        value.to_json()
    }
}

/// Extract reference addresses from an object of the shape
/// `{"references": ["addr", ...]}`; anything else is a plain map.
fn reference_addresses(map: &serde_json::Map<String, Value>) -> Option<Vec<String>> {
    if map.len() != 1 {
        return None;
    }
    let Value::Array(items) = map.get("references")? else {
        return None;
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}
