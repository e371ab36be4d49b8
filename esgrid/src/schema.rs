//! Mapping to grid field descriptors

use crate::error::EsGridError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A grid column derived from an ES mapping property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name
    pub id: String,

    /// Mapping attributes as reported by ES (`type`, `index`, `format`, ...)
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl FieldDescriptor {
    /// ES type of the field; object fields often have none
    pub fn field_type(&self) -> Option<&str> {
        self.attributes.get("type").and_then(Value::as_str)
    }
}

/// Result of a schema fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldDescriptor>,
}

/// Convert a `_mapping` response body into field descriptors
///
/// Accepts the type-level shape `{type: {properties}}` as well as the
/// index-level shapes `{index: {mappings: {properties}}}` and
/// `{index: {mappings: {type: {properties}}}}`. Only the first top-level key
/// is considered.
pub fn normalize_mapping(raw: &Value) -> Result<Schema, EsGridError> {
    let top = match raw {
        Value::Object(map) => map,
        _ => return Err(EsGridError::MissingMapping),
    };
    let (name, entry) = top.iter().next().ok_or(EsGridError::MissingMapping)?;

    let properties = find_properties(entry).ok_or_else(|| {
        EsGridError::Validation(format!("mapping for '{}' has no properties", name))
    })?;

    let fields = properties
        .iter()
        .map(|(field, attributes)| convert_field(field, attributes))
        .collect();

    Ok(Schema { fields })
}

fn find_properties(entry: &Value) -> Option<&Map<String, Value>> {
    if let Some(props) = entry.get("properties").and_then(Value::as_object) {
        return Some(props);
    }
    let mappings = entry.get("mappings")?;
    if let Some(props) = mappings.get("properties").and_then(Value::as_object) {
        return Some(props);
    }
    // Pre-7 index mapping: one more level keyed by type name
    mappings
        .as_object()?
        .values()
        .next()?
        .get("properties")
        .and_then(Value::as_object)
}

fn convert_field(name: &str, attributes: &Value) -> FieldDescriptor {
    let attributes = match attributes {
        Value::Object(map) => {
            let mut map = map.clone();
            map.remove("id");
            map
        }
        other => {
            tracing::warn!("Unexpected mapping entry for field '{}': {}", name, other);
            Map::new()
        }
    };

    FieldDescriptor {
        id: name.to_string(),
        attributes,
    }
}
