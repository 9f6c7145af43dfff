//! Field records and raw property sets

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const NAME: &str = "name";
const DATA_TYPE: &str = "data-type";
const HTML_TYPE: &str = "html-type";

/// One positional input entry before transformation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProperties {
    pub name: String,
    #[serde(rename = "data-type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(rename = "html-type", default, skip_serializing_if = "Option::is_none")]
    pub html_type: Option<String>,
}

impl FieldProperties {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
            html_type: None,
        }
    }
}

/// A canonical field definition as stored in a fields-file
///
/// `name`, `data-type` and `html-type` are the only attributes this crate
/// interprets. Anything else (labels, flags, validation rules) is carried in
/// `attributes` and written back untouched. A `data-type` or `html-type` that
/// is not a string (including `null`) is treated as opaque too.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRecord {
    /// Unique name of the field within its fields-file
    pub name: String,
    /// Storage type hint (e.g., "string", "int")
    pub data_type: Option<String>,
    /// Presentation type hint (e.g., "text", "select")
    pub html_type: Option<String>,
    /// Transformer-derived attributes, opaque to the merge
    pub attributes: Map<String, Value>,
}

/// Pull a string-valued key out of the map, leaving any other value in place
fn take_string(attributes: &mut Map<String, Value>, key: &str) -> Option<String> {
    if !matches!(attributes.get(key), Some(Value::String(_))) {
        return None;
    }
    match attributes.remove(key) {
        Some(Value::String(value)) => Some(value),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for FieldRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut attributes = Map::<String, Value>::deserialize(deserializer)?;

        let name = match attributes.remove(NAME) {
            Some(Value::String(name)) => name,
            Some(other) => {
                return Err(de::Error::custom(format!("field name must be a string, found {}", other)))
            }
            None => return Err(de::Error::missing_field(NAME)),
        };
        let data_type = take_string(&mut attributes, DATA_TYPE);
        let html_type = take_string(&mut attributes, HTML_TYPE);

        Ok(Self {
            name,
            data_type,
            html_type,
            attributes,
        })
    }
}

impl Serialize for FieldRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(NAME, &self.name)?;
        if let Some(data_type) = &self.data_type {
            map.serialize_entry(DATA_TYPE, data_type)?;
        }
        if let Some(html_type) = &self.html_type {
            map.serialize_entry(HTML_TYPE, html_type)?;
        }
        for (key, value) in &self.attributes {
            let shadowed = key == NAME
                || (key == DATA_TYPE && self.data_type.is_some())
                || (key == HTML_TYPE && self.html_type.is_some());
            if !shadowed {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl FieldRecord {
    /// Create a record with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
            html_type: None,
            attributes: Map::new(),
        }
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn with_html_type(mut self, html_type: impl Into<String>) -> Self {
        self.html_type = Some(html_type.into());
        self
    }

    /// Set a derived attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

impl From<FieldProperties> for FieldRecord {
    fn from(props: FieldProperties) -> Self {
        Self {
            name: props.name,
            data_type: props.data_type,
            html_type: props.html_type,
            attributes: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_types_are_not_serialized() {
        let record = FieldRecord::new("email");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({ "name": "email" }));
    }

    #[test]
    fn test_unknown_attributes_survive() {
        let value = json!({
            "name": "status",
            "data-type": "string",
            "options": ["open", "closed"],
            "is-nullable": true
        });
        let record: FieldRecord = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(record.data_type.as_deref(), Some("string"));
        assert_eq!(record.attribute("options"), Some(&json!(["open", "closed"])));
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
    }

    #[test]
    fn test_non_string_type_hints_are_kept_verbatim() {
        let value = json!({ "name": "id", "data-type": null, "html-type": 5, "x": null });
        let record: FieldRecord = serde_json::from_value(value.clone()).unwrap();

        assert_eq!(record.data_type, None);
        assert_eq!(record.html_type, None);
        assert_eq!(record.attribute("data-type"), Some(&Value::Null));
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
    }

    #[test]
    fn test_typed_hint_wins_over_attribute() {
        let record = FieldRecord::new("id")
            .with_attribute("data-type", "bigint")
            .with_data_type("int");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({ "name": "id", "data-type": "int" }));
    }

    #[test]
    fn test_name_must_be_string() {
        let result: Result<FieldRecord, _> = serde_json::from_value(json!({ "name": 7 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_name_is_required() {
        let result: Result<FieldRecord, _> = serde_json::from_value(json!({ "label": "Id" }));
        assert!(result.is_err());
    }
}
