//! Decoding of the tagged custom-field values carried by issues.

use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

use super::{FieldType, FieldValue, Value};
use crate::error::{Error, FieldError, Result};

/// One entry of an issue's `customFields` array as sent by the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireField {
    name: String,
    field_type_id: i64,
    #[serde(default)]
    value: serde_json::Value,
}

/// Outgoing form of [`WireField`], borrowing from a [`FieldValue`].
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireFieldRef<'a> {
    name: &'a str,
    field_type_id: i64,
    value: serde_json::Value,
}

/// List item embedded in a field value. Only the label is kept.
#[derive(Debug, Deserialize)]
struct WireItem {
    name: String,
}

fn wire_item(label: &str) -> serde_json::Value {
    serde_json::json!({ "name": label })
}

/// Shape of the wire value for a field type.
#[derive(Debug, Clone, Copy, PartialEq)]
enum WireShape {
    Text,
    Number,
    Date,
    Item,
    Items,
}

impl WireShape {
    fn of(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text | FieldType::Sentence => WireShape::Text,
            FieldType::Number => WireShape::Number,
            FieldType::Date => WireShape::Date,
            FieldType::SingleList | FieldType::Radio => WireShape::Item,
            FieldType::MultipleList | FieldType::Checkbox => WireShape::Items,
        }
    }

    fn decode(self, raw: serde_json::Value) -> std::result::Result<Value, String> {
        match self {
            WireShape::Text => serde_json::from_value::<String>(raw)
                .map(Value::Single)
                .map_err(|e| e.to_string()),
            WireShape::Number => match raw {
                serde_json::Value::Number(n) => Ok(Value::Single(n.to_string())),
                other => Err(format!("expected a number, found {}", other)),
            },
            WireShape::Date => match raw {
                serde_json::Value::String(s) => Ok(Value::Single(s)),
                other => Err(format!("expected a date string, found {}", other)),
            },
            WireShape::Item => serde_json::from_value::<WireItem>(raw)
                .map(|item| Value::Single(item.name))
                .map_err(|e| e.to_string()),
            WireShape::Items => serde_json::from_value::<Vec<WireItem>>(raw)
                .map(|items| Value::Multiple(items.into_iter().map(|i| i.name).collect()))
                .map_err(|e| e.to_string()),
        }
    }

    /// Inverse of [`WireShape::decode`]. Numbers that do not parse are kept
    /// as strings.
    fn encode(self, value: &Value) -> std::result::Result<serde_json::Value, String> {
        match (self, value) {
            (WireShape::Text | WireShape::Date, Value::Single(s)) => {
                Ok(serde_json::Value::String(s.clone()))
            }
            (WireShape::Number, Value::Single(s)) => {
                Ok(serde_json::from_str::<serde_json::Number>(s)
                    .map(serde_json::Value::Number)
                    .unwrap_or_else(|_| serde_json::Value::String(s.clone())))
            }
            (WireShape::Item, Value::Single(label)) => Ok(wire_item(label)),
            (WireShape::Items, Value::Multiple(labels)) => Ok(serde_json::Value::Array(
                labels.iter().map(|label| wire_item(label)).collect(),
            )),
            (WireShape::Items, Value::Single(_)) => Err("expected a list of labels".to_string()),
            (_, Value::Multiple(_)) => Err("expected a single value".to_string()),
        }
    }
}

/// The custom fields attached to one issue, keyed by unique name.
///
/// Entry order follows the payload. Serializes back into the same
/// `customFields` array shape it decodes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomFieldCollection {
    fields: Vec<FieldValue>,
}

impl CustomFieldCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a `customFields` JSON array.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Option<Vec<WireField>> = serde_json::from_str(json)?;
        Self::decode(entries.unwrap_or_default()).map_err(Error::from)
    }

    /// Decode a `customFields` array that was already parsed as JSON.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let entries: Option<Vec<WireField>> = serde_json::from_value(value)?;
        Self::decode(entries.unwrap_or_default()).map_err(Error::from)
    }

    fn decode(entries: Vec<WireField>) -> std::result::Result<Self, FieldError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(FieldError::AmbiguousName(entry.name.clone()));
            }
        }

        let fields = entries
            .into_iter()
            .map(decode_entry)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { fields })
    }

    /// Look up a field by exact name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Insert a field, replacing any field with the same name in place.
    ///
    /// Returns the replaced field.
    pub fn set(&mut self, field: FieldValue) -> Option<FieldValue> {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => Some(std::mem::replace(existing, field)),
            None => {
                self.fields.push(field);
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let index = self.fields.iter().position(|f| f.name == name)?;
        Some(self.fields.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldValue> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn decode_entry(entry: WireField) -> std::result::Result<FieldValue, FieldError> {
    let field_type =
        FieldType::from_id(entry.field_type_id).ok_or_else(|| FieldError::UnknownFieldType {
            name: entry.name.clone(),
            type_id: entry.field_type_id,
        })?;

    if entry.value.is_null() {
        return Ok(FieldValue::cleared(entry.name, field_type));
    }

    let value = WireShape::of(field_type)
        .decode(entry.value)
        .map_err(|reason| FieldError::Decode {
            name: entry.name.clone(),
            reason,
        })?;

    Ok(FieldValue::new(entry.name, field_type, Some(value)))
}

impl<'a> IntoIterator for &'a CustomFieldCollection {
    type Item = &'a FieldValue;
    type IntoIter = std::slice::Iter<'a, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl FromIterator<FieldValue> for CustomFieldCollection {
    /// Collects through [`CustomFieldCollection::set`], so a later field
    /// replaces an earlier one of the same name. Payload decoding never goes
    /// through here and rejects duplicate names instead.
    fn from_iter<I: IntoIterator<Item = FieldValue>>(iter: I) -> Self {
        let mut collection = Self::new();
        for field in iter {
            collection.set(field);
        }
        collection
    }
}

impl<'de> Deserialize<'de> for CustomFieldCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = Option::<Vec<WireField>>::deserialize(deserializer)?;
        Self::decode(entries.unwrap_or_default()).map_err(serde::de::Error::custom)
    }
}

impl Serialize for CustomFieldCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.fields.len()))?;
        for field in &self.fields {
            let value = match &field.value {
                None => serde_json::Value::Null,
                Some(value) => WireShape::of(field.field_type)
                    .encode(value)
                    .map_err(|reason| {
                        <S::Error as serde::ser::Error>::custom(format!(
                            "field '{}': {}",
                            field.name, reason
                        ))
                    })?,
            };
            seq.serialize_element(&WireFieldRef {
                name: &field.name,
                field_type_id: field.field_type.id(),
                value,
            })?;
        }
        seq.end()
    }
}
