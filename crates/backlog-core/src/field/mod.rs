//! Custom-field type system.
//!
//! Backlog lets every project define its own set of typed custom fields.
//! An issue carries the current values tagged with a field type id, while
//! the update endpoint expects numeric field ids and list item ids. This
//! module bridges the two:
//!
//! - [`CustomFieldCollection`] decodes the tagged wire values of one issue
//! - [`FieldSchemaCatalog`] resolves names to ids for one project
//! - [`build_update_params`] joins both into update form parameters
//!
//! The collection and the catalog are unrelated types; they only meet
//! through name lookups during parameter building.

mod codec;
mod params;
mod schema;

pub use codec::CustomFieldCollection;
pub use params::{build_update_params, custom_field_key, FormParams};
pub use schema::{FieldDefinition, FieldSchemaCatalog};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::FieldError;

// =============================================================================
// Field type
// =============================================================================

/// Kind of a custom field, as tagged by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Sentence,
    Number,
    Date,
    SingleList,
    MultipleList,
    Checkbox,
    Radio,
}

impl FieldType {
    /// All field types in wire id order.
    pub const ALL: [FieldType; 8] = [
        FieldType::Text,
        FieldType::Sentence,
        FieldType::Number,
        FieldType::Date,
        FieldType::SingleList,
        FieldType::MultipleList,
        FieldType::Checkbox,
        FieldType::Radio,
    ];

    /// Look up a field type by its wire id (`fieldTypeId` / `typeId`).
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(FieldType::Text),
            2 => Some(FieldType::Sentence),
            3 => Some(FieldType::Number),
            4 => Some(FieldType::Date),
            5 => Some(FieldType::SingleList),
            6 => Some(FieldType::MultipleList),
            7 => Some(FieldType::Checkbox),
            8 => Some(FieldType::Radio),
            _ => None,
        }
    }

    /// Wire id of this field type.
    pub fn id(self) -> i64 {
        match self {
            FieldType::Text => 1,
            FieldType::Sentence => 2,
            FieldType::Number => 3,
            FieldType::Date => 4,
            FieldType::SingleList => 5,
            FieldType::MultipleList => 6,
            FieldType::Checkbox => 7,
            FieldType::Radio => 8,
        }
    }

    /// Whether values of this type are selected from list items.
    pub fn has_items(self) -> bool {
        matches!(
            self,
            FieldType::SingleList | FieldType::MultipleList | FieldType::Checkbox | FieldType::Radio
        )
    }

    /// Whether values of this type hold several labels.
    pub fn is_multi_valued(self) -> bool {
        matches!(self, FieldType::MultipleList | FieldType::Checkbox)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Sentence => "sentence",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::SingleList => "single_list",
            FieldType::MultipleList => "multiple_list",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.id())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = i64::deserialize(deserializer)?;
        FieldType::from_id(id)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown field type id {}", id)))
    }
}

// =============================================================================
// Values
// =============================================================================

/// A decoded custom-field value.
///
/// List-typed fields hold item *labels*, never item ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Text, sentence, number, date, single list and radio values
    Single(String),
    /// Multiple list and checkbox values, in payload order
    Multiple(Vec<String>),
}

/// One custom field of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValue {
    /// Field name, the key used for schema lookups
    pub name: String,
    /// Field type as tagged in the payload
    pub field_type: FieldType,
    /// `None` when the field is present but cleared
    pub value: Option<Value>,
}

impl FieldValue {
    pub fn new(name: impl Into<String>, field_type: FieldType, value: Option<Value>) -> Self {
        Self {
            name: name.into(),
            field_type,
            value,
        }
    }

    /// A field with no value.
    pub fn cleared(name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(name, field_type, None)
    }

    /// Build a field value from user-supplied strings.
    ///
    /// Multi-valued types take every string as a label. Other types take at
    /// most one string; no strings at all clears the field.
    pub fn from_inputs(
        name: impl Into<String>,
        field_type: FieldType,
        inputs: Vec<String>,
    ) -> Result<Self, FieldError> {
        let name = name.into();
        if field_type.is_multi_valued() {
            return Ok(Self::new(name, field_type, Some(Value::Multiple(inputs))));
        }

        let mut inputs = inputs.into_iter();
        match (inputs.next(), inputs.next()) {
            (None, _) => Ok(Self::cleared(name, field_type)),
            (Some(single), None) => Ok(Self::new(name, field_type, Some(Value::Single(single)))),
            (Some(_), Some(_)) => Err(FieldError::InvalidValue {
                name,
                expected: "a single value",
            }),
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.value.is_none()
    }

    /// The single string value, if the field holds one.
    pub fn as_single(&self) -> Option<&str> {
        match &self.value {
            Some(Value::Single(s)) => Some(s),
            _ => None,
        }
    }

    /// The label sequence, if the field holds one.
    pub fn as_multiple(&self) -> Option<&[String]> {
        match &self.value {
            Some(Value::Multiple(v)) => Some(v),
            _ => None,
        }
    }
}

/// A selectable option of a list-typed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_order: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_ids_round_trip() {
        for ty in FieldType::ALL {
            assert_eq!(FieldType::from_id(ty.id()), Some(ty));
        }
        assert_eq!(FieldType::from_id(0), None);
        assert_eq!(FieldType::from_id(9), None);
    }

    #[test]
    fn test_field_type_deserialize_rejects_unknown() {
        let ty: FieldType = serde_json::from_str("6").unwrap();
        assert_eq!(ty, FieldType::MultipleList);
        assert!(serde_json::from_str::<FieldType>("42").is_err());
    }

    #[test]
    fn test_field_type_kinds() {
        assert!(FieldType::Radio.has_items());
        assert!(!FieldType::Radio.is_multi_valued());
        assert!(FieldType::Checkbox.is_multi_valued());
        assert!(!FieldType::Date.has_items());
    }

    #[test]
    fn test_from_inputs_single() {
        let field =
            FieldValue::from_inputs("Phase", FieldType::SingleList, vec!["Build".into()]).unwrap();
        assert_eq!(field.as_single(), Some("Build"));

        let cleared = FieldValue::from_inputs("Phase", FieldType::SingleList, vec![]).unwrap();
        assert!(cleared.is_cleared());

        let err = FieldValue::from_inputs("Phase", FieldType::Radio, vec!["a".into(), "b".into()])
            .unwrap_err();
        assert!(matches!(err, FieldError::InvalidValue { .. }));
    }

    #[test]
    fn test_from_inputs_multiple_keeps_order() {
        let field = FieldValue::from_inputs(
            "Tags",
            FieldType::Checkbox,
            vec!["b".into(), "a".into()],
        )
        .unwrap();
        assert_eq!(field.as_multiple(), Some(&["b".to_string(), "a".to_string()][..]));
    }

    #[test]
    fn test_field_value_serializes_camel_case() {
        let value = Some(Value::Single("2024-05-01".into()));
        let field = FieldValue::new("Due", FieldType::Date, value);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Due", "fieldType": 4, "value": "2024-05-01"})
        );
    }
}
