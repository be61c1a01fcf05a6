//! Form parameters for the issue update endpoint.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::{CustomFieldCollection, FieldSchemaCatalog, FieldType, FieldValue, Value};
use crate::error::FieldError;

/// Flat, insertion-ordered form parameters with one value per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormParams {
    entries: Vec<(String, String)>,
}

impl FormParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing the value of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FormParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Form key of a custom field.
pub fn custom_field_key(field_id: u64) -> String {
    format!("customField_{}", field_id)
}

/// Build the update parameters for an issue.
///
/// `summary` and `description` are always present. Every custom field gets
/// a `customField_<id>` key; cleared fields get an empty value. The first
/// field that fails to resolve aborts the build.
pub fn build_update_params(
    summary: &str,
    description: &str,
    fields: &CustomFieldCollection,
    catalog: &FieldSchemaCatalog,
) -> Result<FormParams, FieldError> {
    let mut params = FormParams::new();
    params.insert("summary", summary);
    params.insert("description", description);

    for field in fields {
        let (key, value) = encode_field(field, catalog).map_err(|e| e.resolving(&field.name))?;
        params.insert(key, value);
    }

    Ok(params)
}

fn encode_field(
    field: &FieldValue,
    catalog: &FieldSchemaCatalog,
) -> Result<(String, String), FieldError> {
    let key = custom_field_key(catalog.find_field_id(&field.name)?);

    let Some(value) = &field.value else {
        return Ok((key, String::new()));
    };

    let encoded = match (field.field_type, value) {
        (
            FieldType::Text | FieldType::Sentence | FieldType::Number | FieldType::Date,
            Value::Single(s),
        ) => s.clone(),
        (FieldType::SingleList | FieldType::Radio, Value::Single(label)) => {
            if label.is_empty() {
                String::new()
            } else {
                catalog.find_item_id(&field.name, label)?.to_string()
            }
        }
        (FieldType::MultipleList | FieldType::Checkbox, Value::Multiple(labels)) => labels
            .iter()
            .map(|label| {
                catalog
                    .find_item_id(&field.name, label)
                    .map(|id| id.to_string())
            })
            .collect::<Result<Vec<_>, _>>()?
            .join(","),
        (ty, _) => {
            return Err(FieldError::InvalidValue {
                name: field.name.clone(),
                expected: if ty.is_multi_valued() {
                    "a list of labels"
                } else {
                    "a single value"
                },
            })
        }
    };

    Ok((key, encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> FieldSchemaCatalog {
        serde_json::from_value(json!([
            {"id": 10, "typeId": 5, "name": "Phase", "items": [
                {"id": 1, "name": "Design"},
                {"id": 2, "name": "Build"}
            ]},
            {"id": 11, "typeId": 7, "name": "Checks", "items": [
                {"id": 1, "name": "b"},
                {"id": 3, "name": "a"}
            ]},
            {"id": 12, "typeId": 2, "name": "Notes"},
            {"id": 13, "typeId": 3, "name": "Points"},
            {"id": 14, "typeId": 8, "name": "Priority", "items": [
                {"id": 7, "name": "High"}
            ]},
            {"id": 15, "typeId": 4, "name": "Due"}
        ]))
        .unwrap()
    }

    fn single(name: &str, ty: FieldType, value: &str) -> FieldValue {
        FieldValue::new(name, ty, Some(Value::Single(value.into())))
    }

    fn build(fields: Vec<FieldValue>) -> Result<FormParams, FieldError> {
        let mut collection = CustomFieldCollection::new();
        for field in fields {
            assert!(collection.set(field).is_none(), "duplicate field in test input");
        }
        build_update_params("Title", "Body", &collection, &catalog())
    }

    #[test]
    fn test_summary_and_description_always_present() {
        let params = build_update_params(
            "",
            "",
            &CustomFieldCollection::new(),
            &FieldSchemaCatalog::default(),
        )
        .unwrap();

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("summary"), Some(""));
        assert_eq!(params.get("description"), Some(""));
    }

    #[test]
    fn test_single_list_resolves_item_id() {
        let params = build(vec![single("Phase", FieldType::SingleList, "Build")]).unwrap();
        assert_eq!(params.get("customField_10"), Some("2"));
    }

    #[test]
    fn test_radio_resolves_item_id() {
        let params = build(vec![single("Priority", FieldType::Radio, "High")]).unwrap();
        assert_eq!(params.get("customField_14"), Some("7"));
    }

    #[test]
    fn test_cleared_field_emits_empty_value() {
        let params = build(vec![FieldValue::cleared("Phase", FieldType::SingleList)]).unwrap();
        assert!(params.contains_key("customField_10"));
        assert_eq!(params.get("customField_10"), Some(""));
    }

    #[test]
    fn test_empty_label_clears_without_lookup() {
        let params = build(vec![single("Phase", FieldType::SingleList, "")]).unwrap();
        assert_eq!(params.get("customField_10"), Some(""));
    }

    #[test]
    fn test_checkbox_preserves_input_order() {
        let params = build(vec![FieldValue::new(
            "Checks",
            FieldType::Checkbox,
            Some(Value::Multiple(vec!["a".into(), "b".into()])),
        )])
        .unwrap();
        assert_eq!(params.get("customField_11"), Some("3,1"));
    }

    #[test]
    fn test_text_number_passed_verbatim() {
        let params = build(vec![
            single("Notes", FieldType::Sentence, "line 1\nline 2"),
            single("Points", FieldType::Number, "2.5"),
        ])
        .unwrap();
        assert_eq!(params.get("customField_12"), Some("line 1\nline 2"));
        assert_eq!(params.get("customField_13"), Some("2.5"));
        assert_eq!(params.get("summary"), Some("Title"));
        assert_eq!(params.get("description"), Some("Body"));
    }

    #[test]
    fn test_date_passed_verbatim() {
        let params = build(vec![single("Due", FieldType::Date, "2024-05-01")]).unwrap();
        assert_eq!(params.get("customField_15"), Some("2024-05-01"));

        let params = build(vec![FieldValue::cleared("Due", FieldType::Date)]).unwrap();
        assert_eq!(params.get("customField_15"), Some(""));
    }

    #[test]
    fn test_duplicate_catalog_name_aborts_build() {
        let catalog: FieldSchemaCatalog = serde_json::from_value(json!([
            {"id": 12, "typeId": 1, "name": "Notes"},
            {"id": 20, "typeId": 5, "name": "Phase", "items": [{"id": 1, "name": "Build"}]},
            {"id": 21, "typeId": 5, "name": "Phase", "items": [{"id": 2, "name": "Build"}]}
        ]))
        .unwrap();
        let mut fields = CustomFieldCollection::new();
        fields.set(single("Notes", FieldType::Text, "ok"));
        fields.set(single("Phase", FieldType::SingleList, "Build"));

        let err = build_update_params("s", "d", &fields, &catalog).unwrap_err();
        match err {
            FieldError::Resolve { name, source } => {
                assert_eq!(name, "Phase");
                assert_eq!(*source, FieldError::AmbiguousName("Phase".into()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_field_fails_with_not_found() {
        let err = build(vec![
            single("Notes", FieldType::Text, "ok"),
            single("Missing", FieldType::Text, "x"),
        ])
        .unwrap_err();

        match err {
            FieldError::Resolve { name, source } => {
                assert_eq!(name, "Missing");
                assert_eq!(*source, FieldError::FieldNotFound("Missing".into()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_cleared_unknown_field_still_fails() {
        let err = build(vec![FieldValue::cleared("Missing", FieldType::Text)]).unwrap_err();
        assert_eq!(*err.root(), FieldError::FieldNotFound("Missing".into()));
    }

    #[test]
    fn test_one_bad_label_fails_whole_field() {
        let err = build(vec![FieldValue::new(
            "Checks",
            FieldType::Checkbox,
            Some(Value::Multiple(vec!["a".into(), "zzz".into()])),
        )])
        .unwrap_err();

        assert_eq!(
            *err.root(),
            FieldError::ItemNotFound {
                field: "Checks".into(),
                item: "zzz".into()
            }
        );
        assert!(err.to_string().contains("'Checks'"));
    }

    #[test]
    fn test_shape_mismatch_is_invalid_value() {
        let err = build(vec![FieldValue::new(
            "Phase",
            FieldType::SingleList,
            Some(Value::Multiple(vec!["Build".into()])),
        )])
        .unwrap_err();
        assert_eq!(
            *err.root(),
            FieldError::InvalidValue {
                name: "Phase".into(),
                expected: "a single value"
            }
        );

        let err = build(vec![single("Checks", FieldType::Checkbox, "a")]).unwrap_err();
        assert!(matches!(err.root(), FieldError::InvalidValue { .. }));
    }

    #[test]
    fn test_decoded_label_round_trips_to_item_id() {
        let fields = CustomFieldCollection::from_value(json!([
            {"name": "Priority", "fieldTypeId": 8, "value": {"id": 7, "name": "High"}}
        ]))
        .unwrap();

        let params = build_update_params("s", "d", &fields, &catalog()).unwrap();
        assert_eq!(params.get("customField_14"), Some("7"));
    }

    #[test]
    fn test_params_serialize_as_form_map() {
        let mut params = FormParams::new();
        params.insert("summary", "a");
        params.insert("customField_1", "1,2");
        params.insert("summary", "b");

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, json!({"summary": "b", "customField_1": "1,2"}));
        assert_eq!(params.iter().next(), Some(("summary", "b")));
    }
}
