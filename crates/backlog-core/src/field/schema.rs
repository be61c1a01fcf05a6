//! Project field schema and name resolution.

use serde::{Deserialize, Serialize};

use super::{FieldType, ListItem};
use crate::error::{FieldError, Result};

/// Definition of one custom field configured for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Server-assigned field id
    pub id: u64,
    /// Field type
    #[serde(rename = "typeId", alias = "typeID")]
    pub field_type: FieldType,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Issue type ids the field applies to (empty means all)
    #[serde(default)]
    pub applicable_issue_types: Vec<u64>,
    #[serde(default)]
    pub allow_add_item: bool,
    /// Selectable items, only present for list-like types
    #[serde(default)]
    pub items: Vec<ListItem>,
}

impl FieldDefinition {
    /// Find the single list item with the given label.
    pub fn find_item(&self, label: &str) -> std::result::Result<&ListItem, FieldError> {
        let mut matches = self.items.iter().filter(|item| item.name == label);
        let item = matches.next().ok_or_else(|| FieldError::ItemNotFound {
            field: self.name.clone(),
            item: label.to_string(),
        })?;
        if matches.next().is_some() {
            return Err(FieldError::AmbiguousItem {
                field: self.name.clone(),
                item: label.to_string(),
            });
        }
        Ok(item)
    }
}

/// The custom fields configured for one project.
///
/// Lookups compare names case-sensitively and fail when more than one
/// definition carries the requested name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSchemaCatalog {
    definitions: Vec<FieldDefinition>,
}

impl FieldSchemaCatalog {
    pub fn new(definitions: Vec<FieldDefinition>) -> Self {
        Self { definitions }
    }

    /// Parse the response of the project custom-fields endpoint.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn definitions(&self) -> &[FieldDefinition] {
        &self.definitions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Find the single definition with the given name.
    pub fn find(&self, name: &str) -> std::result::Result<&FieldDefinition, FieldError> {
        let mut matches = self.definitions.iter().filter(|d| d.name == name);
        let definition = matches
            .next()
            .ok_or_else(|| FieldError::FieldNotFound(name.to_string()))?;
        if matches.next().is_some() {
            return Err(FieldError::AmbiguousName(name.to_string()));
        }
        Ok(definition)
    }

    pub fn find_field_type(&self, name: &str) -> std::result::Result<FieldType, FieldError> {
        self.find(name).map(|d| d.field_type)
    }

    pub fn find_field_id(&self, name: &str) -> std::result::Result<u64, FieldError> {
        self.find(name).map(|d| d.id)
    }

    /// Resolve a list item label of a field to the item id.
    pub fn find_item_id(
        &self,
        field_name: &str,
        item_name: &str,
    ) -> std::result::Result<u64, FieldError> {
        self.find(field_name)?.find_item(item_name).map(|item| item.id)
    }
}

impl<'a> IntoIterator for &'a FieldSchemaCatalog {
    type Item = &'a FieldDefinition;
    type IntoIter = std::slice::Iter<'a, FieldDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.definitions.iter()
    }
}
