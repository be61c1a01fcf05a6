//! Backlog API types.
//!
//! These types represent the JSON documents of Backlog API v2. Nullable
//! fields decode to `Option` or to their default value.

use backlog_core::{
    build_update_params, CustomFieldCollection, Error, FieldSchemaCatalog, FormParams, Result,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Decode `null` as the default value of `T`.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// User
// =============================================================================

/// Backlog user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    /// Login id
    #[serde(default)]
    pub user_id: Option<String>,
    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub role_type: Option<u32>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub mail_address: Option<String>,
}

// =============================================================================
// Project
// =============================================================================

/// Backlog project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u64,
    pub project_key: String,
    pub name: String,
    #[serde(default)]
    pub chart_enabled: bool,
    #[serde(default)]
    pub subtasking_enabled: bool,
    #[serde(default)]
    pub project_leader_can_edit_project_leader: bool,
    #[serde(default)]
    pub use_wiki_tree_view: bool,
    /// `markdown` or `backlog`
    #[serde(default)]
    pub text_formatting_rule: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

// =============================================================================
// Issue
// =============================================================================

/// Backlog issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: u64,
    /// Missing in webhook payloads
    #[serde(default)]
    pub project_id: u64,
    /// Issue key (e.g., "PROJ-12")
    #[serde(default, deserialize_with = "null_as_default")]
    pub issue_key: String,
    #[serde(default, alias = "key_id", deserialize_with = "null_as_default")]
    pub key_id: u64,
    #[serde(default)]
    pub issue_type: Option<IssueType>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Status name
    #[serde(default, deserialize_with = "status_name")]
    pub status: String,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default, rename = "category", deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub versions: Vec<Version>,
    #[serde(default, rename = "milestone", deserialize_with = "null_as_default")]
    pub milestones: Vec<Version>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub actual_hours: Option<f64>,
    #[serde(default)]
    pub parent_issue_id: Option<u64>,
    #[serde(default)]
    pub created_user: Option<User>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated_user: Option<User>,
    #[serde(default)]
    pub updated: Option<String>,
    /// Custom field values, decoded by their type tags
    #[serde(default)]
    pub custom_fields: CustomFieldCollection,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<Attachment>,
    #[serde(default, alias = "shared_files", deserialize_with = "null_as_default")]
    pub shared_files: Vec<SharedFile>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stars: Vec<Star>,
    /// Comment attached by the event that produced the payload
    #[serde(default)]
    pub comment: Option<IssueComment>,
}

/// Accept either a status object (API) or a plain name.
fn status_name<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Status {
        Name(String),
        Object { name: String },
    }

    Ok(match Option::<Status>::deserialize(deserializer)? {
        Some(Status::Name(name)) | Some(Status::Object { name }) => name,
        None => String::new(),
    })
}

impl Issue {
    /// Form parameters for saving this issue.
    ///
    /// Custom fields are resolved against `catalog`. A non-empty status
    /// name is resolved against `statuses` and sent as `statusId`.
    pub fn update_params(
        &self,
        catalog: &FieldSchemaCatalog,
        statuses: &[IssueStatus],
    ) -> Result<FormParams> {
        let mut params =
            build_update_params(&self.summary, &self.description, &self.custom_fields, catalog)?;

        if !self.status.is_empty() {
            let status = statuses
                .iter()
                .find(|s| s.name == self.status)
                .ok_or_else(|| {
                    Error::InvalidData(format!(
                        "status '{}' not found in project {}",
                        self.status, self.project_id
                    ))
                })?;
            params.insert("statusId", status.id.to_string());
        }

        Ok(params)
    }
}

/// Order issues by ascending id.
pub fn sort_issues_by_id(issues: &mut [Issue]) {
    issues.sort_by_key(|issue| issue.id);
}

/// Issue type (Bug, Task, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueType {
    pub id: u64,
    #[serde(default)]
    pub project_id: u64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub display_order: i64,
}

/// Issue resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub id: u64,
    pub name: String,
}

/// Issue priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Priority {
    pub id: u64,
    pub name: String,
}

/// Issue status as configured for a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueStatus {
    pub id: u64,
    #[serde(default)]
    pub project_id: u64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub display_order: i64,
}

/// Issue category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_order: i64,
}

/// Version or milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: u64,
    #[serde(default)]
    pub project_id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub release_due_date: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub display_order: i64,
}

/// File attached to an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created_user: Option<User>,
    #[serde(default)]
    pub created: Option<String>,
}

/// Shared file linked to an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedFile {
    pub id: u64,
    /// `file` or `directory`
    #[serde(default, rename = "type")]
    pub file_type: Option<String>,
    #[serde(default)]
    pub dir: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created_user: Option<User>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated_user: Option<User>,
    #[serde(default)]
    pub updated: Option<String>,
}

/// Star given to an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub id: u64,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub presenter: Option<User>,
    #[serde(default)]
    pub created: Option<String>,
}

/// Comment embedded in an issue event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}
