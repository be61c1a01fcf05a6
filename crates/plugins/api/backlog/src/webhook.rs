//! Webhook payload decoding.

use backlog_core::Result;
use serde::{Deserialize, Serialize};

use crate::types::{Issue, Project, User};

/// Event posted by a Backlog webhook.
///
/// For issue events, `content` holds the issue with its custom fields
/// decoded the same way as API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: u64,
    /// Event type (1 = issue created, 2 = issue updated, ...)
    #[serde(default, rename = "type")]
    pub event_type: u32,
    #[serde(default)]
    pub project: Option<Project>,
    #[serde(default)]
    pub content: Option<Issue>,
    #[serde(default)]
    pub created_user: Option<User>,
    #[serde(default)]
    pub created: Option<String>,
}

impl Webhook {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The issue of the event, with its project id taken from the envelope.
    pub fn into_issue(self) -> Option<Issue> {
        let mut issue = self.content?;
        if issue.project_id == 0 {
            if let Some(project) = &self.project {
                issue.project_id = project.id;
            }
        }
        Some(issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_webhook_json() -> serde_json::Value {
        json!({
            "id": 9001,
            "type": 2,
            "project": {
                "id": 1,
                "projectKey": "PROJ",
                "name": "Project",
                "chartEnabled": false,
                "subtaskingEnabled": true,
                "projectLeaderCanEditProjectLeader": false,
                "textFormattingRule": "markdown",
                "archived": false
            },
            "content": {
                "id": 100,
                "key_id": 3,
                "summary": "Fix login",
                "description": "",
                "status": {"id": 2, "name": "In Progress"},
                "customFields": [
                    {"id": 10, "fieldTypeId": 5, "name": "Phase", "value": {"id": 2, "name": "Build", "displayOrder": 1}},
                    {"id": 11, "fieldTypeId": 6, "name": "OS", "value": null}
                ],
                "shared_files": [],
                "comment": {"id": 55, "content": "moved to build"}
            },
            "createdUser": {"id": 5, "userId": "jdoe", "name": "John Doe"},
            "created": "2024-05-02T10:00:00Z"
        })
    }

    #[test]
    fn test_decode_issue_webhook() {
        let webhook = Webhook::from_json(&sample_webhook_json().to_string()).unwrap();
        assert_eq!(webhook.event_type, 2);
        assert_eq!(webhook.project.as_ref().unwrap().project_key, "PROJ");

        let issue = webhook.into_issue().unwrap();
        assert_eq!(issue.project_id, 1);
        assert_eq!(issue.key_id, 3);
        assert_eq!(issue.status, "In Progress");
        assert_eq!(issue.comment.unwrap().content, "moved to build");
        assert_eq!(
            issue.custom_fields.get("Phase").unwrap().as_single(),
            Some("Build")
        );
        assert!(issue.custom_fields.get("OS").unwrap().is_cleared());
    }

    #[test]
    fn test_webhook_with_ambiguous_fields_fails() {
        let mut json = sample_webhook_json();
        json["content"]["customFields"] = json!([
            {"fieldTypeId": 5, "name": "Phase", "value": null},
            {"fieldTypeId": 5, "name": "Phase", "value": null}
        ]);
        assert!(Webhook::from_json(&json.to_string()).is_err());
    }

    #[test]
    fn test_webhook_without_content() {
        let webhook = Webhook::from_json(r#"{"id": 1, "type": 5}"#).unwrap();
        assert!(webhook.into_issue().is_none());
    }
}
