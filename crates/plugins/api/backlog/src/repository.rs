//! Repository facade over the Backlog API.

use backlog_core::{FieldSchemaCatalog, Result};
use tracing::{debug, info};

use crate::query::SearchIssueQuery;
use crate::transport::Transport;
use crate::types::{Issue, IssueStatus, Project};

/// Fetches and saves issues through a [`Transport`].
pub struct BacklogRepository<T> {
    transport: T,
}

impl<T: Transport> BacklogRepository<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Get an issue by id or issue key.
    pub async fn find_issue(&self, id_or_key: &str) -> Result<Issue> {
        let path = format!("api/v2/issues/{}", id_or_key);
        let body = self.transport.get(&path, &[]).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn search_issues(&self, query: &SearchIssueQuery) -> Result<Vec<Issue>> {
        let body = self.transport.get("api/v2/issues", query.params()).await?;
        let issues: Vec<Issue> = serde_json::from_str(&body)?;
        debug!(count = issues.len(), "Fetched issues");
        Ok(issues)
    }

    pub async fn project(&self, id_or_key: &str) -> Result<Project> {
        let path = format!("api/v2/projects/{}", id_or_key);
        let body = self.transport.get(&path, &[]).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Custom field definitions of a project.
    pub async fn custom_field_catalog(&self, project_id: u64) -> Result<FieldSchemaCatalog> {
        let path = format!("api/v2/projects/{}/customFields", project_id);
        let body = self.transport.get(&path, &[]).await?;
        let catalog = FieldSchemaCatalog::from_json(&body)?;
        debug!(
            project_id = project_id,
            fields = catalog.len(),
            "Fetched custom field catalog"
        );
        Ok(catalog)
    }

    pub async fn issue_statuses(&self, project_id: u64) -> Result<Vec<IssueStatus>> {
        let path = format!("api/v2/projects/{}/statuses", project_id);
        let body = self.transport.get(&path, &[]).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Save summary, description, status and custom fields of an issue.
    ///
    /// Nothing is sent when any field or the status fails to resolve.
    /// Returns the issue as stored by the server.
    pub async fn update_issue(&self, issue: &Issue) -> Result<Issue> {
        let catalog = self.custom_field_catalog(issue.project_id).await?;
        let statuses = if issue.status.is_empty() {
            Vec::new()
        } else {
            self.issue_statuses(issue.project_id).await?
        };

        let params = issue.update_params(&catalog, &statuses)?;
        debug!(issue = issue.id, params = ?params, "Built update parameters");

        let path = format!("api/v2/issues/{}", issue.id);
        let body = self.transport.patch(&path, &params).await?;
        info!(issue = issue.id, key = issue.issue_key, "Issue updated");

        Ok(serde_json::from_str(&body)?)
    }
}
