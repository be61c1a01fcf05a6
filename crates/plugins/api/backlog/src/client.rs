//! Backlog HTTP client.
//!
//! Authenticates with the space API key passed as the `apiKey` query
//! parameter. Updates are sent as form-encoded `PATCH` requests.

use async_trait::async_trait;
use backlog_core::config::BacklogConfig;
use backlog_core::{Error, FormParams, Result};
use tracing::{debug, warn};

use crate::transport::Transport;

/// Backlog API client.
pub struct BacklogClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl BacklogClient {
    /// Create a client for the configured space.
    pub fn new(config: &BacklogConfig, api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(config.endpoint(), api_key)
    }

    /// Create a client with an explicit endpoint (used with httpmock in tests).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("backlog-tools")
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build request with the API key attached.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .query(&[("apiKey", self.api_key.as_str())])
    }

    /// Check the status and read the body.
    async fn handle_response(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!(
                status = status_code,
                message = message,
                "Backlog API error response"
            );
            return Err(Error::from_status(status_code, message));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Http(format!("Failed to read response: {}", e)))
    }
}

#[async_trait]
impl Transport for BacklogClient {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<String> {
        debug!(path = path, params = ?query, "Backlog GET request");

        let response = self
            .request(reqwest::Method::GET, path)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn patch(&self, path: &str, form: &FormParams) -> Result<String> {
        debug!(path = path, params = ?form, "Backlog PATCH request");

        let response = self
            .request(reqwest::Method::PATCH, path)
            .form(form)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        self.handle_response(response).await
    }
}
