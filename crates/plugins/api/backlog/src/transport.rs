//! HTTP transport seam.

use async_trait::async_trait;
use backlog_core::{FormParams, Result};

/// Issues authenticated requests against the Backlog API.
///
/// Paths are relative to the space endpoint (e.g. `api/v2/issues/1`).
/// Implementations map non-success responses to errors and return the
/// response body otherwise.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET` with extra query parameters.
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<String>;

    /// `PATCH` with a form-encoded body.
    async fn patch(&self, path: &str, form: &FormParams) -> Result<String>;
}
