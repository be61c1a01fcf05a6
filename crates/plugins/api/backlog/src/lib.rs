//! Backlog API client for backlog-tools.
//!
//! Provides the wire types of the Backlog API v2, an HTTP transport,
//! and [`BacklogRepository`], which fetches issues and saves them back,
//! including their custom fields.

mod client;
mod query;
mod repository;
mod transport;
mod types;
mod webhook;

pub use client::BacklogClient;
pub use query::{ParentChildType, SearchIssueQuery};
pub use repository::BacklogRepository;
pub use transport::Transport;
pub use types::*;
pub use webhook::Webhook;
