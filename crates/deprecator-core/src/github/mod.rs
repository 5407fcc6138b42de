//! Repository hosting API access.
//!
//! The pipeline talks to the hosting service through [`HostingApi`];
//! [`GitHubClient`] is the production implementation.

mod client;
mod link;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::GitHubClient;
pub use link::next_link;

use crate::error::HostingError;

/// Repository entry from an organization listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub archived: bool,
}

/// One page of an organization listing.
#[derive(Debug, Clone, Default)]
pub struct RepoPage {
    pub repos: Vec<Repository>,
    /// Absolute URL of the following page, if any
    pub next: Option<String>,
}

/// Pull request creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

/// Pull request as returned after creation.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub html_url: String,
}

/// Capability interface over the hosting service.
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// Fetch one page of the organization's repositories.
    ///
    /// `page_url` is `None` for the first page and the previous page's
    /// [`RepoPage::next`] afterwards.
    async fn list_repos(&self, page_url: Option<&str>) -> Result<RepoPage, HostingError>;

    /// Fetch and decode a repository's `package.json`.
    async fn fetch_manifest(&self, repo: &str) -> Result<serde_json::Value, HostingError>;

    /// Open a pull request. Only a `201 Created` response counts as success.
    async fn create_pull_request(
        &self,
        repo: &str,
        request: &NewPullRequest,
    ) -> Result<PullRequest, HostingError>;
}
