//! Version-control operations used by the repository mutator.
//!
//! The mutator only sees the [`Vcs`] capability trait, so its sequencing can
//! be driven by the real `git` binary ([`GitCli`]) or by an in-memory fake.

mod cli;
mod remote;

use std::path::Path;

use async_trait::async_trait;

pub use cli::GitCli;
pub use remote::parse_head_branch;

use crate::error::GitError;

/// Capability interface over the version-control tool.
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Shallow-clone (depth 1) `url` into `dest`.
    async fn clone_shallow(&self, url: &str, dest: &Path) -> Result<(), GitError>;

    /// Create `branch` and switch to it.
    async fn create_branch(&self, repo: &Path, branch: &str) -> Result<(), GitError>;

    /// Stage every working-tree change.
    async fn stage_all(&self, repo: &Path) -> Result<(), GitError>;

    /// Commit staged changes with the message stored in `message_file`.
    async fn commit(&self, repo: &Path, message_file: &Path) -> Result<(), GitError>;

    /// Push `branch` to `origin`, setting upstream.
    async fn push(&self, repo: &Path, branch: &str) -> Result<(), GitError>;

    /// Raw output describing the `origin` remote.
    async fn describe_remote(&self, repo: &Path) -> Result<String, GitError>;
}
