//! Error taxonomy for the deprecation pipeline.
//!
//! Per-module failures are typed so the orchestrator can record them and move
//! on. Batch-level plumbing (config, input list, discovery) uses `anyhow`.

use std::path::PathBuf;

use thiserror::Error;

/// A module descriptor that cannot be processed.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("new module name '{0}' must differ from the deprecated module name")]
    SameName(String),

    #[error("{field} '{value}' is not a valid package name")]
    InvalidName { field: &'static str, value: String },

    #[error("{field} '{value}' is not a valid semantic version")]
    InvalidVersion {
        field: &'static str,
        value: String,
        #[source]
        source: semver::Error,
    },

    #[error("versionToPublish {publish} must be greater than currentVersion {current}")]
    NotNewer { current: String, publish: String },
}

/// Failure while writing the deprecation stub for one module.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("invalid module descriptor")]
    Descriptor(#[from] DescriptorError),

    #[error("failed to create output directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a single version-control invocation.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to spawn git {args:?}")]
    Spawn {
        args: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    #[error("git {args:?} exited with code {}: {stderr}", .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    Failed {
        args: Vec<String>,
        code: Option<i32>,
        stderr: String,
    },
}

/// Failure while reading or rewriting a package manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest {} is not a JSON object", .path.display())]
    NotAnObject { path: PathBuf },

    #[error("failed to write manifest {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure talking to the repository hosting API.
#[derive(Debug, Error)]
pub enum HostingError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} failed with code {status}: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("invalid base URL {0}")]
    InvalidUrl(String),

    #[error("failed to decode {what}")]
    Decode {
        what: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Failure of one step of the repository mutation sequence.
///
/// A failure at any step stops the sequence for that module.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("invalid module descriptor")]
    Descriptor(#[source] DescriptorError),

    #[error("failed to reset working tree {}", .path.display())]
    Reset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("clone failed")]
    Clone(#[source] GitError),

    #[error("branch creation failed")]
    Branch(#[source] GitError),

    #[error("manifest edit failed")]
    ManifestEdit(#[source] ManifestError),

    #[error("staging changes failed")]
    Stage(#[source] GitError),

    #[error("commit failed")]
    Commit(#[source] GitError),

    #[error("failed to write commit message {}", .path.display())]
    CommitMessage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("push failed")]
    Push(#[source] GitError),

    #[error("failed to describe remote")]
    DescribeRemote(#[source] GitError),

    #[error("remote default branch not found in `git remote show origin` output")]
    BaseBranchNotFound,

    #[error("pull request creation failed")]
    PullRequest(#[source] HostingError),
}
