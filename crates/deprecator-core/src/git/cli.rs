//! [`Vcs`] implementation backed by the `git` binary.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use super::Vcs;
use crate::error::GitError;

/// Variables that would redirect git away from the directory we pass.
const GIT_ENV_OVERRIDES: [&str; 4] = [
    "GIT_DIR",
    "GIT_WORK_TREE",
    "GIT_INDEX_FILE",
    "GIT_COMMON_DIR",
];

/// Runs git as a child process, one invocation per operation.
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    program: Option<String>,
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable instead of the one on `PATH`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    /// Run a git command and return its stdout.
    async fn run_git(&self, cwd: Option<&Path>, args: &[&str]) -> Result<String, GitError> {
        let mut cmd = Command::new(self.program.as_deref().unwrap_or("git"));
        cmd.args(args);
        for key in GIT_ENV_OVERRIDES {
            cmd.env_remove(key);
        }
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        tracing::debug!(?args, cwd = ?cwd, "Running git");

        let owned_args = || args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
        let output = cmd.output().await.map_err(|source| GitError::Spawn {
            args: owned_args(),
            source,
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::Failed {
                args: owned_args(),
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Vcs for GitCli {
    async fn clone_shallow(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        let dest = dest.to_string_lossy();
        self.run_git(None, &["clone", "--depth=1", url, &dest])
            .await
            .map(drop)
    }

    async fn create_branch(&self, repo: &Path, branch: &str) -> Result<(), GitError> {
        self.run_git(Some(repo), &["checkout", "-b", branch])
            .await
            .map(drop)
    }

    async fn stage_all(&self, repo: &Path) -> Result<(), GitError> {
        self.run_git(Some(repo), &["add", "."]).await.map(drop)
    }

    async fn commit(&self, repo: &Path, message_file: &Path) -> Result<(), GitError> {
        let message_file = message_file.to_string_lossy();
        self.run_git(Some(repo), &["commit", "-F", &message_file])
            .await
            .map(drop)
    }

    async fn push(&self, repo: &Path, branch: &str) -> Result<(), GitError> {
        self.run_git(Some(repo), &["push", "-u", "origin", branch])
            .await
            .map(drop)
    }

    async fn describe_remote(&self, repo: &Path) -> Result<String, GitError> {
        self.run_git(Some(repo), &["remote", "show", "origin"]).await
    }
}
