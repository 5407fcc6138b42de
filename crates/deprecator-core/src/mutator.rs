//! Repository rename workflow.
//!
//! For one module: reset the working tree, clone, branch, rename the package
//! in its manifest, stage, commit and, outside dry runs, push and open a pull
//! request. The first failing step ends the sequence; the working tree is
//! left as-is and the next run starts from a fresh clone.

use std::path::{Path, PathBuf};

use crate::error::MutationError;
use crate::git::{Vcs, parse_head_branch};
use crate::github::{HostingApi, NewPullRequest};
use crate::manifest::PackageManifest;
use crate::module::ModuleDescriptor;

/// Branch used for the rename on every repository and every run.
pub const REPO_BRANCH_NAME: &str = "rename-module";
pub const PULL_REQUEST_TITLE: &str = "Rename module";
/// Recorded as the pull request URL when publishing is skipped.
pub const DRY_RUN_SENTINEL: &str = "dry run: did not create pr";

const COMMIT_MESSAGE_FILE: &str = "module-rename-commit.msg";

/// What the publish step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Opened { url: String },
    DryRun,
}

impl MutationOutcome {
    pub fn pr_url(&self) -> &str {
        match self {
            MutationOutcome::Opened { url } => url,
            MutationOutcome::DryRun => DRY_RUN_SENTINEL,
        }
    }

    pub fn pr_created(&self) -> bool {
        matches!(self, MutationOutcome::Opened { .. })
    }
}

#[derive(Debug, Clone)]
pub struct MutatorSettings {
    /// Parent of every working tree
    pub repos_dir: PathBuf,
    /// Clone URL prefix; `<name>.git` is appended
    pub clone_prefix: String,
    pub dry_run: bool,
    pub pull_request_body: String,
    pub commit_message: String,
}

pub struct RepositoryMutator<'a> {
    vcs: &'a dyn Vcs,
    hosting: &'a dyn HostingApi,
    settings: MutatorSettings,
}

impl<'a> RepositoryMutator<'a> {
    pub fn new(vcs: &'a dyn Vcs, hosting: &'a dyn HostingApi, settings: MutatorSettings) -> Self {
        Self {
            vcs,
            hosting,
            settings,
        }
    }

    /// Working tree for `module`.
    pub fn working_path(&self, module: &ModuleDescriptor) -> PathBuf {
        self.settings.repos_dir.join(&module.name)
    }

    pub fn clone_url(&self, module: &ModuleDescriptor) -> String {
        format!("{}{}.git", self.settings.clone_prefix, module.name)
    }

    /// Run the full rename sequence for one module.
    pub async fn mutate(
        &self,
        module: &ModuleDescriptor,
    ) -> Result<MutationOutcome, MutationError> {
        module.validate().map_err(MutationError::Descriptor)?;
        let repo_dir = self.working_path(module);

        tracing::info!(module = %module.name, "Resetting working tree");
        self.reset(&repo_dir)?;

        tracing::info!(module = %module.name, url = %self.clone_url(module), "Cloning");
        self.vcs
            .clone_shallow(&self.clone_url(module), &repo_dir)
            .await
            .map_err(MutationError::Clone)?;

        tracing::info!(module = %module.name, branch = REPO_BRANCH_NAME, "Creating branch");
        self.vcs
            .create_branch(&repo_dir, REPO_BRANCH_NAME)
            .await
            .map_err(MutationError::Branch)?;

        tracing::info!(
            module = %module.name,
            new_name = %module.new_module.name,
            new_version = %module.new_module.version,
            "Updating package manifest"
        );
        let mut manifest =
            PackageManifest::load(&repo_dir).map_err(MutationError::ManifestEdit)?;
        manifest.update(&module.new_module.name, &module.new_module.version);
        manifest.save().map_err(MutationError::ManifestEdit)?;

        tracing::info!(module = %module.name, "Staging changes");
        self.vcs
            .stage_all(&repo_dir)
            .await
            .map_err(MutationError::Stage)?;

        tracing::info!(module = %module.name, "Committing changes");
        let message_file = self.write_commit_message()?;
        self.vcs
            .commit(&repo_dir, &message_file)
            .await
            .map_err(MutationError::Commit)?;

        if self.settings.dry_run {
            tracing::info!(module = %module.name, "Dry run: skipping push and pull request");
            return Ok(MutationOutcome::DryRun);
        }

        tracing::info!(module = %module.name, branch = REPO_BRANCH_NAME, "Pushing branch");
        self.vcs
            .push(&repo_dir, REPO_BRANCH_NAME)
            .await
            .map_err(MutationError::Push)?;

        let url = self.open_pull_request(module, &repo_dir).await?;
        Ok(MutationOutcome::Opened { url })
    }

    /// Remove any previous clone so branch creation never collides.
    fn reset(&self, repo_dir: &Path) -> Result<(), MutationError> {
        let reset_err = |source| MutationError::Reset {
            path: repo_dir.to_path_buf(),
            source,
        };
        std::fs::create_dir_all(&self.settings.repos_dir).map_err(reset_err)?;
        if repo_dir.exists() {
            std::fs::remove_dir_all(repo_dir).map_err(reset_err)?;
        }
        Ok(())
    }

    /// Write the static commit message next to the working trees.
    ///
    /// The path is absolute because git resolves `-F` against the working tree.
    fn write_commit_message(&self) -> Result<PathBuf, MutationError> {
        let path = self.settings.repos_dir.join(COMMIT_MESSAGE_FILE);
        let message_err = |source| MutationError::CommitMessage {
            path: path.clone(),
            source,
        };
        std::fs::write(&path, &self.settings.commit_message).map_err(message_err)?;
        std::path::absolute(&path).map_err(message_err)
    }

    async fn open_pull_request(
        &self,
        module: &ModuleDescriptor,
        repo_dir: &Path,
    ) -> Result<String, MutationError> {
        let remote = self
            .vcs
            .describe_remote(repo_dir)
            .await
            .map_err(MutationError::DescribeRemote)?;
        let base = parse_head_branch(&remote).ok_or(MutationError::BaseBranchNotFound)?;

        tracing::info!(module = %module.name, %base, "Opening pull request");
        let request = NewPullRequest {
            title: PULL_REQUEST_TITLE.to_string(),
            body: self.settings.pull_request_body.clone(),
            head: REPO_BRANCH_NAME.to_string(),
            base,
        };
        let pr = self
            .hosting
            .create_pull_request(&module.name, &request)
            .await
            .map_err(MutationError::PullRequest)?;
        Ok(pr.html_url)
    }
}
