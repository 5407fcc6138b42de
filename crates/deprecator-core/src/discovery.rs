//! Discovery of repositories still publishing under their old names.
//!
//! Walks the organization listing page by page, filters candidate
//! repositories, reads each candidate's manifest and projects it into a
//! [`ModuleDescriptor`] for the batch input list.

use anyhow::Context;
use semver::Version;
use serde_json::Value;

use crate::config::DiscoveryConfig;
use crate::error::HostingError;
use crate::github::{HostingApi, Repository};
use crate::module::{ModuleDescriptor, NewModule, bump_major, bump_minor};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Forward-only pager over the organization's repositories.
pub struct RepoPager<'a> {
    api: &'a dyn HostingApi,
    cursor: Cursor,
}

impl<'a> RepoPager<'a> {
    pub fn new(api: &'a dyn HostingApi) -> Self {
        Self {
            api,
            cursor: Cursor::Start,
        }
    }

    /// Fetch the next page, or `None` once the last page has been returned.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Repository>>, HostingError> {
        let page = match &self.cursor {
            Cursor::Done => return Ok(None),
            Cursor::Start => self.api.list_repos(None).await?,
            Cursor::Next(url) => self.api.list_repos(Some(url)).await?,
        };
        self.cursor = match page.next {
            Some(url) => Cursor::Next(url),
            None => Cursor::Done,
        };
        Ok(Some(page.repos))
    }
}

/// Result of inspecting one candidate's manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Module(ModuleDescriptor),
    /// The package already carries the target scope
    AlreadyMigrated(String),
}

pub struct Discovery<'a> {
    api: &'a dyn HostingApi,
    config: &'a DiscoveryConfig,
}

impl<'a> Discovery<'a> {
    pub fn new(api: &'a dyn HostingApi, config: &'a DiscoveryConfig) -> Self {
        Self { api, config }
    }

    /// Whether a listed repository should have its manifest inspected.
    pub fn is_candidate(&self, repo: &Repository) -> bool {
        repo.name.starts_with(&self.config.repo_prefix)
            && !repo.name.contains(&self.config.exclude_marker)
            && !self.config.denylist.iter().any(|name| name == &repo.name)
            && !repo.archived
    }

    /// Turn a fetched manifest into a descriptor.
    pub fn project(&self, manifest: &Value) -> anyhow::Result<Candidate> {
        let field = |key: &str| {
            manifest
                .get(key)
                .and_then(Value::as_str)
                .with_context(|| format!("package.json has no '{key}' string"))
        };

        let name = field("name")?;
        if name.starts_with(&self.config.target_scope) {
            return Ok(Candidate::AlreadyMigrated(name.to_string()));
        }
        let version = field("version")?;
        let license = field("license")?;
        let current = Version::parse(version)
            .with_context(|| format!("package.json version '{version}' is not semver"))?;

        let module = ModuleDescriptor {
            name: name.to_string(),
            current_version: current.to_string(),
            version_to_publish: bump_minor(&current).to_string(),
            license: license.to_string(),
            new_module: NewModule {
                name: format!(
                    "{}{}",
                    self.config.target_scope,
                    name.replacen(&self.config.repo_prefix, "", 1)
                ),
                version: bump_major(&current).to_string(),
            },
        };
        module
            .validate()
            .with_context(|| format!("package.json describes an unusable module '{name}'"))?;
        Ok(Candidate::Module(module))
    }

    /// Walk every page and collect descriptors for the batch.
    ///
    /// A listing failure aborts discovery; a failure on one repository's
    /// manifest only skips that repository.
    pub async fn collect(&self) -> anyhow::Result<Vec<ModuleDescriptor>> {
        let mut pager = RepoPager::new(self.api);
        let mut modules = Vec::new();

        while let Some(page) = pager
            .next_page()
            .await
            .context("Failed to list repositories")?
        {
            for repo in page.iter().filter(|repo| self.is_candidate(repo)) {
                tracing::info!(repo = %repo.name, "processing");
                let manifest = match self.api.fetch_manifest(&repo.name).await {
                    Ok(manifest) => manifest,
                    Err(err) => {
                        tracing::warn!(repo = %repo.name, error = %format!("{:#}", anyhow::Error::from(err)), "failed to process");
                        continue;
                    }
                };
                match self.project(&manifest) {
                    Ok(Candidate::Module(module)) => modules.push(module),
                    Ok(Candidate::AlreadyMigrated(name)) => {
                        tracing::info!(package = %name, "skipping");
                    }
                    Err(err) => {
                        tracing::warn!(repo = %repo.name, error = %format!("{err:#}"), "failed to process");
                    }
                }
            }
        }

        tracing::info!(count = modules.len(), "Discovery finished");
        Ok(modules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NoApi;

    #[async_trait::async_trait]
    impl HostingApi for NoApi {
        async fn list_repos(
            &self,
            _page_url: Option<&str>,
        ) -> Result<crate::github::RepoPage, HostingError> {
            unreachable!()
        }
        async fn fetch_manifest(&self, _repo: &str) -> Result<Value, HostingError> {
            unreachable!()
        }
        async fn create_pull_request(
            &self,
            _repo: &str,
            _request: &crate::github::NewPullRequest,
        ) -> Result<crate::github::PullRequest, HostingError> {
            unreachable!()
        }
    }

    fn repo(name: &str, archived: bool) -> Repository {
        Repository {
            name: name.into(),
            archived,
        }
    }

    #[test]
    fn test_filters() {
        let config = DiscoveryConfig::default();
        let discovery = Discovery::new(&NoApi, &config);

        assert!(discovery.is_candidate(&repo("fastify-cookie", false)));
        assert!(!discovery.is_candidate(&repo("fastify-cookie", true)));
        assert!(!discovery.is_candidate(&repo("light-my-request", false)));
        assert!(!discovery.is_candidate(&repo("fastify-example-twitter", false)));
        assert!(!discovery.is_candidate(&repo("fastify-vite", false)));
        assert!(!discovery.is_candidate(&repo("fastify-dx", false)));
    }

    #[test]
    fn test_projection_bumps_versions() {
        let config = DiscoveryConfig::default();
        let discovery = Discovery::new(&NoApi, &config);

        let candidate = discovery
            .project(&json!({"name": "fastify-bearer-auth", "version": "6.0.0", "license": "MIT"}))
            .unwrap();

        let Candidate::Module(module) = candidate else {
            panic!("expected a module");
        };
        assert_eq!(module.version_to_publish, "6.1.0");
        assert_eq!(module.new_module.name, "@fastify/bearer-auth");
        assert_eq!(module.new_module.version, "7.0.0");
        assert!(module.validate().is_ok());
    }

    #[test]
    fn test_projected_versions_hold_invariants() {
        let config = DiscoveryConfig::default();
        let discovery = Discovery::new(&NoApi, &config);

        for version in ["0.1.0", "1.0.0", "3.9.12", "10.2.0"] {
            let Candidate::Module(module) = discovery
                .project(&json!({"name": "fastify-x", "version": version, "license": "MIT"}))
                .unwrap()
            else {
                panic!("expected a module");
            };
            let current = Version::parse(&module.current_version).unwrap();
            let publish = Version::parse(&module.version_to_publish).unwrap();
            let next = Version::parse(&module.new_module.version).unwrap();
            assert!(publish > current);
            assert_eq!(next.major, current.major + 1);
        }
    }

    #[test]
    fn test_prerelease_projection_follows_npm_inc() {
        let config = DiscoveryConfig::default();
        let discovery = Discovery::new(&NoApi, &config);
        let project = |version: &str| {
            let Candidate::Module(module) = discovery
                .project(&json!({"name": "fastify-x", "version": version, "license": "MIT"}))
                .unwrap()
            else {
                panic!("expected a module");
            };
            module
        };

        // A prerelease of a minor line publishes the release itself.
        let module = project("3.2.0-beta.1");
        assert_eq!(module.version_to_publish, "3.2.0");
        assert_eq!(module.new_module.version, "4.0.0");

        // A prerelease of a major line: the successor keeps the same major.
        let module = project("4.0.0-rc.1");
        assert_eq!(module.current_version, "4.0.0-rc.1");
        assert_eq!(module.version_to_publish, "4.0.0");
        assert_eq!(module.new_module.version, "4.0.0");
        assert!(module.validate().is_ok());
    }

    #[test]
    fn test_unsafe_package_name_is_error() {
        let config = DiscoveryConfig::default();
        let discovery = Discovery::new(&NoApi, &config);

        for name in ["../fastify-victim", "/srv/fastify-x", "fastify-x/../../y"] {
            let err = discovery
                .project(&json!({"name": name, "version": "1.0.0", "license": "MIT"}))
                .unwrap_err();
            assert!(format!("{err:#}").contains("is not a valid package name"), "{name}");
        }
    }

    #[test]
    fn test_already_scoped_is_skipped() {
        let config = DiscoveryConfig::default();
        let discovery = Discovery::new(&NoApi, &config);

        let candidate = discovery
            .project(&json!({"name": "@fastify/cookie", "version": "6.0.0"}))
            .unwrap();

        assert_eq!(candidate, Candidate::AlreadyMigrated("@fastify/cookie".into()));
    }

    #[test]
    fn test_missing_license_is_error() {
        let config = DiscoveryConfig::default();
        let discovery = Discovery::new(&NoApi, &config);

        let err = discovery
            .project(&json!({"name": "fastify-x", "version": "1.0.0"}))
            .unwrap_err();

        assert!(err.to_string().contains("license"));
    }
}
