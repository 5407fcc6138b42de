//! In-memory collaborators for pipeline tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use deprecator_core::artifact::ArtifactBuilder;
use deprecator_core::error::{GitError, HostingError};
use deprecator_core::git::Vcs;
use deprecator_core::github::{HostingApi, NewPullRequest, PullRequest, RepoPage};
use deprecator_core::module::{ModuleDescriptor, NewModule};
use deprecator_core::mutator::MutatorSettings;
use deprecator_core::template::TemplateSet;

pub const REMOTE_SHOW: &str = "* remote origin
  Fetch URL: git@github.com:fastify/example.git
  Push  URL: git@github.com:fastify/example.git
  HEAD branch: main
";

pub fn descriptor(name: &str) -> ModuleDescriptor {
    ModuleDescriptor {
        name: name.to_string(),
        current_version: "2.1.0".to_string(),
        version_to_publish: "2.2.0".to_string(),
        license: "MIT".to_string(),
        new_module: NewModule {
            name: format!("@fastify/{}", name.trim_start_matches("fastify-")),
            version: "3.0.0".to_string(),
        },
    }
}

pub fn bearer_auth() -> ModuleDescriptor {
    ModuleDescriptor {
        name: "fastify-bearer-auth".to_string(),
        current_version: "6.0.0".to_string(),
        version_to_publish: "6.1.0".to_string(),
        license: "MIT".to_string(),
        new_module: NewModule {
            name: "@fastify/bearer-auth".to_string(),
            version: "7.0.0".to_string(),
        },
    }
}

pub fn settings(root: &Path, dry_run: bool) -> MutatorSettings {
    let templates = TemplateSet::builtin();
    MutatorSettings {
        repos_dir: root.join("repos"),
        clone_prefix: "git@github.com:fastify/".to_string(),
        dry_run,
        pull_request_body: templates.pull_request_body,
        commit_message: templates.commit_message,
    }
}

pub fn builder(root: &Path) -> ArtifactBuilder {
    ArtifactBuilder::new(root.join("out"), TemplateSet::builtin())
}

/// Fake version control that records each invocation.
///
/// `clone_shallow` materializes a working tree with a `package.json`.
pub struct FakeVcs {
    calls: Mutex<Vec<String>>,
    fail_step: Option<&'static str>,
    fail_module: Option<String>,
    remote_output: String,
}

impl Default for FakeVcs {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_step: None,
            fail_module: None,
            remote_output: REMOTE_SHOW.to_string(),
        }
    }
}

impl FakeVcs {
    /// Fail `step` (`clone`, `checkout`, `add`, `commit`, `push`, `remote`)
    /// for every module, or only for `module` when given.
    pub fn failing(step: &'static str, module: Option<&str>) -> Self {
        Self {
            fail_step: Some(step),
            fail_module: module.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_remote_output(output: &str) -> Self {
        Self {
            remote_output: output.to_string(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, step: &'static str, target: &str, call: String) -> Result<(), GitError> {
        self.calls.lock().unwrap().push(call);
        let module_matches = self
            .fail_module
            .as_deref()
            .is_none_or(|module| target.contains(module));
        if self.fail_step == Some(step) && module_matches {
            return Err(GitError::Failed {
                args: vec![step.to_string()],
                code: Some(128),
                stderr: format!("simulated {step} failure"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Vcs for FakeVcs {
    async fn clone_shallow(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        self.record("clone", url, format!("clone --depth=1 {url}"))?;
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        std::fs::create_dir_all(dest).unwrap();
        std::fs::write(
            dest.join("package.json"),
            format!("{{\n  \"name\": \"{name}\",\n  \"version\": \"2.1.0\",\n  \"main\": \"index.js\"\n}}\n"),
        )
        .unwrap();
        Ok(())
    }

    async fn create_branch(&self, repo: &Path, branch: &str) -> Result<(), GitError> {
        self.record("checkout", &repo.to_string_lossy(), format!("checkout -b {branch}"))
    }

    async fn stage_all(&self, repo: &Path) -> Result<(), GitError> {
        self.record("add", &repo.to_string_lossy(), "add .".to_string())
    }

    async fn commit(&self, repo: &Path, message_file: &Path) -> Result<(), GitError> {
        assert!(message_file.is_absolute());
        assert!(message_file.exists());
        self.record("commit", &repo.to_string_lossy(), "commit -F".to_string())
    }

    async fn push(&self, repo: &Path, branch: &str) -> Result<(), GitError> {
        self.record("push", &repo.to_string_lossy(), format!("push -u origin {branch}"))
    }

    async fn describe_remote(&self, repo: &Path) -> Result<String, GitError> {
        self.record("remote", &repo.to_string_lossy(), "remote show origin".to_string())?;
        Ok(self.remote_output.clone())
    }
}

/// Fake hosting API serving canned pages and manifests.
pub struct FakeHosting {
    pages: HashMap<Option<String>, RepoPage>,
    manifests: HashMap<String, Value>,
    pr_status: u16,
    pr_requests: Mutex<Vec<(String, NewPullRequest)>>,
    page_requests: Mutex<Vec<Option<String>>>,
}

impl Default for FakeHosting {
    fn default() -> Self {
        Self {
            pages: HashMap::new(),
            manifests: HashMap::new(),
            pr_status: 201,
            pr_requests: Mutex::new(Vec::new()),
            page_requests: Mutex::new(Vec::new()),
        }
    }
}

impl FakeHosting {
    pub fn with_pr_status(status: u16) -> Self {
        Self {
            pr_status: status,
            ..Self::default()
        }
    }

    pub fn page(mut self, url: Option<&str>, page: RepoPage) -> Self {
        self.pages.insert(url.map(str::to_string), page);
        self
    }

    pub fn manifest(mut self, repo: &str, manifest: Value) -> Self {
        self.manifests.insert(repo.to_string(), manifest);
        self
    }

    pub fn pr_requests(&self) -> Vec<(String, NewPullRequest)> {
        self.pr_requests.lock().unwrap().clone()
    }

    pub fn page_requests(&self) -> Vec<Option<String>> {
        self.page_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostingApi for FakeHosting {
    async fn list_repos(&self, page_url: Option<&str>) -> Result<RepoPage, HostingError> {
        let key = page_url.map(str::to_string);
        self.page_requests.lock().unwrap().push(key.clone());
        self.pages
            .get(&key)
            .cloned()
            .ok_or(HostingError::UnexpectedStatus {
                operation: "list repositories",
                status: 404,
                body: String::new(),
            })
    }

    async fn fetch_manifest(&self, repo: &str) -> Result<Value, HostingError> {
        self.manifests
            .get(repo)
            .cloned()
            .ok_or(HostingError::UnexpectedStatus {
                operation: "fetch package.json",
                status: 404,
                body: "{\"message\":\"Not Found\"}".to_string(),
            })
    }

    async fn create_pull_request(
        &self,
        repo: &str,
        request: &NewPullRequest,
    ) -> Result<PullRequest, HostingError> {
        self.pr_requests
            .lock()
            .unwrap()
            .push((repo.to_string(), request.clone()));
        if self.pr_status != 201 {
            return Err(HostingError::UnexpectedStatus {
                operation: "pr create",
                status: self.pr_status,
                body: "{\"message\":\"Validation Failed\"}".to_string(),
            });
        }
        Ok(PullRequest {
            html_url: format!("https://github.com/fastify/{repo}/pull/1"),
        })
    }
}

pub fn out_file(root: &Path, module: &str, file: &str) -> PathBuf {
    root.join("out").join(module).join(file)
}
