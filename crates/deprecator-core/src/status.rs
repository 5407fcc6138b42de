//! Per-module run status and the end-of-batch report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Outcome of processing one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatus {
    pub deprecation_module: DeprecationStatus,
    pub replacement_module: ReplacementStatus,
}

/// Deprecation stub build step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeprecationStatus {
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Repository rename step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementStatus {
    pub pr_created: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Rendered failure: the one-line cause chain and the multi-line trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub message: String,
    pub stack: String,
}

impl FailureRecord {
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let err = anyhow::Error::from(err);
        Self {
            message: format!("{err:#}"),
            stack: format!("{err:?}"),
        }
    }
}

impl DeprecationStatus {
    pub fn mark_published(&mut self, version: &str) {
        self.published = true;
        self.version_published = Some(version.to_string());
    }

    pub fn mark_failed(&mut self, failure: FailureRecord) {
        self.published = false;
        self.error = Some(failure.message);
        self.stack = Some(failure.stack);
    }
}

impl ReplacementStatus {
    pub fn mark_done(&mut self, pr_created: bool, pr_url: &str) {
        self.pr_created = pr_created;
        self.pr_url = Some(pr_url.to_string());
    }

    pub fn mark_failed(&mut self, failure: FailureRecord) {
        self.pr_created = false;
        self.error = Some(failure.message);
        self.stack = Some(failure.stack);
    }
}

/// Mapping from module name to its status, emitted once per batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchReport {
    entries: BTreeMap<String, RunStatus>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh entry for `name` and return it for updating.
    pub fn start(&mut self, name: &str) -> &mut RunStatus {
        let entry = self.entries.entry(name.to_string()).or_default();
        *entry = RunStatus::default();
        entry
    }

    pub fn get(&self, name: &str) -> Option<&RunStatus> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Modules whose stub was built and whose repository step did not fail.
    pub fn succeeded(&self) -> usize {
        self.entries
            .values()
            .filter(|s| s.deprecation_module.published && s.replacement_module.error.is_none())
            .count()
    }

    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
