//! On-disk configuration file schema (`deprecator.toml`).
//!
//! Every field is optional; absent fields keep the built-in defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Hosting organization owning the repositories
    #[serde(default)]
    pub org: Option<String>,

    #[serde(default)]
    pub api_base: Option<String>,

    #[serde(default)]
    pub user_agent: Option<String>,

    /// Clone URL prefix; the module name and `.git` are appended
    #[serde(default)]
    pub clone_prefix: Option<String>,

    #[serde(default)]
    pub modules_path: Option<PathBuf>,

    #[serde(default)]
    pub out_dir: Option<PathBuf>,

    #[serde(default)]
    pub repos_dir: Option<PathBuf>,

    #[serde(default)]
    pub templates_dir: Option<PathBuf>,

    #[serde(default)]
    pub dry_run: Option<bool>,

    #[serde(default)]
    pub discovery: Option<DiscoveryFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryFile {
    #[serde(default)]
    pub repo_prefix: Option<String>,

    #[serde(default)]
    pub exclude_marker: Option<String>,

    #[serde(default)]
    pub denylist: Option<Vec<String>>,

    #[serde(default)]
    pub target_scope: Option<String>,
}
