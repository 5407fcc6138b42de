//! Process configuration.
//!
//! Configuration is resolved once at startup from, in increasing precedence:
//! built-in defaults, an optional `deprecator.toml`, and the environment
//! (`GITHUB_TOKEN`, `DRY_RUN`). The resulting [`Config`] is passed by
//! reference into the pipeline; nothing below this module reads the
//! environment.

mod parser;
mod schema;

use std::path::{Path, PathBuf};

use anyhow::Context;

pub use parser::{parse_config_file, parse_config_str};
pub use schema::{ConfigFile, DiscoveryFile};

pub const DEFAULT_CONFIG_FILE: &str = "deprecator.toml";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const DRY_RUN_ENV: &str = "DRY_RUN";

/// Repository filters and naming rules for discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Only repositories whose name starts with this are considered
    pub repo_prefix: String,
    /// Repositories whose name contains this are skipped
    pub exclude_marker: String,
    pub denylist: Vec<String>,
    /// Scope of the successor packages, e.g. `@fastify/`
    pub target_scope: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            repo_prefix: "fastify-".to_string(),
            exclude_marker: "example".to_string(),
            denylist: vec!["fastify-vite".to_string(), "fastify-dx".to_string()],
            target_scope: "@fastify/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub org: String,
    pub api_base: String,
    pub user_agent: String,
    clone_prefix: Option<String>,
    /// Hosting API credential
    pub token: Option<String>,
    /// Skip push and pull request creation
    pub dry_run: bool,
    pub modules_path: PathBuf,
    pub out_dir: PathBuf,
    pub repos_dir: PathBuf,
    pub templates_dir: Option<PathBuf>,
    pub discovery: DiscoveryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            org: "fastify".to_string(),
            api_base: "https://api.github.com".to_string(),
            user_agent: "fastify/deprecator".to_string(),
            clone_prefix: None,
            token: None,
            dry_run: true,
            modules_path: PathBuf::from("lib").join("modules.json"),
            out_dir: PathBuf::from("out"),
            repos_dir: PathBuf::from("repos"),
            templates_dir: None,
            discovery: DiscoveryConfig::default(),
        }
    }
}

/// Raw values taken from the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub token: Option<String>,
    pub dry_run: Option<String>,
}

impl EnvOverrides {
    pub fn from_process() -> Self {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            token: read(TOKEN_ENV),
            dry_run: read(DRY_RUN_ENV),
        }
    }
}

impl Config {
    /// Resolve the configuration.
    ///
    /// `file` must exist when given; otherwise `deprecator.toml` in `cwd` is
    /// used if present.
    pub fn load(file: Option<&Path>, cwd: &Path, env: &EnvOverrides) -> anyhow::Result<Self> {
        let mut config = Self::default();

        let file = match file {
            Some(path) => Some(path.to_path_buf()),
            None => Some(cwd.join(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
        };
        if let Some(path) = file {
            tracing::debug!(config = %path.display(), "Loading config file");
            config.apply_file(parse_config_file(&path)?);
        }

        config.apply_env(env)?;
        Ok(config)
    }

    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(org) = file.org {
            self.org = org;
        }
        if let Some(api_base) = file.api_base {
            self.api_base = api_base;
        }
        if let Some(user_agent) = file.user_agent {
            self.user_agent = user_agent;
        }
        if file.clone_prefix.is_some() {
            self.clone_prefix = file.clone_prefix;
        }
        if let Some(path) = file.modules_path {
            self.modules_path = path;
        }
        if let Some(path) = file.out_dir {
            self.out_dir = path;
        }
        if let Some(path) = file.repos_dir {
            self.repos_dir = path;
        }
        if file.templates_dir.is_some() {
            self.templates_dir = file.templates_dir;
        }
        if let Some(dry_run) = file.dry_run {
            self.dry_run = dry_run;
        }
        if let Some(discovery) = file.discovery {
            let target = &mut self.discovery;
            if let Some(prefix) = discovery.repo_prefix {
                target.repo_prefix = prefix;
            }
            if let Some(marker) = discovery.exclude_marker {
                target.exclude_marker = marker;
            }
            if let Some(denylist) = discovery.denylist {
                target.denylist = denylist;
            }
            if let Some(scope) = discovery.target_scope {
                target.target_scope = scope;
            }
        }
    }

    pub fn apply_env(&mut self, env: &EnvOverrides) -> anyhow::Result<()> {
        if let Some(token) = &env.token {
            self.token = Some(token.clone());
        }
        if let Some(raw) = &env.dry_run {
            self.dry_run = parse_bool(raw)
                .with_context(|| format!("Invalid {DRY_RUN_ENV} value '{raw}'"))?;
        }
        Ok(())
    }

    /// Prefix the module name is appended to when cloning.
    pub fn clone_prefix(&self) -> String {
        self.clone_prefix
            .clone()
            .unwrap_or_else(|| format!("git@github.com:{}/", self.org))
    }

    /// The credential, or an error naming the variable to set.
    pub fn require_token(&self) -> anyhow::Result<&str> {
        self.token.as_deref().with_context(|| {
            format!("{TOKEN_ENV} is not set; a hosting API credential is required")
        })
    }
}

/// Lenient boolean parsing for environment toggles.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}
