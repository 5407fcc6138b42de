//! Placeholder substitution for the deprecation templates.
//!
//! The token set is small and closed: every recognized token maps to one
//! descriptor field, and anything else in a template passes through untouched.

use std::path::Path;

use anyhow::Context;

use crate::module::ModuleDescriptor;

/// A recognized template slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    ModuleName,
    CurrentVersion,
    VersionToPublish,
    License,
    NewModuleName,
    NewModuleVersion,
}

impl Placeholder {
    pub const ALL: [Placeholder; 6] = [
        Placeholder::ModuleName,
        Placeholder::CurrentVersion,
        Placeholder::VersionToPublish,
        Placeholder::License,
        Placeholder::NewModuleName,
        Placeholder::NewModuleVersion,
    ];

    /// Literal marker as it appears in template text.
    pub const fn token(self) -> &'static str {
        match self {
            Placeholder::ModuleName => "<<module_name>>",
            Placeholder::CurrentVersion => "<<module_current_version>>",
            Placeholder::VersionToPublish => "<<module_version>>",
            Placeholder::License => "<<module_license>>",
            Placeholder::NewModuleName => "<<new_module_name>>",
            Placeholder::NewModuleVersion => "<<new_module_version>>",
        }
    }

    pub fn value(self, module: &ModuleDescriptor) -> &str {
        match self {
            Placeholder::ModuleName => &module.name,
            Placeholder::CurrentVersion => &module.current_version,
            Placeholder::VersionToPublish => &module.version_to_publish,
            Placeholder::License => &module.license,
            Placeholder::NewModuleName => &module.new_module.name,
            Placeholder::NewModuleVersion => &module.new_module.version,
        }
    }
}

/// Replace every occurrence of every recognized token.
pub fn render(template: &str, module: &ModuleDescriptor) -> String {
    Placeholder::ALL
        .iter()
        .fold(template.to_string(), |text, placeholder| {
            text.replace(placeholder.token(), placeholder.value(module))
        })
}

const INDEX_FILE: &str = "index.js";
const MANIFEST_FILE: &str = "package.json";
const README_FILE: &str = "README.md";
const PULL_REQUEST_FILE: &str = "pr-msg.md";
const COMMIT_MESSAGE_FILE: &str = "module-rename-commit.msg";

/// The full set of templates used by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    /// Stub entry point
    pub index: String,
    /// Stub package manifest
    pub manifest: String,
    /// Stub notice
    pub readme: String,
    /// Pull request body, used as-is
    pub pull_request_body: String,
    /// Commit message, used as-is
    pub commit_message: String,
}

impl TemplateSet {
    /// Templates compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            index: include_str!("../templates/index.js").to_string(),
            manifest: include_str!("../templates/package.json").to_string(),
            readme: include_str!("../templates/README.md").to_string(),
            pull_request_body: include_str!("../templates/pr-msg.md").to_string(),
            commit_message: include_str!("../templates/module-rename-commit.msg").to_string(),
        }
    }

    /// Load overrides from `dir`; files that are absent keep the built-in text.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("Templates directory not found: {}", dir.display());
        }

        let mut set = Self::builtin();
        for (file, slot) in [
            (INDEX_FILE, &mut set.index),
            (MANIFEST_FILE, &mut set.manifest),
            (README_FILE, &mut set.readme),
            (PULL_REQUEST_FILE, &mut set.pull_request_body),
            (COMMIT_MESSAGE_FILE, &mut set.commit_message),
        ] {
            let path = dir.join(file);
            if path.exists() {
                *slot = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read template: {}", path.display()))?;
                tracing::debug!(template = %path.display(), "Loaded template override");
            }
        }

        Ok(set)
    }

    /// Rendered stub files as `(file name, contents)` pairs.
    pub fn render_stub(&self, module: &ModuleDescriptor) -> [(&'static str, String); 3] {
        [
            (INDEX_FILE, render(&self.index, module)),
            (MANIFEST_FILE, render(&self.manifest, module)),
            (README_FILE, render(&self.readme, module)),
        ]
    }
}
