//! Module descriptors: the input records of a deprecation batch.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

/// One package to deprecate and the successor replacing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    /// Existing package name
    pub name: String,
    pub current_version: String,
    /// Version of the deprecation stub
    pub version_to_publish: String,
    /// SPDX identifier
    pub license: String,
    pub new_module: NewModule,
}

/// Successor package identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewModule {
    pub name: String,
    pub version: String,
}

impl ModuleDescriptor {
    /// Check the descriptor invariants before any side effect runs.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        check_name("name", &self.name)?;
        check_name("newModule.name", &self.new_module.name)?;
        if self.new_module.name == self.name {
            return Err(DescriptorError::SameName(self.name.clone()));
        }

        let current = parse_version("currentVersion", &self.current_version)?;
        let publish = parse_version("versionToPublish", &self.version_to_publish)?;
        parse_version("newModule.version", &self.new_module.version)?;

        if publish <= current {
            return Err(DescriptorError::NotNewer {
                current: self.current_version.clone(),
                publish: self.version_to_publish.clone(),
            });
        }

        Ok(())
    }
}

const MAX_NAME_LEN: usize = 214;

/// Accept `name` or `@scope/name`, where each part is a single path
/// component usable as a directory name.
fn check_name(field: &'static str, value: &str) -> Result<(), DescriptorError> {
    let valid_part = |part: &str| {
        !part.is_empty()
            && !part.starts_with(['.', '_'])
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
    };
    let valid = value.len() <= MAX_NAME_LEN
        && match value.strip_prefix('@') {
            Some(scoped) => scoped
                .split_once('/')
                .is_some_and(|(scope, name)| valid_part(scope) && valid_part(name)),
            None => valid_part(value),
        };
    if valid {
        Ok(())
    } else {
        Err(DescriptorError::InvalidName {
            field,
            value: value.to_string(),
        })
    }
}

fn parse_version(field: &'static str, value: &str) -> Result<Version, DescriptorError> {
    Version::parse(value).map_err(|source| DescriptorError::InvalidVersion {
        field,
        value: value.to_string(),
        source,
    })
}

/// Increment the minor component, npm style.
///
/// A prerelease of `X.Y.0` bumps to `X.Y.0`.
pub fn bump_minor(version: &Version) -> Version {
    if !version.pre.is_empty() && version.patch == 0 {
        return Version::new(version.major, version.minor, 0);
    }
    Version::new(version.major, version.minor + 1, 0)
}

/// Increment the major component, npm style.
///
/// A prerelease of `X.0.0` bumps to `X.0.0`.
pub fn bump_major(version: &Version) -> Version {
    if !version.pre.is_empty() && version.minor == 0 && version.patch == 0 {
        return Version::new(version.major, 0, 0);
    }
    Version::new(version.major + 1, 0, 0)
}

/// Read the batch input list.
///
/// The list must be a JSON array of descriptors with unique names.
pub fn load_modules(path: &Path) -> anyhow::Result<Vec<ModuleDescriptor>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read module list: {}", path.display()))?;
    let modules: Vec<ModuleDescriptor> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse module list: {}", path.display()))?;

    let mut seen = HashSet::new();
    for module in &modules {
        if !seen.insert(module.name.as_str()) {
            anyhow::bail!(
                "Duplicate module '{}' in module list: {}",
                module.name,
                path.display()
            );
        }
    }

    Ok(modules)
}

/// Write the batch input list as pretty JSON.
pub fn save_modules(path: &Path, modules: &[ModuleDescriptor]) -> anyhow::Result<()> {
    let content =
        serde_json::to_string_pretty(modules).context("Failed to serialize module list")?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write module list: {}", path.display()))?;
    Ok(())
}
