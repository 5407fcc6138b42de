//! Package manifest (`package.json`) editing.
//!
//! Edits keep the existing key order, indentation and trailing newline so the
//! resulting diff only touches the changed fields.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ManifestError;

pub const MANIFEST_FILE: &str = "package.json";

/// A loaded package manifest bound to its file.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    path: PathBuf,
    content: Map<String, Value>,
    indent: String,
    trailing_newline: bool,
}

impl PackageManifest {
    /// Load `package.json` from a package directory.
    pub fn load(dir: &Path) -> Result<Self, ManifestError> {
        let path = dir.join(MANIFEST_FILE);
        let raw = std::fs::read_to_string(&path).map_err(|source| ManifestError::Read {
            path: path.clone(),
            source,
        })?;
        let value: Value = serde_json::from_str(&raw).map_err(|source| ManifestError::Parse {
            path: path.clone(),
            source,
        })?;
        let Value::Object(content) = value else {
            return Err(ManifestError::NotAnObject { path });
        };

        Ok(Self {
            path,
            content,
            indent: detect_indent(&raw),
            trailing_newline: raw.ends_with('\n'),
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.content.get("name").and_then(Value::as_str)
    }

    /// Set the package name and version, keeping their position in the file.
    pub fn update(&mut self, name: &str, version: &str) {
        self.content
            .insert("name".to_string(), Value::String(name.to_string()));
        self.content
            .insert("version".to_string(), Value::String(version.to_string()));
    }

    /// Write the manifest back to its file.
    pub fn save(&self) -> Result<(), ManifestError> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.content
            .serialize(&mut ser)
            .map_err(|source| ManifestError::Write {
                path: self.path.clone(),
                source: source.into(),
            })?;
        if self.trailing_newline {
            buf.push(b'\n');
        }
        std::fs::write(&self.path, buf).map_err(|source| ManifestError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Indentation of the first indented line, defaulting to two spaces.
fn detect_indent(raw: &str) -> String {
    raw.lines()
        .skip(1)
        .find_map(|line| {
            let trimmed = line.trim_start_matches([' ', '\t']);
            let width = line.len() - trimmed.len();
            (width > 0 && !trimmed.is_empty()).then(|| line[..width].to_string())
        })
        .unwrap_or_else(|| "  ".to_string())
}
