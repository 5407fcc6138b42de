//! TOML parser with helpful error messages

use std::path::Path;

use anyhow::{Context, Result};

use super::schema::ConfigFile;

/// Parse a config file with detailed error messages
pub fn parse_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse config file content from string
pub fn parse_config_str(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(org) = &config.org
        && (org.is_empty() || org.contains('/'))
    {
        anyhow::bail!("Invalid org '{}': expected a bare organization name", org);
    }
    if let Some(discovery) = &config.discovery
        && let Some(scope) = &discovery.target_scope
        && !(scope.starts_with('@') && scope.ends_with('/'))
    {
        anyhow::bail!(
            "Invalid target_scope '{}': expected the form '@scope/'",
            scope
        );
    }
    Ok(())
}

/// Enhance TOML parsing errors with the offending lines
fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let message = error.message().to_string();

    match error.span() {
        Some(span) => {
            let line_num = content[..span.start.min(content.len())]
                .matches('\n')
                .count()
                + 1;
            anyhow::anyhow!(
                "TOML parsing error at line {}:\n{}\n\nError: {}",
                line_num,
                get_line_context(content, line_num),
                message
            )
        }
        None => anyhow::anyhow!("TOML parsing error: {}", message),
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let current = start + i + 1;
            let marker = if current == line_num { ">" } else { " " };
            format!("{marker} {current:>4} | {line}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
