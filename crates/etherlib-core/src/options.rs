//! CLI-facing generate options.

use std::path::{Path, PathBuf};

use crate::error::{GenerateError, OptionIssue, Result};
use crate::CONFIG_EXTENSIONS;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Config file, relative to `root` unless absolute.
    pub config: Option<PathBuf>,
    /// Directory configs are discovered in and relative paths resolve against.
    pub root: Option<PathBuf>,
}

impl GenerateOptions {
    /// Reject malformed options before any config is read.
    pub fn validate(&self) -> Result<()> {
        let mut issues = Vec::new();

        if let Some(root) = &self.root {
            if root.as_os_str().is_empty() {
                issues.push(OptionIssue::new("root", "Expected a non-empty path"));
            } else if !root.is_dir() {
                issues.push(OptionIssue::new("root", "Expected an existing directory"));
            }
        }

        if let Some(config) = &self.config {
            if config.as_os_str().is_empty() {
                issues.push(OptionIssue::new("config", "Expected a non-empty path"));
            } else if !has_config_extension(config) {
                issues.push(OptionIssue::new(
                    "config",
                    format!("Expected a file ending in .{}", CONFIG_EXTENSIONS.join(", .")),
                ));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(GenerateError::InvalidOption { issues })
        }
    }

    /// Root directory, defaulting to the current working directory.
    pub fn root_dir(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => std::env::current_dir().map_err(|e| GenerateError::io(".", e)),
        }
    }
}

fn has_config_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CONFIG_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
