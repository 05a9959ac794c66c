//! Artifact discovery for local build tools.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use serde_json::Value;

/// Include/exclude rules for artifact files under one directory.
///
/// Includes are file patterns searched at any depth. Excludes are matched
/// against the path relative to the directory, either anchored at the top or
/// at any directory boundary.
pub struct ArtifactFilter {
    include: Vec<String>,
    exclude: Vec<(Pattern, Pattern)>,
}

impl ArtifactFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        let exclude = exclude
            .iter()
            .map(|pattern| {
                let anchored = Pattern::new(pattern)
                    .with_context(|| format!("Invalid exclude pattern `{pattern}`"))?;
                let nested = Pattern::new(&format!("**/{pattern}"))
                    .with_context(|| format!("Invalid exclude pattern `{pattern}`"))?;
                Ok((anchored, nested))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            include: include.to_vec(),
            exclude,
        })
    }

    pub fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude
            .iter()
            .any(|(anchored, nested)| anchored.matches_path(relative) || nested.matches_path(relative))
    }

    /// Matching files under `dir`, sorted. A missing directory yields nothing.
    pub fn collect(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let root = Pattern::escape(&dir.to_string_lossy());
        let mut paths = BTreeSet::new();
        for include in &self.include {
            let pattern = format!("{root}/**/{include}");
            let entries = glob::glob(&pattern)
                .with_context(|| format!("Invalid include pattern `{include}`"))?;
            for entry in entries {
                let path = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
                if !path.is_file() {
                    continue;
                }
                let relative = path.strip_prefix(dir).unwrap_or(&path);
                if !self.is_excluded(relative) {
                    paths.insert(path);
                }
            }
        }
        Ok(paths.into_iter().collect())
    }
}

pub fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// An ABI worth emitting: a non-empty array.
pub fn non_empty_abi(artifact: &Value) -> Option<&Value> {
    artifact
        .get("abi")
        .filter(|abi| abi.as_array().is_some_and(|items| !items.is_empty()))
}
