//! Output persistence.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use etherlib_types::Output;

use crate::error::{GenerateError, Result};

/// Writes outputs and tracks which directories this invocation already owns.
#[derive(Debug, Default)]
pub struct OutputWriter {
    claimed: HashSet<PathBuf>,
}

impl OutputWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve output directories for one config. A directory claimed by an
    /// earlier config (or listed twice) is rejected.
    pub fn claim(&mut self, dirs: &[PathBuf]) -> Result<()> {
        for dir in dirs {
            if !self.claimed.insert(lexical_normalize(dir)) {
                return Err(GenerateError::DuplicateOutput(dir.clone()));
            }
        }
        Ok(())
    }

    /// Write every output under `dir`, returning the written file paths.
    ///
    /// The directory is removed first when `clean` is set and always created,
    /// so a build with no outputs still leaves an empty directory behind.
    pub fn write(&self, dir: &Path, clean: bool, outputs: &[Output]) -> Result<Vec<PathBuf>> {
        for output in outputs {
            validate_output_id(&output.id)?;
        }

        info!("Writing to {}", dir.display());
        if clean && dir.exists() {
            fs::remove_dir_all(dir).map_err(|e| GenerateError::io(dir, e))?;
        }
        fs::create_dir_all(dir).map_err(|e| GenerateError::io(dir, e))?;

        let mut written = Vec::with_capacity(outputs.len());
        for output in outputs {
            let path = dir.join(&output.id);
            ensure_parent_dirs(&path)?;
            fs::write(&path, output.render()).map_err(|e| GenerateError::io(&path, e))?;
            debug!(file = %path.display(), "wrote output");
            written.push(path);
        }
        Ok(written)
    }
}

/// Ensure all parent directories exist for a path.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| GenerateError::io(parent, e))?;
    }
    Ok(())
}

/// Output ids must stay inside the output directory.
fn validate_output_id(id: &str) -> Result<()> {
    let path = Path::new(id);
    let escapes = id.is_empty()
        || path.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
    if escapes {
        return Err(GenerateError::InvalidOutputId(id.to_string()));
    }
    Ok(())
}

/// Drop `.` components so `dist` and `./dist` compare equal.
fn lexical_normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_rejects_repeat_across_configs() {
        let mut writer = OutputWriter::new();
        writer.claim(&[PathBuf::from("dist")]).unwrap();
        let err = writer.claim(&[PathBuf::from("./dist")]).unwrap_err();
        assert!(matches!(err, GenerateError::DuplicateOutput(_)));
    }

    #[test]
    fn test_claim_rejects_repeat_within_config() {
        let mut writer = OutputWriter::new();
        let err = writer
            .claim(&[PathBuf::from("a"), PathBuf::from("a")])
            .unwrap_err();
        assert_eq!(err.to_string(), "out \"a\" must be unique.");
    }

    #[test]
    fn test_write_cleans_and_creates_nested_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("dist");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("stale.ts"), "old").unwrap();

        let writer = OutputWriter::new();
        let written = writer
            .write(
                &dir,
                true,
                &[
                    Output::new("Counter.ts", "export {}"),
                    Output::new("typechain/index.ts", "body").with_imports("import x"),
                ],
            )
            .unwrap();

        assert_eq!(written.len(), 2);
        assert!(!dir.join("stale.ts").exists());
        assert_eq!(
            fs::read_to_string(dir.join("Counter.ts")).unwrap(),
            "export {}"
        );
        assert_eq!(
            fs::read_to_string(dir.join("typechain/index.ts")).unwrap(),
            "import x\n\nbody"
        );
    }

    #[test]
    fn test_write_without_clean_keeps_existing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("dist");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("keep.ts"), "keep").unwrap();

        OutputWriter::new().write(&dir, false, &[]).unwrap();

        assert!(dir.join("keep.ts").exists());
    }

    #[test]
    fn test_empty_outputs_still_create_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out/nested");

        OutputWriter::new().write(&dir, true, &[]).unwrap();

        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_escaping_output_id_is_rejected_before_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("dist");

        let err = OutputWriter::new()
            .write(&dir, true, &[Output::new("../evil.ts", "x")])
            .unwrap_err();

        assert!(matches!(err, GenerateError::InvalidOutputId(_)));
        assert!(!dir.exists());
        assert!(validate_output_id("/abs.ts").is_err());
        assert!(validate_output_id("").is_err());
        assert!(validate_output_id("a/./b.ts").is_ok());
    }
}
