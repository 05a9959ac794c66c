//! File-backed response cache for network data sources.
//!
//! Each entry is `<dir>/<sha256(key)>.json` holding `{ "content", "timestamp" }`,
//! where `timestamp` is the expiry time in unix milliseconds.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Default time-to-live for cached ABIs (30 minutes).
pub const DEFAULT_CACHE_DURATION: Duration = Duration::from_millis(1_800_000);

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    content: Value,
    timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{}.json", hex::encode(digest)))
    }

    /// Cached content for `key`, if present and not expired.
    ///
    /// Unreadable or malformed entries count as misses.
    pub fn read(&self, key: &str) -> Option<Value> {
        let raw = fs::read_to_string(self.entry_path(key)).ok()?;
        let entry: CacheEntry = serde_json::from_str(&raw).ok()?;
        if entry.timestamp > Utc::now().timestamp_millis() {
            debug!(key, "cache hit");
            Some(entry.content)
        } else {
            debug!(key, "cache entry expired");
            None
        }
    }

    /// Store `content` under `key` for `ttl`.
    pub fn write(&self, key: &str, content: &Value, ttl: Duration) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache directory {}", self.dir.display()))?;
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let entry = CacheEntry {
            content: content.clone(),
            timestamp: Utc::now().timestamp_millis().saturating_add(ttl_ms),
        };
        let path = self.entry_path(key);
        fs::write(&path, serde_json::to_string(&entry)?)
            .with_context(|| format!("Failed to write cache entry {}", path.display()))?;
        Ok(())
    }
}

/// Parse a cache duration given in milliseconds.
pub(crate) fn duration_from_ms(ms: Option<u64>) -> Duration {
    ms.map(Duration::from_millis)
        .unwrap_or(DEFAULT_CACHE_DURATION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_then_read() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = FileCache::new(tmp.path().join(".cache"));

        assert!(cache.read("counter").is_none());
        cache
            .write("counter", &json!([{ "type": "function" }]), DEFAULT_CACHE_DURATION)
            .unwrap();
        assert_eq!(cache.read("counter"), Some(json!([{ "type": "function" }])));
        assert!(cache.read("other").is_none());
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = FileCache::new(tmp.path());
        cache.write("k", &json!(1), Duration::ZERO).unwrap();
        assert!(cache.read("k").is_none());
    }

    #[test]
    fn test_keys_are_hashed_into_file_names() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = FileCache::new(tmp.path());
        cache
            .write("block explorer:0xabc/..", &json!(null), DEFAULT_CACHE_DURATION)
            .unwrap();

        let names: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].len(), 64 + ".json".len());
    }

    #[test]
    fn test_malformed_entry_is_a_miss() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = FileCache::new(tmp.path());
        fs::write(cache.entry_path("k"), "not json").unwrap();
        assert!(cache.read("k").is_none());
    }
}
