use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

const CACHE_FILE: &str = "bio_cache.json";

/// Persisted username -> generated bio cache.
///
/// Plain read-modify-write with no cross-process lock; concurrent runs for
/// the same username resolve last-writer-wins. An unreadable or corrupt
/// cache file is treated as empty rather than an error.
pub struct BioCache {
    path: PathBuf,
}

impl BioCache {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            path: base_dir.join(CACHE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the cached bio for a username
    pub fn get(&self, username: &str) -> Option<String> {
        self.read_all().remove(username)
    }

    /// Store a bio for a username, overwriting any previous entry
    pub fn put(&self, username: &str, bio: &str) -> Result<()> {
        let mut entries = self.read_all();
        entries.insert(username.to_string(), bio.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&entries).unwrap_or_default();
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }
}
