//! Per-directory cache of extracted tags (`mp3tags.json`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::warn;

use super::tags::FileTags;
use crate::error::Result;

/// File name of the tag cache inside a unit directory
pub const TAG_CACHE_FILE: &str = "mp3tags.json";

/// One cached file, valid while size and modification time are unchanged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedFile {
    pub size: u64,
    /// Modification time in seconds since the Unix epoch
    pub modified: i64,
    pub tags: FileTags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCache {
    pub scanned_at: DateTime<Utc>,
    /// Keyed by file name
    pub files: BTreeMap<String, CachedFile>,
}

impl Default for TagCache {
    fn default() -> Self {
        Self {
            scanned_at: Utc::now(),
            files: BTreeMap::new(),
        }
    }
}

/// Size and mtime of a file as recorded in the cache
pub(crate) fn file_stamp(path: &Path) -> Option<(u64, i64)> {
    let meta = fs::metadata(path).ok()?;
    let modified = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    Some((meta.len(), modified))
}

impl TagCache {
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(TAG_CACHE_FILE)
    }

    /// Load the cache from `dir`; a missing or malformed file yields `None`
    pub fn load(dir: &Path) -> Option<Self> {
        let path = Self::path_in(dir);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!("Ignoring malformed tag cache {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(Self::path_in(dir), content)?;
        Ok(())
    }

    /// Cached tags for `name` if the stamp still matches
    pub fn lookup(&self, name: &str, size: u64, modified: i64) -> Option<&FileTags> {
        self.files
            .get(name)
            .filter(|f| f.size == size && f.modified == modified)
            .map(|f| &f.tags)
    }

    pub fn insert(&mut self, name: impl Into<String>, size: u64, modified: i64, tags: FileTags) {
        self.files.insert(
            name.into(),
            CachedFile {
                size,
                modified,
                tags,
            },
        );
    }
}
