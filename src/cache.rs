//! Rank cache: remembers each station's daily rank so the next day can report a trend.
//!
//! [`RankCache`] is the port the ranker depends on. Two adapters ship with the
//! crate: [`MemoryRankCache`] for single-process use and tests, and
//! [`FileRankCache`], which keeps one small JSON file per key under the
//! platform cache directory so ranks survive restarts.
//!
//! Concurrent writers to the same key race; the last write wins.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config;
use crate::error::{FuelMarketError, Result};

/// Get/set contract with a time-to-live.
pub trait RankCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<i64>>;
    fn set(&self, key: &str, value: i64, ttl: Duration) -> Result<()>;
}

// ---------------------------------------------------------------------------
// MemoryRankCache
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryRankCache {
    entries: Mutex<HashMap<String, (i64, Instant)>>,
}

impl MemoryRankCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, expired ones included until the next write.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RankCache for MemoryRankCache {
    fn get(&self, key: &str) -> Result<Option<i64>> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| FuelMarketError::InvalidArgument("rank cache lock poisoned".into()))?;
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Ok(Some(*value)),
            Some(_) => {
                entries.remove(key);
                debug!(key, "rank cache entry expired");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: i64, ttl: Duration) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| FuelMarketError::InvalidArgument("rank cache lock poisoned".into()))?;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        if entries.len() < before {
            debug!(purged = before - entries.len(), "rank cache purged expired entries");
        }
        entries.insert(key.to_string(), (value, now + ttl));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileRankCache
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct CachedRank {
    value: i64,
    /// Unix timestamp (seconds) after which the entry is ignored.
    expires_at: i64,
}

/// File-backed rank cache, one JSON document per key.
pub struct FileRankCache {
    /// Directory where entries are stored.
    pub cache_dir: PathBuf,
}

impl FileRankCache {
    /// Create a file cache.
    ///
    /// If `cache_dir` is `None`, uses `ranks/` under the platform-appropriate
    /// default cache directory. Creates the directory if it does not exist.
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self> {
        let dir = cache_dir.unwrap_or_else(|| config::default_cache_dir().join("ranks"));
        fs::create_dir_all(&dir)?;
        let cache = Self { cache_dir: dir };
        cache.purge_expired()?;
        Ok(cache)
    }

    /// Delete expired and unreadable entries. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now().timestamp();
        let mut removed = 0;
        for dir_entry in fs::read_dir(&self.cache_dir)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let live = fs::read_to_string(&path)
                .ok()
                .and_then(|c| serde_json::from_str::<CachedRank>(&c).ok())
                .map(|entry| entry.expires_at > now)
                .unwrap_or(false);
            if !live && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, dir = %self.cache_dir.display(), "rank cache purged expired entries");
        }
        Ok(removed)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.cache_dir.join(format!("{}.json", file_name))
    }

    /// Remove all cached entries and recreate the cache directory.
    pub fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }
}

impl RankCache for FileRankCache {
    fn get(&self, key: &str) -> Result<Option<i64>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)?;
        let entry: CachedRank = match serde_json::from_str(&contents) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt rank cache entry, removing");
                let _ = fs::remove_file(&path);
                return Ok(None);
            }
        };

        if entry.expires_at <= Utc::now().timestamp() {
            debug!(key, "rank cache entry expired");
            let _ = fs::remove_file(&path);
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    /// Writes to a temp file first and renames, so readers never see a partial entry.
    fn set(&self, key: &str, value: i64, ttl: Duration) -> Result<()> {
        self.purge_expired()?;
        let path = self.entry_path(key);
        let tmp = path.with_extension("json.tmp");
        let entry = CachedRank {
            value,
            expires_at: Utc::now().timestamp() + ttl.as_secs() as i64,
        };

        let result = (|| -> Result<()> {
            fs::write(&tmp, serde_json::to_vec(&entry)?)?;
            fs::rename(&tmp, &path)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }
}
