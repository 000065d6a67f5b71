//! Time-expiring memo cache for analysis results.
//!
//! Entries are `(value, stored_at)` pairs; expiry is checked on read and
//! expired entries are dropped at that point. The store can optionally be
//! mirrored to a JSON file so results survive restarts.

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};
use truthlens_common::{InputData, TruthLensAnalysis};

use crate::error::{PipelineError, Result};

/// Versioned key prefix; bump when the stored report shape changes.
pub const CACHE_KEY_PREFIX: &str = "tl_cache_v3_";

/// Characters of body text mixed into the key for manual input.
const BODY_KEY_CHARS: usize = 30;

pub fn default_ttl() -> Duration {
    Duration::hours(24)
}

/// Derive the cache key for an input.
///
/// URL inputs are keyed by URL; manual inputs by title plus the first
/// characters of the (truncated) body.
pub fn cache_key(input: &InputData) -> String {
    let material = match input.url() {
        Some(url) => url.to_string(),
        None => {
            let prefix: String = input.truncated_body().chars().take(BODY_KEY_CHARS).collect();
            format!("{}{}", input.title.as_deref().unwrap_or(""), prefix)
        }
    };
    let mut hasher = Sha256::new();
    hasher.update(material.as_bytes());
    format!("{CACHE_KEY_PREFIX}{:x}", hasher.finalize())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry<V> {
    data: V,
    timestamp: DateTime<Utc>,
}

/// Keyed store with time-based expiry.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    persist_path: Option<PathBuf>,
    /// Held from snapshot to rename so writers never interleave on the file.
    persist_lock: Mutex<()>,
}

pub type AnalysisCache = TtlCache<TruthLensAnalysis>;

impl<V> TtlCache<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: RwLock::new(HashMap::new()), persist_path: None, persist_lock: Mutex::new(()) }
    }

    /// Cache mirrored to `path`. Existing non-expired entries are loaded.
    pub fn with_persistence(ttl: Duration, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut entries: HashMap<String, CacheEntry<V>> = HashMap::new();

        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| PipelineError::Cache(format!("reading {}: {e}", path.display())))?;
            match serde_json::from_str::<HashMap<String, CacheEntry<V>>>(&content) {
                Ok(loaded) => entries = loaded,
                // A stale or corrupt file only costs us the cached results
                Err(e) => warn!(path = %path.display(), error = %e, "discarding unreadable cache file"),
            }
        }

        let cache = Self {
            ttl,
            entries: RwLock::new(entries),
            persist_path: Some(path),
            persist_lock: Mutex::new(()),
        };
        let evicted = cache.evict_expired_at(Utc::now());
        debug!(entries = cache.len(), evicted, "cache loaded");
        Ok(cache)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_expired(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
        now - entry.timestamp > self.ttl
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Utc::now())
    }

    /// Look up `key` as of `now`. Expired entries are removed.
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<V> {
        {
            let entries = self.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if !self.is_expired(entry, now) => return Some(entry.data.clone()),
                Some(_) => {}
            }
        }
        // Another caller may have refreshed the entry since the read lock was dropped
        let (value, removed) = {
            let mut entries = self.write();
            match entries.get(key) {
                Some(entry) if !self.is_expired(entry, now) => (Some(entry.data.clone()), false),
                Some(_) => (None, entries.remove(key).is_some()),
                None => (None, false),
            }
        };
        if removed {
            debug!(key, "cache entry expired");
            self.flush();
        }
        value
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.insert_at(key, value, Utc::now());
    }

    pub fn insert_at(&self, key: impl Into<String>, value: V, now: DateTime<Utc>) {
        self.write().insert(key.into(), CacheEntry { data: value, timestamp: now });
        self.flush();
    }

    /// Remove every entry expired as of `now`; returns how many were removed.
    pub fn evict_expired_at(&self, now: DateTime<Utc>) -> usize {
        let removed = {
            let mut entries = self.write();
            let before = entries.len();
            entries.retain(|_, e| now - e.timestamp <= self.ttl);
            before - entries.len()
        };
        if removed > 0 {
            self.flush();
        }
        removed
    }

    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Utc::now())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Write the store to its backing file, if any.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };
        let _guard = self.persist_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let json = serde_json::to_string(&*self.read())
            .map_err(|e| PipelineError::Cache(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| PipelineError::Cache(format!("creating {}: {e}", parent.display())))?;
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .and_then(|_| std::fs::rename(&tmp, path))
            .map_err(|e| PipelineError::Cache(format!("writing {}: {e}", path.display())))
    }

    fn flush(&self) {
        if let Err(e) = self.persist() {
            warn!(error = %e, "failed to persist cache");
        }
    }
}
