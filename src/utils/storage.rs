use crate::error::CacheError;
use crate::models::dashboard::DuoStats;
use crate::models::types::DuoRequest;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub stats: Option<DuoStats>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub cooldown_until: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    latest: Option<String>,
    entries: HashMap<String, CacheEntry>,
}

/// Last computed stats per player pair, persisted as one JSON file.
#[derive(Debug)]
pub struct StatsCache {
    path: PathBuf,
    storage: CacheFile,
}

impl StatsCache {
    pub fn key(request: &DuoRequest) -> String {
        format!(
            "{}|{}|{}",
            request.player1.to_string().to_lowercase(),
            request.player2.to_string().to_lowercase(),
            request.server
        )
    }

    /// A missing or unreadable file starts an empty cache.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let storage = match Self::load(&path) {
            Ok(Some(storage)) => storage,
            Ok(None) => CacheFile::default(),
            Err(e) => {
                error!("Error loading cache file: {}", e);
                CacheFile::default()
            }
        };
        Self { path, storage }
    }

    fn load(path: &Path) -> Result<Option<CacheFile>, CacheError> {
        debug!(path = %path.display(), "loading cached data");
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.storage.entries.get(key)
    }

    pub fn stats(&self, key: &str) -> Option<&DuoStats> {
        self.get(key).and_then(|entry| entry.stats.as_ref())
    }

    /// Stats of the most recently refreshed pair.
    pub fn latest(&self) -> Option<&DuoStats> {
        self.storage
            .latest
            .as_deref()
            .and_then(|key| self.stats(key))
    }

    pub fn cooldown_remaining(&self, key: &str, now: DateTime<Utc>) -> Option<Duration> {
        let entry = self.get(key)?;
        (entry.cooldown_until - now)
            .to_std()
            .ok()
            .filter(|remaining| !remaining.is_zero())
    }

    pub fn record(&mut self, key: &str, stats: DuoStats, now: DateTime<Utc>, cooldown: Duration) {
        self.storage.entries.insert(
            key.to_string(),
            CacheEntry {
                stats: Some(stats),
                fetched_at: Some(now),
                cooldown_until: deadline(now, cooldown),
            },
        );
        self.storage.latest = Some(key.to_string());
    }

    /// Starts the cooldown without touching previously cached stats.
    pub fn record_failure(&mut self, key: &str, now: DateTime<Utc>, cooldown: Duration) {
        let cooldown_until = deadline(now, cooldown);
        self.storage
            .entries
            .entry(key.to_string())
            .and_modify(|entry| entry.cooldown_until = cooldown_until)
            .or_insert(CacheEntry {
                stats: None,
                fetched_at: None,
                cooldown_until,
            });
    }

    /// Writes through a sibling temp file so a crash never leaves half a cache.
    pub fn save(&self) -> Result<(), CacheError> {
        debug!(path = %self.path.display(), "saving cached data");
        let io_err = |source| CacheError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let raw = serde_json::to_string_pretty(&self.storage)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

fn deadline(now: DateTime<Utc>, cooldown: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(cooldown)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
