//! Persistent listing cache
//!
//! The cache is one JSON object mapping listing names to the videos
//! collected so far, newest first. It is read once when a scraper is built
//! and written at most once per collection run.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::Result;
use crate::output::to_json_pretty;
use crate::types::Video;

/// In-memory copy of the cache file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheSnapshot {
    listings: BTreeMap<String, Vec<Video>>,
}

impl CacheSnapshot {
    /// Videos cached for `listing`, empty if the listing was never collected
    pub fn get(&self, listing: &str) -> &[Video] {
        self.listings.get(listing).map(Vec::as_slice).unwrap_or_default()
    }

    /// Replaces the videos cached for `listing`
    pub fn set(&mut self, listing: impl Into<String>, videos: Vec<Video>) {
        self.listings.insert(listing.into(), videos);
    }

    /// Names of all cached listings
    pub fn listings(&self) -> impl Iterator<Item = &str> {
        self.listings.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

/// Storage backend for [`CacheSnapshot`]
pub trait CacheStore {
    /// Reads the stored snapshot; a store with nothing in it yields an empty one
    fn load(&self) -> Result<CacheSnapshot>;

    /// Replaces the stored snapshot
    fn save(&self, snapshot: &CacheSnapshot) -> Result<()>;
}

impl<T: CacheStore + ?Sized> CacheStore for Box<T> {
    fn load(&self) -> Result<CacheSnapshot> {
        (**self).load()
    }

    fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        (**self).save(snapshot)
    }
}

/// Store used when no cache path is configured
///
/// Always loads empty and discards writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl CacheStore for NoCache {
    fn load(&self) -> Result<CacheSnapshot> {
        Ok(CacheSnapshot::default())
    }

    fn save(&self, _snapshot: &CacheSnapshot) -> Result<()> {
        Ok(())
    }
}

/// JSON file on disk, replaced atomically on save
///
/// The new content is written to a temporary file in the target's directory
/// and renamed over the target, so readers see either the old or the new
/// snapshot. Concurrent writers are not coordinated: the last rename wins.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    path: PathBuf,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `snapshot` to a temporary file next to the target
    fn stage(&self, snapshot: &CacheSnapshot) -> Result<NamedTempFile> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(to_json_pretty(snapshot)?.as_bytes())?;
        tmp.as_file().sync_all()?;
        Ok(tmp)
    }
}

impl CacheStore for JsonFileCache {
    fn load(&self) -> Result<CacheSnapshot> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no cache file yet");
            return Ok(CacheSnapshot::default());
        }

        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(CacheSnapshot::default());
        }

        let snapshot: Option<CacheSnapshot> = serde_json::from_str(&raw)?;
        Ok(snapshot.unwrap_or_default())
    }

    fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        let tmp = self.stage(snapshot)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        info!(path = %self.path.display(), "cache written");
        Ok(())
    }
}
