//! On-disk index of cached remotes and their files
//!
//! The index is a single JSON object mapping `sha256(remote_id)` to an
//! [`IndexEntry`]. It is loaded once when the store opens and rewritten
//! in full after every mutation.
//!
//! There is no file locking. Two processes mutating the same cache race
//! and the last `persist()` wins. [`WriteMode::Atomic`] avoids readers
//! seeing a half-written document but does not serialize writers.

use crate::cache::path_key::PathKey;
use crate::error::{PartsbinError, PartsbinResult};
use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Metadata for one cached file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// SHA256 hex digest of the blob contents
    pub content_hash: String,

    /// When the file was written to the cache
    #[serde(with = "ts_milliseconds")]
    pub cached_at: DateTime<Utc>,
}

/// Metadata for one remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    /// The remote identifier as given by the caller
    pub remote_id: String,

    /// Last time a handle was opened for this remote
    #[serde(with = "ts_milliseconds")]
    pub last_touched: DateTime<Utc>,

    /// Cached files keyed by logical path
    #[serde(default)]
    pub files: BTreeMap<PathKey, FileRecord>,
}

impl IndexEntry {
    /// Create an empty entry for a remote
    pub fn new(remote_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            remote_id: remote_id.into(),
            last_touched: now,
            files: BTreeMap::new(),
        }
    }
}

/// How the index document is written back to disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Overwrite the document in place
    #[default]
    Direct,
    /// Write a sibling temp file, then rename it over the document
    Atomic,
}

/// In-memory mirror of `cache.json`
#[derive(Debug)]
pub struct CacheIndex {
    path: PathBuf,
    write_mode: WriteMode,
    entries: BTreeMap<String, IndexEntry>,
}

impl CacheIndex {
    /// Load the index from disk, creating an empty document if absent.
    ///
    /// A path that is a directory is fatal. An unparseable document is
    /// replaced by an empty index with a warning.
    pub fn load(path: impl Into<PathBuf>, write_mode: WriteMode) -> PartsbinResult<Self> {
        let path = path.into();

        if path.is_dir() {
            return Err(PartsbinError::IndexIsDirectory { path });
        }

        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }

        let mut index = Self {
            path,
            write_mode,
            entries: BTreeMap::new(),
        };

        if !index.path.exists() {
            debug!("Creating cache index at {}", index.path.display());
            index.write("{}")?;
            return Ok(index);
        }

        let bytes = fs::read(&index.path).map_err(|e| {
            PartsbinError::io(format!("reading cache index {}", index.path.display()), e)
        })?;

        match serde_json::from_slice(&bytes) {
            Ok(entries) => index.entries = entries,
            Err(e) => warn!(
                "Cache index {} is unreadable, starting empty: {}",
                index.path.display(),
                e
            ),
        }

        debug!("Loaded cache index with {} remote(s)", index.entries.len());
        Ok(index)
    }

    /// Serialize the full index and overwrite the document
    pub fn persist(&self) -> PartsbinResult<()> {
        let content = serde_json::to_string_pretty(&self.entries)?;
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        self.write(&content)
    }

    fn write(&self, content: &str) -> PartsbinResult<()> {
        match self.write_mode {
            WriteMode::Direct => fs::write(&self.path, content).map_err(|e| {
                PartsbinError::io(format!("writing cache index {}", self.path.display()), e)
            }),
            WriteMode::Atomic => {
                let tmp = self.tmp_path();
                fs::write(&tmp, content).map_err(|e| {
                    PartsbinError::io(format!("writing cache index {}", tmp.display()), e)
                })?;
                fs::rename(&tmp, &self.path).map_err(|e| {
                    PartsbinError::io(
                        format!("replacing cache index {}", self.path.display()),
                        e,
                    )
                })
            }
        }
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Path of the index document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a remote by its identifier hash
    pub fn entry(&self, remote_hash: &str) -> Option<&IndexEntry> {
        self.entries.get(remote_hash)
    }

    /// Mutable lookup of a remote by its identifier hash
    pub fn entry_mut(&mut self, remote_hash: &str) -> Option<&mut IndexEntry> {
        self.entries.get_mut(remote_hash)
    }

    /// Insert or replace a remote entry
    pub fn insert(&mut self, remote_hash: impl Into<String>, entry: IndexEntry) {
        self.entries.insert(remote_hash.into(), entry);
    }

    /// Iterate over `(remote_hash, entry)` pairs in hash order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexEntry)> {
        self.entries.iter()
    }

    /// Number of remotes tracked
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no remotes are tracked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry from memory (the document is left untouched)
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

/// Create a directory and its parents, failing if an ancestor is a file
pub(crate) fn ensure_dir(dir: &Path) -> PartsbinResult<()> {
    for ancestor in dir.ancestors() {
        if ancestor.is_dir() {
            break;
        }
        if ancestor.exists() {
            return Err(PartsbinError::PathIsFile {
                path: ancestor.to_path_buf(),
            });
        }
    }

    fs::create_dir_all(dir)
        .map_err(|e| PartsbinError::io(format!("creating directory {}", dir.display()), e))
}
