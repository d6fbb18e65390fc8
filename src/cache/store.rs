//! Cache store and per-remote handles
//!
//! Layout under the cache root:
//!
//! ```text
//! <root>/
//!   cache.json
//!   remotes/
//!     <sha256(remote_id)>/
//!       <content_hash[0..2]>/
//!         <content_hash>
//! ```

use crate::cache::diagnostics;
use crate::cache::hash;
use crate::cache::index::{ensure_dir, CacheIndex, FileRecord, IndexEntry, WriteMode};
use crate::cache::path_key::PathKey;
use crate::error::{PartsbinError, PartsbinResult};
use chrono::{Duration, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the index document inside the cache root
pub const INDEX_FILE: &str = "cache.json";

/// Directory holding one subdirectory per remote
pub const REMOTES_DIR: &str = "remotes";

/// Freshness window for cached files (7 days)
pub const TTL_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

fn ttl() -> Duration {
    Duration::milliseconds(TTL_MILLIS)
}

/// Location of a blob inside a remote directory, or `None` if the recorded
/// hash is not a well-formed digest
pub(crate) fn blob_path(remote_dir: &Path, content_hash: &str) -> Option<PathBuf> {
    if !hash::is_digest(content_hash) {
        return None;
    }
    Some(remote_dir.join(hash::shard(content_hash)).join(content_hash))
}

/// Disk-backed cache for fetched remote files
#[derive(Debug)]
pub struct CacheStore {
    root: PathBuf,
    index: CacheIndex,
}

impl CacheStore {
    /// Open the cache rooted at `root`, loading (or creating) its index
    pub fn open(root: impl Into<PathBuf>, write_mode: WriteMode) -> PartsbinResult<Self> {
        let root = root.into();
        let index = CacheIndex::load(root.join(INDEX_FILE), write_mode)?;
        Ok(Self { root, index })
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The loaded index
    pub fn index(&self) -> &CacheIndex {
        &self.index
    }

    /// Directory for a remote's blobs
    pub fn remote_dir(&self, remote_hash: &str) -> PathBuf {
        self.root.join(REMOTES_DIR).join(remote_hash)
    }

    /// Open a handle for a remote, creating or resetting its cache as needed.
    ///
    /// A remote directory with no index entry is treated as a half-written
    /// cache: the directory is wiped and the remote starts fresh.
    pub fn remote(&mut self, remote_id: &str) -> PartsbinResult<RemoteCache<'_>> {
        let remote_hash = hash::digest(remote_id);
        let dir = self.remote_dir(&remote_hash);
        let now = Utc::now();

        if dir.exists() && !dir.is_dir() {
            return Err(PartsbinError::PathIsFile { path: dir });
        }

        if !dir.exists() {
            debug!("Creating cache for remote {}", remote_id);
            ensure_dir(&dir)?;
            self.index
                .insert(remote_hash.clone(), IndexEntry::new(remote_id, now));
        } else if let Some(entry) = self.index.entry_mut(&remote_hash) {
            entry.last_touched = now;
        } else {
            warn!(
                "Cache directory {} has no index entry, resetting",
                dir.display()
            );
            fs::remove_dir_all(&dir)
                .map_err(|e| PartsbinError::io(format!("removing {}", dir.display()), e))?;
            ensure_dir(&dir)?;
            self.index
                .insert(remote_hash.clone(), IndexEntry::new(remote_id, now));
        }

        self.index.persist()?;

        Ok(RemoteCache {
            store: self,
            remote_id: remote_id.to_string(),
            remote_hash,
            dir,
        })
    }

    /// Delete the whole cache root and forget every remote
    pub fn clear(&mut self) -> PartsbinResult<()> {
        diagnostics::clear(&self.root)?;
        self.index.reset();
        info!("Cleared cache at {}", self.root.display());
        Ok(())
    }
}

/// Read/write access to one remote's cached files
#[derive(Debug)]
pub struct RemoteCache<'a> {
    store: &'a mut CacheStore,
    remote_id: String,
    remote_hash: String,
    dir: PathBuf,
}

impl RemoteCache<'_> {
    /// Store `content` under `key`, replacing any previous record.
    ///
    /// The previous blob, if any, stays on disk.
    pub fn add_file(
        &mut self,
        key: impl Into<PathKey>,
        content: impl AsRef<[u8]>,
    ) -> PartsbinResult<()> {
        let key = key.into();
        let content = content.as_ref();
        let content_hash = hash::digest(content);

        let blob = self.dir.join(hash::shard(&content_hash)).join(&content_hash);
        if let Some(parent) = blob.parent() {
            ensure_dir(parent)?;
        }
        if blob.is_dir() {
            return Err(PartsbinError::BlobIsDirectory { path: blob });
        }
        fs::write(&blob, content)
            .map_err(|e| PartsbinError::io(format!("writing blob {}", blob.display()), e))?;

        let record = FileRecord {
            content_hash,
            cached_at: Utc::now(),
        };
        debug!(
            "Cached {} for {} ({} bytes)",
            key.display_path(),
            self.remote_id,
            content.len()
        );
        self.entry_mut()?.files.insert(key, record);
        self.store.index.persist()
    }

    /// Read cached text for `key`.
    ///
    /// Returns `None` when there is no record, the record is older than the
    /// TTL, the blob is missing, its digest no longer matches, or it is not
    /// UTF-8. Stale records are left in place.
    pub fn get_file(&self, key: impl Into<PathKey>) -> PartsbinResult<Option<String>> {
        let key = key.into();
        let Some(bytes) = self.get_bytes(&key)? else {
            return Ok(None);
        };

        match String::from_utf8(bytes) {
            Ok(text) => Ok(Some(text)),
            Err(_) => {
                warn!("Cached {} is not valid UTF-8", key.display_path());
                Ok(None)
            }
        }
    }

    /// Read cached bytes for `key`, applying the same checks as [`get_file`](Self::get_file)
    pub fn get_bytes(&self, key: impl Into<PathKey>) -> PartsbinResult<Option<Vec<u8>>> {
        let key = key.into();
        let Some(record) = self.record(&key) else {
            debug!("Cache miss for {}: not cached", key.display_path());
            return Ok(None);
        };

        if Utc::now() - record.cached_at > ttl() {
            debug!("Cache miss for {}: expired", key.display_path());
            return Ok(None);
        }

        let Some(blob) = blob_path(&self.dir, &record.content_hash) else {
            warn!(
                "Malformed content hash for {}: {}",
                key.display_path(),
                record.content_hash
            );
            return Ok(None);
        };

        if !blob.exists() {
            debug!("Cache miss for {}: blob missing", key.display_path());
            return Ok(None);
        }
        if blob.is_dir() {
            return Err(PartsbinError::BlobIsDirectory { path: blob });
        }

        let bytes = fs::read(&blob)
            .map_err(|e| PartsbinError::io(format!("reading blob {}", blob.display()), e))?;

        if hash::digest(&bytes) != record.content_hash {
            debug!("Cache miss for {}: hash mismatch", key.display_path());
            return Ok(None);
        }

        Ok(Some(bytes))
    }

    /// Forget `key` and delete its blob unless another key shares it
    pub fn remove_file(&mut self, key: impl Into<PathKey>) -> PartsbinResult<()> {
        let key = key.into();
        let Some(record) = self.record(&key) else {
            return Ok(());
        };

        let shared = self
            .store
            .index
            .entry(&self.remote_hash)
            .is_some_and(|entry| {
                entry
                    .files
                    .iter()
                    .any(|(other, r)| *other != key && r.content_hash == record.content_hash)
            });

        // The index is only touched once the blob is gone
        if !shared {
            if let Some(blob) = blob_path(&self.dir, &record.content_hash) {
                if blob.is_dir() {
                    return Err(PartsbinError::BlobIsDirectory { path: blob });
                }
                if blob.exists() {
                    fs::remove_file(&blob).map_err(|e| {
                        PartsbinError::io(format!("removing blob {}", blob.display()), e)
                    })?;
                }
            }
        }

        self.entry_mut()?.files.remove(&key);
        debug!("Removed {} from {}", key.display_path(), self.remote_id);
        self.store.index.persist()
    }

    /// Whether a record exists for `key`, regardless of freshness
    pub fn contains(&self, key: impl Into<PathKey>) -> bool {
        self.record(&key.into()).is_some()
    }

    /// The remote identifier this handle was opened with
    pub fn remote_identifier(&self) -> &str {
        &self.remote_id
    }

    /// SHA256 hex digest of the remote identifier
    pub fn remote_identifier_hash(&self) -> &str {
        &self.remote_hash
    }

    /// Root directory of the whole cache
    pub fn cache_root_path(&self) -> &Path {
        self.store.root()
    }

    /// Directory holding this remote's blobs
    pub fn remote_dir(&self) -> &Path {
        &self.dir
    }

    fn record(&self, key: &PathKey) -> Option<FileRecord> {
        self.store
            .index
            .entry(&self.remote_hash)
            .and_then(|entry| entry.files.get(key))
            .cloned()
    }

    fn entry_mut(&mut self) -> PartsbinResult<&mut IndexEntry> {
        self.store
            .index
            .entry_mut(&self.remote_hash)
            .ok_or_else(|| {
                PartsbinError::Internal(format!("no index entry for remote {}", self.remote_id))
            })
    }
}
