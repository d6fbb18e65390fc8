//! Whole-cache size, inventory and reset
//!
//! These read the disk layout directly and do not apply the TTL or hash
//! checks that [`RemoteCache::get_file`](crate::cache::RemoteCache::get_file)
//! uses. Any inconsistency is returned as an error.

use crate::cache::path_key::PathKey;
use crate::cache::store::{blob_path, CacheStore, REMOTES_DIR};
use crate::error::{PartsbinError, PartsbinResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Size and age of one cached file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    /// Bytes on disk (0 if the blob is gone)
    pub size: u64,
    /// When the file was cached
    pub cached_at: DateTime<Utc>,
}

/// Inventory of one remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSummary {
    /// SHA256 of the remote identifier (its directory name)
    pub remote_hash: String,
    /// Last time a handle was opened for the remote
    pub last_touched: DateTime<Utc>,
    /// Total bytes under the remote directory, orphaned blobs included
    pub size: u64,
    /// Files keyed by logical path
    pub files: BTreeMap<PathKey, FileSummary>,
}

/// Format bytes as human-readable size (e.g., "1.5 MB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Sum the size of every file under the cache root (0 if absent)
pub fn total_size_bytes(root: &Path) -> PartsbinResult<u64> {
    dir_size(root)
}

/// Sum the size of every file under one remote's directory
pub fn remote_size_bytes(root: &Path, remote_hash: &str) -> PartsbinResult<u64> {
    dir_size(&root.join(REMOTES_DIR).join(remote_hash))
}

fn dir_size(path: &Path) -> PartsbinResult<u64> {
    if !path.exists() {
        return Ok(0);
    }

    let mut total = 0;
    for entry in WalkDir::new(path) {
        let entry =
            entry.map_err(|e| PartsbinError::walk(format!("walking {}", path.display()), e))?;
        if entry.file_type().is_file() {
            let metadata = entry.metadata().map_err(|e| {
                PartsbinError::walk(format!("reading {}", entry.path().display()), e)
            })?;
            total += metadata.len();
        }
    }
    Ok(total)
}

/// Build a per-remote inventory from the index and the blobs on disk
pub fn build_tree(store: &CacheStore) -> PartsbinResult<BTreeMap<String, RemoteSummary>> {
    let mut tree = BTreeMap::new();

    for (remote_hash, entry) in store.index().iter() {
        let remote_dir = store.remote_dir(remote_hash);

        let mut files = BTreeMap::new();
        for (key, record) in &entry.files {
            let size = match blob_path(&remote_dir, &record.content_hash) {
                Some(blob) => blob_size(&blob)?,
                None => 0,
            };
            files.insert(
                key.clone(),
                FileSummary {
                    size,
                    cached_at: record.cached_at,
                },
            );
        }

        tree.insert(
            entry.remote_id.clone(),
            RemoteSummary {
                remote_hash: remote_hash.clone(),
                last_touched: entry.last_touched,
                size: remote_size_bytes(store.root(), remote_hash)?,
                files,
            },
        );
    }

    debug!("Built cache tree with {} remote(s)", tree.len());
    Ok(tree)
}

fn blob_size(blob: &Path) -> PartsbinResult<u64> {
    if blob.is_dir() {
        return Err(PartsbinError::BlobIsDirectory {
            path: blob.to_path_buf(),
        });
    }
    if !blob.exists() {
        return Ok(0);
    }
    let metadata = fs::metadata(blob)
        .map_err(|e| PartsbinError::io(format!("reading {}", blob.display()), e))?;
    Ok(metadata.len())
}

/// Recursively delete the cache root
pub fn clear(root: &Path) -> PartsbinResult<()> {
    if root.is_dir() {
        fs::remove_dir_all(root)
            .map_err(|e| PartsbinError::io(format!("removing {}", root.display()), e))?;
    } else if root.exists() {
        fs::remove_file(root)
            .map_err(|e| PartsbinError::io(format!("removing {}", root.display()), e))?;
    }
    Ok(())
}
