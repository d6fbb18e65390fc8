//! Local cache for files fetched from remotes
//!
//! A content-addressed store on disk. Blobs are named by their SHA256
//! digest, and `cache.json` records which logical path of which remote
//! points at which blob and when it was cached.
//!
//! # Read path
//!
//! A cached file is served only if all of these hold:
//!
//! | Check | On failure |
//! |-------|------------|
//! | A record exists for the path | miss |
//! | The record is younger than 7 days | miss |
//! | The blob exists | miss |
//! | The blob is a file | error |
//! | The blob's digest matches the record | miss |
//!
//! Misses never repair or delete anything. The next `add_file` or
//! `remove_file` for that path does.
//!
//! # Concurrency
//!
//! Single writer assumed. Nothing is locked across processes.

pub mod diagnostics;
pub mod hash;
pub mod index;
pub mod path_key;
pub mod store;

pub use diagnostics::{build_tree, FileSummary, RemoteSummary};
pub use index::{CacheIndex, FileRecord, IndexEntry, WriteMode};
pub use path_key::PathKey;
pub use store::{CacheStore, RemoteCache, TTL_MILLIS};
