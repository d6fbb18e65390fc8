//! Fetching component files from remotes
//!
//! The cache never touches the network. This module fetches on a miss
//! and writes the result back through a [`RemoteCache`](crate::cache::RemoteCache).

use crate::cache::{CacheStore, PathKey};
use crate::error::{PartsbinError, PartsbinResult};
use std::time::Duration;
use tracing::{debug, info};

/// Source of raw file contents for a remote
pub trait Fetcher {
    /// Fetch the file at `key` from `remote`
    fn fetch(&self, remote: &str, key: &PathKey) -> PartsbinResult<Vec<u8>>;
}

/// Fetches files over HTTP(S), treating the remote as a base URL
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Create a fetcher with a global request timeout
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }

    /// URL of a file under a remote base URL
    pub fn file_url(remote: &str, key: &PathKey) -> PartsbinResult<String> {
        let segments = key.segments()?;
        Ok(format!(
            "{}/{}",
            remote.trim_end_matches('/'),
            segments.join("/")
        ))
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, remote: &str, key: &PathKey) -> PartsbinResult<Vec<u8>> {
        let url = Self::file_url(remote, key)?;
        debug!("GET {}", url);

        let mut response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| PartsbinError::fetch(&url, e.to_string()))?;

        response
            .body_mut()
            .read_to_vec()
            .map_err(|e| PartsbinError::fetch(&url, e.to_string()))
    }
}

/// Result of a read-through fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    /// File contents
    pub content: String,
    /// Whether the contents came from the cache
    pub from_cache: bool,
}

/// Read a file through the cache, fetching and caching it on a miss.
///
/// With `refresh` set the cache is bypassed for reading but still updated.
pub fn fetch_through(
    store: &mut CacheStore,
    fetcher: &dyn Fetcher,
    remote: &str,
    key: &PathKey,
    refresh: bool,
) -> PartsbinResult<Fetched> {
    let mut cache = store.remote(remote)?;

    if !refresh {
        if let Some(content) = cache.get_file(key)? {
            debug!("Cache hit for {} from {}", key.display_path(), remote);
            return Ok(Fetched {
                content,
                from_cache: true,
            });
        }
    }

    let bytes = fetcher.fetch(remote, key)?;
    let content = String::from_utf8(bytes).map_err(|_| {
        PartsbinError::fetch(
            format!("{} {}", remote, key.display_path()),
            "response is not valid UTF-8",
        )
    })?;

    cache.add_file(key, &content)?;
    info!("Fetched {} from {}", key.display_path(), remote);

    Ok(Fetched {
        content,
        from_cache: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::WriteMode;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct CountingFetcher {
        body: &'static str,
        calls: Cell<usize>,
    }

    impl CountingFetcher {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                calls: Cell::new(0),
            }
        }
    }

    impl Fetcher for CountingFetcher {
        fn fetch(&self, _remote: &str, _key: &PathKey) -> PartsbinResult<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.body.as_bytes().to_vec())
        }
    }

    struct FailingFetcher;

    impl Fetcher for FailingFetcher {
        fn fetch(&self, remote: &str, _key: &PathKey) -> PartsbinResult<Vec<u8>> {
            Err(PartsbinError::fetch(remote, "connection refused"))
        }
    }

    fn test_store() -> (CacheStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = CacheStore::open(temp.path().join("partsbin"), WriteMode::Direct).unwrap();
        (store, temp)
    }

    #[test]
    fn file_url_joins_segments() {
        let key = PathKey::from(["components", "Button.tsx"]);
        assert_eq!(
            HttpFetcher::file_url("https://example.com/ui/", &key).unwrap(),
            "https://example.com/ui/components/Button.tsx"
        );
    }

    #[test]
    fn fetches_only_on_miss() {
        let (mut store, _temp) = test_store();
        let fetcher = CountingFetcher::new("export {}");
        let key = PathKey::from(["Button.tsx"]);

        let first = fetch_through(&mut store, &fetcher, "remote", &key, false).unwrap();
        let second = fetch_through(&mut store, &fetcher, "remote", &key, false).unwrap();

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(second.content, "export {}");
        assert_eq!(fetcher.calls.get(), 1);
    }

    #[test]
    fn refresh_bypasses_cache() {
        let (mut store, _temp) = test_store();
        let fetcher = CountingFetcher::new("v");
        let key = PathKey::from(["Button.tsx"]);

        fetch_through(&mut store, &fetcher, "remote", &key, false).unwrap();
        let refreshed = fetch_through(&mut store, &fetcher, "remote", &key, true).unwrap();

        assert!(!refreshed.from_cache);
        assert_eq!(fetcher.calls.get(), 2);
    }

    #[test]
    fn fetch_error_leaves_cache_untouched() {
        let (mut store, _temp) = test_store();
        let key = PathKey::from(["Button.tsx"]);

        let err = fetch_through(&mut store, &FailingFetcher, "remote", &key, false).unwrap_err();
        assert!(matches!(err, PartsbinError::Fetch { .. }));

        let cache = store.remote("remote").unwrap();
        assert!(!cache.contains(&key));
    }
}
