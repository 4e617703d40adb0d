//! Asset Cache Store
//!
//! Named response stores backing the proxy. Each cache maps a managed
//! path (exact string) to the most recently stored response for it.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::fetch::{Network, NetworkError, Request, Response};

/// Default storage quota per cache (bytes)
const DEFAULT_QUOTA: usize = 50 * 1024 * 1024;

/// Cache error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Storing the entry would exceed the cache quota
    QuotaExceeded,
    /// A precache fetch resolved with a non-OK status
    RequestFailed {
        /// Path that failed
        path: String,
        /// Status it resolved with
        status: u16,
    },
    /// A precache fetch failed at the transport level
    Network {
        /// Path that failed
        path: String,
        /// Underlying error
        error: NetworkError,
    },
}

/// A cached response entry
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The response
    response: Response,
    /// Size in bytes
    size: usize,
}

impl CacheEntry {
    fn new(response: Response) -> Self {
        let size = response.body_size();
        Self { response, size }
    }
}

/// A named cache store.
///
/// At most one entry per path; writes overwrite.
#[derive(Debug)]
pub struct Cache {
    /// Cache name
    name: String,
    /// Cached entries (path -> entry)
    entries: BTreeMap<String, CacheEntry>,
    /// Total size in bytes
    total_size: usize,
    /// Quota (bytes)
    quota: usize,
}

impl Cache {
    /// Create a new cache
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
            total_size: 0,
            quota: DEFAULT_QUOTA,
        }
    }

    /// Get cache name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the entry stored for a path (exact match)
    pub fn match_path(&self, path: &str) -> Option<Response> {
        self.entries.get(path).map(|e| e.response.clone_response())
    }

    /// Store a response under a path, overwriting any prior entry
    pub fn put(&mut self, path: &str, response: Response) -> Result<(), CacheError> {
        let entry = CacheEntry::new(response);
        let size = entry.size;

        let old_size = self.entries.get(path).map(|e| e.size).unwrap_or(0);
        if self.total_size - old_size + size > self.quota {
            return Err(CacheError::QuotaExceeded);
        }

        if let Some(old) = self.entries.insert(path.to_string(), entry) {
            self.total_size -= old.size;
        }
        self.total_size += size;

        Ok(())
    }

    /// Fetch every path through the network and store the results.
    ///
    /// All fetches happen before any store: a failure, transport error
    /// or non-OK status, aborts the whole call and writes nothing.
    pub fn add_all(&mut self, network: &dyn Network, paths: &[String]) -> Result<(), CacheError> {
        let mut fetched = Vec::with_capacity(paths.len());
        for path in paths {
            let request = Request::new(path.clone());
            let response = network.fetch(&request).map_err(|error| CacheError::Network {
                path: path.clone(),
                error,
            })?;
            if !response.ok() {
                return Err(CacheError::RequestFailed {
                    path: path.clone(),
                    status: response.status,
                });
            }
            fetched.push((path, response));
        }
        for (path, response) in fetched {
            self.put(path, response)?;
        }
        Ok(())
    }

    /// Delete a cached path
    pub fn delete(&mut self, path: &str) -> bool {
        if let Some(entry) = self.entries.remove(path) {
            self.total_size -= entry.size;
            true
        } else {
            false
        }
    }

    /// Get all cached paths
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total size in bytes
    pub fn size(&self) -> usize {
        self.total_size
    }

    /// Quota in bytes
    pub fn quota(&self) -> usize {
        self.quota
    }

    #[cfg(test)]
    fn set_quota(&mut self, quota: usize) {
        self.quota = quota;
    }
}

/// Cache storage for one origin (manages caches by name).
///
/// Owned by the host and passed into each operation; there is no
/// ambient singleton.
pub struct CacheStorage {
    /// Origin
    origin: String,
    /// Caches by name
    caches: BTreeMap<String, Cache>,
}

impl CacheStorage {
    /// Create new cache storage
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            caches: BTreeMap::new(),
        }
    }

    /// Open a cache by name, creating it if absent
    pub fn open(&mut self, name: &str) -> &mut Cache {
        self.caches
            .entry(name.to_string())
            .or_insert_with(|| Cache::new(name))
    }

    /// Get a cache without creating it
    pub fn get(&self, name: &str) -> Option<&Cache> {
        self.caches.get(name)
    }

    /// Check if a cache exists
    pub fn has(&self, name: &str) -> bool {
        self.caches.contains_key(name)
    }

    /// Delete a cache
    pub fn delete(&mut self, name: &str) -> bool {
        self.caches.remove(name).is_some()
    }

    /// Get all cache names
    pub fn keys(&self) -> Vec<String> {
        self.caches.keys().cloned().collect()
    }

    /// Total usage across caches (bytes)
    pub fn usage(&self) -> usize {
        self.caches.values().map(|c| c.size()).sum()
    }

    /// Get origin
    pub fn origin(&self) -> &str {
        &self.origin
    }
}
