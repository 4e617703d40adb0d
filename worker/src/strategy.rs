//! Fetch Strategies
//!
//! Strategies for answering an intercepted request from the network,
//! a named cache, or both. The asset proxy uses `network_first`; the
//! rest are part of the same menu for hosts that wire caches
//! differently.
//!
//! All strategies key cache entries by the request's path component,
//! make at most one network attempt, and return `None` when neither
//! source can produce a response.

use log::warn;

use super::cache::CacheStorage;
use super::fetch::{Network, Request, Response};

/// Network-first: one network attempt, refresh the cache on success,
/// fall back to the stored copy on transport failure.
///
/// The stored entry always equals the most recent successful fetch for
/// the path; the cache is a fallback, never a primary source.
pub fn network_first(
    storage: &mut CacheStorage,
    network: &dyn Network,
    cache_name: &str,
    request: &Request,
) -> Option<Response> {
    let path = request.path();
    match network.fetch(request) {
        Ok(response) => {
            // A failed store must not fail the live response
            if let Err(err) = storage.open(cache_name).put(&path, response.clone_response()) {
                warn!("cache refresh for {} failed: {:?}", path, err);
            }
            Some(response)
        }
        Err(_) => storage.open(cache_name).match_path(&path),
    }
}

/// Cache-first: serve the stored copy when present, otherwise one
/// network attempt, stored on success.
pub fn cache_first(
    storage: &mut CacheStorage,
    network: &dyn Network,
    cache_name: &str,
    request: &Request,
) -> Option<Response> {
    let path = request.path();
    if let Some(hit) = storage.open(cache_name).match_path(&path) {
        return Some(hit);
    }
    match network.fetch(request) {
        Ok(response) => {
            if let Err(err) = storage.open(cache_name).put(&path, response.clone_response()) {
                warn!("cache fill for {} failed: {:?}", path, err);
            }
            Some(response)
        }
        Err(_) => None,
    }
}

/// Stale-while-revalidate: serve the stored copy when present and
/// refresh it from the network in the same pass; fall through to the
/// network on a miss.
pub fn stale_while_revalidate(
    storage: &mut CacheStorage,
    network: &dyn Network,
    cache_name: &str,
    request: &Request,
) -> Option<Response> {
    let path = request.path();
    let cached = storage.open(cache_name).match_path(&path);
    match network.fetch(request) {
        Ok(response) => {
            if let Err(err) = storage.open(cache_name).put(&path, response.clone_response()) {
                warn!("revalidation for {} failed: {:?}", path, err);
            }
            match cached {
                Some(stale) => Some(stale),
                None => Some(response),
            }
        }
        Err(_) => cached,
    }
}

/// Cache-only: never touch the network.
pub fn cache_only(
    storage: &mut CacheStorage,
    cache_name: &str,
    request: &Request,
) -> Option<Response> {
    storage.open(cache_name).match_path(&request.path())
}

/// Network-only: never touch the cache.
pub fn network_only(network: &dyn Network, request: &Request) -> Option<Response> {
    network.fetch(request).ok()
}
