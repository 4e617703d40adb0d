//! Asset Cache Proxy
//!
//! The network-first proxy over a fixed set of same-origin asset paths.
//! On install it precaches the full set; on fetch it intercepts managed
//! paths only, serving live data when the network answers and the
//! stored copy when it does not; on activate it takes over every open
//! client so the new version applies without a reload.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use log::{debug, warn};

use super::cache::CacheStorage;
use super::events::{Clients, ExtendableEvent};
use super::fetch::{FetchEvent, Network, Response};
use super::lifecycle::{ActivateEvent, InstallEvent};
use super::strategy;
use super::WorkerError;

/// Default version-scoped cache name
pub const DEFAULT_CACHE_NAME: &str = "assets_v1";

/// Proxy configuration.
///
/// The managed path set is fixed at build time by the deploy pipeline;
/// membership is exact path match, never query or wildcard matching.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Version-scoped cache name
    pub cache_name: String,
    /// Managed paths, precached at install in order
    pub precache: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            precache: [
                "/",
                "/assets/index.css",
                "/assets/index.js",
                "/assets/bootstrap-icons.woff",
                "/assets/bootstrap-icons.woff2",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
        }
    }
}

impl ProxyConfig {
    /// Check whether a path belongs to the managed set
    pub fn is_managed(&self, path: &str) -> bool {
        self.precache.iter().any(|p| p == path)
    }
}

/// The asset cache proxy.
///
/// Stateless apart from its configuration; all persistent state lives
/// in the cache storage the host passes into each operation.
pub struct AssetCacheProxy {
    /// Configuration
    config: ProxyConfig,
}

impl AssetCacheProxy {
    /// Create a new proxy
    pub fn new(config: ProxyConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Install handler: precache the full managed set.
    ///
    /// Blocks the install until every fetch resolves; any failure is
    /// fatal to this version's install and is not retried.
    pub fn on_install(
        &self,
        event: &mut InstallEvent,
        storage: &mut CacheStorage,
        network: &dyn Network,
    ) -> Result<(), WorkerError> {
        event.wait_until();
        let cache = storage.open(&self.config.cache_name);
        cache
            .add_all(network, &self.config.precache)
            .map_err(|err| {
                warn!("precache into {} aborted: {:?}", self.config.cache_name, err);
                WorkerError::PrecacheFailed(err)
            })?;
        debug!(
            "precached {} assets into {}",
            self.config.precache.len(),
            self.config.cache_name
        );
        Ok(())
    }

    /// Fetch handler: intercept managed paths only.
    ///
    /// Unmanaged paths are left untouched and proceed through the
    /// normal network stack. Managed paths are answered network-first;
    /// a cold miss with the network down resolves to the network-error
    /// response rather than failing the dispatch.
    pub fn on_fetch(
        &self,
        event: &mut FetchEvent,
        storage: &mut CacheStorage,
        network: &dyn Network,
    ) {
        let path = event.request().path();
        if !self.config.is_managed(&path) {
            return;
        }

        match strategy::network_first(storage, network, &self.config.cache_name, event.request()) {
            Some(response) => event.respond_with(response),
            None => {
                debug!("cold miss for {} with network down", path);
                event.respond_with(Response::error());
            }
        }
    }

    /// Activate handler: take over all open clients.
    ///
    /// Blocks activation until every currently open client is attached
    /// to this version. No cache migration or cleanup happens here.
    pub fn on_activate(&self, event: &mut ActivateEvent, clients: &mut Clients) {
        event.wait_until();
        let claimed = clients.claim(event.worker_id);
        debug!("worker {:?} claimed {} clients", event.worker_id, claimed);
    }
}
