//! Offcache Asset Cache Proxy Worker
//!
//! This crate provides the browser-resident asset cache proxy for the
//! Offcache app shell: a background worker that intercepts requests for
//! a fixed set of same-origin static assets, serves them network-first
//! with cache fallback, and keeps the cache populated and current
//! across application updates.
//!
//! The hosting runtime owns scheduling and the event loop; it drives a
//! [`Container`] by dispatching install, fetch, and activate events and
//! waiting on the handlers it is told to wait on.
//!
//! # Architecture
//!
//! - `fetch`: request/response types, fetch events, the consumed network interface
//! - `cache`: named response stores (precache target and fallback source)
//! - `lifecycle`: worker state machine + lifecycle events
//! - `events`: extendable events + the registry of open clients
//! - `registration`: installing/waiting/active version slots
//! - `strategy`: network-first and the rest of the strategy menu
//! - `proxy`: the asset cache proxy handlers themselves

#![no_std]

extern crate alloc;

pub mod cache;
pub mod events;
pub mod fetch;
pub mod lifecycle;
pub mod proxy;
pub mod registration;
pub mod strategy;

pub use cache::{Cache, CacheError, CacheStorage};
pub use events::{ClientInfo, Clients, EventType, ExtendableEvent};
pub use fetch::{
    request_path, FetchEvent, FetchEventId, Method, Network, NetworkError, Request, Response,
};
pub use lifecycle::{
    ActivateEvent, InstallEvent, LifecycleEvent, LifecycleManager, StateChangeEvent,
};
pub use proxy::{AssetCacheProxy, ProxyConfig, DEFAULT_CACHE_NAME};
pub use registration::Registration;

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use core::sync::atomic::{AtomicU64, Ordering};

/// Worker global ID counter
static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

/// Worker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Initial state, not yet installing
    Parsed,
    /// Installing (precache in progress)
    Installing,
    /// Installed, waiting to activate
    Installed,
    /// Activating (takeover in progress)
    Activating,
    /// Active and controlling clients
    Activated,
    /// Failed install or superseded version
    Redundant,
}

impl Default for WorkerState {
    fn default() -> Self {
        Self::Parsed
    }
}

/// Worker error types
#[derive(Debug, Clone)]
pub enum WorkerError {
    /// Precache population failed during install
    PrecacheFailed(CacheError),
    /// State transition invalid
    InvalidStateTransition,
    /// Worker not found
    NotFound,
}

/// Worker ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(u64);

impl WorkerId {
    /// Create a new unique ID
    pub fn new() -> Self {
        Self(NEXT_WORKER_ID.fetch_add(1, Ordering::SeqCst))
    }

    /// Get raw value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for WorkerId {
    fn default() -> Self {
        Self::new()
    }
}

/// One installed version of the asset cache proxy
pub struct AssetWorker {
    /// Unique identifier
    id: WorkerId,
    /// The proxy this version runs
    proxy: AssetCacheProxy,
    /// Current state
    pub(crate) state: WorkerState,
}

impl AssetWorker {
    /// Create a new worker version
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            id: WorkerId::new(),
            proxy: AssetCacheProxy::new(config),
            state: WorkerState::Parsed,
        }
    }

    /// Get the worker ID
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Get current state
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Get the proxy
    pub fn proxy(&self) -> &AssetCacheProxy {
        &self.proxy
    }

    /// Get the configuration
    pub fn config(&self) -> &ProxyConfig {
        self.proxy.config()
    }

    /// Check if the worker is active
    pub fn is_active(&self) -> bool {
        self.state == WorkerState::Activated
    }

    /// Check if the worker is installing
    pub fn is_installing(&self) -> bool {
        self.state == WorkerState::Installing
    }

    /// Check if the worker is waiting
    pub fn is_waiting(&self) -> bool {
        self.state == WorkerState::Installed
    }
}

/// Proxy container.
///
/// Owns every worker version for an origin, the registration slots,
/// and the registry of open clients, and routes host events to the
/// right version.
pub struct Container {
    /// Origin this container belongs to
    origin: String,
    /// Worker versions by ID
    workers: BTreeMap<WorkerId, AssetWorker>,
    /// The origin's single registration
    registration: Registration,
    /// Open clients
    clients: Clients,
    /// Lifecycle manager
    lifecycle: LifecycleManager,
    /// Client ID counter
    next_client_id: u64,
}

impl Container {
    /// Create a new container
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            workers: BTreeMap::new(),
            registration: Registration::new(),
            clients: Clients::new(),
            lifecycle: LifecycleManager::new(),
            next_client_id: 1,
        }
    }

    /// Get the origin
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Get the registration
    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    /// Get the client registry
    pub fn clients(&self) -> &Clients {
        &self.clients
    }

    /// Get the lifecycle manager
    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    /// Get the lifecycle manager mutably (for listener registration)
    pub fn lifecycle_mut(&mut self) -> &mut LifecycleManager {
        &mut self.lifecycle
    }

    /// Get worker by ID
    pub fn worker(&self, id: WorkerId) -> Option<&AssetWorker> {
        self.workers.get(&id)
    }

    /// Get the active worker
    pub fn active_worker(&self) -> Option<&AssetWorker> {
        self.registration.active().and_then(|id| self.workers.get(&id))
    }

    /// Register an open client.
    ///
    /// New clients attach to the current active worker; clients open
    /// before an activation keep their controller until a claim.
    pub fn connect_client(&mut self, url: impl Into<String>) -> String {
        let id = format!("client-{}", self.next_client_id);
        self.next_client_id += 1;
        self.clients.add(ClientInfo {
            id: id.clone(),
            url: url.into(),
            controller: self.registration.active(),
        });
        id
    }

    /// Remove a client
    pub fn disconnect_client(&mut self, id: &str) -> bool {
        self.clients.remove(id)
    }

    /// Install a new proxy version.
    ///
    /// Runs the install handler as a blocking gate. On success the
    /// version parks in the waiting slot; on failure it becomes
    /// redundant and any prior active version remains in control.
    pub fn install(
        &mut self,
        config: ProxyConfig,
        storage: &mut CacheStorage,
        network: &dyn Network,
    ) -> Result<WorkerId, WorkerError> {
        let worker = AssetWorker::new(config);
        let id = worker.id();
        self.workers.insert(id, worker);
        self.registration.set_installing(Some(id));
        self.transition(id, WorkerState::Installing)?;

        let mut event = InstallEvent::new(id);
        let result = match self.workers.get(&id) {
            Some(worker) => worker.proxy().on_install(&mut event, storage, network),
            None => Err(WorkerError::NotFound),
        };

        self.registration.set_installing(None);
        match result {
            Ok(()) => {
                self.transition(id, WorkerState::Installed)?;
                self.registration.set_waiting(Some(id));
                Ok(id)
            }
            Err(err) => {
                self.transition(id, WorkerState::Redundant)?;
                Err(err)
            }
        }
    }

    /// Activate the waiting version.
    ///
    /// Runs the activate handler as a blocking gate: every open client
    /// is claimed for this version before activation completes. The
    /// displaced version, if any, becomes redundant.
    pub fn activate(&mut self, id: WorkerId) -> Result<(), WorkerError> {
        if self.registration.waiting() != Some(id) {
            return Err(WorkerError::InvalidStateTransition);
        }
        self.transition(id, WorkerState::Activating)?;

        let mut event = ActivateEvent::new(id);
        match self.workers.get(&id) {
            Some(worker) => worker.proxy().on_activate(&mut event, &mut self.clients),
            None => return Err(WorkerError::NotFound),
        }

        if let Some(previous) = self.registration.promote_waiting() {
            self.transition(previous, WorkerState::Redundant)?;
        }
        self.transition(id, WorkerState::Activated)?;
        self.lifecycle.dispatch(LifecycleEvent::ControllerChange);
        Ok(())
    }

    /// Route a fetch event to the worker controlling its issuing client.
    ///
    /// Returns whether the event was intercepted; an unanswered event
    /// proceeds through the normal network stack untouched.
    pub fn dispatch_fetch(
        &mut self,
        event: &mut FetchEvent,
        storage: &mut CacheStorage,
        network: &dyn Network,
    ) -> bool {
        let worker_id = match event.client_id().and_then(|id| self.clients.controller_of(id)) {
            Some(id) => id,
            None => return false,
        };
        let worker = match self.workers.get(&worker_id) {
            Some(worker) if worker.is_active() => worker,
            _ => return false,
        };
        worker.proxy().on_fetch(event, storage, network);
        event.responded()
    }

    fn transition(&mut self, id: WorkerId, state: WorkerState) -> Result<(), WorkerError> {
        let worker = self.workers.get_mut(&id).ok_or(WorkerError::NotFound)?;
        self.lifecycle.transition_state(worker, state)
    }
}
