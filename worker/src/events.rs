//! Worker Events
//!
//! Common event types and the registry of open clients.

use alloc::string::String;
use alloc::vec::Vec;

use super::WorkerId;

/// Event type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// Install event
    Install,
    /// Activate event
    Activate,
    /// Fetch event
    Fetch,
}

/// Extendable event trait.
///
/// An event whose lifetime the handler may extend; the host waits for
/// handlers that set `wait_until` before treating the event as settled.
pub trait ExtendableEvent {
    /// Get event type
    fn event_type(&self) -> EventType;

    /// Extend the event until the handler's work completes
    fn wait_until(&mut self);

    /// Check if wait_until was called
    fn has_wait_until(&self) -> bool;
}

/// An open consumer (page) under the proxy's origin
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// Client ID
    pub id: String,
    /// URL the client is showing
    pub url: String,
    /// Worker currently controlling this client
    pub controller: Option<WorkerId>,
}

/// Registry of open clients
pub struct Clients {
    /// All clients
    clients: Vec<ClientInfo>,
}

impl Clients {
    /// Create new client registry
    pub fn new() -> Self {
        Self {
            clients: Vec::new(),
        }
    }

    /// Get a client by ID
    pub fn get(&self, id: &str) -> Option<&ClientInfo> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Controller of a client
    pub fn controller_of(&self, id: &str) -> Option<WorkerId> {
        self.get(id).and_then(|c| c.controller)
    }

    /// Take control of every currently open client.
    ///
    /// Once this returns, subsequent requests from clients opened before
    /// the takeover are routed to the given worker without a reload.
    pub fn claim(&mut self, worker_id: WorkerId) -> usize {
        for client in &mut self.clients {
            client.controller = Some(worker_id);
        }
        self.clients.len()
    }

    /// Clients controlled by a worker
    pub fn controlled_by(&self, worker_id: WorkerId) -> usize {
        self.clients
            .iter()
            .filter(|c| c.controller == Some(worker_id))
            .count()
    }

    /// Add a client
    pub fn add(&mut self, client: ClientInfo) {
        self.clients.push(client);
    }

    /// Remove a client
    pub fn remove(&mut self, id: &str) -> bool {
        let len_before = self.clients.len();
        self.clients.retain(|c| c.id != id);
        self.clients.len() != len_before
    }

    /// Iterate over clients
    pub fn iter(&self) -> impl Iterator<Item = &ClientInfo> {
        self.clients.iter()
    }

    /// Number of open clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Check if no clients are open
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Default for Clients {
    fn default() -> Self {
        Self::new()
    }
}
