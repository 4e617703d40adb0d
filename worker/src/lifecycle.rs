//! Worker Lifecycle Management
//!
//! Handles proxy worker state transitions and lifecycle events.

use alloc::boxed::Box;
use alloc::vec::Vec;

use super::events::{EventType, ExtendableEvent};
use super::{AssetWorker, WorkerError, WorkerId, WorkerState};

/// Lifecycle event types
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    /// Install event
    Install(InstallEvent),
    /// Activate event
    Activate(ActivateEvent),
    /// State change
    StateChange(StateChangeEvent),
    /// Controller change
    ControllerChange,
}

/// Install event data
#[derive(Debug, Clone)]
pub struct InstallEvent {
    /// Worker ID
    pub worker_id: WorkerId,
    /// Whether the host must wait for the handler to complete
    pub wait_until: bool,
}

impl InstallEvent {
    /// Create new install event
    pub fn new(worker_id: WorkerId) -> Self {
        Self {
            worker_id,
            wait_until: false,
        }
    }
}

impl ExtendableEvent for InstallEvent {
    fn event_type(&self) -> EventType {
        EventType::Install
    }

    fn wait_until(&mut self) {
        self.wait_until = true;
    }

    fn has_wait_until(&self) -> bool {
        self.wait_until
    }
}

/// Activate event data
#[derive(Debug, Clone)]
pub struct ActivateEvent {
    /// Worker ID
    pub worker_id: WorkerId,
    /// Whether the host must wait for the handler to complete
    pub wait_until: bool,
}

impl ActivateEvent {
    /// Create new activate event
    pub fn new(worker_id: WorkerId) -> Self {
        Self {
            worker_id,
            wait_until: false,
        }
    }
}

impl ExtendableEvent for ActivateEvent {
    fn event_type(&self) -> EventType {
        EventType::Activate
    }

    fn wait_until(&mut self) {
        self.wait_until = true;
    }

    fn has_wait_until(&self) -> bool {
        self.wait_until
    }
}

/// State change event data
#[derive(Debug, Clone)]
pub struct StateChangeEvent {
    /// Worker ID
    pub worker_id: WorkerId,
    /// Old state
    pub old_state: WorkerState,
    /// New state
    pub new_state: WorkerState,
}

/// Lifecycle manager
pub struct LifecycleManager {
    /// Pending events
    pending_events: Vec<LifecycleEvent>,
    /// Event listeners
    listeners: Vec<Box<dyn Fn(&LifecycleEvent) + Send + Sync>>,
}

impl LifecycleManager {
    /// Create new lifecycle manager
    pub fn new() -> Self {
        Self {
            pending_events: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Add event listener
    pub fn add_listener(&mut self, listener: Box<dyn Fn(&LifecycleEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    /// Dispatch an event
    pub fn dispatch(&mut self, event: LifecycleEvent) {
        for listener in &self.listeners {
            listener(&event);
        }
        self.pending_events.push(event);
    }

    /// Get pending events
    pub fn pending_events(&self) -> &[LifecycleEvent] {
        &self.pending_events
    }

    /// Clear pending events
    pub fn clear_pending(&mut self) {
        self.pending_events.clear();
    }

    /// Transition worker state
    pub fn transition_state(
        &mut self,
        worker: &mut AssetWorker,
        new_state: WorkerState,
    ) -> Result<(), WorkerError> {
        let old_state = worker.state;

        if !is_valid_transition(old_state, new_state) {
            return Err(WorkerError::InvalidStateTransition);
        }

        worker.state = new_state;

        self.dispatch(LifecycleEvent::StateChange(StateChangeEvent {
            worker_id: worker.id(),
            old_state,
            new_state,
        }));

        match new_state {
            WorkerState::Installing => {
                self.dispatch(LifecycleEvent::Install(InstallEvent::new(worker.id())));
            }
            WorkerState::Activating => {
                self.dispatch(LifecycleEvent::Activate(ActivateEvent::new(worker.id())));
            }
            _ => {}
        }

        Ok(())
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a state transition is valid
pub fn is_valid_transition(from: WorkerState, to: WorkerState) -> bool {
    use WorkerState::*;

    matches!(
        (from, to),
        // Normal lifecycle
        (Parsed, Installing) |
        (Installing, Installed) |
        (Installing, Redundant) |  // Precache failed
        (Installed, Activating) |
        (Activating, Activated) |
        (Activating, Redundant) |  // Activate failed
        (Activated, Redundant)     // Superseded by a newer version
    )
}
