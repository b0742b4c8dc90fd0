//! Typed listener collection used by the in-memory collaborators.
//!
//! Emission works on a snapshot: the lock is released before any listener
//! runs, so a listener may add or remove listeners (including itself) while
//! being notified.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use shared::{
    domain::{ListenerId, ListenerSource},
    error::RegistrationError,
};

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

pub struct ListenerRegistry<L> {
    registry: ListenerSource,
    state: Mutex<RegistryState<L>>,
}

struct RegistryState<L> {
    listeners: Vec<(ListenerId, L)>,
    closed: bool,
}

impl<L: Clone> ListenerRegistry<L> {
    pub fn new(registry: ListenerSource) -> Self {
        Self {
            registry,
            state: Mutex::new(RegistryState {
                listeners: Vec::new(),
                closed: false,
            }),
        }
    }

    pub fn registry(&self) -> ListenerSource {
        self.registry
    }

    pub fn add(&self, listener: L) -> Result<ListenerId, RegistrationError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(RegistrationError::RegistryClosed {
                registry: self.registry,
            });
        }
        let id = ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed));
        state.listeners.push((id, listener));
        Ok(id)
    }

    pub fn remove(&self, id: ListenerId) -> Result<(), RegistrationError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(RegistrationError::RegistryClosed {
                registry: self.registry,
            });
        }
        let before = state.listeners.len();
        state.listeners.retain(|(lid, _)| *lid != id);
        if state.listeners.len() == before {
            return Err(RegistrationError::UnknownListener {
                registry: self.registry,
                id,
            });
        }
        Ok(())
    }

    /// Listeners registered right now, cloned out of the lock.
    pub fn snapshot(&self) -> Vec<L> {
        let state = self.state.lock();
        state.listeners.iter().map(|(_, l)| l.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every listener and rejects later adds and removes.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        let dropped = std::mem::take(&mut state.listeners);
        if !dropped.is_empty() {
            tracing::debug!(
                registry = %self.registry,
                dropped = dropped.len(),
                "registry closed with listeners still attached"
            );
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
