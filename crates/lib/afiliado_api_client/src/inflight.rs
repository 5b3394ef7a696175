//! De-duplication of overlapping operations.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Set of operation keys currently running.
#[derive(Debug, Clone, Default)]
pub struct InFlightGuard {
    active: Arc<DashMap<String, ()>>,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key`, or returns `None` if an operation with the same key is
    /// still running. The claim is released when the ticket drops.
    pub fn try_acquire(&self, key: impl Into<String>) -> Option<InFlightTicket> {
        let key = key.into();
        match self.active.entry(key.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(InFlightTicket {
                    active: Arc::clone(&self.active),
                    key,
                })
            }
        }
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.active.contains_key(key)
    }
}

/// Claim on an operation key; releases it on drop.
#[derive(Debug)]
pub struct InFlightTicket {
    active: Arc<DashMap<String, ()>>,
    key: String,
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.active.remove(&self.key);
    }
}
