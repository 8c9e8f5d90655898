//! Reminder id to alert handle mapping

use promemoria_util::{AlertHandle, ReminderId, HANDLE_SPACE};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Bidirectional reminder id <-> handle table.
///
/// A handle is allocated the first time an id is seen, starting from the
/// derived hash and probing forward past handles already taken, so two ids
/// never share a handle. Entries live for the whole process.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    by_id: HashMap<ReminderId, AlertHandle>,
    by_handle: HashMap<AlertHandle, ReminderId>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The handle for `id`, allocating one on first use
    pub fn handle_for(&mut self, id: &ReminderId) -> AlertHandle {
        if let Some(handle) = self.by_id.get(id) {
            return *handle;
        }

        let derived = AlertHandle::derive(id);
        let mut candidate = derived;
        let mut probes = 0u32;
        while self.by_handle.contains_key(&candidate) {
            probes += 1;
            if probes >= HANDLE_SPACE {
                // Every handle is taken; share the derived one
                warn!(reminder_id = %id, "Handle space exhausted");
                return derived;
            }
            candidate = candidate.next();
        }

        if probes > 0 {
            debug!(
                reminder_id = %id,
                derived = %derived,
                allocated = %candidate,
                "Handle collision resolved"
            );
        }

        self.by_id.insert(id.clone(), candidate);
        self.by_handle.insert(candidate, id.clone());
        candidate
    }

    /// The handle already allocated for `id`, if any
    pub fn lookup(&self, id: &ReminderId) -> Option<AlertHandle> {
        self.by_id.get(id).copied()
    }

    /// The reminder a handle was allocated to
    pub fn reminder_for(&self, handle: AlertHandle) -> Option<&ReminderId> {
        self.by_handle.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
