//! At most one enhancement in flight per note.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use jotwise_core::{Error, Result};

/// Set of notes with an enhancement currently running.
#[derive(Debug, Clone, Default)]
pub struct InFlightNotes {
    inner: Arc<Mutex<HashSet<Uuid>>>,
}

/// Marks a note as busy until dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    note_id: Uuid,
    inner: Arc<Mutex<HashSet<Uuid>>>,
}

impl InFlightNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `note_id`, or fail with `Error::Conflict` when another
    /// enhancement for the same note has not finished.
    pub fn try_acquire(&self, note_id: Uuid) -> Result<InFlightGuard> {
        let mut set = self
            .inner
            .lock()
            .map_err(|e| Error::Internal(format!("in-flight set poisoned: {}", e)))?;
        if !set.insert(note_id) {
            debug!(
                subsystem = "enhance",
                component = "gate",
                note_id = %note_id,
                "Enhancement already in flight"
            );
            return Err(Error::Conflict(format!(
                "an enhancement for note {} is already running",
                note_id
            )));
        }
        Ok(InFlightGuard {
            note_id,
            inner: Arc::clone(&self.inner),
        })
    }

    pub fn is_in_flight(&self, note_id: Uuid) -> bool {
        self.inner
            .lock()
            .map(|set| set.contains(&note_id))
            .unwrap_or(false)
    }
}

impl InFlightGuard {
    pub fn note_id(&self) -> Uuid {
        self.note_id
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut set) = self.inner.lock() {
            set.remove(&self.note_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_rejected() {
        let gate = InFlightNotes::new();
        let id = Uuid::new_v4();
        let _guard = gate.try_acquire(id).unwrap();
        assert!(matches!(gate.try_acquire(id), Err(Error::Conflict(_))));
    }

    #[test]
    fn test_release_on_drop() {
        let gate = InFlightNotes::new();
        let id = Uuid::new_v4();
        {
            let guard = gate.try_acquire(id).unwrap();
            assert_eq!(guard.note_id(), id);
            assert!(gate.is_in_flight(id));
        }
        assert!(!gate.is_in_flight(id));
        assert!(gate.try_acquire(id).is_ok());
    }

    #[test]
    fn test_different_notes_do_not_contend() {
        let gate = InFlightNotes::new();
        let _a = gate.try_acquire(Uuid::new_v4()).unwrap();
        let _b = gate.try_acquire(Uuid::new_v4()).unwrap();
    }

    #[test]
    fn test_clones_share_state() {
        let gate = InFlightNotes::new();
        let other = gate.clone();
        let id = Uuid::new_v4();
        let _guard = gate.try_acquire(id).unwrap();
        assert!(other.try_acquire(id).is_err());
    }
}
