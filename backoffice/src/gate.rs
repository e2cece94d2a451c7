//! Per-row mutation gate
//!
//! At most one in-flight mutation per row id. A second attempt while the
//! first is still running is rejected immediately instead of being queued,
//! so a double-click on the same order can never produce two network
//! writes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Tracks which row ids currently have a mutation in flight.
///
/// Each claim carries a token so that a stale guard, outlived by a
/// [`MutationGate::force_release`] and a re-acquire, cannot release the
/// newer claim when it finally drops.
#[derive(Debug, Clone, Default)]
pub struct MutationGate {
    in_flight: Arc<DashMap<i64, u64>>,
    next_token: Arc<AtomicU64>,
}

impl MutationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate for a row id.
    ///
    /// Returns `None` when a mutation for this id is already running. The
    /// returned guard releases the id when dropped, on both the success
    /// and the error path of the caller.
    pub fn try_acquire(&self, id: i64) -> Option<GateGuard> {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        match self.in_flight.entry(id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(token);
                Some(GateGuard {
                    in_flight: Arc::clone(&self.in_flight),
                    id,
                    token,
                })
            }
        }
    }

    pub fn is_busy(&self, id: i64) -> bool {
        self.in_flight.contains_key(&id)
    }

    /// Drop a stuck claim outright.
    ///
    /// Used after a timed-out mutation whose guard is kept alive by an
    /// abandoned future; the row becomes actionable again right away.
    pub fn force_release(&self, id: i64) {
        self.in_flight.remove(&id);
    }
}

/// RAII claim on one row id
#[derive(Debug)]
pub struct GateGuard {
    in_flight: Arc<DashMap<i64, u64>>,
    id: i64,
    token: u64,
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.in_flight
            .remove_if(&self.id, |_, &held| held == self.token);
    }
}
