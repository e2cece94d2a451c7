//! Mirrored collection synchronizer
//!
//! Holds the authoritative local copy of one remote table, seeded by a
//! one-time full fetch and kept current by applying change-feed events in
//! delivery order. After processing any event the local mapping equals the
//! set of rows the remote table would return.
//!
//! Application semantics are deliberately forgiving of feed quirks:
//!
//! - insert of an id that is already present replaces the row (duplicate
//!   delivery stays idempotent);
//! - update of an absent id is a no-op (the event raced the initial fetch
//!   and self-corrects on the next update or full refetch);
//! - delete of an absent id is a no-op.
//!
//! Every applied delta is published to registered observers over a
//! broadcast channel; consumers recompute their derived views from
//! [`Collection::rows`] and never mutate the mirror directly.

use std::collections::HashMap;

use shared::feed::{ChangeEvent, ChangeKind};
use shared::models::{MenuItem, Order};
use tokio::sync::broadcast;

/// Capacity of the delta broadcast channel
const DELTA_CHANNEL_CAPACITY: usize = 256;

/// A row type mirrored from a remote table
pub trait TableRow: Clone + serde::de::DeserializeOwned + Send + Sync + 'static {
    /// Remote table name
    const TABLE: &'static str;

    /// Primary key
    fn id(&self) -> i64;
}

impl TableRow for Order {
    const TABLE: &'static str = shared::feed::tables::ORDERS;

    fn id(&self) -> i64 {
        self.id
    }
}

impl TableRow for MenuItem {
    const TABLE: &'static str = shared::feed::tables::MENU;

    fn id(&self) -> i64 {
        self.id
    }
}

/// One applied change, published to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub kind: ChangeKind,
    pub id: i64,
}

/// Ordered local mirror of one remote table
#[derive(Debug)]
pub struct Collection<T: TableRow> {
    /// Rows in fetch/arrival order
    rows: Vec<T>,
    /// id -> position in `rows`
    index: HashMap<i64, usize>,
    deltas: broadcast::Sender<Delta>,
}

impl<T: TableRow> Collection<T> {
    pub fn new() -> Self {
        let (deltas, _) = broadcast::channel(DELTA_CHANNEL_CAPACITY);
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
            deltas,
        }
    }

    /// Replace the entire mirror with a freshly fetched row set
    pub fn reset(&mut self, rows: Vec<T>) {
        self.index = rows
            .iter()
            .enumerate()
            .map(|(pos, row)| (row.id(), pos))
            .collect();
        self.rows = rows;
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.index.get(&id).map(|&pos| &self.rows[pos])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Register an observer for applied deltas
    pub fn subscribe(&self) -> broadcast::Receiver<Delta> {
        self.deltas.subscribe()
    }

    /// Append a row; an already-present id is replaced in place
    pub fn insert(&mut self, row: T) -> Delta {
        let id = row.id();
        match self.index.get(&id) {
            Some(&pos) => self.rows[pos] = row,
            None => {
                self.index.insert(id, self.rows.len());
                self.rows.push(row);
            }
        }
        self.publish(Delta {
            kind: ChangeKind::Insert,
            id,
        })
    }

    /// Replace the row matching id; absent id is a no-op
    pub fn update(&mut self, row: T) -> Option<Delta> {
        let id = row.id();
        let &pos = self.index.get(&id)?;
        self.rows[pos] = row;
        Some(self.publish(Delta {
            kind: ChangeKind::Update,
            id,
        }))
    }

    /// Remove the row matching id; absent id is a no-op
    pub fn delete(&mut self, id: i64) -> Option<Delta> {
        let pos = self.index.remove(&id)?;
        self.rows.remove(pos);
        for shifted in &self.rows[pos..] {
            if let Some(entry) = self.index.get_mut(&shifted.id()) {
                *entry -= 1;
            }
        }
        Some(self.publish(Delta {
            kind: ChangeKind::Delete,
            id,
        }))
    }

    /// Apply one change-feed event.
    ///
    /// Returns the applied delta, or `None` when the event decoded to
    /// nothing (wrong shape, missing key) and the mirror was left as is.
    pub fn apply(&mut self, event: &ChangeEvent) -> Option<Delta> {
        match event.kind {
            ChangeKind::Insert => event.new_row::<T>().map(|row| self.insert(row)),
            ChangeKind::Update => event.new_row::<T>().and_then(|row| self.update(row)),
            ChangeKind::Delete => event.old_id().and_then(|id| self.delete(id)),
        }
    }

    fn publish(&self, delta: Delta) -> Delta {
        // No registered observers is fine
        let _ = self.deltas.send(delta);
        delta
    }
}

impl<T: TableRow> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}
