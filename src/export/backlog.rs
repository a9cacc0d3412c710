//! Pending identifiers of one pass

use super::record::EntityId;

/// Pending identifiers for one collection kind.
///
/// Holds the full listing as an immutable snapshot plus a cursor. Batches
/// are taken from the front by advancing the cursor, so the remaining
/// length only ever shrinks and the pass is complete exactly when it
/// reaches zero.
#[derive(Debug, Clone)]
pub struct Backlog {
    ids: Vec<EntityId>,
    cursor: usize,
}

impl Backlog {
    pub fn new(ids: Vec<EntityId>) -> Self {
        Self { ids, cursor: 0 }
    }

    /// Number of identifiers in the original listing
    pub fn total(&self) -> usize {
        self.ids.len()
    }

    /// Number of identifiers still pending
    pub fn len(&self) -> usize {
        self.ids.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove up to `max` identifiers from the front
    ///
    /// Returns fewer than `max` only for the final, partial batch, and an
    /// empty slice once the backlog is drained.
    pub fn take_batch(&mut self, max: usize) -> &[EntityId] {
        let start = self.cursor;
        let end = start + max.min(self.len());
        self.cursor = end;
        &self.ids[start..end]
    }

    /// Fraction of the listing already taken
    ///
    /// `None` for an empty listing, where progress is undefined.
    pub fn progress(&self) -> Option<f64> {
        if self.ids.is_empty() {
            None
        } else {
            Some(self.cursor as f64 / self.ids.len() as f64)
        }
    }
}

impl From<Vec<EntityId>> for Backlog {
    fn from(ids: Vec<EntityId>) -> Self {
        Self::new(ids)
    }
}
