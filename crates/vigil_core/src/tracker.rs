//! # Violation Tracker
//!
//! Thread-safe accumulation of per-client detection evidence.
//!
//! ## Design
//!
//! - Single lock-guarded map, exclusively owned by this type
//! - Critical sections are a map lookup or a full copy, never I/O
//! - Writers (signal path) and readers (sweep/reset timers) converge here;
//!   a snapshot taken mid-record sees either the old or the new count,
//!   never a torn one

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::client::ClientId;

/// Per-client violation counts.
///
/// A client appears in the map only while its count is at least one. Entries
/// are created by [`record`](Self::record), removed individually by the
/// sweep, and removed en masse by the reset.
#[derive(Debug, Default)]
pub struct ViolationTracker {
    /// The violation map. All access goes through this lock.
    entries: Mutex<HashMap<ClientId, u32>>,
}

impl ViolationTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Records one detection against `client` and returns the new count.
    ///
    /// Creates the entry at count 1 if absent. Safe to call concurrently
    /// from any number of signal threads; increments are never lost. The
    /// count saturates rather than wraps, though reaching `u32::MAX`
    /// detections within one reset interval is not a realistic session.
    pub fn record(&self, client: ClientId) -> u32 {
        let mut entries = self.entries.lock();
        let count = entries.entry(client).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Returns the current count for `client`, if tracked.
    #[must_use]
    pub fn count(&self, client: ClientId) -> Option<u32> {
        self.entries.lock().get(&client).copied()
    }

    /// Returns a consistent copy of all `(client, count)` pairs.
    ///
    /// Records arriving while the copy is taken land in the next snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(ClientId, u32)> {
        self.entries
            .lock()
            .iter()
            .map(|(client, count)| (*client, *count))
            .collect()
    }

    /// Deletes the entry for `client`. Returns true if one existed.
    pub fn remove(&self, client: ClientId) -> bool {
        self.entries.lock().remove(&client).is_some()
    }

    /// Removes all entries and returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock();
        let cleared = entries.len();
        entries.clear();
        cleared
    }

    /// Returns the number of tracked clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if no client is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
