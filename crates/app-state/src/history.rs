//! Snapshot-based undo/redo history.
//!
//! - Linear list of `TimelineSnapshot` entries plus a cursor at the current state
//! - Pushing while the cursor is behind the end prunes the undone branch
//! - Batch grouping collapses a whole interaction into one entry
//! - Configurable maximum depth, oldest entries evicted first
//!
//! # Usage
//!
//! ```ignore
//! let mut history = HistoryManager::new(100, TimelineSnapshot::capture(&doc));
//!
//! // After each user action, record the resulting state
//! history.push("Split clip", TimelineSnapshot::capture(&doc));
//!
//! // Undo
//! if let Some(prev) = history.undo() {
//!     prev.restore(&mut doc);
//! }
//!
//! // Batch grouping (for drags, volume scrubbing, etc.)
//! history.start_batch("Move clip");
//! // ... many working-state updates, push() calls are suppressed ...
//! history.end_batch(TimelineSnapshot::capture(&doc));
//! ```

use std::time::Instant;

use crate::snapshot::TimelineSnapshot;

/// A single entry in the history.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// Action that produced this state (e.g., "Split clip", "Remove track").
    pub label: String,
    /// State after the action.
    pub snapshot: TimelineSnapshot,
    pub timestamp: Instant,
}

/// Label of the seed entry.
pub const INITIAL_LABEL: &str = "Open timeline";

/// Cursor-based undo/redo over document snapshots.
///
/// `entries[cursor]` always equals the current document state. Undo moves the
/// cursor back, redo forward.
pub struct HistoryManager {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    max_entries: usize,
    /// When Some, a batch is open and push() calls are suppressed.
    batch_label: Option<String>,
}

impl HistoryManager {
    /// Create a history seeded with the opening state. `max_entries` is at least 1.
    pub fn new(max_entries: usize, initial: TimelineSnapshot) -> Self {
        Self {
            entries: vec![HistoryEntry {
                label: INITIAL_LABEL.to_string(),
                snapshot: initial,
                timestamp: Instant::now(),
            }],
            cursor: 0,
            max_entries: max_entries.max(1),
            batch_label: None,
        }
    }

    /// Record the state after an action.
    ///
    /// - Discards entries past the cursor (new branch).
    /// - Suppressed while a batch is open.
    pub fn push(&mut self, label: &str, snapshot: TimelineSnapshot) {
        if self.batch_label.is_some() {
            tracing::debug!(label, "Push suppressed: batch in progress");
            return;
        }
        self.append(label.to_string(), snapshot);
    }

    /// Step back. Returns the snapshot to restore, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&TimelineSnapshot> {
        if self.batch_label.take().is_some() {
            tracing::warn!("Ending stuck batch before undo");
        }
        if self.cursor == 0 {
            return None;
        }
        tracing::debug!(
            label = %self.entries[self.cursor].label,
            undo_remaining = self.cursor - 1,
            "Undo"
        );
        self.cursor -= 1;
        Some(&self.entries[self.cursor].snapshot)
    }

    /// Step forward. Returns the snapshot to restore, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&TimelineSnapshot> {
        if self.batch_label.take().is_some() {
            tracing::warn!("Ending stuck batch before redo");
        }
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        tracing::debug!(
            label = %self.entries[self.cursor].label,
            redo_remaining = self.redo_count(),
            "Redo"
        );
        Some(&self.entries[self.cursor].snapshot)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Open a batch. While open, `push()` is suppressed.
    pub fn start_batch(&mut self, label: &str) -> bool {
        if self.batch_label.is_some() {
            tracing::warn!(label, "start_batch called while already batching, ignoring");
            return false;
        }
        self.batch_label = Some(label.to_string());
        tracing::debug!(label, "Batch started");
        true
    }

    /// Close the batch, recording `snapshot` as one entry if it differs from
    /// the current entry. Returns whether an entry was pushed.
    pub fn end_batch(&mut self, snapshot: TimelineSnapshot) -> bool {
        let Some(label) = self.batch_label.take() else {
            return false;
        };
        if self.current() == &snapshot {
            tracing::debug!(label = %label, "Batch ended without changes");
            return false;
        }
        self.append(label, snapshot);
        true
    }

    /// Close the batch without recording anything.
    pub fn cancel_batch(&mut self) -> bool {
        let cancelled = self.batch_label.take();
        if let Some(label) = &cancelled {
            tracing::debug!(label = %label, "Batch cancelled");
        }
        cancelled.is_some()
    }

    pub fn is_batching(&self) -> bool {
        self.batch_label.is_some()
    }

    /// Snapshot at the cursor (the committed state).
    pub fn current(&self) -> &TimelineSnapshot {
        &self.entries[self.cursor].snapshot
    }

    /// Label of the action that would be undone next.
    pub fn undo_label(&self) -> Option<&str> {
        self.can_undo()
            .then(|| self.entries[self.cursor].label.as_str())
    }

    /// Label of the action that would be redone next.
    pub fn redo_label(&self) -> Option<&str> {
        self.entries.get(self.cursor + 1).map(|e| e.label.as_str())
    }

    pub fn undo_count(&self) -> usize {
        self.cursor
    }

    pub fn redo_count(&self) -> usize {
        self.entries.len() - self.cursor - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all history, keeping only the current state as the new seed.
    pub fn clear(&mut self) {
        let current = self.entries.swap_remove(self.cursor);
        self.entries = vec![current];
        self.cursor = 0;
        self.batch_label = None;
        tracing::debug!("History cleared");
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Set the maximum depth (at least 1). Evicts the oldest entries if needed.
    pub fn set_max_entries(&mut self, max: usize) {
        self.max_entries = max.max(1);
        self.evict();
    }

    fn append(&mut self, label: String, snapshot: TimelineSnapshot) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry {
            label,
            snapshot,
            timestamp: Instant::now(),
        });
        self.cursor = self.entries.len() - 1;
        self.evict();
        tracing::debug!(undo_depth = self.cursor, "History entry pushed");
    }

    fn evict(&mut self) {
        if self.entries.len() <= self.max_entries {
            return;
        }
        // Keep the cursor's entry even when it is the oldest.
        let excess = (self.entries.len() - self.max_entries).min(self.cursor);
        self.entries.drain(..excess);
        self.cursor -= excess;
    }
}
