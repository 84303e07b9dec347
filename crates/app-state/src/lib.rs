//! `cd-app-state` -- Editing state management for the clipdeck timeline engine.
//!
//! This crate provides:
//!
//! - **`TimelineStore`**: Session-scoped owner of tracks, clips, audio overrides, selection, view, and PiP state.
//! - **`HistoryManager`**: Snapshot-based, cursor-driven undo/redo with batch grouping.
//! - **`TimelineSnapshot` / `StoreSnapshot`**: Undoable document snapshot and the published read-only view.
//! - **Transactions and drags**: Working-state interactions that commit as one history entry.
//! - **`PlayerStore`**: Playhead position, transport mode, focus context, and rate.
//! - **`PipState`**: Picture-in-picture placement kept consistent with its preset.
//!
//! # Architecture
//!
//! ```text
//! TimelineStore (session state)
//! ├── doc: TimelineState             (undoable: tracks, duration mode, audio overrides)
//! ├── history: HistoryManager        (entries + cursor, batch = open transaction)
//! ├── selection: SelectionState      (selected clip / track)
//! ├── view: ViewConfig               (zoom, scroll; never undone)
//! ├── pip: PipState                  (overlay preset and geometry)
//! ├── transaction / drag             (open interaction, rollback point)
//! └── publisher: SnapshotPublisher   (crossbeam fan-out of StoreSnapshot)
//!
//! PlayerStore (owned by the host, read by the store)
//! ```

pub mod history;
pub mod interaction;
pub mod observer;
pub mod pip;
pub mod playback;
pub mod selection;
pub mod snapshot;
pub mod state;
pub mod store;

// Re-export primary types at crate root for convenience.
pub use history::{HistoryEntry, HistoryManager};
pub use interaction::{DragKind, DragSession};
pub use observer::SnapshotPublisher;
pub use pip::PipState;
pub use playback::{FocusContext, PlaybackMode, PlayerStore};
pub use selection::SelectionState;
pub use snapshot::{StoreSnapshot, TimelineSnapshot};
pub use state::{DurationMode, TimelineState};
pub use store::TimelineStore;
