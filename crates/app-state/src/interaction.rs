//! Open interactions: transactions and the drag sessions built on them.
//!
//! While a transaction is open the store mutates and publishes its working
//! state but records nothing in history. Committing records one entry; rolling
//! back restores the state captured when it opened.

use cd_common::{ClipId, Millis};
use cd_timeline::{Clip, SnapTarget};
use serde::{Deserialize, Serialize};

use crate::selection::SelectionState;
use crate::snapshot::TimelineSnapshot;

/// What a pointer drag on a clip changes.
///
/// Every drag value is a track time: the new clip start for `Move`, the new
/// position of the dragged edge for the trims.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragKind {
    Move,
    TrimStart,
    TrimEnd,
}

impl DragKind {
    pub fn history_label(self) -> &'static str {
        match self {
            DragKind::Move => "Move clip",
            DragKind::TrimStart | DragKind::TrimEnd => "Trim clip",
        }
    }
}

/// State captured when a transaction opens.
#[derive(Clone, Debug)]
pub struct Transaction {
    pub label: String,
    pub before: TimelineSnapshot,
    pub selection_before: SelectionState,
}

/// An in-progress drag on one clip.
#[derive(Clone, Debug)]
pub struct DragSession {
    pub clip_id: ClipId,
    pub kind: DragKind,
    /// The clip as it was when the drag began.
    pub origin: Clip,
    /// Snap targets frozen at drag start (other clips' edges and the playhead).
    pub targets: Vec<SnapTarget>,
    /// Last value applied to the working state.
    pub last_applied: Millis,
}

impl DragSession {
    pub fn new(origin: Clip, kind: DragKind, targets: Vec<SnapTarget>) -> Self {
        let last_applied = match kind {
            DragKind::Move | DragKind::TrimStart => origin.start_time,
            DragKind::TrimEnd => origin.end_time(),
        };
        Self {
            clip_id: origin.id,
            kind,
            origin,
            targets,
            last_applied,
        }
    }
}
