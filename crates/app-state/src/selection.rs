//! Clip and track selection state.
//!
//! Selection is presentation state: it is published with every snapshot but
//! never recorded in undo history.

use cd_common::{ClipId, TrackId};
use serde::{Deserialize, Serialize};

/// The single selected clip and the track that holds keyboard focus.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    selected_clip: Option<ClipId>,
    selected_track: Option<TrackId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a clip (or clear with `None`). Returns whether anything changed.
    pub fn select_clip(&mut self, clip_id: Option<ClipId>) -> bool {
        if self.selected_clip == clip_id {
            return false;
        }
        self.selected_clip = clip_id;
        true
    }

    pub fn select_track(&mut self, track_id: Option<TrackId>) -> bool {
        if self.selected_track == track_id {
            return false;
        }
        self.selected_track = track_id;
        true
    }

    pub fn selected_clip(&self) -> Option<ClipId> {
        self.selected_clip
    }

    pub fn selected_track(&self) -> Option<TrackId> {
        self.selected_track
    }

    pub fn is_clip_selected(&self, clip_id: ClipId) -> bool {
        self.selected_clip == Some(clip_id)
    }

    /// Drop references to entities that no longer exist.
    pub fn retain(&mut self, clip_exists: impl Fn(ClipId) -> bool, track_exists: impl Fn(TrackId) -> bool) {
        if self.selected_clip.is_some_and(|id| !clip_exists(id)) {
            self.selected_clip = None;
        }
        if self.selected_track.is_some_and(|id| !track_exists(id)) {
            self.selected_track = None;
        }
    }

    pub fn clear(&mut self) {
        self.selected_clip = None;
        self.selected_track = None;
    }

    pub fn is_empty(&self) -> bool {
        self.selected_clip.is_none() && self.selected_track.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_selection_is_empty() {
        let sel = SelectionState::new();
        assert!(sel.is_empty());
        assert!(sel.selected_clip().is_none());
    }

    #[test]
    fn select_replaces_previous() {
        let mut sel = SelectionState::new();
        assert!(sel.select_clip(Some(ClipId(1))));
        assert!(sel.select_clip(Some(ClipId(2))));
        assert!(!sel.is_clip_selected(ClipId(1)));
        assert!(sel.is_clip_selected(ClipId(2)));
        assert!(!sel.select_clip(Some(ClipId(2))), "reselecting is not a change");
    }

    #[test]
    fn retain_drops_stale_ids() {
        let mut sel = SelectionState::new();
        sel.select_clip(Some(ClipId(1)));
        sel.select_track(Some(TrackId(4)));
        sel.retain(|id| id != ClipId(1), |_| true);
        assert!(sel.selected_clip().is_none());
        assert_eq!(sel.selected_track(), Some(TrackId(4)));
    }

    #[test]
    fn clear_all() {
        let mut sel = SelectionState::new();
        sel.select_clip(Some(ClipId(1)));
        sel.select_track(Some(TrackId(2)));
        sel.clear();
        assert!(sel.is_empty());
    }

    #[test]
    fn serialize_deserialize_roundtrip() {
        let mut sel = SelectionState::new();
        sel.select_clip(Some(ClipId(3)));
        let json = serde_json::to_string(&sel).unwrap();
        let restored: SelectionState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, sel);
    }
}
