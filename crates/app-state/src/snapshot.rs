//! Serializable snapshots.
//!
//! `TimelineSnapshot` is what the `HistoryManager` stores: the minimum needed
//! to restore the editable document. `StoreSnapshot` is the full read-only view
//! published to subscribers after every mutation.

use cd_common::{ClipId, Millis, ViewConfig};
use cd_timeline::{AudioOverrides, Track};
use serde::{Deserialize, Serialize};

use crate::pip::PipState;
use crate::state::{DurationMode, TimelineState};

/// Undoable document state at one point in history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    pub tracks: Vec<Track>,
    pub total_duration: Millis,
    pub duration_mode: DurationMode,
    pub audio_overrides: AudioOverrides,
}

impl TimelineSnapshot {
    pub fn capture(state: &TimelineState) -> Self {
        Self {
            tracks: state.tracks.clone(),
            total_duration: state.total_duration,
            duration_mode: state.duration_mode,
            audio_overrides: state.audio_overrides.clone(),
        }
    }

    /// Overwrite the document with this snapshot.
    pub fn restore(&self, state: &mut TimelineState) {
        state.tracks = self.tracks.clone();
        state.duration_mode = self.duration_mode;
        state.audio_overrides = self.audio_overrides.clone();
        state.total_duration = self.total_duration;

        tracing::debug!(
            tracks = state.tracks.len(),
            clips = state.total_clips(),
            "Snapshot restored"
        );
    }
}

/// Everything a rendering surface needs, published after each mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Strictly increasing per store.
    pub revision: u64,
    pub tracks: Vec<Track>,
    pub total_duration: Millis,
    pub duration_mode: DurationMode,
    pub view: ViewConfig,
    pub selected_clip_id: Option<ClipId>,
    pub can_undo: bool,
    pub can_redo: bool,
    /// A transaction or drag is open; `tracks` shows its working state.
    pub interaction_active: bool,
    pub pip: PipState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cd_common::TrackId;
    use cd_timeline::{Clip, ClipSpec, TrackType};

    fn make_state() -> TimelineState {
        let mut track = Track::new(TrackId(1), 1, TrackType::Video, "Video 1");
        track
            .insert_clip(Clip::from_spec(ClipId(2), ClipSpec::new("a.mp4", 0, 5000)).unwrap())
            .unwrap();
        let mut state = TimelineState {
            tracks: vec![track],
            ..TimelineState::default()
        };
        state.audio_overrides.set_muted(ClipId(2), 0, true);
        state.recalculate_duration();
        state
    }

    #[test]
    fn capture_and_restore_roundtrip() {
        let state = make_state();
        let snap = TimelineSnapshot::capture(&state);

        let mut other = TimelineState::new();
        assert_ne!(TimelineSnapshot::capture(&other), snap);
        snap.restore(&mut other);
        assert_eq!(other, state);
        assert_eq!(TimelineSnapshot::capture(&other), snap);
    }

    #[test]
    fn snapshot_serialization_roundtrip() {
        let snap = TimelineSnapshot::capture(&make_state());
        let json = serde_json::to_string(&snap).unwrap();
        let back: TimelineSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn empty_state_snapshot() {
        let snap = TimelineSnapshot::capture(&TimelineState::new());
        assert!(snap.tracks.is_empty());
        assert_eq!(snap.total_duration, 0);
        assert_eq!(snap.duration_mode, DurationMode::Auto);
    }
}
