//! Editable timeline document.
//!
//! `TimelineState` is everything undo/redo restores: tracks with their clips,
//! the duration policy, and the audio subtrack overrides. Presentation state
//! (selection, view, PiP) lives beside it in the store.

use cd_common::{ClipId, Millis, TrackId};
use cd_timeline::{AudioOverrides, Clip, Track, TrackType};
use serde::{Deserialize, Serialize};

/// How the total timeline duration is determined.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationMode {
    /// Follows the latest clip end.
    #[default]
    Auto,
    /// User-pinned minimum; clips past it still extend the timeline.
    Fixed(Millis),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineState {
    /// Tracks in `track_number` order.
    pub tracks: Vec<Track>,
    pub duration_mode: DurationMode,
    pub audio_overrides: AudioOverrides,
    /// Derived from clips and `duration_mode` by `recalculate_duration`.
    pub total_duration: Millis,
}

impl TimelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_track(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    pub fn find_track_mut(&mut self, track_id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == track_id)
    }

    /// Find a clip across all tracks.
    pub fn find_clip(&self, clip_id: ClipId) -> Option<(&Track, &Clip)> {
        self.tracks
            .iter()
            .find_map(|t| t.clip(clip_id).map(|c| (t, c)))
    }

    /// Track holding the clip, mutable.
    pub fn track_of_clip_mut(&mut self, clip_id: ClipId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.contains_clip(clip_id))
    }

    /// Every clip under `time`, in track order.
    pub fn clips_at(&self, time: Millis) -> Vec<(&Track, &Clip)> {
        self.tracks
            .iter()
            .filter_map(|t| t.clip_at(time).map(|c| (t, c)))
            .collect()
    }

    /// Latest clip end across all tracks.
    pub fn content_end(&self) -> Millis {
        self.tracks.iter().map(Track::content_end).max().unwrap_or(0)
    }

    pub fn recalculate_duration(&mut self) {
        let content = self.content_end();
        self.total_duration = match self.duration_mode {
            DurationMode::Auto => content,
            DurationMode::Fixed(fixed) => fixed.max(content),
        };
    }

    /// Next unused track number.
    pub fn next_track_number(&self) -> u32 {
        self.tracks
            .iter()
            .map(|t| t.track_number)
            .max()
            .map_or(1, |n| n + 1)
    }

    pub fn count_of_type(&self, track_type: TrackType) -> usize {
        self.tracks
            .iter()
            .filter(|t| t.track_type == track_type)
            .count()
    }

    pub fn total_clips(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }

    /// Whether every track is sorted and overlap-free, and track numbers are unique.
    pub fn is_consistent(&self) -> bool {
        let mut numbers: Vec<u32> = self.tracks.iter().map(|t| t.track_number).collect();
        numbers.sort_unstable();
        numbers.dedup();
        numbers.len() == self.tracks.len() && self.tracks.iter().all(Track::is_consistent)
    }
}
