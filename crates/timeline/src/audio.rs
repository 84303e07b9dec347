//! Per-subtrack audio settings and their lookup chain.
//!
//! Resolution order for one field of one subtrack:
//!
//! 1. the user's override for `(clip, track_index)`, if that field is set
//! 2. the subtrack's own default
//! 3. the clip-level volume/mute

use std::collections::BTreeMap;

use cd_common::ClipId;
use serde::{Deserialize, Serialize};

use crate::clip::{Clip, MAX_SUBTRACK_VOLUME};

/// User override for one audio subtrack. Each field is independent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioOverride {
    pub volume: Option<f64>,
    pub muted: Option<bool>,
}

impl AudioOverride {
    pub fn is_empty(&self) -> bool {
        self.volume.is_none() && self.muted.is_none()
    }
}

/// Resolved settings for one audio subtrack.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioTrackSettings {
    /// Gain fraction in `0.0..=2.0`.
    pub volume: f64,
    pub muted: bool,
}

impl AudioTrackSettings {
    /// Audible level in percent: 0 while muted.
    pub fn effective_percent(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume * 100.0
        }
    }
}

/// Resolve settings for `track_index` of `clip`, layering `override_` on top.
pub fn resolve_audio_settings(
    clip: &Clip,
    track_index: usize,
    override_: Option<&AudioOverride>,
) -> AudioTrackSettings {
    let subtrack = clip.audio_track(track_index);
    let default_volume = subtrack
        .map(|t| t.volume)
        .unwrap_or(clip.volume / 100.0);
    let default_muted = subtrack.map(|t| t.muted).unwrap_or(clip.muted);
    AudioTrackSettings {
        volume: override_.and_then(|o| o.volume).unwrap_or(default_volume),
        muted: override_.and_then(|o| o.muted).unwrap_or(default_muted),
    }
}

/// Clamp a subtrack gain to its valid range. NaN becomes unity.
pub fn clamp_subtrack_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        return 1.0;
    }
    volume.clamp(0.0, MAX_SUBTRACK_VOLUME)
}

/// Override table keyed by clip, then subtrack index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioOverrides {
    entries: BTreeMap<ClipId, BTreeMap<usize, AudioOverride>>,
}

impl AudioOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, clip_id: ClipId, track_index: usize) -> Option<&AudioOverride> {
        self.entries.get(&clip_id)?.get(&track_index)
    }

    pub fn set_volume(&mut self, clip_id: ClipId, track_index: usize, volume: f64) {
        self.entry(clip_id, track_index).volume = Some(volume);
    }

    pub fn set_muted(&mut self, clip_id: ClipId, track_index: usize, muted: bool) {
        self.entry(clip_id, track_index).muted = Some(muted);
    }

    /// Drop the override for one subtrack. Returns whether one existed.
    pub fn clear(&mut self, clip_id: ClipId, track_index: usize) -> bool {
        let Some(per_clip) = self.entries.get_mut(&clip_id) else {
            return false;
        };
        let removed = per_clip.remove(&track_index).is_some();
        if per_clip.is_empty() {
            self.entries.remove(&clip_id);
        }
        removed
    }

    /// Drop every override of a clip (used when the clip is deleted).
    pub fn remove_clip(&mut self, clip_id: ClipId) {
        self.entries.remove(&clip_id);
    }

    /// Copy all overrides of `from` onto `to` (used by split).
    pub fn duplicate(&mut self, from: ClipId, to: ClipId) {
        if let Some(per_clip) = self.entries.get(&from).cloned() {
            self.entries.insert(to, per_clip);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolve(&self, clip: &Clip, track_index: usize) -> AudioTrackSettings {
        resolve_audio_settings(clip, track_index, self.get(clip.id, track_index))
    }

    fn entry(&mut self, clip_id: ClipId, track_index: usize) -> &mut AudioOverride {
        self.entries
            .entry(clip_id)
            .or_default()
            .entry(track_index)
            .or_default()
    }
}
