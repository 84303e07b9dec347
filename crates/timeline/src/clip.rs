//! Clip data model and derivation helpers.
//!
//! A clip references a span of source media (`trim_in..trim_out`) and places it
//! on a track at `start_time`. Everything on-track is derived from those four
//! stored fields; nothing derived is cached.

use cd_common::{ClipId, EditError, EditResult, Millis};
use serde::{Deserialize, Serialize};

/// Upper bound of clip volume, in percent.
pub const MAX_CLIP_VOLUME: f64 = 200.0;
/// Upper bound of an audio subtrack volume, as a gain fraction.
pub const MAX_SUBTRACK_VOLUME: f64 = 2.0;
pub const DEFAULT_CLIP_VOLUME: f64 = 100.0;

/// Half-open time interval `[start, end)` on a track.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: Millis,
    pub end: Millis,
}

impl Interval {
    pub fn new(start: Millis, end: Millis) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> Millis {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether the two intervals share any instant. Touching is not overlapping.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// `start <= time < end`.
    pub fn covers(&self, time: Millis) -> bool {
        time >= self.start && time < self.end
    }
}

/// Which edge of a clip a trim moves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrimEdge {
    /// Moves `trim_in`; the right edge stays put on the track.
    Start,
    /// Moves `trim_out`; `start_time` stays put.
    End,
}

/// Origin of an audio subtrack inside a multi-audio recording.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSource {
    System,
    Microphone,
    Webcam,
    Other(String),
}

/// One audio stream of a multi-audio clip, with its own default level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioSubtrack {
    pub track_index: usize,
    pub label: String,
    pub source: AudioSource,
    /// Gain fraction in `0.0..=2.0`.
    pub volume: f64,
    pub muted: bool,
}

impl AudioSubtrack {
    pub fn new(track_index: usize, label: impl Into<String>, source: AudioSource) -> Self {
        Self {
            track_index,
            label: label.into(),
            source,
            volume: 1.0,
            muted: false,
        }
    }
}

/// A finished media file handed over by the recorder or an import.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub file_path: String,
    pub duration_ms: Millis,
    #[serde(default)]
    pub audio_tracks: Vec<AudioSubtrack>,
}

/// Input for adding a clip to a track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipSpec {
    pub file_path: String,
    pub start_time: Millis,
    pub duration: Millis,
    pub trim_in: Millis,
    pub trim_out: Millis,
    pub volume: f64,
    pub muted: bool,
    #[serde(default)]
    pub audio_tracks: Vec<AudioSubtrack>,
}

impl ClipSpec {
    /// Untrimmed clip of `duration` ms at `start_time`, full volume.
    pub fn new(file_path: impl Into<String>, start_time: Millis, duration: Millis) -> Self {
        Self {
            file_path: file_path.into(),
            start_time,
            duration,
            trim_in: 0,
            trim_out: duration,
            volume: DEFAULT_CLIP_VOLUME,
            muted: false,
            audio_tracks: Vec::new(),
        }
    }

    pub fn from_media(media: &MediaDescriptor, start_time: Millis) -> Self {
        Self {
            audio_tracks: media.audio_tracks.clone(),
            ..Self::new(media.file_path.clone(), start_time, media.duration_ms)
        }
    }

    pub fn with_trim(mut self, trim_in: Millis, trim_out: Millis) -> Self {
        self.trim_in = trim_in;
        self.trim_out = trim_out;
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    pub fn with_audio_tracks(mut self, audio_tracks: Vec<AudioSubtrack>) -> Self {
        self.audio_tracks = audio_tracks;
        self
    }
}

/// Partial clip update. `None` leaves the field as it is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipPatch {
    pub file_path: Option<String>,
    pub start_time: Option<Millis>,
    pub duration: Option<Millis>,
    pub trim_in: Option<Millis>,
    pub trim_out: Option<Millis>,
    pub volume: Option<f64>,
    pub muted: Option<bool>,
    pub audio_tracks: Option<Vec<AudioSubtrack>>,
}

impl ClipPatch {
    pub fn is_empty(&self) -> bool {
        *self == ClipPatch::default()
    }

    pub fn start_time(start_time: Millis) -> Self {
        Self {
            start_time: Some(start_time),
            ..Self::default()
        }
    }

    pub fn trim(trim_in: Millis, trim_out: Millis) -> Self {
        Self {
            trim_in: Some(trim_in),
            trim_out: Some(trim_out),
            ..Self::default()
        }
    }

    pub fn volume(volume: f64) -> Self {
        Self {
            volume: Some(volume),
            ..Self::default()
        }
    }
}

/// A clip placed on a track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub file_path: String,
    /// Position of the clip's first visible frame on the track.
    pub start_time: Millis,
    /// Full source duration.
    pub duration: Millis,
    /// Source offset of the first visible frame.
    pub trim_in: Millis,
    /// Source offset just past the last visible frame.
    pub trim_out: Millis,
    /// Percent, `0.0..=200.0`.
    pub volume: f64,
    pub muted: bool,
    /// Empty for single-audio clips.
    #[serde(default)]
    pub audio_tracks: Vec<AudioSubtrack>,
}

impl Clip {
    /// Build and validate a clip from an add request.
    pub fn from_spec(id: ClipId, spec: ClipSpec) -> EditResult<Self> {
        let clip = Self {
            id,
            file_path: spec.file_path,
            start_time: spec.start_time,
            duration: spec.duration,
            trim_in: spec.trim_in,
            trim_out: spec.trim_out,
            volume: spec.volume,
            muted: spec.muted,
            audio_tracks: spec.audio_tracks,
        };
        clip.validate()?;
        Ok(clip)
    }

    /// Post-trim length on the track.
    pub fn effective_duration(&self) -> Millis {
        self.trim_out - self.trim_in
    }

    pub fn end_time(&self) -> Millis {
        self.start_time.saturating_add(self.effective_duration())
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start_time, self.end_time())
    }

    /// `start < time < end`: valid split points.
    pub fn contains_strictly(&self, time: Millis) -> bool {
        time > self.start_time && time < self.end_time()
    }

    /// `start <= time < end`: the clip is under `time`.
    pub fn covers(&self, time: Millis) -> bool {
        self.interval().covers(time)
    }

    pub fn overlaps_interval(&self, interval: &Interval) -> bool {
        self.interval().overlaps(interval)
    }

    /// Map a track time to the matching offset into the source media.
    pub fn source_time_at(&self, time: Millis) -> Millis {
        self.trim_in.saturating_add(time.saturating_sub(self.start_time))
    }

    pub fn is_trimmed(&self) -> bool {
        self.trim_in != 0 || self.trim_out != self.duration
    }

    pub fn has_multiple_audio_tracks(&self) -> bool {
        self.audio_tracks.len() > 1
    }

    pub fn audio_track(&self, track_index: usize) -> Option<&AudioSubtrack> {
        self.audio_tracks.iter().find(|t| t.track_index == track_index)
    }

    /// Volume the user hears, in percent: 0 while muted.
    pub fn effective_volume_percent(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Check every per-clip field invariant.
    pub fn validate(&self) -> EditResult<()> {
        if self.start_time < 0 {
            return Err(EditError::bounds(format!(
                "start_time must be >= 0, got {}",
                self.start_time
            )));
        }
        if self.duration <= 0 {
            return Err(EditError::bounds(format!(
                "duration must be > 0, got {}",
                self.duration
            )));
        }
        if self.trim_in < 0 || self.trim_in >= self.trim_out || self.trim_out > self.duration {
            return Err(EditError::bounds(format!(
                "trim must satisfy 0 <= trim_in < trim_out <= duration, got {}..{} of {}",
                self.trim_in, self.trim_out, self.duration
            )));
        }
        if self.start_time.checked_add(self.effective_duration()).is_none() {
            return Err(EditError::bounds(format!(
                "clip end past the representable range: start {} + {}",
                self.start_time,
                self.effective_duration()
            )));
        }
        if !(0.0..=MAX_CLIP_VOLUME).contains(&self.volume) {
            return Err(EditError::bounds(format!(
                "volume must be within 0..=200, got {}",
                self.volume
            )));
        }
        if let Some(track) = self
            .audio_tracks
            .iter()
            .find(|t| !(0.0..=MAX_SUBTRACK_VOLUME).contains(&t.volume))
        {
            return Err(EditError::bounds(format!(
                "audio track {} volume must be within 0..=2, got {}",
                track.track_index, track.volume
            )));
        }
        Ok(())
    }

    /// Merge a partial update into a copy of this clip and validate the result.
    pub fn patched(&self, patch: &ClipPatch) -> EditResult<Clip> {
        let mut next = self.clone();
        if let Some(path) = &patch.file_path {
            next.file_path = path.clone();
        }
        if let Some(start) = patch.start_time {
            next.start_time = start;
        }
        if let Some(duration) = patch.duration {
            next.duration = duration;
        }
        if let Some(trim_in) = patch.trim_in {
            next.trim_in = trim_in;
        }
        if let Some(trim_out) = patch.trim_out {
            next.trim_out = trim_out;
        }
        if let Some(volume) = patch.volume {
            next.volume = volume;
        }
        if let Some(muted) = patch.muted {
            next.muted = muted;
        }
        if let Some(tracks) = &patch.audio_tracks {
            next.audio_tracks = tracks.clone();
        }
        next.validate()?;
        Ok(next)
    }

    /// Copy with the full source span restored; `start_time` is unchanged.
    pub fn with_trim_reset(&self) -> Clip {
        Clip {
            trim_in: 0,
            trim_out: self.duration,
            ..self.clone()
        }
    }

    /// Copy placed at `start_time`.
    pub fn moved_to(&self, start_time: Millis) -> EditResult<Clip> {
        let next = Clip {
            start_time,
            ..self.clone()
        };
        next.validate()?;
        Ok(next)
    }

    /// Copy with one trim edge set to the source offset `value`.
    ///
    /// A start trim shifts `start_time` by the same delta as `trim_in`.
    pub fn trimmed(&self, edge: TrimEdge, value: Millis) -> EditResult<Clip> {
        let mut next = self.clone();
        match edge {
            TrimEdge::Start => {
                next.start_time = self
                    .start_time
                    .saturating_add(value.saturating_sub(self.trim_in));
                next.trim_in = value;
            }
            TrimEdge::End => next.trim_out = value,
        }
        next.validate()?;
        Ok(next)
    }

    /// Source offset that puts `edge` at track time `time`.
    pub fn trim_value_for_edge_at(&self, time: Millis) -> Millis {
        self.source_time_at(time)
    }

    /// Split into two clips at track time `at`.
    ///
    /// The left half keeps this clip's id. The halves' intervals are
    /// contiguous and together equal the original interval.
    pub fn split_at(&self, at: Millis, right_id: ClipId) -> EditResult<(Clip, Clip)> {
        if !self.contains_strictly(at) {
            return Err(EditError::NotOverClip { time: at });
        }
        let cut = self.source_time_at(at);
        let left = Clip {
            trim_out: cut,
            ..self.clone()
        };
        let right = Clip {
            id: right_id,
            start_time: at,
            trim_in: cut,
            ..self.clone()
        };
        Ok((left, right))
    }
}
