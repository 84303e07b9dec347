//! Track data structure: an ordered, non-overlapping set of clips.

use std::fmt;

use cd_common::{ClipId, EditError, EditResult, Millis, TrackId};
use serde::{Deserialize, Serialize};

use crate::clip::{Clip, Interval};

/// Media kind a track accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    Video,
    Audio,
}

impl TrackType {
    /// Default label for the `n`th track of this type (1-based).
    pub fn default_label(self, n: usize) -> String {
        match self {
            TrackType::Video => format!("Video {n}"),
            TrackType::Audio => format!("Audio {n}"),
        }
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackType::Video => write!(f, "video"),
            TrackType::Audio => write!(f, "audio"),
        }
    }
}

/// A track holds clips sorted by `start_time`. No two clips overlap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    /// Stable ordering key, unique per store.
    pub track_number: u32,
    pub track_type: TrackType,
    pub label: String,
    clips: Vec<Clip>,
}

impl Track {
    pub fn new(
        id: TrackId,
        track_number: u32,
        track_type: TrackType,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id,
            track_number,
            track_type,
            label: label.into(),
            clips: Vec::new(),
        }
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    pub fn contains_clip(&self, id: ClipId) -> bool {
        self.clip(id).is_some()
    }

    /// First clip whose interval intersects `interval`, skipping `ignore`.
    pub fn find_overlap(&self, interval: &Interval, ignore: Option<ClipId>) -> Option<&Clip> {
        self.clips
            .iter()
            .filter(|c| Some(c.id) != ignore)
            .find(|c| c.overlaps_interval(interval))
    }

    /// Clip under `time`, if any.
    pub fn clip_at(&self, time: Millis) -> Option<&Clip> {
        self.clips.iter().find(|c| c.covers(time))
    }

    /// End of the last clip, 0 when empty.
    pub fn content_end(&self) -> Millis {
        self.clips.iter().map(Clip::end_time).max().unwrap_or(0)
    }

    /// Insert a clip, keeping order. Rejects an overlapping interval.
    pub fn insert_clip(&mut self, clip: Clip) -> EditResult<()> {
        self.check_fits(&clip, None)?;
        let pos = self
            .clips
            .partition_point(|c| c.start_time <= clip.start_time);
        self.clips.insert(pos, clip);
        Ok(())
    }

    /// Replace the clip with the same id. Rejects an overlap with any sibling.
    pub fn replace_clip(&mut self, clip: Clip) -> EditResult<()> {
        let Some(pos) = self.clips.iter().position(|c| c.id == clip.id) else {
            return Err(EditError::clip_not_found(clip.id));
        };
        self.check_fits(&clip, Some(clip.id))?;
        self.clips.remove(pos);
        let pos = self
            .clips
            .partition_point(|c| c.start_time <= clip.start_time);
        self.clips.insert(pos, clip);
        Ok(())
    }

    pub fn remove_clip(&mut self, id: ClipId) -> Option<Clip> {
        let pos = self.clips.iter().position(|c| c.id == id)?;
        Some(self.clips.remove(pos))
    }

    /// Check that `clip` could sit on this track without overlapping a sibling.
    pub fn check_fits(&self, clip: &Clip, ignore: Option<ClipId>) -> EditResult<()> {
        match self.find_overlap(&clip.interval(), ignore) {
            Some(existing) => Err(EditError::Overlap {
                clip_id: existing.id,
                track_id: self.id,
            }),
            None => Ok(()),
        }
    }

    /// Whether clips are sorted and pairwise disjoint.
    pub fn is_consistent(&self) -> bool {
        self.clips
            .windows(2)
            .all(|w| w[0].start_time <= w[1].start_time && w[0].end_time() <= w[1].start_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClipSpec;

    fn make_clip(id: u64, start: Millis, duration: Millis) -> Clip {
        Clip::from_spec(ClipId(id), ClipSpec::new("a.mp4", start, duration)).unwrap()
    }

    fn make_track() -> Track {
        Track::new(TrackId(1), 1, TrackType::Video, "Video 1")
    }

    #[test]
    fn insert_keeps_clips_sorted() {
        let mut track = make_track();
        track.insert_clip(make_clip(1, 5000, 1000)).unwrap();
        track.insert_clip(make_clip(2, 0, 1000)).unwrap();
        track.insert_clip(make_clip(3, 2000, 1000)).unwrap();
        let starts: Vec<_> = track.clips().iter().map(|c| c.start_time).collect();
        assert_eq!(starts, vec![0, 2000, 5000]);
        assert!(track.is_consistent());
    }

    #[test]
    fn overlap_rejected_and_track_unchanged() {
        let mut track = make_track();
        track.insert_clip(make_clip(1, 0, 1000)).unwrap();
        let before = track.clone();
        let err = track.insert_clip(make_clip(2, 500, 1000)).unwrap_err();
        assert_eq!(
            err,
            EditError::Overlap {
                clip_id: ClipId(1),
                track_id: TrackId(1)
            }
        );
        assert_eq!(track, before);
    }

    #[test]
    fn adjacent_clips_allowed() {
        let mut track = make_track();
        track.insert_clip(make_clip(1, 0, 1000)).unwrap();
        track.insert_clip(make_clip(2, 1000, 1000)).unwrap();
        assert_eq!(track.len(), 2);
        assert_eq!(track.content_end(), 2000);
    }

    #[test]
    fn clip_at_lookup() {
        let mut track = make_track();
        track.insert_clip(make_clip(1, 0, 1000)).unwrap();
        track.insert_clip(make_clip(2, 1000, 1000)).unwrap();
        assert_eq!(track.clip_at(999).map(|c| c.id), Some(ClipId(1)));
        assert_eq!(track.clip_at(1000).map(|c| c.id), Some(ClipId(2)));
        assert!(track.clip_at(2000).is_none());
    }

    #[test]
    fn replace_ignores_self_but_not_siblings() {
        let mut track = make_track();
        track.insert_clip(make_clip(1, 0, 1000)).unwrap();
        track.insert_clip(make_clip(2, 3000, 1000)).unwrap();
        track.replace_clip(make_clip(1, 500, 1000)).unwrap();
        assert_eq!(track.clip(ClipId(1)).map(|c| c.start_time), Some(500));
        assert!(track.replace_clip(make_clip(1, 2500, 1000)).is_err());
        assert!(matches!(
            track.replace_clip(make_clip(7, 9000, 10)),
            Err(EditError::NotFound { .. })
        ));
    }

    #[test]
    fn replace_resorts() {
        let mut track = make_track();
        track.insert_clip(make_clip(1, 0, 1000)).unwrap();
        track.insert_clip(make_clip(2, 3000, 1000)).unwrap();
        track.replace_clip(make_clip(1, 5000, 1000)).unwrap();
        let ids: Vec<_> = track.clips().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![ClipId(2), ClipId(1)]);
    }

    #[test]
    fn remove_clip() {
        let mut track = make_track();
        track.insert_clip(make_clip(1, 0, 1000)).unwrap();
        assert!(track.remove_clip(ClipId(1)).is_some());
        assert!(track.remove_clip(ClipId(1)).is_none());
        assert!(track.is_empty());
    }

    #[test]
    fn default_labels() {
        assert_eq!(TrackType::Video.default_label(2), "Video 2");
        assert_eq!(TrackType::Audio.default_label(1), "Audio 1");
    }
}
