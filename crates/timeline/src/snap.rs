//! Snap target collection and best-match selection.

use cd_common::{pixels_to_ms, ClipId, Millis};
use serde::{Deserialize, Serialize};

use crate::track::Track;

/// Where a snap target comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapTargetKind {
    ClipStart,
    ClipEnd,
    Playhead,
}

/// A time a dragged edge may lock onto.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapTarget {
    pub time: Millis,
    pub kind: SnapTargetKind,
    /// Set for clip-edge targets.
    pub clip_id: Option<ClipId>,
}

impl SnapTarget {
    pub fn clip_start(time: Millis, clip_id: ClipId) -> Self {
        Self {
            time,
            kind: SnapTargetKind::ClipStart,
            clip_id: Some(clip_id),
        }
    }

    pub fn clip_end(time: Millis, clip_id: ClipId) -> Self {
        Self {
            time,
            kind: SnapTargetKind::ClipEnd,
            clip_id: Some(clip_id),
        }
    }

    pub fn playhead(time: Millis) -> Self {
        Self {
            time,
            kind: SnapTargetKind::Playhead,
            clip_id: None,
        }
    }
}

/// Result of a snap query.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SnapMatch {
    /// Shift to apply to the source edge(s).
    pub delta: Millis,
    pub target: SnapTarget,
}

/// Threshold in ms for a pixel threshold at the given zoom rate.
pub fn threshold_ms(threshold_px: f64, pixels_per_second: f64) -> f64 {
    pixels_to_ms(threshold_px, pixels_per_second)
}

/// Edges of every clip on every track except `exclude`, plus the playhead.
pub fn collect_targets<'a>(
    tracks: impl IntoIterator<Item = &'a Track>,
    exclude: Option<ClipId>,
    playhead: Option<Millis>,
) -> Vec<SnapTarget> {
    let mut targets: Vec<SnapTarget> = tracks
        .into_iter()
        .flat_map(|t| t.clips().iter())
        .filter(|c| Some(c.id) != exclude)
        .flat_map(|c| {
            [
                SnapTarget::clip_start(c.start_time, c.id),
                SnapTarget::clip_end(c.end_time(), c.id),
            ]
        })
        .collect();
    if let Some(time) = playhead {
        targets.push(SnapTarget::playhead(time));
    }
    targets
}

/// Find the closest target to any of `sources` within `threshold_ms`.
///
/// Ties go to the smaller distance, then to the earlier target time.
pub fn best_snap(sources: &[Millis], targets: &[SnapTarget], threshold_ms: f64) -> Option<SnapMatch> {
    if sources.is_empty() || targets.is_empty() || threshold_ms.is_nan() || threshold_ms <= 0.0 {
        return None;
    }

    let mut best: Option<(Millis, SnapMatch)> = None;
    for &source in sources {
        for &target in targets {
            let delta = target.time.saturating_sub(source);
            let distance = delta.saturating_abs();
            if distance as f64 > threshold_ms {
                continue;
            }
            let take = match &best {
                None => true,
                Some((best_distance, m)) => {
                    distance < *best_distance
                        || (distance == *best_distance && target.time < m.target.time)
                }
            };
            if take {
                best = Some((distance, SnapMatch { delta, target }));
            }
        }
    }
    best.map(|(_, m)| m)
}

/// Snap a single time, returning it unchanged when nothing is in range.
pub fn snap_time(time: Millis, targets: &[SnapTarget], threshold_ms: f64) -> Millis {
    best_snap(&[time], targets, threshold_ms)
        .map(|m| time.saturating_add(m.delta))
        .unwrap_or(time)
}

/// Snap a whole clip of `length` starting at `start`, testing both edges.
/// Returns the new start.
pub fn snap_span(start: Millis, length: Millis, targets: &[SnapTarget], threshold_ms: f64) -> Millis {
    best_snap(&[start, start.saturating_add(length)], targets, threshold_ms)
        .map(|m| start.saturating_add(m.delta))
        .unwrap_or(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{Clip, ClipSpec};
    use cd_common::TrackId;
    use crate::track::TrackType;

    fn targets() -> Vec<SnapTarget> {
        vec![
            SnapTarget::clip_start(1000, ClipId(1)),
            SnapTarget::clip_end(3000, ClipId(1)),
            SnapTarget::playhead(5000),
        ]
    }

    #[test]
    fn snaps_to_nearest_in_range() {
        assert_eq!(snap_time(1040, &targets(), 100.0), 1000);
        assert_eq!(snap_time(4950, &targets(), 100.0), 5000);
        assert_eq!(snap_time(2000, &targets(), 100.0), 2000);
    }

    #[test]
    fn spans_near_i64_limits_do_not_wrap() {
        assert_eq!(snap_span(i64::MAX - 10, 1000, &targets(), 100.0), i64::MAX - 10);
        assert_eq!(snap_time(i64::MIN, &targets(), 100.0), i64::MIN);
        assert!(best_snap(&[i64::MAX], &[SnapTarget::playhead(i64::MIN)], 100.0).is_none());
    }

    #[test]
    fn tie_prefers_earlier_target() {
        let t = vec![
            SnapTarget::playhead(1100),
            SnapTarget::clip_start(900, ClipId(2)),
        ];
        let m = best_snap(&[1000], &t, 200.0).unwrap();
        assert_eq!(m.target.time, 900);
        assert_eq!(m.delta, -100);
    }

    #[test]
    fn smaller_distance_beats_order() {
        let t = vec![
            SnapTarget::clip_start(900, ClipId(2)),
            SnapTarget::playhead(1050),
        ];
        let m = best_snap(&[1000], &t, 200.0).unwrap();
        assert_eq!(m.target.kind, SnapTargetKind::Playhead);
    }

    #[test]
    fn span_snaps_on_either_edge() {
        // End edge at 2960 is 40ms from 3000; start edge at 1960 is far from everything.
        assert_eq!(snap_span(1960, 1000, &targets(), 50.0), 2000);
        // Start edge near 1000.
        assert_eq!(snap_span(1020, 500, &targets(), 50.0), 1000);
    }

    #[test]
    fn zero_threshold_disables() {
        assert!(best_snap(&[1000], &targets(), 0.0).is_none());
        assert!(best_snap(&[1000], &[], 10.0).is_none());
    }

    #[test]
    fn threshold_follows_zoom() {
        assert!((threshold_ms(10.0, 100.0) - 100.0).abs() < 1e-9);
        assert!((threshold_ms(10.0, 200.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn collect_excludes_dragged_clip() {
        let mut track = Track::new(TrackId(1), 1, TrackType::Video, "Video 1");
        track
            .insert_clip(Clip::from_spec(ClipId(1), ClipSpec::new("a", 0, 1000)).unwrap())
            .unwrap();
        track
            .insert_clip(Clip::from_spec(ClipId(2), ClipSpec::new("b", 2000, 1000)).unwrap())
            .unwrap();
        let t = collect_targets([&track], Some(ClipId(1)), Some(500));
        assert_eq!(t.len(), 3);
        assert!(t.iter().all(|t| t.clip_id != Some(ClipId(1))));
        assert!(t.contains(&SnapTarget::playhead(500)));
    }
}
