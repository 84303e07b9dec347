//! `cd-timeline`: Timeline data model and pure editing helpers.
//!
//! This crate holds the values the editing store operates on, and the pure
//! functions that derive from them:
//!
//! - **Clips**: `Clip`, `ClipSpec`, `ClipPatch`, effective duration and on-track interval
//! - **Tracks**: `Track`, ordered, overlap-checked clip sets
//! - **Audio**: per-subtrack overrides and the override → subtrack → clip lookup chain
//! - **Snapping**: snap target collection and best-match selection
//! - **PiP**: 16:9 overlay geometry for corner presets
//!
//! Nothing here holds state beyond the values themselves; mutation policy and
//! history live in `cd-app-state`.

pub mod audio;
pub mod clip;
pub mod pip;
pub mod snap;
pub mod track;

// Re-export primary API
pub use audio::{resolve_audio_settings, AudioOverride, AudioOverrides, AudioTrackSettings};
pub use clip::{
    AudioSource, AudioSubtrack, Clip, ClipPatch, ClipSpec, Interval, MediaDescriptor, TrimEdge,
};
pub use pip::{resolve_pip, PipGeometry, SizeSpec, DEFAULT_PIP_PADDING, PIP_ASPECT_RATIO};
pub use snap::{best_snap, collect_targets, SnapMatch, SnapTarget, SnapTargetKind};
pub use track::{Track, TrackType};
