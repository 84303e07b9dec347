//! Core types with newtype pattern for type safety.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Time in whole milliseconds.
///
/// Used for every on-track position and every offset into source media, so
/// that trim and split arithmetic stays exact.
pub type Millis = i64;

/// Unique clip identifier within one editing session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u64);

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip-{}", self.0)
    }
}

/// Unique track identifier within one editing session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track-{}", self.0)
    }
}

/// Monotonic id allocator. Ids handed out are never reused.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocator whose first id is `last + 1`, for documents loaded from disk.
    /// `None` when `last` leaves no id to hand out.
    pub fn resume_after(last: u64) -> Option<Self> {
        last.checked_add(1).map(|next| Self { next })
    }

    pub fn next_clip(&mut self) -> ClipId {
        ClipId(self.bump())
    }

    pub fn next_track(&mut self) -> TrackId {
        TrackId(self.bump())
    }

    fn bump(&mut self) -> u64 {
        let id = self.next.max(1);
        self.next = id.saturating_add(1);
        id
    }
}

/// A point in screen pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in screen pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const HD: Self = Self {
        width: 1920.0,
        height: 1080.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(self) -> f64 {
        self.width / self.height
    }

    /// Whether both dimensions are finite and strictly positive.
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Anchor corner for the picture-in-picture overlay.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipPreset {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    /// Caller-supplied position, never recomputed.
    Custom,
}
