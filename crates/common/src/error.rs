//! Central error types for timeline editing (thiserror-based).

use thiserror::Error;

use crate::types::{ClipId, Millis, TrackId};

/// What kind of entity a lookup failed to find.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Clip,
    Track,
    AudioTrack,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Clip => write!(f, "clip"),
            EntityKind::Track => write!(f, "track"),
            EntityKind::AudioTrack => write!(f, "audio track"),
        }
    }
}

/// A rejected edit. The store is unchanged whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("clip interval intersects {clip_id} on {track_id}")]
    Overlap { clip_id: ClipId, track_id: TrackId },

    #[error("no clip under {time}ms")]
    NotOverClip { time: Millis },

    #[error("out of bounds: {reason}")]
    Bounds { reason: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("cannot drop below {minimum} tracks")]
    TrackFloor { minimum: usize },

    #[error("track type mismatch: expected {expected}, found {found}")]
    TrackTypeMismatch { expected: String, found: String },

    #[error("no interaction in progress")]
    NoInteraction,
}

impl EditError {
    pub fn bounds(reason: impl Into<String>) -> Self {
        Self::Bounds {
            reason: reason.into(),
        }
    }

    pub fn clip_not_found(id: ClipId) -> Self {
        Self::NotFound {
            kind: EntityKind::Clip,
            id: id.to_string(),
        }
    }

    pub fn track_not_found(id: TrackId) -> Self {
        Self::NotFound {
            kind: EntityKind::Track,
            id: id.to_string(),
        }
    }
}

/// Convenience Result type for editing operations.
pub type EditResult<T> = Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = EditError::Overlap {
            clip_id: ClipId(4),
            track_id: TrackId(1),
        };
        assert_eq!(err.to_string(), "clip interval intersects clip-4 on track-1");

        let err = EditError::NotOverClip { time: 1500 };
        assert!(err.to_string().contains("1500"));

        let err = EditError::bounds("trim_in must be < trim_out");
        assert!(err.to_string().contains("trim_in"));

        let err = EditError::clip_not_found(ClipId(9));
        assert_eq!(err.to_string(), "clip not found: clip-9");

        let err = EditError::TrackFloor { minimum: 2 };
        assert!(err.to_string().contains('2'));
    }
}
