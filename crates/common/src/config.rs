//! Configuration structs for the editor session, snapping, PiP, and the view.

use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};
use crate::time;
use crate::types::PipPreset;

/// Pixels per second at zoom level 1.0.
pub const BASE_PIXELS_PER_SECOND: f64 = 100.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Top-level editor session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Track count the store refuses to go below.
    pub min_tracks: usize,
    /// Maximum number of history entries kept (oldest evicted first).
    pub max_history: usize,
    pub initial_video_tracks: usize,
    pub initial_audio_tracks: usize,
    pub snap: SnapConfig,
    pub pip: PipDefaults,
    pub view: ViewConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_tracks: 2,
            max_history: 100,
            initial_video_tracks: 1,
            initial_audio_tracks: 1,
            snap: SnapConfig::default(),
            pip: PipDefaults::default(),
            view: ViewConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON document; missing fields take defaults.
    pub fn from_json(json: &str) -> EditResult<Self> {
        let config: EditorConfig = serde_json::from_str(json)
            .map_err(|e| EditError::bounds(format!("invalid editor config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EditResult<()> {
        if self.min_tracks == 0 {
            return Err(EditError::bounds("min_tracks must be at least 1"));
        }
        if self.max_history == 0 {
            return Err(EditError::bounds("max_history must be at least 1"));
        }
        if self.snap.threshold_px < 0.0 || !self.snap.threshold_px.is_finite() {
            return Err(EditError::bounds("snap threshold must be a non-negative number"));
        }
        if !(0.0..=1.0).contains(&self.pip.size_fraction) || self.pip.size_fraction == 0.0 {
            return Err(EditError::bounds("pip size fraction must be in (0, 1]"));
        }
        Ok(())
    }

    /// Number of tracks a fresh session opens with (never below the floor).
    pub fn opening_track_count(&self) -> usize {
        (self.initial_video_tracks + self.initial_audio_tracks).max(self.min_tracks)
    }
}

/// Snap behaviour while dragging clips or trim edges.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub enabled: bool,
    /// Snap distance in screen pixels (converted to ms at the current zoom).
    pub threshold_px: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_px: 10.0,
        }
    }
}

/// Initial picture-in-picture placement.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipDefaults {
    pub preset: PipPreset,
    /// Overlay width as a fraction of screen width.
    pub size_fraction: f64,
    /// Gap between the overlay and the screen edge, in pixels.
    pub padding: f64,
}

impl Default for PipDefaults {
    fn default() -> Self {
        Self {
            preset: PipPreset::BottomRight,
            size_fraction: 0.2,
            padding: 20.0,
        }
    }
}

/// Presentation-only timeline view state. Never part of undo history.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub pixels_per_second: f64,
    pub track_height: f64,
    pub ruler_height: f64,
    pub zoom_level: f64,
    /// Horizontal scroll offset in pixels.
    pub scroll_position: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            pixels_per_second: BASE_PIXELS_PER_SECOND,
            track_height: 60.0,
            ruler_height: 30.0,
            zoom_level: 1.0,
            scroll_position: 0.0,
        }
    }
}

impl ViewConfig {
    /// Set the zoom level (clamped) and rederive the pixel rate.
    pub fn set_zoom(&mut self, zoom: f64) {
        let zoom = if zoom.is_finite() { zoom } else { 1.0 };
        self.zoom_level = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.pixels_per_second = BASE_PIXELS_PER_SECOND * self.zoom_level;
    }

    pub fn set_scroll(&mut self, pixels: f64) {
        self.scroll_position = pixels.max(0.0);
    }

    pub fn ms_to_pixels(&self, ms: f64) -> f64 {
        time::ms_to_pixels(ms, self.pixels_per_second)
    }

    pub fn pixels_to_ms(&self, pixels: f64) -> f64 {
        time::pixels_to_ms(pixels, self.pixels_per_second)
    }

    /// Timeline time under a viewport x coordinate, accounting for scroll.
    pub fn time_at_viewport_x(&self, x: f64) -> f64 {
        self.pixels_to_ms(x + self.scroll_position).max(0.0)
    }
}
