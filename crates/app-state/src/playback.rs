//! Player/playhead store: transport mode, playhead position, focus, rate.
//!
//! Owned by the host next to the `TimelineStore`. The timeline store only
//! reads it (clip-at-playhead queries, snap targets, split at playhead).

use cd_common::{format_millis, Millis};
use serde::{Deserialize, Serialize};

/// Current playback mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackMode {
    /// Playhead parked (at 0 or the last stop position).
    #[default]
    Stopped,
    Playing,
    Paused,
    /// User is dragging the playhead.
    Scrubbing,
}

/// Which surface keyboard shortcuts currently address.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusContext {
    #[default]
    Timeline,
    Preview,
    Other,
}

pub const MIN_PLAYBACK_RATE: f64 = 0.1;
pub const MAX_PLAYBACK_RATE: f64 = 16.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerStore {
    mode: PlaybackMode,
    /// Playhead position in ms, never negative.
    position: Millis,
    focus: FocusContext,
    /// Speed multiplier: 1.0 = normal.
    rate: f64,
}

impl Default for PlayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerStore {
    /// Stopped at 0, timeline focused, normal speed.
    pub fn new() -> Self {
        Self {
            mode: PlaybackMode::Stopped,
            position: 0,
            focus: FocusContext::Timeline,
            rate: 1.0,
        }
    }

    pub fn position(&self) -> Millis {
        self.position
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn focus(&self) -> FocusContext {
        self.focus
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_playing(&self) -> bool {
        self.mode == PlaybackMode::Playing
    }

    pub fn is_timeline_focused(&self) -> bool {
        self.focus == FocusContext::Timeline
    }

    /// Start or resume playback.
    pub fn play(&mut self) {
        self.mode = PlaybackMode::Playing;
        tracing::debug!(time = %format_millis(self.position), rate = self.rate, "Playback started");
    }

    pub fn pause(&mut self) {
        self.mode = PlaybackMode::Paused;
        tracing::debug!(time = %format_millis(self.position), "Playback paused");
    }

    /// Stop playback and park the playhead at 0.
    pub fn stop(&mut self) {
        self.mode = PlaybackMode::Stopped;
        self.position = 0;
        tracing::debug!("Playback stopped");
    }

    /// Toggle between playing and paused. If stopped or scrubbing, starts playing.
    pub fn toggle_play_pause(&mut self) {
        match self.mode {
            PlaybackMode::Playing => self.pause(),
            PlaybackMode::Paused | PlaybackMode::Stopped | PlaybackMode::Scrubbing => self.play(),
        }
    }

    /// Move the playhead (clamped at 0). A stopped player becomes paused.
    pub fn seek(&mut self, time: Millis) {
        self.position = time.max(0);
        if self.mode == PlaybackMode::Stopped {
            self.mode = PlaybackMode::Paused;
        }
        tracing::debug!(time = %format_millis(self.position), "Seeked");
    }

    /// Keep the playhead inside `[0, duration]`.
    pub fn clamp_to(&mut self, duration: Millis) {
        let clamped = self.position.clamp(0, duration.max(0));
        if clamped != self.position {
            tracing::debug!(from = self.position, to = clamped, "Playhead clamped to duration");
            self.position = clamped;
        }
    }

    /// Advance during playback by `elapsed_ms` of wall time, scaled by rate.
    /// Pauses at `duration`.
    pub fn advance(&mut self, elapsed_ms: f64, duration: Millis) {
        if self.mode != PlaybackMode::Playing {
            return;
        }
        let step = (elapsed_ms * self.rate).round() as Millis;
        self.position = self.position.saturating_add(step).max(0);
        if self.position >= duration {
            self.position = duration.max(0);
            self.pause();
        }
    }

    pub fn start_scrub(&mut self, time: Millis) {
        self.mode = PlaybackMode::Scrubbing;
        self.position = time.max(0);
    }

    /// Update position during scrubbing; ignored otherwise.
    pub fn scrub_to(&mut self, time: Millis) {
        if self.mode == PlaybackMode::Scrubbing {
            self.position = time.max(0);
        }
    }

    /// End scrubbing, paused at the current position.
    pub fn end_scrub(&mut self) {
        if self.mode == PlaybackMode::Scrubbing {
            self.mode = PlaybackMode::Paused;
            tracing::debug!(time = %format_millis(self.position), "Scrub ended");
        }
    }

    pub fn set_focus(&mut self, focus: FocusContext) {
        if self.focus != focus {
            tracing::debug!(?focus, "Focus changed");
            self.focus = focus;
        }
    }

    /// Set playback speed, clamped to `[0.1, 16.0]`.
    pub fn set_rate(&mut self, rate: f64) {
        let rate = if rate.is_finite() { rate } else { 1.0 };
        self.rate = rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
        tracing::debug!(rate = self.rate, "Playback rate changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_stopped_at_zero() {
        let p = PlayerStore::new();
        assert_eq!(p.mode(), PlaybackMode::Stopped);
        assert_eq!(p.position(), 0);
        assert!(p.is_timeline_focused());
        assert_eq!(p.rate(), 1.0);
    }

    #[test]
    fn toggle_play_pause() {
        let mut p = PlayerStore::new();
        p.toggle_play_pause();
        assert!(p.is_playing());
        p.toggle_play_pause();
        assert_eq!(p.mode(), PlaybackMode::Paused);
    }

    #[test]
    fn seek_clamps_and_unstops() {
        let mut p = PlayerStore::new();
        p.seek(-500);
        assert_eq!(p.position(), 0);
        assert_eq!(p.mode(), PlaybackMode::Paused);
        p.seek(4000);
        assert_eq!(p.position(), 4000);
    }

    #[test]
    fn stop_resets_position() {
        let mut p = PlayerStore::new();
        p.seek(2500);
        p.play();
        p.stop();
        assert_eq!(p.position(), 0);
        assert_eq!(p.mode(), PlaybackMode::Stopped);
    }

    #[test]
    fn clamp_to_duration() {
        let mut p = PlayerStore::new();
        p.seek(9000);
        p.clamp_to(5000);
        assert_eq!(p.position(), 5000);
    }

    #[test]
    fn scrub_lifecycle() {
        let mut p = PlayerStore::new();
        p.scrub_to(100);
        assert_eq!(p.position(), 0, "scrub_to ignored outside scrubbing");
        p.start_scrub(1000);
        p.scrub_to(1500);
        assert_eq!(p.position(), 1500);
        p.end_scrub();
        assert_eq!(p.mode(), PlaybackMode::Paused);
    }

    #[test]
    fn advance_respects_rate_and_end() {
        let mut p = PlayerStore::new();
        p.set_rate(2.0);
        p.play();
        p.advance(100.0, 10_000);
        assert_eq!(p.position(), 200);
        p.advance(10_000.0, 10_000);
        assert_eq!(p.position(), 10_000);
        assert_eq!(p.mode(), PlaybackMode::Paused);
    }

    #[test]
    fn rate_and_focus() {
        let mut p = PlayerStore::new();
        p.set_rate(100.0);
        assert_eq!(p.rate(), MAX_PLAYBACK_RATE);
        p.set_focus(FocusContext::Preview);
        assert!(!p.is_timeline_focused());
    }
}
