//! Picture-in-picture configuration state.
//!
//! Position is derived from the active corner preset and re-derived after
//! every size or screen change. Only `Custom` keeps a caller-chosen position.

use cd_common::{PipDefaults, PipPreset, Point, Size};
use cd_timeline::pip::{anchor_position, clamp_position, fit_size, resolve_pip};
use cd_timeline::{PipGeometry, SizeSpec};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipState {
    preset: PipPreset,
    /// `None` until the screen is known.
    position: Option<Point>,
    size: Option<Size>,
    screen: Option<Size>,
    size_fraction: f64,
    padding: f64,
}

impl Default for PipState {
    fn default() -> Self {
        Self::new(&PipDefaults::default())
    }
}

impl PipState {
    pub fn new(defaults: &PipDefaults) -> Self {
        Self {
            preset: defaults.preset,
            position: None,
            size: None,
            screen: None,
            size_fraction: defaults.size_fraction,
            padding: defaults.padding,
        }
    }

    pub fn preset(&self) -> PipPreset {
        self.preset
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn size(&self) -> Option<Size> {
        self.size
    }

    pub fn screen(&self) -> Option<Size> {
        self.screen
    }

    pub fn size_fraction(&self) -> f64 {
        self.size_fraction
    }

    /// Geometry for the recording request, once both position and size are known.
    pub fn recording_geometry(&self) -> Option<PipGeometry> {
        Some(PipGeometry {
            position: self.position?,
            size: self.size?,
        })
    }

    /// Set the capture screen. Invalid sizes are ignored.
    pub fn set_screen(&mut self, screen: Size) -> bool {
        if !screen.is_valid() {
            tracing::warn!(%screen, "Ignoring invalid PiP screen size");
            return false;
        }
        self.screen = Some(screen);
        self.recompute(SizeSpec::Fraction(self.size_fraction));
        true
    }

    pub fn set_preset(&mut self, preset: PipPreset) {
        self.preset = preset;
        if let (Some(screen), Some(size)) = (self.screen, self.size) {
            if let Some(position) = anchor_position(preset, screen, size, self.padding) {
                self.position = Some(position);
            }
        }
        tracing::debug!(?preset, "PiP preset changed");
    }

    /// Resize as a fraction of screen width.
    pub fn set_size_fraction(&mut self, fraction: f64) -> bool {
        if !fraction.is_finite() || fraction <= 0.0 {
            return false;
        }
        self.size_fraction = fraction.min(1.0);
        self.recompute(SizeSpec::Fraction(self.size_fraction));
        true
    }

    /// Resize to an explicit width; height follows the fixed aspect ratio.
    pub fn set_size(&mut self, size: Size) -> bool {
        let Some(screen) = self.screen else {
            return false;
        };
        if !size.width.is_finite() || size.width <= 0.0 {
            return false;
        }
        let fitted = fit_size(screen, size.width, self.padding);
        self.size_fraction = fitted.width / screen.width;
        self.recompute(SizeSpec::Explicit(fitted));
        true
    }

    /// Place the overlay freely. Switches the preset to `Custom`.
    pub fn set_custom_position(&mut self, position: Point) -> bool {
        let (Some(screen), Some(size)) = (self.screen, self.size) else {
            return false;
        };
        self.preset = PipPreset::Custom;
        self.position = Some(clamp_position(position, screen, size));
        true
    }

    fn recompute(&mut self, spec: SizeSpec) {
        let Some(screen) = self.screen else {
            return;
        };
        let geometry = resolve_pip(self.preset, screen, spec, self.padding, self.position);
        self.size = Some(geometry.size);
        self.position = Some(geometry.position);
        tracing::debug!(
            x = geometry.position.x,
            y = geometry.position.y,
            width = geometry.size.width,
            height = geometry.size.height,
            "PiP geometry recomputed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cd_timeline::PIP_ASPECT_RATIO;

    const EPS: f64 = 1e-6;

    fn hd_state() -> PipState {
        let mut pip = PipState::default();
        pip.set_screen(Size::HD);
        pip
    }

    #[test]
    fn geometry_unknown_until_screen() {
        let pip = PipState::default();
        assert!(pip.recording_geometry().is_none());
        assert!(pip.position().is_none());
    }

    #[test]
    fn default_is_bottom_right_fifth() {
        let pip = hd_state();
        let g = pip.recording_geometry().unwrap();
        assert!((g.size.width - 384.0).abs() < EPS);
        assert!((g.position.x - 1516.0).abs() < EPS);
        assert!((g.position.y - 844.0).abs() < EPS);
    }

    #[test]
    fn resize_stays_anchored() {
        let mut pip = hd_state();
        pip.set_preset(PipPreset::TopRight);
        assert!(pip.set_size(Size::new(640.0, 999.0)));
        let g = pip.recording_geometry().unwrap();
        assert!((g.size.width / g.size.height - PIP_ASPECT_RATIO).abs() < 0.01);
        assert!((g.position.x + g.size.width - 1900.0).abs() < EPS);
        assert!((g.position.y - 20.0).abs() < EPS);
    }

    #[test]
    fn custom_position_is_kept_across_resize() {
        let mut pip = hd_state();
        assert!(pip.set_custom_position(Point::new(100.0, 100.0)));
        assert_eq!(pip.preset(), PipPreset::Custom);
        pip.set_size_fraction(0.3);
        assert_eq!(pip.position(), Some(Point::new(100.0, 100.0)));
    }

    #[test]
    fn custom_position_clamped() {
        let mut pip = hd_state();
        pip.set_custom_position(Point::new(-50.0, 5000.0));
        let p = pip.position().unwrap();
        assert_eq!(p.x, 0.0);
        assert!((p.y - (1080.0 - 216.0)).abs() < EPS);
    }

    #[test]
    fn screen_change_rederives() {
        let mut pip = hd_state();
        pip.set_screen(Size::new(1280.0, 720.0));
        let g = pip.recording_geometry().unwrap();
        assert!((g.size.width - 256.0).abs() < EPS);
        assert!((g.position.x - (1280.0 - 256.0 - 20.0)).abs() < EPS);
        assert!(!pip.set_screen(Size::new(0.0, 0.0)));
    }

    #[test]
    fn invalid_fraction_rejected() {
        let mut pip = hd_state();
        assert!(!pip.set_size_fraction(0.0));
        assert!(!pip.set_size_fraction(f64::NAN));
        assert_eq!(pip.size_fraction(), 0.2);
    }
}
