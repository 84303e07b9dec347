//! Picture-in-picture geometry resolver.
//!
//! Pure mapping from `{preset, screen, size}` to `{position, size}`. The
//! overlay has a fixed 16:9 aspect ratio: width is authoritative and height is
//! always derived from it.

use cd_common::{PipPreset, Point, Size};
use serde::{Deserialize, Serialize};

/// Overlay aspect ratio (width / height).
pub const PIP_ASPECT_RATIO: f64 = 16.0 / 9.0;
/// Default gap between the overlay and the screen edge, in pixels.
pub const DEFAULT_PIP_PADDING: f64 = 20.0;
/// Smallest overlay width produced when the screen allows it.
pub const MIN_PIP_WIDTH: f64 = 32.0;

/// How the overlay size is requested.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SizeSpec {
    /// Fraction of screen width.
    Fraction(f64),
    /// Explicit size; only the width is honoured.
    Explicit(Size),
}

/// Resolved overlay placement.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipGeometry {
    pub position: Point,
    pub size: Size,
}

/// 16:9 size for a requested width, shrunk so it fits inside the padded screen.
pub fn fit_size(screen: Size, width: f64, padding: f64) -> Size {
    let max_width = (screen.width - 2.0 * padding)
        .min((screen.height - 2.0 * padding) * PIP_ASPECT_RATIO)
        .max(1.0);
    let width = if width.is_finite() { width } else { max_width };
    let width = width.clamp(MIN_PIP_WIDTH.min(max_width), max_width);
    Size::new(width, width / PIP_ASPECT_RATIO)
}

pub fn pip_size(screen: Size, spec: SizeSpec, padding: f64) -> Size {
    let width = match spec {
        SizeSpec::Fraction(fraction) => screen.width * fraction,
        SizeSpec::Explicit(size) => size.width,
    };
    fit_size(screen, width, padding)
}

/// Corner position for a preset. `None` for `Custom`.
pub fn anchor_position(preset: PipPreset, screen: Size, size: Size, padding: f64) -> Option<Point> {
    let right = screen.width - size.width - padding;
    let bottom = screen.height - size.height - padding;
    match preset {
        PipPreset::TopLeft => Some(Point::new(padding, padding)),
        PipPreset::TopRight => Some(Point::new(right, padding)),
        PipPreset::BottomLeft => Some(Point::new(padding, bottom)),
        PipPreset::BottomRight => Some(Point::new(right, bottom)),
        PipPreset::Custom => None,
    }
}

/// Keep an overlay of `size` fully on screen.
pub fn clamp_position(position: Point, screen: Size, size: Size) -> Point {
    let max_x = (screen.width - size.width).max(0.0);
    let max_y = (screen.height - size.height).max(0.0);
    Point::new(position.x.clamp(0.0, max_x), position.y.clamp(0.0, max_y))
}

/// Resolve size and position.
///
/// For `Custom`, `current` is kept (clamped to the screen); without one the
/// overlay falls back to the bottom-right corner.
pub fn resolve_pip(
    preset: PipPreset,
    screen: Size,
    spec: SizeSpec,
    padding: f64,
    current: Option<Point>,
) -> PipGeometry {
    let size = pip_size(screen, spec, padding);
    let position = match anchor_position(preset, screen, size, padding) {
        Some(position) => position,
        None => match current {
            Some(position) => clamp_position(position, screen, size),
            None => anchor_position(PipPreset::BottomRight, screen, size, padding)
                .unwrap_or_default(),
        },
    };
    PipGeometry { position, size }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn bottom_right_hd() {
        let g = resolve_pip(
            PipPreset::BottomRight,
            Size::HD,
            SizeSpec::Explicit(Size::new(384.0, 216.0)),
            DEFAULT_PIP_PADDING,
            None,
        );
        assert!((g.position.x - 1516.0).abs() < EPS);
        assert!((g.position.y - 844.0).abs() < EPS);
        assert!((g.size.height - 216.0).abs() < EPS);
    }

    #[test]
    fn fraction_sizes_keep_aspect() {
        for fraction in [0.05, 0.1, 0.2, 0.35, 0.5, 0.9] {
            for screen in [Size::HD, Size::new(1280.0, 720.0), Size::new(1080.0, 1920.0)] {
                let size = pip_size(screen, SizeSpec::Fraction(fraction), DEFAULT_PIP_PADDING);
                assert!((size.width / size.height - PIP_ASPECT_RATIO).abs() < 0.01);
                assert!(size.width + 2.0 * DEFAULT_PIP_PADDING <= screen.width + EPS);
                assert!(size.height + 2.0 * DEFAULT_PIP_PADDING <= screen.height + EPS);
            }
        }
    }

    #[test]
    fn explicit_height_is_rederived() {
        let size = pip_size(Size::HD, SizeSpec::Explicit(Size::new(480.0, 100.0)), 20.0);
        assert!((size.height - 270.0).abs() < EPS);
    }

    #[test]
    fn each_corner() {
        let size = Size::new(384.0, 216.0);
        let at = |p| anchor_position(p, Size::HD, size, 20.0).unwrap();
        assert_eq!(at(PipPreset::TopLeft), Point::new(20.0, 20.0));
        assert_eq!(at(PipPreset::TopRight), Point::new(1516.0, 20.0));
        assert_eq!(at(PipPreset::BottomLeft), Point::new(20.0, 844.0));
        assert!(anchor_position(PipPreset::Custom, Size::HD, size, 20.0).is_none());
    }

    #[test]
    fn resize_keeps_corner() {
        for fraction in [0.1, 0.2, 0.4] {
            let g = resolve_pip(PipPreset::BottomRight, Size::HD, SizeSpec::Fraction(fraction), 20.0, None);
            assert!((g.position.x + g.size.width - (1920.0 - 20.0)).abs() < EPS);
            assert!((g.position.y + g.size.height - (1080.0 - 20.0)).abs() < EPS);
        }
    }

    #[test]
    fn custom_keeps_position_but_clamps() {
        let g = resolve_pip(
            PipPreset::Custom,
            Size::HD,
            SizeSpec::Fraction(0.2),
            20.0,
            Some(Point::new(300.0, 400.0)),
        );
        assert_eq!(g.position, Point::new(300.0, 400.0));

        let g = resolve_pip(
            PipPreset::Custom,
            Size::HD,
            SizeSpec::Fraction(0.2),
            20.0,
            Some(Point::new(5000.0, -10.0)),
        );
        assert!((g.position.x - (1920.0 - 384.0)).abs() < EPS);
        assert_eq!(g.position.y, 0.0);
    }

    #[test]
    fn oversized_request_is_shrunk() {
        let size = pip_size(Size::HD, SizeSpec::Fraction(1.0), 20.0);
        assert!((size.height - (1080.0 - 40.0)).abs() < EPS);
    }
}
