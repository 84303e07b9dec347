//! Conversions between timeline milliseconds and pixel coordinates.

use crate::types::Millis;

/// Convert milliseconds to pixels at the given zoom rate.
#[inline]
pub fn ms_to_pixels(ms: f64, pixels_per_second: f64) -> f64 {
    ms * pixels_per_second / 1000.0
}

/// Convert pixels back to milliseconds at the given zoom rate.
///
/// A non-positive rate yields 0 rather than an infinity.
#[inline]
pub fn pixels_to_ms(pixels: f64, pixels_per_second: f64) -> f64 {
    if pixels_per_second <= 0.0 {
        return 0.0;
    }
    pixels * 1000.0 / pixels_per_second
}

/// Pixels to whole milliseconds, rounded to nearest.
#[inline]
pub fn pixels_to_millis(pixels: f64, pixels_per_second: f64) -> Millis {
    pixels_to_ms(pixels, pixels_per_second).round() as Millis
}

/// Format as `MM:SS.mmm`, or `H:MM:SS.mmm` once past an hour.
pub fn format_millis(ms: Millis) -> String {
    let sign = if ms < 0 { "-" } else { "" };
    let ms = ms.unsigned_abs();
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    if hours > 0 {
        format!("{sign}{hours}:{minutes:02}:{seconds:02}.{millis:03}")
    } else {
        format!("{sign}{minutes:02}:{seconds:02}.{millis:03}")
    }
}
