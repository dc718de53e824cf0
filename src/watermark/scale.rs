//! Font size resolution.
//!
//! Turns a size request (absolute pixels or a percentage of the shorter
//! image side) into a concrete pixel size.

/// Resolve the font size in pixels for an image of the given dimensions.
///
/// A percentage takes precedence over an absolute size; with neither,
/// `default_size` is used. `Watermarker` never gets here with both set, it
/// rejects such specs up front. The result is not clamped: zero or negative
/// sizes are passed through and the renderer treats them as 1px.
pub fn resolve_font_size(
    absolute: Option<u32>,
    percent: Option<f32>,
    image_width: u32,
    image_height: u32,
    default_size: u32,
) -> i32 {
    match (percent, absolute) {
        (Some(pct), _) => {
            let base = image_width.min(image_height) as f64;
            (base * pct as f64 / 100.0).floor() as i32
        }
        (None, Some(size)) => size.min(i32::MAX as u32) as i32,
        (None, None) => default_size.min(i32::MAX as u32) as i32,
    }
}

/// Scale repeat spacing to the resolved font size.
///
/// Only percentage-sized repeating watermarks are adjusted, so that the
/// gaps between tiles grow with the text.
pub fn resolve_spacing(
    spacing: u32,
    font_size: i32,
    percent_mode: bool,
    reference_size: u32,
) -> u32 {
    if !percent_mode || reference_size == 0 {
        return spacing;
    }

    let scaled = (spacing as f64 * font_size.max(0) as f64 / reference_size as f64).floor();
    scaled.min(u32::MAX as f64) as u32
}
