//! Rendered watermark stamps.
//!
//! A `Stamp` is an RGBA buffer holding one rendered run of text, ready to be
//! pasted onto a canvas. Stamps are immutable: padding and rotation return
//! new stamps.

use super::WatermarkError;
use image::{Rgba, RgbaImage};

/// A standalone rendered watermark, pasted as a unit.
#[derive(Clone)]
pub struct Stamp {
    image: RgbaImage,
    scale_ratio: f32,
}

impl std::fmt::Debug for Stamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stamp")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .field("scale_ratio", &self.scale_ratio)
            .finish()
    }
}

impl Stamp {
    /// Wrap a rendered buffer. Both dimensions must be non-zero.
    pub fn new(image: RgbaImage) -> Result<Self, WatermarkError> {
        Self::with_scale_ratio(image, 1.0)
    }

    /// Wrap a buffer that was scaled up from a fixed-size face by `scale_ratio`.
    pub fn with_scale_ratio(image: RgbaImage, scale_ratio: f32) -> Result<Self, WatermarkError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(WatermarkError::invalid_geometry(
                "stamp",
                image.width(),
                image.height(),
            ));
        }
        Ok(Self { image, scale_ratio })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Scale factor applied after rasterizing (1.0 for outline fonts).
    pub fn scale_ratio(&self) -> f32 {
        self.scale_ratio
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Whether any pixel is visible.
    pub fn has_coverage(&self) -> bool {
        self.image.pixels().any(|p| p[3] > 0)
    }

    /// Surround the stamp with `padding` transparent pixels on every side.
    pub fn padded(&self, padding: u32) -> Stamp {
        if padding == 0 {
            return self.clone();
        }

        let mut image = RgbaImage::new(
            self.width() + padding * 2,
            self.height() + padding * 2,
        );
        image::imageops::replace(&mut image, &self.image, padding as i64, padding as i64);

        Stamp {
            image,
            scale_ratio: self.scale_ratio,
        }
    }

    /// Rotate counter-clockwise by `degrees`, growing the buffer to hold the
    /// whole rotated stamp.
    pub fn rotated(&self, degrees: f32) -> Stamp {
        Stamp {
            image: rotate_expand(&self.image, degrees),
            scale_ratio: self.scale_ratio,
        }
    }

    /// Pad by `padding_ratio` of the larger side, then rotate.
    ///
    /// The padding keeps anti-aliased corners from touching the buffer edge
    /// after rotation. Both intermediate buffers are checked against
    /// `max_pixels` before they are allocated.
    pub fn rotated_with_padding(
        &self,
        degrees: f32,
        padding_ratio: f32,
        max_pixels: u64,
    ) -> Result<Stamp, WatermarkError> {
        let longest = self.width().max(self.height()) as f64;
        let padding = (longest * padding_ratio as f64).floor().min(u32::MAX as f64) as u32;

        let padded_w = grow(self.width(), padding)?;
        let padded_h = grow(self.height(), padding)?;
        check_allocation("padded stamp", padded_w as u64, padded_h as u64, max_pixels)?;

        let (rotated_w, rotated_h) = rotated_dimensions(padded_w, padded_h, degrees);
        check_allocation("rotated stamp", rotated_w, rotated_h, max_pixels)?;

        Ok(self.padded(padding).rotated(degrees))
    }
}

fn grow(side: u32, padding: u32) -> Result<u32, WatermarkError> {
    padding
        .checked_mul(2)
        .and_then(|p| side.checked_add(p))
        .ok_or_else(|| {
            WatermarkError::AllocationFailure(format!(
                "padding {} on a side of {} overflows",
                padding, side
            ))
        })
}

/// Reject a `width` x `height` RGBA buffer larger than `max_pixels` or too
/// large to address.
pub fn check_allocation(
    what: &str,
    width: u64,
    height: u64,
    max_pixels: u64,
) -> Result<(), WatermarkError> {
    let pixels = width.checked_mul(height);
    let bytes = pixels.and_then(|p| p.checked_mul(4));
    match (pixels, bytes) {
        (Some(pixels), Some(_))
            if pixels <= max_pixels && width <= u32::MAX as u64 && height <= u32::MAX as u64 =>
        {
            Ok(())
        }
        _ => Err(WatermarkError::AllocationFailure(format!(
            "{} buffer {}x{} exceeds the limit of {} pixels",
            what, width, height, max_pixels
        ))),
    }
}

/// Size of the box holding a `width` x `height` buffer turned by `degrees`.
pub fn rotated_dimensions(width: u32, height: u32, degrees: f32) -> (u64, u64) {
    let radians = degrees.to_radians();
    let (sin, cos) = (radians.sin().abs() as f64, radians.cos().abs() as f64);
    let (w, h) = (width as f64, height as f64);

    // Trim float noise so that 90 degree turns do not gain a pixel.
    let rotated_w = (w * cos + h * sin - 1e-3).ceil().max(1.0);
    let rotated_h = (w * sin + h * cos - 1e-3).ceil().max(1.0);
    (rotated_w as u64, rotated_h as u64)
}

/// Rotate an image counter-clockwise by the specified degrees with an
/// expanded bounding box and bilinear sampling.
fn rotate_expand(image: &RgbaImage, degrees: f32) -> RgbaImage {
    let radians = degrees.to_radians();
    let cos = radians.cos();
    let sin = radians.sin();

    let src_w = image.width() as f32;
    let src_h = image.height() as f32;
    let cx = src_w / 2.0;
    let cy = src_h / 2.0;

    let (dst_w, dst_h) = rotated_dimensions(image.width(), image.height(), degrees);
    let (dst_w, dst_h) = (dst_w as u32, dst_h as u32);

    let mut rotated = RgbaImage::new(dst_w, dst_h);

    let dst_cx = dst_w as f32 / 2.0;
    let dst_cy = dst_h as f32 / 2.0;

    for dy in 0..dst_h {
        for dx in 0..dst_w {
            // Inverse transform: destination pixel centre back to source space
            let rx = dx as f32 + 0.5 - dst_cx;
            let ry = dy as f32 + 0.5 - dst_cy;

            let sx = rx * cos - ry * sin + cx - 0.5;
            let sy = rx * sin + ry * cos + cy - 0.5;

            if let Some(pixel) = sample_bilinear(image, sx, sy) {
                rotated.put_pixel(dx, dy, pixel);
            }
        }
    }

    rotated
}

/// Bilinear sample at a fractional position; `None` outside the image.
fn sample_bilinear(image: &RgbaImage, sx: f32, sy: f32) -> Option<Rgba<u8>> {
    let max_x = image.width() as f32 - 1.0;
    let max_y = image.height() as f32 - 1.0;
    if sx < -0.5 || sy < -0.5 || sx > max_x + 0.5 || sy > max_y + 0.5 {
        return None;
    }

    let sx = sx.clamp(0.0, max_x);
    let sy = sy.clamp(0.0, max_y);

    let x0 = sx.floor() as u32;
    let y0 = sy.floor() as u32;
    let x1 = (x0 + 1).min(image.width() - 1);
    let y1 = (y0 + 1).min(image.height() - 1);

    let fx = sx - x0 as f32;
    let fy = sy - y0 as f32;

    let p00 = image.get_pixel(x0, y0);
    let p10 = image.get_pixel(x1, y0);
    let p01 = image.get_pixel(x0, y1);
    let p11 = image.get_pixel(x1, y1);

    let interpolate = |c: usize| -> u8 {
        let v = p00[c] as f32 * (1.0 - fx) * (1.0 - fy)
            + p10[c] as f32 * fx * (1.0 - fy)
            + p01[c] as f32 * (1.0 - fx) * fy
            + p11[c] as f32 * fx * fy;
        v.round().clamp(0.0, 255.0) as u8
    };

    Some(Rgba([
        interpolate(0),
        interpolate(1),
        interpolate(2),
        interpolate(3),
    ]))
}
