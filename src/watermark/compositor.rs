//! Watermark compositor for blending stamps onto images.
//!
//! The source image is lifted into an RGBA `Canvas` (fully opaque), stamps
//! are blended at every anchor of a `PlacementPlan` with the Porter-Duff
//! "over" operator, and the result is flattened back to RGB.
//!
//! Anchors may lie partly or wholly outside the canvas; only the overlapping
//! region is touched.
//!
//! # Example
//!
//! ```ignore
//! use webmark::watermark::compositor::Canvas;
//!
//! let mut canvas = Canvas::from_rgb(&photo)?;
//! canvas.composite(&stamp, &plan);
//! let output = canvas.flatten();
//! ```

use super::position::{is_visible, CanvasDimensions, PlacementPosition, StampDimensions};
use super::{PlacementPlan, Stamp, WatermarkError};
use image::{Rgba, RgbImage, RgbaImage};

/// An RGBA working copy of the image being watermarked.
pub struct Canvas {
    image: RgbaImage,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("dimensions", &self.image.dimensions())
            .finish()
    }
}

impl Canvas {
    /// Lift an RGB image into an opaque RGBA canvas.
    pub fn from_rgb(source: &RgbImage) -> Result<Self, WatermarkError> {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(WatermarkError::invalid_geometry("canvas", width, height));
        }

        let mut image = RgbaImage::new(width, height);
        for (dst, src) in image.pixels_mut().zip(source.pixels()) {
            *dst = Rgba([src[0], src[1], src[2], 255]);
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> CanvasDimensions {
        CanvasDimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Blend `stamp` at every anchor of `plan`, in order.
    ///
    /// Returns the number of anchors that touched the canvas.
    pub fn composite(&mut self, stamp: &Stamp, plan: &PlacementPlan) -> usize {
        let canvas_dims = self.dimensions();
        let stamp_dims = StampDimensions {
            width: stamp.width(),
            height: stamp.height(),
        };

        let mut drawn = 0;
        for position in plan.positions() {
            if !is_visible(position, &canvas_dims, &stamp_dims) {
                continue;
            }
            self.blend_stamp(stamp, *position);
            drawn += 1;
        }
        drawn
    }

    /// Blend one stamp with its top-left corner at `position`, clipped to
    /// the canvas.
    pub fn blend_stamp(&mut self, stamp: &Stamp, position: PlacementPosition) {
        let target_width = self.image.width() as i64;
        let target_height = self.image.height() as i64;
        let px = position.x as i64;
        let py = position.y as i64;

        let x_start = px.max(0);
        let y_start = py.max(0);
        let x_end = (px + stamp.width() as i64).min(target_width);
        let y_end = (py + stamp.height() as i64).min(target_height);

        let source = stamp.image();
        for ty in y_start..y_end {
            for tx in x_start..x_end {
                let sx = (tx - px) as u32;
                let sy = (ty - py) as u32;

                let fg = *source.get_pixel(sx, sy);
                if fg[3] == 0 {
                    continue;
                }

                let pixel = self.image.get_pixel_mut(tx as u32, ty as u32);
                *pixel = blend_pixels(*pixel, fg);
            }
        }
    }

    /// Drop the alpha channel.
    pub fn flatten(self) -> RgbImage {
        let (width, height) = self.image.dimensions();
        let mut output = RgbImage::new(width, height);
        for (dst, src) in output.pixels_mut().zip(self.image.pixels()) {
            dst.0 = [src[0], src[1], src[2]];
        }
        output
    }
}

/// Porter-Duff "over": result = foreground + background * (1 - foreground.alpha)
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);
    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
