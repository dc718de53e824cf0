//! Text watermark rendering.
//!
//! This module measures and rasterizes text into `Stamp`s that can be
//! composited onto target images.
//!
//! # Features
//!
//! - Outline fonts at any pixel size (ab_glyph)
//! - Built-in bitmap face with nearest-neighbour scale-up for sizes above
//!   its native height
//! - Opacity baked into the stamp's alpha channel
//!
//! Measurement and rendering share one layout routine per face, so the box
//! used for placement is always the box that gets drawn.
//!
//! # Example
//!
//! ```ignore
//! use webmark::watermark::text_renderer::{render_stamp, TextRenderOptions};
//! use webmark::watermark::{FontChain, FontColor};
//!
//! let face = FontChain::builtin().resolve();
//! let options = TextRenderOptions {
//!     text: "Copyright 2025".to_string(),
//!     font_size: 24,
//!     color: FontColor::white(),
//!     opacity: 0.5,
//!     ..TextRenderOptions::default()
//! };
//!
//! let stamp = render_stamp(&face, &options).unwrap();
//! ```

use super::config::DEFAULT_MAX_STAMP_PIXELS;
use super::font::{builtin_font, builtin_native_size, Face};
use super::stamp::check_allocation;
use super::{FontColor, Stamp, WatermarkError};
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Baseline, Text};
use image::imageops::FilterType;
use image::{GrayImage, Luma, Rgba, RgbaImage};
use std::convert::Infallible;

/// Extra pixels around outline-rendered text.
const OUTLINE_PADDING: u32 = 2;

/// Options for text rendering.
#[derive(Debug, Clone)]
pub struct TextRenderOptions {
    /// The text to render.
    pub text: String,
    /// Font size in pixels. Values below 1 render as 1.
    pub font_size: i32,
    /// Text color (RGB).
    pub color: FontColor,
    /// Alpha multiplier; not clamped, the byte conversion saturates.
    pub opacity: f32,
    /// Largest buffer, in pixels, rendering may allocate.
    pub max_pixels: u64,
}

impl Default for TextRenderOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 36,
            color: FontColor::white(),
            opacity: 0.45,
            max_pixels: DEFAULT_MAX_STAMP_PIXELS,
        }
    }
}

/// Layout of a built-in face rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BuiltinLayout {
    native_width: u32,
    native_height: u32,
    width: u32,
    height: u32,
    scale_ratio: f32,
}

fn effective_size(font_size: i32) -> u32 {
    font_size.max(1) as u32
}

fn builtin_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyle::new(builtin_font(), BinaryColor::On)
}

fn builtin_layout(text: &str, font_size: u32) -> BuiltinLayout {
    let size = builtin_style()
        .measure_string(text, Point::zero(), Baseline::Top)
        .bounding_box
        .size;
    let native = builtin_native_size();

    let (width, height, scale_ratio) = if font_size > native {
        let scale = |v: u32| (v as u64 * font_size as u64 / native as u64).min(u32::MAX as u64) as u32;
        (
            scale(size.width),
            scale(size.height),
            font_size as f32 / native as f32,
        )
    } else {
        (size.width, size.height, 1.0)
    };

    BuiltinLayout {
        native_width: size.width,
        native_height: size.height,
        width,
        height,
        scale_ratio,
    }
}

fn outline_layout(font: &FontVec, text: &str, font_size: u32) -> (u32, u32) {
    let scaled_font = font.as_scaled(PxScale::from(font_size as f32));

    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);

        if let Some(prev) = prev_glyph {
            width += scaled_font.kern(prev, glyph_id);
        }

        width += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    let height = scaled_font.height();

    (
        (width.ceil() as u32).saturating_add(OUTLINE_PADDING),
        (height.ceil() as u32).saturating_add(OUTLINE_PADDING),
    )
}

/// Calculate the dimensions of rendered text.
///
/// Returns (width, height) in pixels, exactly as `render_stamp` would
/// produce them.
pub fn measure_text(face: &Face, text: &str, font_size: i32) -> (u32, u32) {
    let size = effective_size(font_size);
    match face {
        Face::Outline { font, .. } => outline_layout(font, text, size),
        Face::Builtin => {
            let layout = builtin_layout(text, size);
            (layout.width, layout.height)
        }
    }
}

/// Render text to a stamp.
///
/// RGB channels of every pixel equal the configured colour; alpha is the
/// glyph coverage scaled by the opacity.
pub fn render_stamp(face: &Face, options: &TextRenderOptions) -> Result<Stamp, WatermarkError> {
    if options.text.is_empty() {
        return Err(WatermarkError::RenderError(
            "Cannot render empty text".to_string(),
        ));
    }

    let size = effective_size(options.font_size);
    match face {
        Face::Outline { font, .. } => render_outline(font, options, size),
        Face::Builtin => render_builtin(options, size),
    }
}

fn text_alpha(coverage: f32, opacity: f32) -> u8 {
    // Float to int casts saturate, so out-of-range opacity ends at 0 or 255
    (coverage * opacity * 255.0) as u8
}

fn render_outline(
    font: &FontVec,
    options: &TextRenderOptions,
    font_size: u32,
) -> Result<Stamp, WatermarkError> {
    let scale = PxScale::from(font_size as f32);
    let scaled_font = font.as_scaled(scale);

    let (width, height) = outline_layout(font, &options.text, font_size);
    let (width, height) = (width.max(1), height.max(1));
    check_allocation("text", width as u64, height as u64, options.max_pixels)?;
    let mut image = RgbaImage::new(width, height);
    let (canvas_width, canvas_height) = image.dimensions();

    let baseline_y = OUTLINE_PADDING as f32 / 2.0 + scaled_font.ascent();
    let mut cursor_x = OUTLINE_PADDING as f32 / 2.0;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in options.text.chars() {
        let glyph_id = scaled_font.glyph_id(c);

        if let Some(prev) = prev_glyph {
            cursor_x += scaled_font.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();

            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;

                if x >= 0 && y >= 0 && x < canvas_width as i32 && y < canvas_height as i32 {
                    let pixel = Rgba([
                        options.color.r,
                        options.color.g,
                        options.color.b,
                        text_alpha(coverage, options.opacity),
                    ]);

                    // Overlapping glyph edges keep the stronger coverage
                    let existing = image.get_pixel_mut(x as u32, y as u32);
                    if pixel[3] >= existing[3] {
                        *existing = pixel;
                    }
                }
            });
        }

        cursor_x += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    Stamp::new(image)
}

/// Collects the "on" pixels of an embedded-graphics drawing into a mask.
struct CoverageMask {
    mask: GrayImage,
}

impl OriginDimensions for CoverageMask {
    fn size(&self) -> Size {
        Size::new(self.mask.width(), self.mask.height())
    }
}

impl DrawTarget for CoverageMask {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if color.is_off() || point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x < self.mask.width() && y < self.mask.height() {
                self.mask.put_pixel(x, y, Luma([255]));
            }
        }
        Ok(())
    }
}

fn render_builtin(options: &TextRenderOptions, font_size: u32) -> Result<Stamp, WatermarkError> {
    let layout = builtin_layout(&options.text, font_size);
    if layout.native_width == 0 || layout.native_height == 0 {
        return Err(WatermarkError::invalid_geometry(
            "stamp",
            layout.native_width,
            layout.native_height,
        ));
    }

    check_allocation(
        "text",
        layout.native_width as u64,
        layout.native_height as u64,
        options.max_pixels,
    )?;
    if layout.scale_ratio != 1.0 {
        check_allocation(
            "scaled text",
            layout.width as u64,
            layout.height as u64,
            options.max_pixels,
        )?;
    }

    let mut target = CoverageMask {
        mask: GrayImage::new(layout.native_width, layout.native_height),
    };
    // Infallible target
    let _ = Text::with_baseline(&options.text, Point::zero(), builtin_style(), Baseline::Top)
        .draw(&mut target);

    let alpha = text_alpha(1.0, options.opacity);
    let native = RgbaImage::from_fn(layout.native_width, layout.native_height, |x, y| {
        if target.mask.get_pixel(x, y)[0] > 0 {
            Rgba([options.color.r, options.color.g, options.color.b, alpha])
        } else {
            Rgba([options.color.r, options.color.g, options.color.b, 0])
        }
    });

    if layout.scale_ratio == 1.0 {
        return Stamp::new(native);
    }

    tracing::trace!(
        requested = font_size,
        native = builtin_native_size(),
        ratio = layout.scale_ratio,
        "Scaling built-in face"
    );
    let scaled = image::imageops::resize(&native, layout.width, layout.height, FilterType::Nearest);
    Stamp::with_scale_ratio(scaled, layout.scale_ratio)
}
