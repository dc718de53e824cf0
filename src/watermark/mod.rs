//! Text watermarking for raster images.
//!
//! The engine turns a `WatermarkSpec` into pixels in five steps:
//!
//! 1. resolve the font size (absolute, or a percentage of the shorter side)
//! 2. render the text once into a transparent `Stamp`
//! 3. for rotated repeat patterns, pad and rotate that stamp once
//! 4. plan anchors (single bottom-right / explicit, or a staggered grid)
//! 5. blend the stamp at every anchor and flatten to RGB
//!
//! Every call is independent: the only shared state is the resolved font
//! face, which is read-only, so one `Watermarker` can serve many threads.
//!
//! # Configuration Example
//!
//! ```yaml
//! watermark:
//!   text: "© Example Studio"
//!   scale: 5.0
//!   repeat: true
//!   spacing: 100
//!   angle: 45
//!   opacity: 0.3
//!   color: "255,255,255"
//! ```
//!
//! # Example
//!
//! ```ignore
//! use webmark::watermark::{FontChain, Watermarker, WatermarkSettings, WatermarkSpec};
//!
//! let marker = Watermarker::new(WatermarkSettings::default(), &FontChain::builtin());
//! let output = marker.apply(&photo, &WatermarkSpec::new("© Example"))?;
//! ```

pub mod compositor;
pub mod config;
pub mod error;
pub mod font;
pub mod position;
pub mod scale;
pub mod stamp;
pub mod text_renderer;

// Re-export main types for convenience
pub use compositor::Canvas;
pub use config::{Anchor, FontColor, WatermarkSettings, WatermarkSpec};
pub use error::WatermarkError;
pub use font::{Face, FileFontSource, FontChain, FontConfig, FontLoadError, FontSource};
pub use position::{
    is_visible, plan_repeat, plan_single, CanvasDimensions, PlacementMode, PlacementPlan,
    PlacementPosition, RepeatPattern, StampDimensions,
};
pub use scale::{resolve_font_size, resolve_spacing};
pub use stamp::Stamp;
pub use text_renderer::{measure_text, render_stamp, TextRenderOptions};

use image::RgbImage;

/// Applies text watermarks with one resolved font face.
#[derive(Debug)]
pub struct Watermarker {
    settings: WatermarkSettings,
    face: Face,
}

impl Watermarker {
    /// Resolve `fonts` once and keep the face for every later call.
    pub fn new(settings: WatermarkSettings, fonts: &FontChain) -> Self {
        let face = fonts.resolve();
        tracing::debug!(face = face.name(), "Watermark face resolved");
        Self::with_face(settings, face)
    }

    pub fn with_face(settings: WatermarkSettings, face: Face) -> Self {
        Self { settings, face }
    }

    pub fn settings(&self) -> &WatermarkSettings {
        &self.settings
    }

    pub fn face(&self) -> &Face {
        &self.face
    }

    /// Produce the stamp and anchors for `spec` on a canvas of the given size.
    ///
    /// A spec carrying both `font_size` and `scale` is rejected with
    /// `InvalidSpec`; the "scale wins" rule of `resolve_font_size` only
    /// applies to callers that use the resolver directly.
    pub fn plan(
        &self,
        canvas: CanvasDimensions,
        spec: &WatermarkSpec,
    ) -> Result<(Stamp, PlacementPlan), WatermarkError> {
        spec.validate().map_err(WatermarkError::InvalidSpec)?;
        if canvas.width == 0 || canvas.height == 0 {
            return Err(WatermarkError::invalid_geometry(
                "canvas",
                canvas.width,
                canvas.height,
            ));
        }

        let font_size = resolve_font_size(
            spec.font_size,
            spec.scale,
            canvas.width,
            canvas.height,
            self.settings.default_font_size,
        );
        let spacing = resolve_spacing(
            spec.spacing,
            font_size,
            spec.repeat && spec.scale.is_some(),
            self.settings.spacing_reference_size,
        );
        tracing::debug!(
            canvas_width = canvas.width,
            canvas_height = canvas.height,
            font_size,
            spacing,
            "Resolved watermark size"
        );

        let options = TextRenderOptions {
            text: spec.text.clone(),
            font_size,
            color: spec.color,
            opacity: spec.opacity,
            max_pixels: self.settings.max_stamp_pixels,
        };
        let mut stamp = render_stamp(&self.face, &options)?;
        if spec.is_rotated() {
            stamp = stamp.rotated_with_padding(
                spec.angle,
                self.settings.rotation_padding_ratio,
                self.settings.max_stamp_pixels,
            )?;
        }
        tracing::debug!(
            stamp_width = stamp.width(),
            stamp_height = stamp.height(),
            scale_ratio = stamp.scale_ratio(),
            angle = spec.angle,
            "Rendered watermark stamp"
        );

        let stamp_dims = StampDimensions {
            width: stamp.width(),
            height: stamp.height(),
        };
        let plan = if spec.repeat {
            let pattern = RepeatPattern {
                spacing,
                angle: spec.angle,
                max_placements: self.settings.max_placements,
            };
            plan_repeat(&canvas, &stamp_dims, &pattern)?
        } else {
            let explicit = spec.position.map(|a| PlacementPosition::new(a.x, a.y));
            plan_single(&canvas, &stamp_dims, explicit, self.settings.margin)
        };
        tracing::debug!(
            anchors = plan.len(),
            repeat = spec.repeat,
            "Planned watermark placement"
        );

        Ok((stamp, plan))
    }

    /// Watermark `image` according to `spec`, returning a new RGB image of
    /// the same size.
    ///
    /// Size modes are exclusive here: a spec with both `font_size` and
    /// `scale` fails with `InvalidSpec` rather than letting `scale` win.
    /// Stamp buffers above `max_stamp_pixels` fail with `AllocationFailure`
    /// before anything is allocated, and no partial output is produced.
    pub fn apply(&self, image: &RgbImage, spec: &WatermarkSpec) -> Result<RgbImage, WatermarkError> {
        let (width, height) = image.dimensions();
        let (stamp, plan) = self.plan(CanvasDimensions { width, height }, spec)?;

        let mut canvas = Canvas::from_rgb(image)?;
        let drawn = canvas.composite(&stamp, &plan);
        tracing::debug!(drawn, anchors = plan.len(), "Composited watermark");

        Ok(canvas.flatten())
    }
}

impl Default for Watermarker {
    /// Default settings with the built-in face.
    fn default() -> Self {
        Self::with_face(WatermarkSettings::default(), Face::Builtin)
    }
}
