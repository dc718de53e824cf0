//! Watermark error types.
//!
//! Every failure inside a watermark call is reported as one of these; the
//! caller decides whether to skip the image. A missing font is not an error
//! (the built-in face takes over), so it has no variant here.

use thiserror::Error;

/// Errors that can occur while watermarking a single image.
#[derive(Debug, Error)]
pub enum WatermarkError {
    /// The watermark specification is unusable (empty text, conflicting sizes).
    #[error("Invalid watermark specification: {0}")]
    InvalidSpec(String),

    /// Canvas or stamp has a zero dimension.
    #[error("Invalid geometry: {what} is {width}x{height}")]
    InvalidGeometry {
        what: &'static str,
        width: u32,
        height: u32,
    },

    /// A buffer or placement plan could not be allocated.
    #[error("Allocation failed: {0}")]
    AllocationFailure(String),

    /// Text could not be rasterized.
    #[error("Failed to render text watermark: {0}")]
    RenderError(String),
}

impl WatermarkError {
    pub fn invalid_geometry(what: &'static str, width: u32, height: u32) -> Self {
        Self::InvalidGeometry {
            what,
            width,
            height,
        }
    }
}
