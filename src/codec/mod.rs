//! Image decoding, downscaling and JPEG encoding.
//!
//! Images enter the engine as 8-bit RGB whatever their source format and
//! colour mode (grayscale, palette, alpha, 16-bit), and leave as JPEG:
//!
//! ```ignore
//! use webmark::codec;
//!
//! let image = codec::decode_file("photo.png")?;
//! let image = codec::fit_within(image, 1024)?;
//! let jpeg = codec::encode_jpeg(&image, codec::DEFAULT_JPEG_QUALITY)?;
//! ```

pub mod error;

pub use error::CodecError;

use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::io::Reader as ImageReader;
use image::RgbImage;
use std::io::Cursor;
use std::num::NonZeroU32;
use std::path::Path;

/// JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Decode image data of any supported format into RGB.
pub fn decode(data: &[u8]) -> Result<RgbImage, CodecError> {
    let image = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| CodecError::decode_failed(e.to_string()))?
        .decode()
        .map_err(|e| CodecError::decode_failed(e.to_string()))?;
    Ok(image.to_rgb8())
}

/// Read and decode an image file.
pub fn decode_file(path: impl AsRef<Path>) -> Result<RgbImage, CodecError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decode(&data)?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "Decoded image"
    );
    Ok(image)
}

/// Target size when the longest side is capped at `max_dimension`.
///
/// The longest side becomes `max_dimension`; the other keeps the aspect
/// ratio, rounded down but never below 1.
pub fn fitted_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_dimension || longest == 0 {
        return (width, height);
    }

    let scale = |side: u32| ((side as u64 * max_dimension as u64) / longest as u64).max(1) as u32;
    if width >= height {
        (max_dimension, scale(height))
    } else {
        (scale(width), max_dimension)
    }
}

/// Downscale so that neither side exceeds `max_dimension`.
///
/// Images already within the bound are returned unchanged.
pub fn fit_within(image: RgbImage, max_dimension: u32) -> Result<RgbImage, CodecError> {
    let (src_w, src_h) = image.dimensions();
    let (target_w, target_h) = fitted_dimensions(src_w, src_h, max_dimension);
    if (target_w, target_h) == (src_w, src_h) {
        return Ok(image);
    }

    let src_width =
        NonZeroU32::new(src_w).ok_or_else(|| CodecError::resize_failed("Source width is 0"))?;
    let src_height =
        NonZeroU32::new(src_h).ok_or_else(|| CodecError::resize_failed("Source height is 0"))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| CodecError::resize_failed("Target width is 0"))?;
    let dst_height =
        NonZeroU32::new(target_h).ok_or_else(|| CodecError::resize_failed("Target height is 0"))?;

    let src_image = Image::from_vec_u8(src_width, src_height, image.into_raw(), PixelType::U8x3)
        .map_err(|e| CodecError::resize_failed(format!("Failed to create source image: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x3);

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));

    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| CodecError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

    tracing::debug!(
        from_width = src_w,
        from_height = src_h,
        to_width = target_w,
        to_height = target_h,
        "Resized image"
    );

    RgbImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| CodecError::resize_failed("Failed to create output image buffer"))
}

/// Encode as baseline JPEG. `quality` is clamped to 1-100.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, CodecError> {
    use image::codecs::jpeg::JpegEncoder;
    use image::ImageEncoder as _;

    let quality = quality.clamp(1, 100);
    let mut output = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut output, quality);

    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ColorType::Rgb8,
        )
        .map_err(|e| CodecError::encode_failed("jpeg", e.to_string()))?;

    Ok(output.into_inner())
}
