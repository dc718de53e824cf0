//! Watermark Pipeline Integration Tests
//!
//! Runs the complete preparation flow for one image:
//!   source bytes → decode → downscale → watermark → JPEG → metadata
//!
//! Metadata is captured by an in-memory writer so the tests do not need
//! exiftool installed.

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use webmark::codec;
use webmark::config::Config;
use webmark::metadata::{copyright_fields, MetadataError, MetadataField, MetadataWriter};
use webmark::watermark::{FontChain, Watermarker};

/// Records every write instead of touching the file.
#[derive(Default)]
struct RecordingWriter {
    writes: Mutex<Vec<(PathBuf, Vec<MetadataField>)>>,
}

impl MetadataWriter for RecordingWriter {
    fn write(&self, path: &Path, fields: &[MetadataField]) -> Result<(), MetadataError> {
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), fields.to_vec()));
        Ok(())
    }
}

/// Create a PNG test image (dark gradient)
fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 64) as u8, (y % 64) as u8, 32])
    });
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .unwrap();
    buffer.into_inner()
}

/// Run one image through the pipeline, returning the written JPEG path.
fn prepare(
    config: &Config,
    source: &[u8],
    out_dir: &Path,
    writer: &dyn MetadataWriter,
) -> PathBuf {
    let marker = Watermarker::new(config.settings.clone(), &FontChain::from_config(&config.fonts));

    let image = codec::decode(source).unwrap();
    let image = codec::fit_within(image, config.output.max_dimension).unwrap();
    let image = marker.apply(&image, &config.watermark).unwrap();
    let jpeg = codec::encode_jpeg(&image, config.output.jpeg_quality).unwrap();

    let path = out_dir.join("output.jpg");
    std::fs::write(&path, jpeg).unwrap();

    let fields = copyright_fields(&config.copyright.holder, config.copyright.year);
    writer.write(&path, &fields).unwrap();
    path
}

#[test]
fn test_pipeline_resizes_watermarks_and_encodes() {
    let yaml = r#"
watermark:
  opacity: 0.8
  repeat: true
  angle: 45
  spacing: 30
output:
  max_dimension: 400
copyright:
  holder: "Example Studio"
  year: 2024
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    config.validate().unwrap();
    assert_eq!(config.watermark.text, "Example Studio");

    let dir = tempfile::tempdir().unwrap();
    let writer = RecordingWriter::default();
    let path = prepare(&config, &create_test_png(800, 600), dir.path(), &writer);

    let output = codec::decode_file(&path).unwrap();
    assert_eq!(output.dimensions(), (400, 300));

    // White text over a dark gradient brightens the image
    let bright = output.pixels().filter(|p| p[0] > 150 && p[1] > 150).count();
    assert!(bright > 100, "expected watermark pixels, found {}", bright);

    let writes = writer.writes.lock().unwrap();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, path);
    assert_eq!(
        writes[0].1[0].value,
        "Copyright © 2024 Example Studio. All rights reserved."
    );
    assert_eq!(writes[0].1.len(), 8);
}

#[test]
fn test_pipeline_keeps_small_images_at_size() {
    let config = Config::from_yaml_with_env("watermark:\n  text: \"Draft\"\n").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let writer = RecordingWriter::default();
    let path = prepare(&config, &create_test_png(320, 240), dir.path(), &writer);

    let output = codec::decode_file(&path).unwrap();
    assert_eq!(output.dimensions(), (320, 240));
}

#[test]
fn test_pipeline_rejects_corrupt_input() {
    let result = codec::decode(b"\x89PNG\r\n\x1a\nnot really");
    assert!(result.is_err());
}

#[test]
fn test_pipeline_from_profile_file() {
    let dir = tempfile::tempdir().unwrap();
    let profile = dir.path().join("profile.yaml");
    std::fs::write(
        &profile,
        "watermark:\n  scale: 6\n  repeat: true\n  spacing: 40\noutput:\n  max_dimension: 256\n",
    )
    .unwrap();

    let config = Config::from_file(&profile).unwrap();
    config.validate().unwrap();

    let writer = RecordingWriter::default();
    let path = prepare(&config, &create_test_png(1024, 512), dir.path(), &writer);
    let output = codec::decode_file(&path).unwrap();
    assert_eq!(output.dimensions(), (256, 128));
}
