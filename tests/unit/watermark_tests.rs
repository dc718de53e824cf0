// Watermark engine unit tests against the public API

use image::{Rgb, RgbImage};
use webmark::watermark::*;

fn photo(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, 128])
    })
}

fn diff_bounds(a: &RgbImage, b: &RgbImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in a.enumerate_pixels() {
        if b.get_pixel(x, y) != p {
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }
    bounds
}

#[test]
fn test_builtin_watermarker_resolves_builtin_face() {
    let marker = Watermarker::new(WatermarkSettings::default(), &FontChain::builtin());
    assert!(marker.face().is_builtin());
}

#[test]
fn test_unloadable_fonts_fall_back_to_builtin() {
    let config = FontConfig {
        names: vec!["no-such-font-anywhere.ttf".to_string()],
        search_dirs: vec![],
    };
    let marker = Watermarker::new(WatermarkSettings::default(), &FontChain::from_config(&config));
    assert!(marker.face().is_builtin());

    let output = marker
        .apply(&photo(200, 100), &WatermarkSpec::new("fallback"))
        .unwrap();
    assert_eq!(output.dimensions(), (200, 100));
}

#[test]
fn test_single_mark_respects_margin() {
    let settings = WatermarkSettings {
        margin: 5,
        ..WatermarkSettings::default()
    };
    let marker = Watermarker::with_face(settings, Face::Builtin);
    let source = photo(300, 200);
    let spec = WatermarkSpec {
        font_size: Some(20),
        opacity: 1.0,
        ..WatermarkSpec::new("MMM")
    };

    let output = marker.apply(&source, &spec).unwrap();
    let (x0, y0, x1, y1) = diff_bounds(&source, &output).expect("watermark should change pixels");
    // Stamp is 30x20, anchored at (300 - 30 - 5, 200 - 20 - 5)
    assert!(x0 >= 265 && y0 >= 175);
    assert!(x1 < 295 && y1 < 195);
}

#[test]
fn test_repeat_changes_whole_image() {
    let marker = Watermarker::default();
    let source = photo(400, 400);
    let spec = WatermarkSpec {
        repeat: true,
        spacing: 20,
        opacity: 1.0,
        ..WatermarkSpec::new("TILE")
    };
    let output = marker.apply(&source, &spec).unwrap();
    let (x0, y0, x1, y1) = diff_bounds(&source, &output).unwrap();
    assert!(x0 < 50 && y0 < 50);
    assert!(x1 > 350 && y1 > 350);
}

#[test]
fn test_larger_scale_gives_larger_stamp() {
    let marker = Watermarker::default();
    let canvas = CanvasDimensions {
        width: 1000,
        height: 800,
    };
    let small = WatermarkSpec {
        scale: Some(3.0),
        ..WatermarkSpec::new("abc")
    };
    let large = WatermarkSpec {
        scale: Some(9.0),
        ..WatermarkSpec::new("abc")
    };
    let (small_stamp, _) = marker.plan(canvas, &small).unwrap();
    let (large_stamp, _) = marker.plan(canvas, &large).unwrap();
    assert!(large_stamp.width() > small_stamp.width());
    assert!(large_stamp.height() > small_stamp.height());
}

#[test]
fn test_rotated_stamp_is_rendered_once() {
    let marker = Watermarker::default();
    let spec = WatermarkSpec {
        repeat: true,
        angle: 90.0,
        spacing: 10,
        ..WatermarkSpec::new("UP")
    };
    let (stamp, plan) = marker
        .plan(
            CanvasDimensions {
                width: 300,
                height: 300,
            },
            &spec,
        )
        .unwrap();
    // "UP" at 36px is 36x36; padding 3 per side then a quarter turn
    assert_eq!(stamp.dimensions(), (42, 42));
    assert_eq!(plan.angle(), 90.0);
    assert!(plan.len() > 1);
}

#[test]
fn test_measure_text_matches_stamp() {
    let stamp = render_stamp(
        &Face::Builtin,
        &TextRenderOptions {
            text: "measure".to_string(),
            font_size: 44,
            ..TextRenderOptions::default()
        },
    )
    .unwrap();
    assert_eq!(stamp.dimensions(), measure_text(&Face::Builtin, "measure", 44));
}

#[test]
fn test_errors_are_reported_per_call() {
    let marker = Watermarker::default();
    assert!(marker.apply(&photo(50, 50), &WatermarkSpec::new("")).is_err());
    // The same marker keeps working afterwards
    assert!(marker.apply(&photo(50, 50), &WatermarkSpec::new("ok")).is_ok());
}

#[test]
fn test_watermarker_is_shareable_across_threads() {
    let marker = std::sync::Arc::new(Watermarker::default());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let marker = marker.clone();
            std::thread::spawn(move || {
                let spec = WatermarkSpec {
                    repeat: i % 2 == 0,
                    angle: 15.0 * i as f32,
                    ..WatermarkSpec::new(format!("thread {}", i))
                };
                marker.apply(&photo(160, 120), &spec).map(|img| img.dimensions())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), (160, 120));
    }
}

/// An installed outline face, or `None` on machines without one.
fn outline_face() -> Option<Face> {
    let config = FontConfig {
        names: vec![
            "DejaVuSans.ttf".to_string(),
            "DejaVuSansMono.ttf".to_string(),
            "Arial.ttf".to_string(),
            "arial.ttf".to_string(),
        ],
        search_dirs: font::default_search_dirs(),
    };
    let face = FontChain::from_config(&config).resolve();
    if face.is_builtin() {
        eprintln!("no outline font installed, skipping");
        None
    } else {
        Some(face)
    }
}

#[test]
fn test_outline_explicit_anchor_footprint() {
    let Some(face) = outline_face() else { return };
    let (w, h) = measure_text(&face, "COPYRIGHT", 36);

    let marker = Watermarker::with_face(WatermarkSettings::default(), face);
    let source = photo(300, 200);
    let spec = WatermarkSpec {
        position: Some(Anchor::new(10, 20)),
        font_size: Some(36),
        opacity: 1.0,
        ..WatermarkSpec::new("COPYRIGHT")
    };

    let output = marker.apply(&source, &spec).unwrap();
    let (x0, y0, x1, y1) = diff_bounds(&source, &output).expect("watermark should change pixels");
    assert!(x0 >= 10 && y0 >= 20);
    assert!(x1 < 10 + w && y1 < 20 + h);
}

#[test]
fn test_outline_stamp_matches_measurement() {
    let Some(face) = outline_face() else { return };
    let marker = Watermarker::with_face(WatermarkSettings::default(), face);
    let spec = WatermarkSpec {
        font_size: Some(48),
        ..WatermarkSpec::new("Sample")
    };
    let (stamp, plan) = marker
        .plan(
            CanvasDimensions {
                width: 640,
                height: 480,
            },
            &spec,
        )
        .unwrap();
    assert_eq!(stamp.dimensions(), measure_text(marker.face(), "Sample", 48));
    assert_eq!(
        plan.positions(),
        &[PlacementPosition::new(
            640 - stamp.width() as i32 - 20,
            480 - stamp.height() as i32 - 20
        )]
    );
}

#[test]
fn test_huge_font_size_fails_without_aborting() {
    let marker = Watermarker::default();
    let spec = WatermarkSpec {
        font_size: Some(200_000),
        ..WatermarkSpec::new("COPYRIGHT")
    };
    let result = marker.apply(&photo(64, 64), &spec);
    assert!(matches!(result, Err(WatermarkError::AllocationFailure(_))));
}
