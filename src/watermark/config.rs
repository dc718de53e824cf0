//! Watermark configuration types.
//!
//! This module defines:
//! - `WatermarkSpec`: what to draw (text, colour, size request, pattern)
//! - `WatermarkSettings`: the tunable constants of the engine (margin,
//!   rotation padding, default size, placement bound)
//! - `FontColor` and `Anchor` value types
//!
//! Both structs deserialize from the `watermark` and `settings` sections of
//! a job profile:
//!
//! ```yaml
//! watermark:
//!   text: "© Example Studio"
//!   opacity: 0.45
//!   color: "255,255,255"
//!   scale: 5.0
//!   repeat: true
//!   spacing: 100
//!   angle: 45
//! settings:
//!   margin: 20
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Default values
fn default_opacity() -> f32 {
    0.45
}

fn default_spacing() -> u32 {
    100
}

fn default_margin() -> u32 {
    20
}

fn default_rotation_padding_ratio() -> f32 {
    0.1
}

fn default_font_size() -> u32 {
    36
}

fn default_spacing_reference_size() -> u32 {
    40
}

fn default_max_placements() -> usize {
    100_000
}

/// Largest stamp buffer, in pixels, the renderer will allocate (200 MB of RGBA).
pub const DEFAULT_MAX_STAMP_PIXELS: u64 = 50_000_000;

fn default_max_stamp_pixels() -> u64 {
    DEFAULT_MAX_STAMP_PIXELS
}

/// RGB text colour.
///
/// Parses from `"R,G,B"` (channels clamped to 0-255) or `#RGB` / `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FontColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl FontColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// White color.
    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Black color.
    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }
}

impl Default for FontColor {
    fn default() -> Self {
        Self::white()
    }
}

impl fmt::Display for FontColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

impl FromStr for FontColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix('#') {
            Some(hex) => parse_hex_color(hex),
            None => parse_rgb_triplet(s),
        }
    }
}

impl TryFrom<String> for FontColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FontColor> for String {
    fn from(color: FontColor) -> Self {
        color.to_string()
    }
}

/// Parse `R,G,B`, clamping each channel into 0-255.
fn parse_rgb_triplet(s: &str) -> Result<FontColor, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!(
            "Color must be in the format 'R,G,B' (e.g. '255,0,0' for red), got '{}'",
            s
        ));
    }

    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(parts) {
        let value: i64 = part
            .trim()
            .parse()
            .map_err(|_| format!("Invalid color channel '{}' in '{}'", part.trim(), s))?;
        *slot = value.clamp(0, 255) as u8;
    }

    Ok(FontColor::new(channels[0], channels[1], channels[2]))
}

/// Parse the digits of a `#RGB` or `#RRGGBB` colour.
fn parse_hex_color(hex: &str) -> Result<FontColor, String> {
    let digit = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|d| u8::from_str_radix(d, 16).ok())
            .ok_or_else(|| format!("Invalid hex digit in '#{}'", hex))
    };

    match hex.len() {
        3 => {
            // Double each component: 0xF -> 0xFF, 0xA -> 0xAA
            Ok(FontColor::new(
                digit(0..1)? * 17,
                digit(1..2)? * 17,
                digit(2..3)? * 17,
            ))
        }
        6 => Ok(FontColor::new(digit(0..2)?, digit(2..4)?, digit(4..6)?)),
        _ => Err(format!(
            "Color must be #RGB or #RRGGBB format, got {} characters",
            hex.len()
        )),
    }
}

/// Explicit top-left anchor for a single (non-repeating) watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
}

impl Anchor {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// What to draw on each image.
///
/// `font_size` and `scale` are mutually exclusive; when both reach the
/// engine anyway, `scale` wins. `spacing` and `angle` only matter when
/// `repeat` is set, `position` only when it is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkSpec {
    /// Watermark text (must be non-empty by the time it is rendered)
    #[serde(default)]
    pub text: String,

    /// Text alpha multiplier, 0.0 (invisible) to 1.0 (opaque) (default: 0.45)
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    /// Text colour (default: white)
    #[serde(default)]
    pub color: FontColor,

    /// Absolute font size in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,

    /// Font size as a percentage of the shorter image side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,

    /// Tile the text across the whole image
    #[serde(default)]
    pub repeat: bool,

    /// Gap between repeated tiles in pixels (default: 100)
    #[serde(default = "default_spacing")]
    pub spacing: u32,

    /// Rotation of repeated tiles in degrees, counter-clockwise
    #[serde(default)]
    pub angle: f32,

    /// Top-left corner of a single watermark (default: bottom-right corner)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Anchor>,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            text: String::new(),
            opacity: default_opacity(),
            color: FontColor::default(),
            font_size: None,
            scale: None,
            repeat: false,
            spacing: default_spacing(),
            angle: 0.0,
            position: None,
        }
    }
}

impl WatermarkSpec {
    /// Create a spec with default settings for the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Whether the repeat pattern needs a rotated stamp.
    pub fn is_rotated(&self) -> bool {
        self.repeat && self.angle != 0.0
    }

    /// Validate the watermark specification.
    pub fn validate(&self) -> Result<(), String> {
        if self.text.is_empty() {
            return Err("Watermark 'text' field cannot be empty".to_string());
        }

        if self.font_size.is_some() && self.scale.is_some() {
            return Err("Watermark 'font_size' and 'scale' are mutually exclusive".to_string());
        }

        if let Some(scale) = self.scale {
            if !scale.is_finite() || scale <= 0.0 || scale > 100.0 {
                return Err(format!(
                    "Watermark scale must be a percentage in (0, 100], got {}",
                    scale
                ));
            }
        }

        if !self.opacity.is_finite() {
            return Err(format!(
                "Watermark opacity must be a finite value, got {}",
                self.opacity
            ));
        }

        if !self.angle.is_finite() {
            return Err(format!(
                "Watermark angle must be a finite value, got {}",
                self.angle
            ));
        }

        Ok(())
    }
}

/// Engine constants, overridable from the `settings` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkSettings {
    /// Distance of the default single anchor from the bottom-right edges (default: 20)
    #[serde(default = "default_margin")]
    pub margin: u32,

    /// Padding added on each side before rotating, as a fraction of the
    /// stamp's larger side (default: 0.1)
    #[serde(default = "default_rotation_padding_ratio")]
    pub rotation_padding_ratio: f32,

    /// Font size used when neither size nor scale is requested (default: 36)
    #[serde(default = "default_font_size")]
    pub default_font_size: u32,

    /// Font size at which repeat spacing is used unscaled in percentage mode (default: 40)
    #[serde(default = "default_spacing_reference_size")]
    pub spacing_reference_size: u32,

    /// Upper bound on anchors in one plan (default: 100000)
    #[serde(default = "default_max_placements")]
    pub max_placements: usize,

    /// Upper bound on the pixel count of any stamp buffer, before or after
    /// rotation (default: 50000000)
    #[serde(default = "default_max_stamp_pixels")]
    pub max_stamp_pixels: u64,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            rotation_padding_ratio: default_rotation_padding_ratio(),
            default_font_size: default_font_size(),
            spacing_reference_size: default_spacing_reference_size(),
            max_placements: default_max_placements(),
            max_stamp_pixels: default_max_stamp_pixels(),
        }
    }
}

impl WatermarkSettings {
    /// Validate the engine settings.
    pub fn validate(&self) -> Result<(), String> {
        if !self.rotation_padding_ratio.is_finite() || self.rotation_padding_ratio < 0.0 {
            return Err(format!(
                "rotation_padding_ratio must be a non-negative finite value, got {}",
                self.rotation_padding_ratio
            ));
        }

        if self.spacing_reference_size == 0 {
            return Err("spacing_reference_size must be greater than 0".to_string());
        }

        if self.max_placements == 0 {
            return Err("max_placements must be greater than 0".to_string());
        }

        if self.max_stamp_pixels == 0 {
            return Err("max_stamp_pixels must be greater than 0".to_string());
        }

        Ok(())
    }
}
