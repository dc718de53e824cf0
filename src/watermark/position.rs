//! Position calculation for watermark placement.
//!
//! This module computes the anchors (top-left corners) at which a stamp is
//! pasted onto a canvas.
//!
//! # Modes
//!
//! - **Single**: one anchor, either explicit or `margin` pixels in from the
//!   bottom-right corner.
//! - **Repeat**: a staggered grid covering the canvas. Odd rows are shifted
//!   right by half a column step so columns do not line up. With a non-zero
//!   angle the grid also extends one stamp beyond every edge, since rotated
//!   stamps leave empty corners.
//!
//! Row parity uses floor division, so the row starting above the canvas at a
//! negative `y` counts as row -1 (odd).
//!
//! # Example
//!
//! ```ignore
//! use webmark::watermark::position::{plan_single, CanvasDimensions, StampDimensions};
//!
//! let canvas = CanvasDimensions { width: 1024, height: 768 };
//! let stamp = StampDimensions { width: 100, height: 30 };
//!
//! let plan = plan_single(&canvas, &stamp, None, 20);
//! assert_eq!(plan.positions()[0], PlacementPosition::new(904, 718));
//! ```

use super::WatermarkError;

/// Dimensions of the target canvas.
#[derive(Debug, Clone, Copy)]
pub struct CanvasDimensions {
    pub width: u32,
    pub height: u32,
}

/// Dimensions of the stamp to be placed.
#[derive(Debug, Clone, Copy)]
pub struct StampDimensions {
    pub width: u32,
    pub height: u32,
}

/// A single position where a stamp should be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// How the stamp is laid out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementMode {
    Single,
    Repeat,
}

/// Ordered anchors for one stamp, plus the rotation baked into that stamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementPlan {
    positions: Vec<PlacementPosition>,
    angle: f32,
}

impl PlacementPlan {
    pub fn new(positions: Vec<PlacementPosition>, angle: f32) -> Self {
        Self { positions, angle }
    }

    pub fn positions(&self) -> &[PlacementPosition] {
        &self.positions
    }

    /// Rotation (degrees) already applied to the stamp these anchors belong to.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Parameters of a repeating pattern.
#[derive(Debug, Clone, Copy)]
pub struct RepeatPattern {
    /// Gap between neighbouring stamps in pixels.
    pub spacing: u32,
    /// Rotation already applied to the stamp, in degrees.
    pub angle: f32,
    /// Upper bound on the number of anchors.
    pub max_placements: usize,
}

/// Plan a single placement.
///
/// Without an explicit position the stamp sits `margin` pixels in from the
/// bottom-right corner. Coordinates may be negative when the stamp is larger
/// than the canvas; the compositor clips.
pub fn plan_single(
    canvas: &CanvasDimensions,
    stamp: &StampDimensions,
    explicit: Option<PlacementPosition>,
    margin: u32,
) -> PlacementPlan {
    let position = explicit.unwrap_or_else(|| {
        let m = margin as i64;
        PlacementPosition::new(
            saturate(canvas.width as i64 - stamp.width as i64 - m),
            saturate(canvas.height as i64 - stamp.height as i64 - m),
        )
    });
    PlacementPlan::new(vec![position], 0.0)
}

/// Plan a staggered repeating pattern.
///
/// For an unrotated stamp rows run from `-stamp.height` to the canvas
/// height and columns from the row's start to the canvas width. For a
/// rotated stamp both ranges extend one stamp past the far edges as well.
pub fn plan_repeat(
    canvas: &CanvasDimensions,
    stamp: &StampDimensions,
    pattern: &RepeatPattern,
) -> Result<PlacementPlan, WatermarkError> {
    let stamp_w = stamp.width as i64;
    let stamp_h = stamp.height as i64;
    if stamp_w == 0 || stamp_h == 0 {
        return Err(WatermarkError::invalid_geometry(
            "stamp",
            stamp.width,
            stamp.height,
        ));
    }

    let spacing = pattern.spacing as i64;
    let column_step = spacing + stamp_w;
    let row_step = spacing + stamp_h;
    let stagger = column_step / 2;

    let rotated = pattern.angle != 0.0;
    let (x_end, y_end) = if rotated {
        (
            canvas.width as i64 + stamp_w,
            canvas.height as i64 + stamp_h,
        )
    } else {
        (canvas.width as i64, canvas.height as i64)
    };

    let mut positions = Vec::new();
    let mut y = -stamp_h;
    while y < y_end {
        let row = y.div_euclid(row_step);
        let x_start = if row.rem_euclid(2) == 1 {
            -stamp_w + stagger
        } else {
            -stamp_w
        };

        let mut x = x_start;
        while x < x_end {
            if positions.len() >= pattern.max_placements {
                return Err(WatermarkError::AllocationFailure(format!(
                    "repeat pattern exceeds {} placements (canvas {}x{}, stamp {}x{}, spacing {})",
                    pattern.max_placements,
                    canvas.width,
                    canvas.height,
                    stamp.width,
                    stamp.height,
                    pattern.spacing
                )));
            }
            positions.push(PlacementPosition::new(saturate(x), saturate(y)));
            x += column_step;
        }
        y += row_step;
    }

    Ok(PlacementPlan::new(positions, pattern.angle))
}

/// Plan placements for the given mode.
pub fn plan(
    mode: PlacementMode,
    canvas: &CanvasDimensions,
    stamp: &StampDimensions,
    pattern: &RepeatPattern,
    explicit: Option<PlacementPosition>,
    margin: u32,
) -> Result<PlacementPlan, WatermarkError> {
    match mode {
        PlacementMode::Single => Ok(plan_single(canvas, stamp, explicit, margin)),
        PlacementMode::Repeat => plan_repeat(canvas, stamp, pattern),
    }
}

/// Check if a stamp at `pos` would be at least partially visible.
pub fn is_visible(
    pos: &PlacementPosition,
    canvas: &CanvasDimensions,
    stamp: &StampDimensions,
) -> bool {
    let right = pos.x as i64 + stamp.width as i64;
    let bottom = pos.y as i64 + stamp.height as i64;

    (pos.x as i64) < canvas.width as i64
        && (pos.y as i64) < canvas.height as i64
        && right > 0
        && bottom > 0
}

fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
