//! Snapping for single-object drags: grid first, then sibling edges.

use crate::shapes::Shape;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Default grid spacing (scene units).
pub const GRID_SIZE: f64 = 50.0;
/// Default snap threshold (scene units).
pub const SNAP_DISTANCE: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapConfig {
    pub grid_size: f64,
    pub snap_distance: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            snap_distance: SNAP_DISTANCE,
        }
    }
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// Corrected top-left position.
    pub point: Point,
    pub snapped_x: bool,
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Snap one coordinate to the grid when its remainder is within `snap_distance` of zero.
///
/// Only the remainder is compared, so a value just below a grid line
/// (e.g. 45 with a 50 grid) stays put.
pub fn snap_axis_to_grid(value: f64, config: &SnapConfig) -> Option<f64> {
    if config.grid_size <= 0.0 {
        return None;
    }
    if (value % config.grid_size).abs() < config.snap_distance {
        Some((value / config.grid_size).round() * config.grid_size)
    } else {
        None
    }
}

/// Grid snap applied independently per axis.
pub fn snap_to_grid(point: Point, config: &SnapConfig) -> SnapResult {
    let x = snap_axis_to_grid(point.x, config);
    let y = snap_axis_to_grid(point.y, config);
    SnapResult {
        point: Point::new(x.unwrap_or(point.x), y.unwrap_or(point.y)),
        snapped_x: x.is_some(),
        snapped_y: y.is_some(),
    }
}

/// Align the moving box's edges to sibling edges.
///
/// Siblings are visited in order and each check sees the position left by the
/// previous one, so the last match on an axis wins.
pub fn snap_to_siblings(
    start: SnapResult,
    size: Size,
    siblings: impl IntoIterator<Item = Rect>,
    config: &SnapConfig,
) -> SnapResult {
    let d = config.snap_distance;
    let mut result = start;
    for other in siblings {
        let p = &mut result.point;
        if (p.x - other.x0).abs() < d {
            p.x = other.x0;
            result.snapped_x = true;
        }
        if (p.y - other.y0).abs() < d {
            p.y = other.y0;
            result.snapped_y = true;
        }
        if ((p.x + size.width) - other.x1).abs() < d {
            p.x = other.x1 - size.width;
            result.snapped_x = true;
        }
        if ((p.y + size.height) - other.y1).abs() < d {
            p.y = other.y1 - size.height;
            result.snapped_y = true;
        }
    }
    result
}

/// Corrected top-left for `moving` dragged to `proposed`, given every object in the scene.
///
/// The moving object itself and hidden objects are skipped as siblings.
pub fn snap_moving_object<'a>(
    moving: &Shape,
    proposed: Point,
    objects: impl IntoIterator<Item = &'a Shape>,
    config: &SnapConfig,
) -> SnapResult {
    let size = Size::new(moving.scaled_width(), moving.scaled_height());
    let moving_id = moving.id();
    let siblings = objects
        .into_iter()
        .filter(|o| o.id() != moving_id && o.frame().visible)
        .map(Shape::bounds);
    snap_to_siblings(snap_to_grid(proposed, config), size, siblings, config)
}
