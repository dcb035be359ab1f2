//! Viewport controller: pan/zoom transform between screen and scene space.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom factor shown as "100%".
pub const BASE_ZOOM: f64 = 1.0;
pub const MIN_ZOOM: f64 = 0.01;
pub const MAX_ZOOM: f64 = 20.0;
/// Per-unit wheel zoom base: factor = `WHEEL_ZOOM_BASE ^ delta_y`.
pub const WHEEL_ZOOM_BASE: f64 = 0.999;

/// Camera manages the view transform for the canvas.
///
/// Screen coordinates are `scene * zoom + offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: BASE_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen to scene transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan by a raw screen-space delta. The delta is not divided by zoom.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        // Adjust offset so world_point stays under the cursor
        let new_screen = self.world_to_screen(world_point);
        self.offset += screen_point - new_screen;
    }

    /// Apply a mouse-wheel step anchored at the pointer.
    pub fn wheel_zoom(&mut self, screen_point: Point, delta_y: f64) {
        self.zoom_at(screen_point, WHEEL_ZOOM_BASE.powf(delta_y));
    }

    /// Scene point at the center of a viewport of the given pixel size.
    pub fn viewport_center_world(&self, viewport: Size) -> Point {
        self.screen_to_world(Point::new(viewport.width / 2.0, viewport.height / 2.0))
    }

    /// Reset camera to default position and zoom.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = BASE_ZOOM;
    }
}
