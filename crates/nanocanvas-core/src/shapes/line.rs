//! Straight line segment.

use super::{Frame, ObjectId, ShapeStyle, ShapeTrait, point_to_segment_dist};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A line segment. Endpoints are stored relative to the frame's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub(crate) id: ObjectId,
    pub frame: Frame,
    pub start: Point,
    pub end: Point,
    pub style: ShapeStyle,
}

impl Line {
    /// Create a line between two scene points.
    pub fn new(start: Point, end: Point) -> Self {
        let origin = Rect::from_points(start, end).origin();
        let offset = origin.to_vec2();
        Self {
            id: Uuid::new_v4(),
            frame: Frame::at(origin),
            start: start - offset,
            end: end - offset,
            style: ShapeStyle::default(),
        }
    }

    /// Endpoints in scene coordinates.
    pub fn world_points(&self) -> (Point, Point) {
        let to_world = |p: Point| {
            self.frame.position
                + Vec2::new(p.x * self.frame.scale_x, p.y * self.frame.scale_y)
        };
        (to_world(self.start), to_world(self.end))
    }
}

impl ShapeTrait for Line {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn size(&self) -> Size {
        Size::new(
            self.start.x.max(self.end.x),
            self.start.y.max(self.end.y),
        )
    }

    fn frame(&self) -> &Frame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let (a, b) = self.world_points();
        point_to_segment_dist(point, a, b) <= tolerance + self.style.stroke_width / 2.0
    }
}
