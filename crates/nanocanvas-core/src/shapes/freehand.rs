//! Freehand stroke produced by the free-drawing brush.

use super::{Frame, ObjectId, ShapeStyle, ShapeTrait, point_to_segment_dist};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand path. Points are relative to the frame's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    pub(crate) id: ObjectId,
    pub frame: Frame,
    pub points: Vec<Point>,
    pub style: ShapeStyle,
}

impl Freehand {
    /// Build a path from points in scene coordinates.
    pub fn from_points(points: Vec<Point>) -> Self {
        let origin = points
            .iter()
            .fold(None::<Rect>, |acc, &p| {
                Some(match acc {
                    Some(r) => r.union_pt(p),
                    None => Rect::from_points(p, p),
                })
            })
            .map(|r| r.origin())
            .unwrap_or(Point::ZERO);
        let offset = origin.to_vec2();
        Self {
            id: Uuid::new_v4(),
            frame: Frame::at(origin),
            points: points.into_iter().map(|p| p - offset).collect(),
            style: ShapeStyle::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in scene coordinates.
    pub fn world_points(&self) -> Vec<Point> {
        self.points
            .iter()
            .map(|p| {
                self.frame.position
                    + Vec2::new(p.x * self.frame.scale_x, p.y * self.frame.scale_y)
            })
            .collect()
    }
}

impl ShapeTrait for Freehand {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn size(&self) -> Size {
        let (w, h) = self
            .points
            .iter()
            .fold((0.0_f64, 0.0_f64), |(w, h), p| (w.max(p.x), h.max(p.y)));
        Size::new(w, h)
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
        let reach = tolerance + self.style.stroke_width / 2.0;
        let pts = self.world_points();
        match pts.as_slice() {
            [] => false,
            [only] => only.distance(point) <= reach,
            _ => pts
                .windows(2)
                .any(|w| point_to_segment_dist(point, w[0], w[1]) <= reach),
        }
    }
}
