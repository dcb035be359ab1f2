//! Rectangle shape.

use super::{Frame, ObjectId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ObjectId,
    pub frame: Frame,
    /// Unscaled width.
    pub width: f64,
    /// Unscaled height.
    pub height: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Rectangle {
    /// Create a new rectangle with its top-left corner at `position`.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame: Frame::at(position),
            width,
            height,
            style: ShapeStyle::default(),
        }
    }

    /// Create a rectangle spanning two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let rect = Rect::from_points(p1, p2);
        Self::new(rect.origin(), rect.width(), rect.height())
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn size(&self) -> Size {
        Size::new(self.width, self.height)
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
        let rect = self.bounds();
        if self.style.fill.is_some() {
            return rect.inflate(tolerance, tolerance).contains(point);
        }
        // Outline only: hit on the border
        let reach = tolerance + self.style.stroke_width / 2.0;
        let outer = rect.inflate(reach, reach);
        let inner = rect.inflate(-reach, -reach);
        outer.contains(point) && !inner.contains(point)
    }
}
