//! Circle/ellipse shape.

use super::{Frame, ObjectId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle anchored at its top-left corner; non-uniform scale makes it an ellipse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub(crate) id: ObjectId,
    pub frame: Frame,
    /// Unscaled radius.
    pub radius: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Ellipse {
    /// Create a circle whose bounding box starts at `position`.
    pub fn new(position: Point, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame: Frame::at(position),
            radius,
            style: ShapeStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    /// Center point in scene coordinates.
    pub fn center(&self) -> Point {
        let b = self.bounds();
        b.center()
    }
}

impl ShapeTrait for Ellipse {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn size(&self) -> Size {
        Size::new(self.radius * 2.0, self.radius * 2.0)
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
        let center = self.center();
        let rx = self.radius * self.frame.scale_x;
        let ry = self.radius * self.frame.scale_y;
        let half_sw = self.style.stroke_width / 2.0;
        let dx_outer = (point.x - center.x) / (rx + tolerance + half_sw);
        let dy_outer = (point.y - center.y) / (ry + tolerance + half_sw);
        if dx_outer * dx_outer + dy_outer * dy_outer > 1.0 {
            return false;
        }
        if self.style.fill.is_some() {
            return true;
        }
        let inner_rx = (rx - tolerance - half_sw).max(0.0);
        let inner_ry = (ry - tolerance - half_sw).max(0.0);
        if inner_rx < f64::EPSILON || inner_ry < f64::EPSILON {
            return true;
        }
        let dx_inner = (point.x - center.x) / inner_rx;
        let dy_inner = (point.y - center.y) / inner_ry;
        dx_inner * dx_inner + dy_inner * dy_inner > 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_bounds() {
        let circle = Ellipse::new(Point::new(10.0, 10.0), 25.0);
        let bounds = circle.bounds();
        assert!((bounds.width() - 50.0).abs() < f64::EPSILON);
        assert!((bounds.height() - 50.0).abs() < f64::EPSILON);
        assert_eq!(circle.center(), Point::new(35.0, 35.0));
    }

    #[test]
    fn test_outline_hit_test() {
        let circle = Ellipse::new(Point::ZERO, 50.0);
        assert!(circle.hit_test(Point::new(100.0, 50.0), 2.0));
        assert!(!circle.hit_test(Point::new(50.0, 50.0), 2.0));
        assert!(!circle.hit_test(Point::new(0.0, 0.0), 2.0));
    }
}
