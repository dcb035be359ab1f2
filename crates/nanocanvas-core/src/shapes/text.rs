//! Editable text object.

use super::{Frame, ObjectId, SerializableColor, ShapeStyle, ShapeTrait};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Line height as a multiple of the font size.
const LINE_HEIGHT: f64 = 1.16;
/// Average glyph advance as a multiple of the font size.
const CHAR_WIDTH_FACTOR: f64 = 0.55;

/// A text object. Its color lives in `style.fill`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ObjectId,
    pub frame: Frame,
    pub content: String,
    /// Font size in scene units.
    pub font_size: f64,
    pub font_family: String,
    pub style: ShapeStyle,
}

impl Text {
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame: Frame::at(position),
            content: content.into(),
            font_size: 32.0,
            font_family: "Inter".to_string(),
            style: ShapeStyle::filled(SerializableColor::black()),
        }
    }

    /// Distance between baselines in unscaled units.
    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_HEIGHT
    }

    fn line_count(&self) -> usize {
        let lines = self.content.lines().count().max(1);
        if self.content.ends_with('\n') {
            lines + 1
        } else {
            lines
        }
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ObjectId {
        self.id
    }

    /// Approximate layout box; the rendering engine owns exact metrics.
    fn size(&self) -> Size {
        let widest = self
            .content
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);
        Size::new(
            widest as f64 * self.font_size * CHAR_WIDTH_FACTOR,
            self.line_count() as f64 * self.font_size * LINE_HEIGHT,
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_size_grows_with_lines() {
        let mut text = Text::new(Point::ZERO, "abcd");
        let single = text.size();
        text.content = "abcd\nab".to_string();
        let double = text.size();
        assert!((single.width - double.width).abs() < f64::EPSILON);
        assert!((double.height - 2.0 * single.height).abs() < 1e-9);
    }

    #[test]
    fn test_text_defaults() {
        let text = Text::new(Point::new(5.0, 5.0), "Type Here");
        assert!((text.font_size - 32.0).abs() < f64::EPSILON);
        assert_eq!(text.style.fill, Some(SerializableColor::black()));
        assert!(text.style.stroke.is_none());
    }
}
