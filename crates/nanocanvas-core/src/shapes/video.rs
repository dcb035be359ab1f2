//! Video surface: a playing media element wrapped as an image-like object.

use super::{AiData, Frame, ObjectId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_VIDEO_WIDTH: u32 = 1280;
pub const DEFAULT_VIDEO_HEIGHT: u32 = 720;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub(crate) id: ObjectId,
    pub frame: Frame,
    pub source_width: u32,
    pub source_height: u32,
    pub url: String,
    pub looping: bool,
    pub muted: bool,
    pub playing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_data: Option<AiData>,
    pub style: ShapeStyle,
}

impl Video {
    /// A looping, muted, playing surface at the default native size.
    pub fn new(position: Point, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame: Frame::at(position),
            source_width: DEFAULT_VIDEO_WIDTH,
            source_height: DEFAULT_VIDEO_HEIGHT,
            url: url.into(),
            looping: true,
            muted: true,
            playing: true,
            ai_data: None,
            style: ShapeStyle {
                stroke: None,
                stroke_width: 0.0,
                fill: None,
            },
        }
    }

    /// Surfaces that change their pixels over time need continuous rendering.
    pub fn is_animating(&self) -> bool {
        self.playing && self.frame.visible
    }
}

impl ShapeTrait for Video {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn size(&self) -> Size {
        Size::new(self.source_width as f64, self.source_height as f64)
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
    fn test_video_defaults() {
        let video = Video::new(Point::ZERO, "https://cdn.example/v.mp4");
        assert!(video.looping && video.muted && video.playing);
        assert!((video.size().width - 1280.0).abs() < f64::EPSILON);
        assert!((video.size().height - 720.0).abs() < f64::EPSILON);
        assert!(video.is_animating());
    }
}
