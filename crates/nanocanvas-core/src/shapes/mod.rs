//! Canvas object definitions.

mod ellipse;
mod freehand;
mod image;
mod line;
mod rectangle;
mod text;
mod video;

pub use ellipse::Ellipse;
pub use freehand::Freehand;
pub use self::image::{Image, ImageFormat};
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::Text;
pub use video::Video;

use kurbo::{Point, Rect, Size};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::generation::ModelId;

/// Unique identifier for canvas objects.
pub type ObjectId = Uuid;

/// Serializable color representation (RGBA8), stored as a CSS hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Lowercase hex form: `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Parse a CSS color. `transparent` and the empty string mean "no color".
    pub fn parse_css(s: &str) -> Result<Option<Self>, ColorParseError> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("transparent") {
            return Ok(None);
        }
        s.parse().map(Some)
    }

    /// Parse an optional CSS color coming from the style editor.
    pub fn from_css_lossy(s: &str) -> Option<Self> {
        match Self::parse_css(s) {
            Ok(color) => color,
            Err(e) => {
                log::warn!("Ignoring color {:?}: {}", s, e);
                None
            }
        }
    }
}

/// Error returned when a color string is not a recognised hex color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color: {0}")]
pub struct ColorParseError(pub String);

impl FromStr for SerializableColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError(s.to_string()))?;
        let byte = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| ColorParseError(s.to_string()))
        };
        let nibble = |i: usize| {
            hex.get(i..i + 1)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .map(|v| v * 17)
                .ok_or_else(|| ColorParseError(s.to_string()))
        };
        match hex.len() {
            3 => Ok(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(ColorParseError(s.to_string())),
        }
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for SerializableColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties shared by every object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color (None = no stroke).
    #[serde(default)]
    pub stroke: Option<SerializableColor>,
    /// Stroke width.
    #[serde(default)]
    pub stroke_width: f64,
    /// Fill color (None = transparent).
    #[serde(default)]
    pub fill: Option<SerializableColor>,
}

impl ShapeStyle {
    /// An outline-only style.
    pub fn outline(stroke: SerializableColor, stroke_width: f64) -> Self {
        Self {
            stroke: Some(stroke),
            stroke_width,
            fill: None,
        }
    }

    /// A fill-only style (text, images).
    pub fn filled(fill: SerializableColor) -> Self {
        Self {
            stroke: None,
            stroke_width: 0.0,
            fill: Some(fill),
        }
    }

    /// Get the stroke color as a peniko Color.
    pub fn stroke_color(&self) -> Option<Color> {
        self.stroke.map(Color::from)
    }

    /// Get the fill color as a peniko Color.
    pub fn fill_color(&self) -> Option<Color> {
        self.fill.map(Color::from)
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self::outline(SerializableColor::black(), 3.0)
    }
}

fn default_scale() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

/// Placement and transform shared by every object: origin is the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Left/top position in scene units.
    pub position: Point,
    #[serde(default = "default_scale")]
    pub scale_x: f64,
    #[serde(default = "default_scale")]
    pub scale_y: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Locked objects cannot be dragged.
    #[serde(default)]
    pub locked: bool,
}

impl Frame {
    pub fn at(position: Point) -> Self {
        Self {
            position,
            scale_x: 1.0,
            scale_y: 1.0,
            visible: true,
            locked: false,
        }
    }

    /// Scaled bounding box for an unscaled size.
    pub fn bounds_for(&self, size: Size) -> Rect {
        Rect::from_origin_size(
            self.position,
            Size::new(size.width * self.scale_x, size.height * self.scale_y),
        )
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::at(Point::ZERO)
    }
}

/// Provenance metadata stamped on generated objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiData {
    pub prompt: String,
    pub model: ModelId,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Closed set of object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Line,
    Freehand,
    Text,
    Image,
    Video,
}

impl ShapeKind {
    /// Variant tag exposed to the style editor.
    pub fn tag(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rect",
            ShapeKind::Ellipse => "circle",
            ShapeKind::Line => "line",
            ShapeKind::Freehand => "path",
            ShapeKind::Text => "text",
            ShapeKind::Image => "image",
            ShapeKind::Video => "video",
        }
    }

    /// Raster content (video surfaces are image-wrapped media).
    pub fn is_image_like(self) -> bool {
        matches!(self, ShapeKind::Image | ShapeKind::Video)
    }

    /// Drawn overlay content used as annotations.
    pub fn is_vector_shape(self) -> bool {
        matches!(
            self,
            ShapeKind::Rectangle | ShapeKind::Ellipse | ShapeKind::Freehand | ShapeKind::Line
        )
    }
}

/// Minimum distance from a point to a line segment.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}

/// Common trait for all objects.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ObjectId;

    /// Unscaled intrinsic size.
    fn size(&self) -> Size;

    fn frame(&self) -> &Frame;

    fn frame_mut(&mut self) -> &mut Frame;

    fn style(&self) -> &ShapeStyle;

    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Scaled bounding box in scene coordinates.
    fn bounds(&self) -> Rect {
        self.frame().bounds_for(self.size())
    }

    /// Check if a point (in scene coordinates) hits this object.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }
}

/// Enum wrapper for all object kinds (for storage and serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Line(Line),
    Freehand(Freehand),
    Text(Text),
    Image(Image),
    Video(Video),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Shape::Rectangle($s) => $body,
            Shape::Ellipse($s) => $body,
            Shape::Line($s) => $body,
            Shape::Freehand($s) => $body,
            Shape::Text($s) => $body,
            Shape::Image($s) => $body,
            Shape::Video($s) => $body,
        }
    };
}

impl Shape {
    pub fn id(&self) -> ObjectId {
        dispatch!(self, s => s.id())
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Ellipse(_) => ShapeKind::Ellipse,
            Shape::Line(_) => ShapeKind::Line,
            Shape::Freehand(_) => ShapeKind::Freehand,
            Shape::Text(_) => ShapeKind::Text,
            Shape::Image(_) => ShapeKind::Image,
            Shape::Video(_) => ShapeKind::Video,
        }
    }

    pub fn size(&self) -> Size {
        dispatch!(self, s => s.size())
    }

    pub fn bounds(&self) -> Rect {
        dispatch!(self, s => s.bounds())
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        dispatch!(self, s => s.hit_test(point, tolerance))
    }

    pub fn frame(&self) -> &Frame {
        dispatch!(self, s => s.frame())
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        dispatch!(self, s => s.frame_mut())
    }

    pub fn style(&self) -> &ShapeStyle {
        dispatch!(self, s => s.style())
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        dispatch!(self, s => s.style_mut())
    }

    /// Scaled width (`width * scale_x`).
    pub fn scaled_width(&self) -> f64 {
        self.size().width * self.frame().scale_x
    }

    /// Scaled height (`height * scale_y`).
    pub fn scaled_height(&self) -> f64 {
        self.size().height * self.frame().scale_y
    }

    /// Stroke width after the object's own scale.
    pub fn scaled_stroke_width(&self) -> f64 {
        let frame = self.frame();
        self.style().stroke_width * (frame.scale_x.abs() + frame.scale_y.abs()) / 2.0
    }

    /// Painted footprint: bounds grown by half the stroke, as the host reports them.
    pub fn visual_bounds(&self) -> Rect {
        let half = match self.style().stroke {
            Some(_) => self.scaled_stroke_width() / 2.0,
            None => 0.0,
        };
        self.bounds().inflate(half, half)
    }

    /// Uniformly rescale so the scaled width matches `width`.
    pub fn scale_to_width(&mut self, width: f64) {
        let natural = self.size().width;
        if natural <= f64::EPSILON {
            return;
        }
        let scale = width / natural;
        let frame = self.frame_mut();
        frame.scale_x = scale;
        frame.scale_y = scale;
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Shape::Text(_))
    }

    /// Check if the object can be picked up and dragged.
    pub fn is_draggable(&self) -> bool {
        let frame = self.frame();
        frame.visible && !frame.locked
    }

    /// Font size, for text objects.
    pub fn font_size(&self) -> Option<f64> {
        match self {
            Shape::Text(t) => Some(t.font_size),
            _ => None,
        }
    }

    /// Provenance metadata, present only on generated objects.
    pub fn ai_data(&self) -> Option<&AiData> {
        match self {
            Shape::Image(img) => img.ai_data.as_ref(),
            Shape::Video(vid) => vid.ai_data.as_ref(),
            _ => None,
        }
    }

    /// Attach provenance metadata. Returns false for kinds that cannot carry it.
    pub fn set_ai_data(&mut self, data: AiData) -> bool {
        match self {
            Shape::Image(img) => {
                img.ai_data = Some(data);
                true
            }
            Shape::Video(vid) => {
                vid.ai_data = Some(data);
                true
            }
            _ => false,
        }
    }

    /// Source URL tag for media objects.
    pub fn source_url(&self) -> Option<&str> {
        match self {
            Shape::Image(img) => img.source_url.as_deref(),
            Shape::Video(vid) => Some(vid.url.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_roundtrip() {
        let color: SerializableColor = "#EF4444".parse().unwrap();
        assert_eq!(color, SerializableColor::rgb(0xef, 0x44, 0x44));
        assert_eq!(color.to_hex(), "#ef4444");
    }

    #[test]
    fn test_color_short_and_alpha_forms() {
        let short: SerializableColor = "#fff".parse().unwrap();
        assert_eq!(short, SerializableColor::white());

        let translucent: SerializableColor = "#00000080".parse().unwrap();
        assert_eq!(translucent.a, 0x80);
        assert_eq!(translucent.to_hex(), "#00000080");
    }

    #[test]
    fn test_color_transparent_is_none() {
        assert_eq!(SerializableColor::parse_css("transparent"), Ok(None));
        assert_eq!(SerializableColor::parse_css(""), Ok(None));
        assert!(SerializableColor::parse_css("red").is_err());
        assert_eq!(SerializableColor::from_css_lossy("nope"), None);
    }

    #[test]
    fn test_color_serializes_as_hex_string() {
        let style = ShapeStyle::outline(SerializableColor::rgb(0x3b, 0x82, 0xf6), 3.0);
        let json = serde_json::to_string(&style).unwrap();
        assert!(json.contains("\"#3b82f6\""));
        let back: ShapeStyle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, style);
    }

    #[test]
    fn test_style_colors_as_peniko() {
        let style = ShapeStyle::outline(SerializableColor::new(0x22, 0xc5, 0x5e, 0x80), 2.0);
        let rgba = style.stroke_color().unwrap().to_rgba8();
        assert_eq!((rgba.r, rgba.g, rgba.b, rgba.a), (0x22, 0xc5, 0x5e, 0x80));
        assert!(style.fill_color().is_none());
    }

    #[test]
    fn test_visual_bounds_include_stroke() {
        let line = Shape::Line(Line::new(Point::new(100.0, 100.0), Point::new(100.0, 300.0)));
        assert!(line.bounds().width().abs() < f64::EPSILON);
        let visual = line.visual_bounds();
        assert!((visual.width() - 3.0).abs() < f64::EPSILON);
        assert!((visual.height() - 203.0).abs() < f64::EPSILON);

        let mut rect = Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0));
        rect.frame_mut().scale_x = 2.0;
        rect.frame_mut().scale_y = 2.0;
        assert!((rect.scaled_stroke_width() - 6.0).abs() < f64::EPSILON);

        let text = Shape::Text(Text::new(Point::ZERO, "hi"));
        assert_eq!(text.visual_bounds(), text.bounds());
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(ShapeKind::Rectangle.tag(), "rect");
        assert_eq!(ShapeKind::Ellipse.tag(), "circle");
        assert_eq!(ShapeKind::Freehand.tag(), "path");
        assert!(ShapeKind::Video.is_image_like());
        assert!(ShapeKind::Line.is_vector_shape());
        assert!(!ShapeKind::Text.is_vector_shape());
    }

    #[test]
    fn test_scale_to_width() {
        let mut shape = Shape::Rectangle(Rectangle::new(Point::ZERO, 200.0, 100.0));
        shape.scale_to_width(400.0);
        assert!((shape.scaled_width() - 400.0).abs() < f64::EPSILON);
        assert!((shape.scaled_height() - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ai_data_only_on_media() {
        let data = AiData {
            prompt: "a cat".to_string(),
            model: ModelId::FlashImage,
            timestamp: 1,
        };
        let mut rect = Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0));
        assert!(!rect.set_ai_data(data.clone()));
        assert!(rect.ai_data().is_none());

        let image = Image::from_parts(Point::ZERO, 10, 10, ImageFormat::Png, String::new());
        let mut img = Shape::Image(image);
        assert!(img.set_ai_data(data.clone()));
        assert_eq!(img.ai_data(), Some(&data));
    }

    #[test]
    fn test_locked_or_hidden_not_draggable() {
        let mut shape = Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0));
        assert!(shape.is_draggable());
        shape.frame_mut().locked = true;
        assert!(!shape.is_draggable());
        shape.frame_mut().locked = false;
        shape.frame_mut().visible = false;
        assert!(!shape.is_draggable());
    }
}
