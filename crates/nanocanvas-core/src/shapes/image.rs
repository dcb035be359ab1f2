//! Raster image objects.

use super::{AiData, Frame, ObjectId, ShapeStyle, ShapeTrait};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use uuid::Uuid;

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// Errors raised while turning bytes into an image object.
#[derive(Debug, thiserror::Error)]
pub enum ImageDataError {
    #[error("unrecognised image format")]
    UnknownFormat,
    #[error("image has zero size")]
    Empty,
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

/// A raster image. Native size is the pixel size; display size comes from the frame scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub(crate) id: ObjectId,
    pub frame: Frame,
    pub source_width: u32,
    pub source_height: u32,
    pub format: ImageFormat,
    /// Encoded image bytes as base64.
    pub data_base64: String,
    /// Remote URL the bytes came from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_data: Option<AiData>,
    pub style: ShapeStyle,
}

impl Image {
    /// Build an image from already-known parts.
    pub fn from_parts(
        position: Point,
        source_width: u32,
        source_height: u32,
        format: ImageFormat,
        data_base64: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame: Frame::at(position),
            source_width,
            source_height,
            format,
            data_base64,
            source_url: None,
            ai_data: None,
            style: ShapeStyle {
                stroke: None,
                stroke_width: 0.0,
                fill: None,
            },
        }
    }

    /// Decode encoded bytes (PNG, JPEG or WebP) to learn their pixel size.
    pub fn decode(position: Point, data: &[u8]) -> Result<Self, ImageDataError> {
        let format = ImageFormat::from_magic_bytes(data).ok_or(ImageDataError::UnknownFormat)?;
        let (width, height) = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_dimensions()?;
        if width == 0 || height == 0 {
            return Err(ImageDataError::Empty);
        }
        Ok(Self::from_parts(
            position,
            width,
            height,
            format,
            STANDARD.encode(data),
        ))
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Get the raw image data (decoded from base64).
    pub fn data(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.data_base64).ok()
    }

    /// `data:` URL for the encoded bytes.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.data_base64)
    }
}

impl ShapeTrait for Image {
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

    fn tiny_png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer
                .write_image_data(&vec![255u8; (width * height * 4) as usize])
                .unwrap();
        }
        out
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("gif"), None);
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF8"), None);
    }

    #[test]
    fn test_decode_reads_dimensions() {
        let img = Image::decode(Point::new(10.0, 20.0), &tiny_png(8, 4)).unwrap();
        assert_eq!((img.source_width, img.source_height), (8, 4));
        assert_eq!(img.format, ImageFormat::Png);
        assert!(img.ai_data.is_none());
        let bounds = img.bounds();
        assert!((bounds.x1 - 18.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 24.0).abs() < f64::EPSILON);
        assert!(img.data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            Image::decode(Point::ZERO, b"not an image"),
            Err(ImageDataError::UnknownFormat)
        ));
        let mut truncated = tiny_png(4, 4);
        truncated.truncate(12);
        assert!(Image::decode(Point::ZERO, &truncated).is_err());
    }
}
