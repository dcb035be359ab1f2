//! Generation requests: assembling context from the canvas and integrating results.

mod assembler;
mod integrator;

pub use assembler::{
    AssemblerConfig, Classification, annotation_directive, annotation_instructions, assemble,
    classify, color_name, upscale_multiplier,
};
pub use integrator::{integrate_image, integrate_video};

use crate::BoxFuture;
use crate::scene::SceneError;
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Generative models the editor can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    #[serde(rename = "gemini-2.5-flash-image")]
    FlashImage,
    #[serde(rename = "gemini-3-pro-image-preview")]
    ProImage,
    #[serde(rename = "veo-2.0-generate-preview")]
    VideoFast,
    #[serde(rename = "veo-3.1-generate-preview")]
    VideoHq,
}

impl ModelId {
    pub const ALL: [ModelId; 4] = [
        ModelId::FlashImage,
        ModelId::ProImage,
        ModelId::VideoFast,
        ModelId::VideoHq,
    ];

    /// Wire identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelId::FlashImage => "gemini-2.5-flash-image",
            ModelId::ProImage => "gemini-3-pro-image-preview",
            ModelId::VideoFast => "veo-2.0-generate-preview",
            ModelId::VideoHq => "veo-3.1-generate-preview",
        }
    }

    pub fn is_video(self) -> bool {
        matches!(self, ModelId::VideoFast | ModelId::VideoHq)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base64-encoded PNG payload (no `data:` prefix).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Base64Image(pub String);

impl Base64Image {
    pub fn from_png_bytes(bytes: &[u8]) -> Self {
        Self(STANDARD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.0)
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.0)
    }
}

/// Request sent to the remote model. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: ModelId,
    pub images: Vec<Base64Image>,
    /// Size used by the remote side to pick an aspect ratio.
    pub reference_width: f64,
    pub reference_height: f64,
}

impl GenerationRequest {
    pub fn aspect_ratio(&self) -> &'static str {
        closest_aspect_ratio(self.reference_width, self.reference_height)
    }
}

/// Which assembly branch produced a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Flattened selection.
    Standard,
    /// One payload per selected image.
    MultiImage,
    /// Images with shape overlays turned into edit instructions.
    Annotation,
    /// Nothing selected: the visible viewport (or no image for video).
    Viewport,
}

/// Where the result lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Top-left corner of the result in scene coordinates.
    pub anchor: Point,
    /// Width the result is scaled to.
    pub visual_width: f64,
}

/// Everything produced by the assembler for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationContext {
    pub request: GenerationRequest,
    pub mode: GenerationMode,
    pub placement: Placement,
}

/// Image returned by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResult {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Remote URL, when the image was fetched rather than inlined.
    pub source_url: Option<String>,
}

/// Errors from the generation pipeline.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no selection to generate from")]
    EmptySelection,
    #[error("a generation is already in progress")]
    Busy,
    #[error("the editor has been torn down")]
    SceneUnavailable,
    #[error("remote request failed: {0}")]
    RemoteRequestFailed(String),
    #[error("response did not contain a result")]
    MissingResultPayload,
    #[error("failed to load result: {0}")]
    DecodeFailure(String),
    #[error("failed to rasterize context: {0}")]
    Rasterization(#[from] SceneError),
}

/// Remote generation service.
pub trait GenerationBackend {
    fn generate_image<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<ImageResult, GenerationError>>;

    /// Returns a playable video URL.
    fn generate_video<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<String, GenerationError>>;
}

/// Supported output aspect ratios and their numeric values.
const ASPECT_RATIOS: [(&str, f64); 5] = [
    ("1:1", 1.0),
    ("3:4", 0.75),
    ("4:3", 1.333),
    ("9:16", 0.5625),
    ("16:9", 1.777),
];

/// Nearest supported aspect ratio for a reference size. Earlier entries win ties.
pub fn closest_aspect_ratio(width: f64, height: f64) -> &'static str {
    if !(width > 0.0 && height > 0.0) {
        return "1:1";
    }
    let ratio = width / height;
    ASPECT_RATIOS
        .iter()
        .fold(ASPECT_RATIOS[0], |best, &cur| {
            if (cur.1 - ratio).abs() < (best.1 - ratio).abs() {
                cur
            } else {
                best
            }
        })
        .0
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_ids_serialize_as_wire_names() {
        for model in ModelId::ALL {
            let json = serde_json::to_string(&model).unwrap();
            assert_eq!(json, format!("\"{}\"", model.as_str()));
        }
        assert!(ModelId::VideoHq.is_video());
        assert!(!ModelId::ProImage.is_video());
    }

    #[test]
    fn test_closest_aspect_ratio() {
        assert_eq!(closest_aspect_ratio(1920.0, 1080.0), "16:9");
        assert_eq!(closest_aspect_ratio(1080.0, 1920.0), "9:16");
        assert_eq!(closest_aspect_ratio(400.0, 300.0), "4:3");
        assert_eq!(closest_aspect_ratio(300.0, 400.0), "3:4");
        assert_eq!(closest_aspect_ratio(500.0, 510.0), "1:1");
        assert_eq!(closest_aspect_ratio(0.0, 100.0), "1:1");
    }

    #[test]
    fn test_base64_image_data_url() {
        let img = Base64Image::from_png_bytes(&[1, 2, 3]);
        assert_eq!(img.to_data_url(), "data:image/png;base64,AQID");
        assert_eq!(img.decode().unwrap(), vec![1, 2, 3]);
    }
}
