//! HTTP client for the generation service.

use crate::config::RemoteConfig;
use crate::error::RemoteError;
use base64::{Engine, engine::general_purpose::STANDARD};
use nanocanvas_core::generation::now_millis;
use nanocanvas_core::{
    BoxFuture, GenerationBackend, GenerationError, GenerationRequest, ImageResult, ModelId,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

const IMAGE_PATH: &str = "/api/ai/image/generate";
const VIDEO_PATH: &str = "/api/ai/video/generate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageOperation {
    Image,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageStatus {
    Success,
    Error,
}

/// Billing record for one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageEvent {
    pub model: ModelId,
    pub operation: UsageOperation,
    pub status: UsageStatus,
    pub timestamp: i64,
}

type UsageHook = Box<dyn Fn(&UsageEvent) + Send + Sync>;

pub struct HttpGenerationClient {
    http: reqwest::Client,
    config: RemoteConfig,
    usage_hook: Option<UsageHook>,
}

impl HttpGenerationClient {
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| RemoteError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            config,
            usage_hook: None,
        })
    }

    pub fn from_env() -> Result<Self, RemoteError> {
        Self::new(RemoteConfig::from_env())
    }

    /// Receive a [`UsageEvent`] after every call, successful or not.
    pub fn with_usage_hook(mut self, hook: impl Fn(&UsageEvent) + Send + Sync + 'static) -> Self {
        self.usage_hook = Some(Box::new(hook));
        self
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Generate or edit an image, returning the encoded result bytes.
    pub async fn generate_image(
        &self,
        request: &GenerationRequest,
    ) -> Result<ImageResult, RemoteError> {
        let result = self.fetch_image(request).await;
        self.record_usage(request.model, UsageOperation::Image, result.is_ok());
        result
    }

    /// Generate a video, returning its playable URL.
    pub async fn generate_video(&self, request: &GenerationRequest) -> Result<String, RemoteError> {
        let result = self
            .post(VIDEO_PATH, request, self.config.timeouts.video())
            .await
            .and_then(|data| {
                data.video_url
                    .filter(|u| !u.is_empty())
                    .ok_or(RemoteError::MissingPayload)
            });
        self.record_usage(request.model, UsageOperation::Video, result.is_ok());
        result
    }

    async fn fetch_image(&self, request: &GenerationRequest) -> Result<ImageResult, RemoteError> {
        let data = self
            .post(IMAGE_PATH, request, self.config.timeouts.request())
            .await?;

        if let Some(b64) = data.image_base64.filter(|b| !b.is_empty()) {
            let bytes = STANDARD
                .decode(b64.trim())
                .map_err(|e| RemoteError::Parse(e.to_string()))?;
            return Ok(ImageResult {
                bytes,
                source_url: None,
            });
        }

        let url = data
            .image_url
            .or(data.edited_image_url)
            .filter(|u| !u.is_empty())
            .ok_or(RemoteError::MissingPayload)?;
        if url.starts_with("data:") {
            return Ok(ImageResult {
                bytes: decode_data_url(&url)?,
                source_url: None,
            });
        }

        let bytes = self.download(&url).await?;
        Ok(ImageResult {
            bytes,
            source_url: Some(url),
        })
    }

    async fn post(
        &self,
        path: &str,
        request: &GenerationRequest,
        timeout: Duration,
    ) -> Result<ResultData, RemoteError> {
        let body = WireRequest::from(request);
        info!(model = %request.model, images = request.images.len(), "POST {}", path);

        let response = self
            .http
            .post(self.config.endpoint(path))
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;
        if !(200..300).contains(&status) {
            warn!(status, "generation service error");
            return Err(RemoteError::Response { status, body: text });
        }
        parse_response(&text)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        let response = self
            .http
            .get(url)
            .timeout(self.config.timeouts.request())
            .send()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(RemoteError::Response {
                status,
                body: String::new(),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn record_usage(&self, model: ModelId, operation: UsageOperation, ok: bool) {
        let Some(hook) = &self.usage_hook else {
            return;
        };
        hook(&UsageEvent {
            model,
            operation,
            status: if ok {
                UsageStatus::Success
            } else {
                UsageStatus::Error
            },
            timestamp: now_millis(),
        });
    }
}

impl GenerationBackend for HttpGenerationClient {
    fn generate_image<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<ImageResult, GenerationError>> {
        Box::pin(async move { Ok(HttpGenerationClient::generate_image(self, request).await?) })
    }

    fn generate_video<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<String, GenerationError>> {
        Box::pin(async move { Ok(HttpGenerationClient::generate_video(self, request).await?) })
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    prompt: &'a str,
    model: ModelId,
    /// First payload image as a data URL, for single-image endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    /// Every payload image as a data URL, in selection order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    aspect_ratio: &'static str,
}

impl<'a> From<&'a GenerationRequest> for WireRequest<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        let images: Vec<String> = request.images.iter().map(|img| img.to_data_url()).collect();
        Self {
            prompt: &request.prompt,
            model: request.model,
            image: images.first().cloned(),
            images,
            aspect_ratio: request.aspect_ratio(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    success: bool,
    data: Option<ResultData>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultData {
    image_url: Option<String>,
    edited_image_url: Option<String>,
    image_base64: Option<String>,
    video_url: Option<String>,
}

fn parse_response(text: &str) -> Result<ResultData, RemoteError> {
    let envelope: WireResponse =
        serde_json::from_str(text).map_err(|e| RemoteError::Parse(e.to_string()))?;
    if !envelope.success {
        let message = envelope.error.unwrap_or_else(|| "unknown error".to_string());
        return Err(RemoteError::Rejected(message));
    }
    envelope.data.ok_or(RemoteError::MissingPayload)
}

/// Decode a `data:<mime>;base64,<payload>` URL.
fn decode_data_url(url: &str) -> Result<Vec<u8>, RemoteError> {
    let (header, payload) = url
        .split_once(',')
        .ok_or_else(|| RemoteError::Parse("malformed data URL".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(RemoteError::Parse("data URL is not base64".to_string()));
    }
    STANDARD
        .decode(payload)
        .map_err(|e| RemoteError::Parse(e.to_string()))
}
