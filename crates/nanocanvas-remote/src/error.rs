use nanocanvas_core::GenerationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// Transport failure or timeout.
    #[error("request failed: {0}")]
    Request(String),

    /// Non-2xx status.
    #[error("generation service returned status {status}")]
    Response { status: u16, body: String },

    /// The service answered with `success: false`.
    #[error("generation failed: {0}")]
    Rejected(String),

    /// Body could not be parsed.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// Successful response without an image or video field.
    #[error("response did not contain a result")]
    MissingPayload,
}

impl From<RemoteError> for GenerationError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::MissingPayload => GenerationError::MissingResultPayload,
            other => GenerationError::RemoteRequestFailed(other.to_string()),
        }
    }
}
