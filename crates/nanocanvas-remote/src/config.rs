//! Remote client configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_VIDEO_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteTimeouts {
    pub request_secs: u64,
    /// Video generation runs much longer on the remote side.
    pub video_secs: u64,
    pub connect_secs: u64,
}

impl RemoteTimeouts {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn video(&self) -> Duration {
        Duration::from_secs(self.video_secs)
    }

    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for RemoteTimeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            video_secs: DEFAULT_VIDEO_TIMEOUT_SECS,
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    pub timeouts: RemoteTimeouts,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl RemoteConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeouts: RemoteTimeouts::default(),
        }
    }

    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `NANOCANVAS_API_BASE_URL`: default `http://localhost:3000`
    /// - `NANOCANVAS_REQUEST_TIMEOUT_SECS`: default 120
    /// - `NANOCANVAS_VIDEO_TIMEOUT_SECS`: default 600
    /// - `NANOCANVAS_CONNECT_TIMEOUT_SECS`: default 10
    pub fn from_env() -> Self {
        let base_url = std::env::var("NANOCANVAS_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        Self {
            timeouts: RemoteTimeouts {
                request_secs: env_parse_u64(
                    "NANOCANVAS_REQUEST_TIMEOUT_SECS",
                    DEFAULT_REQUEST_TIMEOUT_SECS,
                ),
                video_secs: env_parse_u64(
                    "NANOCANVAS_VIDEO_TIMEOUT_SECS",
                    DEFAULT_VIDEO_TIMEOUT_SECS,
                ),
                connect_secs: env_parse_u64(
                    "NANOCANVAS_CONNECT_TIMEOUT_SECS",
                    DEFAULT_CONNECT_TIMEOUT_SECS,
                ),
            },
            ..Self::new(&base_url)
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = RemoteConfig::new("https://api.example.com//");
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(
            config.endpoint("/api/ai/image/generate"),
            "https://api.example.com/api/ai/image/generate"
        );
    }

    #[test]
    fn test_default_timeouts() {
        let timeouts = RemoteConfig::default().timeouts;
        assert_eq!(timeouts.request(), Duration::from_secs(120));
        assert_eq!(timeouts.video(), Duration::from_secs(600));
        assert_eq!(timeouts.connect(), Duration::from_secs(10));
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        assert_eq!(env_parse_u64("NANOCANVAS_TEST_UNSET_VARIABLE", 7), 7);
    }
}
