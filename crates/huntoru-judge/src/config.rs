//! Provider endpoints and client settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default image-analysis endpoint.
pub const DEFAULT_VISION_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Default text-generation base URL (model name and method are appended).
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default text-generation model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Endpoint and client configuration for the judging pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Image-analysis endpoint.
    #[serde(default = "default_vision_url")]
    pub vision_url: String,

    /// Text-generation base URL.
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Text-generation model name.
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Per-request timeout for every outbound call, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Reuse bearer tokens across judgments until shortly before expiry.
    #[serde(default)]
    pub token_cache: bool,
}

fn default_vision_url() -> String {
    DEFAULT_VISION_URL.to_string()
}

fn default_gemini_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            vision_url: default_vision_url(),
            gemini_base_url: default_gemini_base_url(),
            gemini_model: default_gemini_model(),
            timeout_secs: default_timeout(),
            token_cache: false,
        }
    }
}

impl JudgeConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `HUNTORU_VISION_URL` | Image-analysis endpoint |
    /// | `HUNTORU_GEMINI_BASE_URL` | Text-generation base URL |
    /// | `HUNTORU_GEMINI_MODEL` | Text-generation model |
    /// | `HUNTORU_HTTP_TIMEOUT` | Outbound timeout in seconds (default: 30) |
    /// | `HUNTORU_TOKEN_CACHE` | Reuse bearer tokens (`1` or `true`) |
    pub fn from_env() -> Self {
        Self {
            vision_url: std::env::var("HUNTORU_VISION_URL").unwrap_or_else(|_| default_vision_url()),
            gemini_base_url: std::env::var("HUNTORU_GEMINI_BASE_URL")
                .unwrap_or_else(|_| default_gemini_base_url()),
            gemini_model: std::env::var("HUNTORU_GEMINI_MODEL")
                .unwrap_or_else(|_| default_gemini_model()),
            timeout_secs: std::env::var("HUNTORU_HTTP_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or_else(default_timeout),
            token_cache: std::env::var("HUNTORU_TOKEN_CACHE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    /// Set the image-analysis endpoint.
    pub fn with_vision_url(mut self, url: impl Into<String>) -> Self {
        self.vision_url = url.into();
        self
    }

    /// Set the text-generation base URL.
    pub fn with_gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.gemini_base_url = url.into();
        self
    }

    /// Set the outbound timeout. Zero falls back to the default.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = if secs == 0 { default_timeout() } else { secs };
        self
    }

    /// Outbound timeout. Zero means the default.
    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(default_timeout()),
            secs => Duration::from_secs(secs),
        }
    }

    /// Enable or disable bearer token reuse.
    pub fn with_token_cache(mut self, enabled: bool) -> Self {
        self.token_cache = enabled;
        self
    }

    /// Full `generateContent` URL for the configured model, without the key.
    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.gemini_base_url.trim_end_matches('/'),
            self.gemini_model
        )
    }
}
