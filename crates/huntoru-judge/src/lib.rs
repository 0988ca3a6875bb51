//! Photo judging pipeline for the HunToru game.
//!
//! A judgment runs three provider calls in sequence:
//!
//! - exchange a signed service-account assertion for a bearer token
//! - extract labels and dominant colors from the photo
//! - ask a text-generation model for a `{ score, reason }` verdict
//!
//! # Quick Start
//!
//! ```no_run
//! use huntoru_judge::{ApiKey, Credentials, Judge, JudgeConfig, JudgeRequestBody};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let judge = Judge::from_config(&JudgeConfig::from_env(), Credentials::from_env()?, ApiKey::from_env())?;
//!
//! let body = JudgeRequestBody {
//!     theme: Some("赤いコップ".into()),
//!     image_data: Some("data:image/jpeg;base64,/9j/4AAQSkZJRg==".into()),
//!     difficulty: Some("HARD".into()),
//! };
//! let (status, json) = judge.respond(body).await;
//! println!("{status}: {json}");
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `GOOGLE_CLOUD_SERVICE_ACCOUNT_KEY` | Service-account JSON key document |
//! | `GEMINI_API_KEY` | Text-generation API key |
//! | `HUNTORU_VISION_URL` | Image-analysis endpoint |
//! | `HUNTORU_GEMINI_BASE_URL` | Text-generation base URL |
//! | `HUNTORU_GEMINI_MODEL` | Text-generation model (default: `gemini-1.5-flash`) |
//! | `HUNTORU_HTTP_TIMEOUT` | Outbound timeout in seconds (default: 30) |
//! | `HUNTORU_TOKEN_CACHE` | Reuse bearer tokens until shortly before expiry |

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
mod http;
pub mod image;
pub mod judge;
pub mod judgment;
pub mod themes;
pub mod types;
pub mod vision;

/// User agent sent on every outbound request.
pub const USER_AGENT: &str = concat!("huntoru-judge/", env!("CARGO_PKG_VERSION"));

pub use auth::{sign_assertion, AccessToken, TokenExchangeClient, TokenSource};
pub use config::JudgeConfig;
pub use credentials::{ApiKey, Credentials};
pub use error::{JudgeError, JudgeResult, MalformedKind, Stage};
pub use image::normalize_image_payload;
pub use judge::{failure_response, validate, Judge, ValidatedRequest};
pub use judgment::{build_prompt, parse_judgment, GeminiClient, JudgmentProvider};
pub use themes::{InMemoryCatalog, ThemeCatalog};
pub use types::{
    DetectionResult, Difficulty, DominantColor, JudgeFailure, JudgeRequestBody, JudgeSuccess,
    JudgmentRequest, JudgmentResult, Label, Theme,
};
pub use vision::{ImageAnnotator, VisionClient};
