//! Label and dominant-color extraction.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::auth::AccessToken;
use crate::config::JudgeConfig;
use crate::error::{JudgeError, JudgeResult, Stage};
use crate::http::{build_client, external_failure};
use crate::types::{DetectionResult, DominantColor, Label};

/// Maximum labels requested per image.
pub const MAX_LABELS: u32 = 10;

/// Extracts labels and dominant colors from an image.
#[async_trait]
pub trait ImageAnnotator: Send + Sync {
    /// `image` is canonical base64 without any data-URI prefix.
    async fn annotate(&self, image: &str, token: &AccessToken) -> JudgeResult<DetectionResult>;
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Vec<LabelAnnotation>,
    #[serde(default)]
    image_properties_annotation: Option<ImageProperties>,
    #[serde(default)]
    error: Option<ProviderStatus>,
}

#[derive(Debug, Deserialize)]
struct LabelAnnotation {
    description: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageProperties {
    #[serde(default)]
    dominant_colors: Option<DominantColors>,
}

#[derive(Debug, Deserialize)]
struct DominantColors {
    #[serde(default)]
    colors: Vec<ColorInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColorInfo {
    #[serde(default)]
    color: RgbColor,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    pixel_fraction: f64,
}

/// Channels are floats on the wire; absent channels are zero.
#[derive(Debug, Default, Deserialize)]
struct RgbColor {
    #[serde(default)]
    red: f64,
    #[serde(default)]
    green: f64,
    #[serde(default)]
    blue: f64,
}

#[derive(Debug, Deserialize)]
struct ProviderStatus {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

impl From<ColorInfo> for DominantColor {
    fn from(info: ColorInfo) -> Self {
        Self {
            red: channel(info.color.red),
            green: channel(info.color.green),
            blue: channel(info.color.blue),
            score: info.score,
            pixel_fraction: info.pixel_fraction,
        }
    }
}

/// Convert a decoded annotate response into a detection result.
fn detection_from(response: AnnotateResponse) -> JudgeResult<DetectionResult> {
    let first = response
        .responses
        .into_iter()
        .next()
        .ok_or_else(|| JudgeError::envelope(Stage::ImageAnalysis, "response contains no results"))?;

    if let Some(err) = first.error {
        let status = err.status.as_deref().unwrap_or("ERROR");
        return Err(JudgeError::ExternalService {
            stage: Stage::ImageAnalysis,
            status: None,
            message: format!("provider error {} ({}): {}", err.code.unwrap_or(0), status, err.message),
        });
    }

    let labels = first
        .label_annotations
        .into_iter()
        .map(|l| Label {
            description: l.description,
            score: l.score,
        })
        .collect();

    let colors = first
        .image_properties_annotation
        .and_then(|p| p.dominant_colors)
        .map(|d| d.colors.into_iter().map(DominantColor::from).collect())
        .unwrap_or_default();

    Ok(DetectionResult { labels, colors })
}

/// Client for the `images:annotate` endpoint.
#[derive(Debug, Clone)]
pub struct VisionClient {
    client: reqwest::Client,
    url: String,
}

impl VisionClient {
    pub fn new(config: &JudgeConfig) -> JudgeResult<Self> {
        Ok(Self::with_http_client(build_client(config)?, &config.vision_url))
    }

    pub fn with_http_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ImageAnnotator for VisionClient {
    async fn annotate(&self, image: &str, token: &AccessToken) -> JudgeResult<DetectionResult> {
        let body = json!({
            "requests": [{
                "image": { "content": image },
                "features": [
                    { "type": "LABEL_DETECTION", "maxResults": MAX_LABELS },
                    { "type": "IMAGE_PROPERTIES" }
                ]
            }]
        });

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(token.secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| JudgeError::transport(Stage::ImageAnalysis, e))?;

        if !response.status().is_success() {
            return Err(external_failure(Stage::ImageAnalysis, response).await);
        }

        let decoded: AnnotateResponse = response.json().await.map_err(|e| {
            JudgeError::envelope(
                Stage::ImageAnalysis,
                format!("failed to parse annotate response: {}", e.without_url()),
            )
        })?;

        let detection = detection_from(decoded)?;
        tracing::debug!(
            labels = detection.labels.len(),
            colors = detection.colors.len(),
            "image annotated"
        );
        Ok(detection)
    }
}
