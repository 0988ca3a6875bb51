//! Judging orchestrator: validation, stage sequencing and outcome shaping.

use std::sync::Arc;

use crate::auth::{TokenExchangeClient, TokenSource};
use crate::config::JudgeConfig;
use crate::credentials::{ApiKey, Credentials};
use crate::error::{JudgeError, JudgeResult};
use crate::image::normalize_image_payload;
use crate::judgment::{GeminiClient, JudgmentProvider};
use crate::types::{Difficulty, JudgeFailure, JudgeRequestBody, JudgeSuccess, JudgmentRequest};
use crate::vision::{ImageAnnotator, VisionClient};

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub theme: String,
    pub difficulty: Difficulty,
    /// Canonical base64, prefix stripped.
    pub image: String,
}

/// Check an inbound body without touching the network.
pub fn validate(body: JudgeRequestBody) -> JudgeResult<ValidatedRequest> {
    let theme = body
        .theme
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| JudgeError::invalid("theme is required and must be a non-empty string"))?;

    let raw_image = body
        .image_data
        .ok_or_else(|| JudgeError::invalid("imageData is required"))?;
    let image = normalize_image_payload(&raw_image)?;

    let difficulty = match body.difficulty.as_deref() {
        None | Some("") => Difficulty::default(),
        Some(value) => value.parse().map_err(JudgeError::invalid)?,
    };

    Ok(ValidatedRequest {
        theme,
        difficulty,
        image,
    })
}

/// Runs token exchange, image analysis and judgment in sequence.
#[derive(Clone)]
pub struct Judge {
    tokens: Arc<dyn TokenSource>,
    annotator: Arc<dyn ImageAnnotator>,
    provider: Arc<dyn JudgmentProvider>,
    credentials: Option<Credentials>,
    api_key: Option<ApiKey>,
}

impl Judge {
    pub fn new(
        tokens: Arc<dyn TokenSource>,
        annotator: Arc<dyn ImageAnnotator>,
        provider: Arc<dyn JudgmentProvider>,
    ) -> Self {
        Self {
            tokens,
            annotator,
            provider,
            credentials: None,
            api_key: None,
        }
    }

    /// Build the production pipeline from configuration.
    pub fn from_config(
        config: &JudgeConfig,
        credentials: Option<Credentials>,
        api_key: Option<ApiKey>,
    ) -> JudgeResult<Self> {
        let judge = Self::new(
            Arc::new(TokenExchangeClient::new(config)?),
            Arc::new(VisionClient::new(config)?),
            Arc::new(GeminiClient::new(config)?),
        );
        Ok(Self {
            credentials,
            api_key,
            ..judge
        })
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_api_key(mut self, api_key: ApiKey) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Whether both provider secrets are present.
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some() && self.api_key.is_some()
    }

    /// Judge one photo. Any stage failure fails the whole judgment.
    pub async fn judge(&self, body: JudgeRequestBody) -> JudgeResult<JudgeSuccess> {
        let request = validate(body)?;

        let (credentials, api_key) = match (&self.credentials, &self.api_key) {
            (Some(c), Some(k)) => (c, k),
            _ => {
                return Err(JudgeError::config(
                    "provider credentials are not configured",
                ))
            }
        };

        tracing::debug!(theme = %request.theme, difficulty = %request.difficulty, "judging photo");

        let token = self.tokens.access_token(credentials).await?;
        let detection = self.annotator.annotate(&request.image, &token).await?;

        let judgment_request = JudgmentRequest::new(request.theme, request.difficulty, &detection);
        let result = self.provider.judge(&judgment_request, api_key).await?;

        tracing::info!(
            theme = %judgment_request.theme,
            difficulty = %judgment_request.difficulty,
            score = result.score,
            labels = judgment_request.labels.len(),
            "judgment complete"
        );

        Ok(JudgeSuccess::new(judgment_request, result))
    }

    /// Judge and shape the outcome as `(status, body)` for the HTTP layer.
    pub async fn respond(&self, body: JudgeRequestBody) -> (u16, serde_json::Value) {
        match self.judge(body).await {
            Ok(success) => (200, serde_json::to_value(success).unwrap_or_default()),
            Err(err) => failure_response(&err),
        }
    }
}

/// Status and `{ success: false, error }` body for a failure.
pub fn failure_response(err: &JudgeError) -> (u16, serde_json::Value) {
    let status = err.http_status();
    if status >= 500 {
        tracing::warn!(status, error = %err, "judgment failed");
    } else {
        tracing::debug!(status, error = %err, "judgment rejected");
    }
    (
        status,
        serde_json::to_value(JudgeFailure::new(err.to_string())).unwrap_or_default(),
    )
}
