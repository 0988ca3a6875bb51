//! HTTP plumbing shared by the provider clients.

use crate::config::JudgeConfig;
use crate::error::{JudgeError, JudgeResult, Stage};

/// Provider error bodies are cut to this many characters in messages.
const MAX_ERROR_BODY_CHARS: usize = 512;

pub(crate) fn build_client(config: &JudgeConfig) -> JudgeResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .user_agent(crate::USER_AGENT)
        .build()
        .map_err(|e| JudgeError::config(format!("failed to create HTTP client: {e}")))
}

/// Turn a non-success response into an [`JudgeError::ExternalService`].
pub(crate) async fn external_failure(stage: Stage, response: reqwest::Response) -> JudgeError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%stage, status = status.as_u16(), "provider returned an error status");
    JudgeError::ExternalService {
        stage,
        status: Some(status.as_u16()),
        message: format!("HTTP {} - {}", status, truncate(body.trim())),
    }
}

pub(crate) fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
