//! Error types for the judging pipeline.

use std::fmt;

/// Pipeline stage that talks to an external provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// OAuth2 assertion exchange.
    TokenExchange,
    /// Label and dominant-color extraction.
    ImageAnalysis,
    /// Text-generation scoring.
    Judgment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TokenExchange => "token exchange",
            Self::ImageAnalysis => "image analysis",
            Self::Judgment => "judgment",
        })
    }
}

/// Why a provider's success response could not be used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedKind {
    /// The outer JSON document did not have the expected shape.
    #[error("unexpected envelope: {message}")]
    Envelope { message: String },

    /// The model text inside the envelope was not the requested JSON object.
    #[error("unparseable result payload: {message}")]
    Payload { message: String },

    /// The score parsed but lies outside [0.0, 1.0].
    #[error("score {score} outside [0.0, 1.0]")]
    ScoreOutOfRange { score: f64 },
}

/// Judging errors.
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    /// Client input was malformed.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Server-side credentials are missing or unusable.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The token endpoint rejected the signed assertion.
    #[error("token exchange rejected: HTTP {status} - {body}")]
    Authentication { status: u16, body: String },

    /// A provider returned a non-success status, an embedded error, or never answered.
    #[error("{stage} failed: {message}")]
    ExternalService {
        stage: Stage,
        status: Option<u16>,
        message: String,
    },

    /// A provider's success response did not have the expected shape.
    #[error("malformed {stage} response: {kind}")]
    MalformedResponse { stage: Stage, kind: MalformedKind },
}

impl JudgeError {
    /// HTTP status reported to the caller.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. } => 400,
            Self::Authentication { .. } => 401,
            Self::ExternalService { .. } => 502,
            Self::Config { .. } => 500,
            Self::MalformedResponse { .. } => 500,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Map a transport failure, dropping the URL so query-string secrets stay out of messages.
    pub(crate) fn transport(stage: Stage, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.without_url().to_string()
        };
        Self::ExternalService {
            stage,
            status: None,
            message,
        }
    }

    pub(crate) fn envelope(stage: Stage, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            stage,
            kind: MalformedKind::Envelope {
                message: message.into(),
            },
        }
    }
}

/// Result type for judging operations.
pub type JudgeResult<T> = Result<T, JudgeError>;
