use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure of the single outbound call to the model provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, TLS, body read)
    #[error("request to model provider failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Provider answered with a non-success status
    #[error("model provider returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    /// Provider answered 2xx but the body is not a chat completion
    #[error("invalid response from model provider: {0}")]
    Decode(String),
    /// Chat completion carried no choice or no text content
    #[error("model provider returned an empty completion")]
    EmptyResponse,
}

impl ProviderError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
            Self::EmptyResponse => "empty_response",
        }
    }
}

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected upload, no upstream call was made
    #[error("{0}")]
    InvalidInput(String),
    /// Upstream model call failed
    #[error("AI Error: {0}")]
    Upstream(#[from] ProviderError),
    /// Multipart body could not be read; carries the status axum assigned
    #[error("Malformed upload: {message}")]
    Upload { status: StatusCode, message: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Upload { status, .. } => *status,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::InvalidInput(msg) => tracing::debug!(reason = %msg, "Rejected request"),
            Self::Upload { status, message } => {
                tracing::debug!(status = %status, reason = %message, "Rejected upload")
            }
            Self::Upstream(err) => tracing::warn!(kind = err.kind(), error = %err, "Upstream failure"),
        }

        let body = Json(json!({
            "detail": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        Self::Upload {
            status: err.status(),
            message: err.body_text(),
        }
    }
}
