use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::playlist::PlaylistError;
use thiserror::Error;
use tracing::{error, warn};

/// JSON error body: `{"error": <title>, "message": <detail>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        Self { status, error, message }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", Some(message.into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({"error": self.error, "message": self.message}))).into_response()
    }
}

impl From<PlaylistError> for JsonApiError {
    fn from(e: PlaylistError) -> Self {
        let (status, title) = match &e {
            PlaylistError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            PlaylistError::NotFound => (StatusCode::NOT_FOUND, "Not Found"),
            PlaylistError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
            PlaylistError::Cancelled => (StatusCode::REQUEST_TIMEOUT, "Cancelled"),
            PlaylistError::DeadlineExceeded => (StatusCode::GATEWAY_TIMEOUT, "Deadline Exceeded"),
            PlaylistError::Repository(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Storage Error"),
        };
        if status.is_server_error() {
            error!(err = %e, code = e.code(), "playlist operation failed");
        } else if e.is_cancellation() {
            warn!(err = %e, code = e.code(), "playlist operation aborted");
        }
        Self::new(status, title, Some(e.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
