use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Serialize;
use tracing::error;

/// Canonical JSON payload for error responses.
#[derive(Debug, Serialize, Clone)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body returned by deletes and password changes.
#[derive(Debug, Serialize, Clone)]
pub struct ApiSuccess {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiSuccess {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

pub type ApiFailure = (StatusCode, Json<ApiError>);

/// Helper for controllers that need to return `(StatusCode, Json<ApiError>)`.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> ApiFailure {
    (status, Json(ApiError::new(message)))
}

pub fn bad_request(message: impl Into<String>) -> ApiFailure {
    json_error(StatusCode::BAD_REQUEST, message)
}

pub fn not_found(message: impl Into<String>) -> ApiFailure {
    json_error(StatusCode::NOT_FOUND, message)
}

/// Log the failure and hide its details behind a generic message.
pub fn internal_error(err: anyhow::Error, message: &str) -> ApiFailure {
    error!(?err, "{message}");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// Unwrap a JSON body, turning extractor rejections into a 400 with our error shape.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiFailure> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| bad_request(format!("请求数据无效: {}", rejection.body_text())))
}

/// Trimmed, non-empty view of an optional request field.
pub fn required(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
