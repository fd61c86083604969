use crate::models::ErrorResponse;
use crate::validator::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Request body was not declared as JSON.
    InvalidContentType,
    /// Request body could not be decoded as JSON.
    MalformedJson(String),
    /// Payload decoded but failed the quotation shape checks.
    Validation(ValidationError),
    /// Request body exceeded the configured size limit.
    PayloadTooLarge,
    /// Client exceeded the ingest rate limit.
    RateLimited { wait_secs: u64 },
    /// Error interacting with an external API.
    ExternalApiError(String),
    /// Internal server error.
    InternalError(String),
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidContentType => write!(f, "Content-Type must be application/json"),
            AppError::MalformedJson(detail) => write!(f, "Malformed JSON: {}", detail),
            AppError::Validation(e) => write!(f, "Validation failed: {}", e),
            AppError::PayloadTooLarge => write!(f, "Request body too large"),
            AppError::RateLimited { wait_secs } => {
                write!(f, "Rate limit exceeded, retry in {}s", wait_secs)
            }
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidContentType
            | AppError::MalformedJson(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Client errors echo their reason; server-side details are logged and
    /// replaced with a generic message.
    fn into_response(self) -> Response {
        let (error, message) = match &self {
            AppError::InvalidContentType => {
                tracing::warn!("Rejected request: {}", self);
                (
                    "Invalid content type",
                    "Content-Type must be application/json".to_string(),
                )
            }
            AppError::MalformedJson(detail) => {
                tracing::warn!("Rejected malformed JSON body: {}", detail);
                ("Invalid JSON", "Request body is not valid JSON".to_string())
            }
            AppError::Validation(e) => {
                tracing::warn!("Rejected quotation: {}", e);
                ("Validation failed", e.to_string())
            }
            AppError::PayloadTooLarge => {
                tracing::warn!("Rejected oversized request body");
                (
                    "Payload too large",
                    "Request body exceeds the configured size limit".to_string(),
                )
            }
            AppError::RateLimited { wait_secs } => {
                tracing::warn!("Rate limit exceeded, retry in {}s", wait_secs);
                (
                    "Too many requests",
                    format!("Rate limit exceeded, retry in {}s", wait_secs),
                )
            }
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                (
                    "External service error",
                    "An upstream service failed to respond correctly".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    "Internal server error",
                    "An unexpected error occurred while processing the request".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (self.status_code(), body).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedJson(err.to_string())
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        AppError::InternalError(format!("Template rendering failed: {:?}", err))
    }
}
