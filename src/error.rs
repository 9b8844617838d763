use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error types with appropriate HTTP status codes.
///
/// # Synchronous vs Asynchronous Failures
///
/// Every variant here is raised synchronously to the immediate caller.
/// Broker delivery failures arrive later through the delivery report loop
/// and are only logged, never turned into an `AppError`.
///
/// - `ConfigRead` / `Config` / `Connection` - fatal at startup
/// - `Enqueue` / `Serialization` - a single send was not accepted
/// - `InvalidData` / `BadRequest` - the request body was rejected
/// - `PayloadTooLarge` - the body exceeded the configured size limit
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to read broker config: {0}")]
    ConfigRead(String),

    #[error("Failed to create Kafka producer: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to enqueue message: {0}")]
    Enqueue(String),

    #[error("Flush did not complete: {0}")]
    Flush(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body for API endpoints.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full error details server-side for debugging
        // but only expose sanitized messages to clients
        tracing::error!(error = %self, "Request failed");

        let (status, error_type, message) = match &self {
            AppError::InvalidData(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "invalid_data", "Invalid data")
            }
            AppError::PayloadTooLarge(_) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                "Request body too large",
            ),
            AppError::Enqueue(_) | AppError::Serialization(_) => {
                (StatusCode::BAD_REQUEST, "send_failed", "Failed to send")
            }

            // Startup-class errors should never reach a handler, but if they
            // do, don't leak broker addresses or file paths
            AppError::ConfigRead(_) | AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "config_error",
                "Service configuration error. Please contact support.",
            ),
            AppError::Connection(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "connection_failed",
                "Message broker is temporarily unavailable. Please try again later.",
            ),
            AppError::Flush(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred. Please contact support if the issue persists.",
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: message.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
