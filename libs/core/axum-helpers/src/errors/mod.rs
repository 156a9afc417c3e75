pub mod handlers;
pub mod responses;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Error as UuidError;
use validator::ValidationErrors;

/// Standard error response envelope.
///
/// Returned for every error, carrying:
/// - `status`: the HTTP status code, repeated in the body
/// - `error`: machine-readable identifier (e.g. "NOT_FOUND")
/// - `message`: human-readable error message
/// - `timestamp`: when the error was produced
/// - `path`: originating request path (attached by middleware)
/// - `details`: optional structured detail, e.g. validation field errors
///   or the underlying store error name/code. Not a stable contract.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            error: error.into(),
            message: message.into(),
            timestamp: Utc::now(),
            path: None,
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Application error type convertible to an HTTP response.
///
/// Mirrors the store/domain error taxonomy: validation problems map to
/// 400, missing resources to 404, id collisions and lost optimistic
/// writes to 409, store throttling to 429, store timeouts to 408 and an
/// unreachable store to 503.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("UUID error: {0}")]
    UuidError(#[from] UuidError),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Request Timeout: {0}")]
    RequestTimeout(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too Many Requests: {0}")]
    TooManyRequests(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::JsonExtractorRejection(_)
            | AppError::ValidationError(_)
            | AppError::UuidError(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RequestTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Machine-readable identifier for clients and log queries.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::JsonExtractorRejection(_) => "INVALID_JSON",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::UuidError(_) => "INVALID_UUID",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::RequestTimeout(_) => "TIMEOUT",
            AppError::Conflict(_) => "CONFLICT",
            AppError::TooManyRequests(_) => "RATE_LIMITED",
            AppError::InternalServerError(_) => "INTERNAL_ERROR",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::ValidationError(errors) => {
                let fields = errors
                    .field_errors()
                    .iter()
                    .map(|(field, errs)| {
                        let messages: Vec<serde_json::Value> = errs
                            .iter()
                            .map(|err| {
                                serde_json::json!({
                                    "code": err.code,
                                    "message": err.message,
                                })
                            })
                            .collect();
                        (field.to_string(), serde_json::json!(messages))
                    })
                    .collect::<serde_json::Map<_, _>>();
                Some(serde_json::Value::Object(fields))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let mut body = ErrorResponse::new(status, self.error_code(), self.to_string());
        body.details = self.details();

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::TooManyRequests("x".into()).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::ServiceUnavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::RequestTimeout("x".into()).status_code(),
            StatusCode::REQUEST_TIMEOUT
        );
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(AppError::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(AppError::Conflict("x".into()).error_code(), "CONFLICT");
        assert_eq!(
            AppError::InternalServerError("x".into()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_error_response_serializes_without_empty_fields() {
        let body = ErrorResponse::new(StatusCode::NOT_FOUND, "NOT_FOUND", "missing");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], 404);
        assert!(json.get("path").is_none());
        assert!(json.get("details").is_none());
    }
}
