pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Error as UuidError;
use validator::ValidationErrors;

/// Standard error response structure.
///
/// Returned for every error response:
///
/// ```json
/// {
///   "code": 1004,
///   "error": "NOT_FOUND",
///   "message": "Note not found"
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured error details (e.g., validation field errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Application error type that can be converted to HTTP responses.
///
/// Domain crates convert their own error enums into this type at the
/// handler boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Query extraction error: {0}")]
    QueryExtractorRejection(#[from] QueryRejection),

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

    /// The detail is logged, never sent to the client.
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JsonExtractorRejection(_)
            | AppError::QueryExtractorRejection(_)
            | AppError::ValidationError(_)
            | AppError::UuidError(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(
                    error_code = ErrorCode::InvalidJson.code(),
                    "JSON extraction error: {:?}",
                    e
                );
                ErrorResponse::new(ErrorCode::InvalidJson, e.body_text())
            }
            AppError::QueryExtractorRejection(e) => {
                tracing::warn!(
                    error_code = ErrorCode::BadRequest.code(),
                    "Query extraction error: {:?}",
                    e
                );
                ErrorResponse::new(ErrorCode::BadRequest, e.body_text())
            }
            AppError::ValidationError(e) => {
                tracing::info!(
                    error_code = ErrorCode::ValidationError.code(),
                    "Validation error: {:?}",
                    e
                );
                ErrorResponse::new(
                    ErrorCode::ValidationError,
                    ErrorCode::ValidationError.default_message(),
                )
                .with_details(validation_details(&e))
            }
            AppError::UuidError(e) => {
                tracing::warn!(
                    error_code = ErrorCode::InvalidUuid.code(),
                    "UUID error: {:?}",
                    e
                );
                ErrorResponse::new(
                    ErrorCode::InvalidUuid,
                    ErrorCode::InvalidUuid.default_message(),
                )
            }
            AppError::BadRequest(msg) => {
                tracing::info!("Bad request: {}", msg);
                ErrorResponse::new(ErrorCode::BadRequest, msg)
            }
            AppError::Unauthorized(msg) => {
                tracing::info!("Unauthorized: {}", msg);
                ErrorResponse::new(ErrorCode::Unauthorized, msg)
            }
            AppError::Forbidden(msg) => {
                tracing::info!("Forbidden: {}", msg);
                ErrorResponse::new(ErrorCode::Forbidden, msg)
            }
            AppError::NotFound(msg) => {
                tracing::info!(
                    error_code = ErrorCode::NotFound.code(),
                    "Not found: {}",
                    msg
                );
                ErrorResponse::new(ErrorCode::NotFound, msg)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(
                    error_code = ErrorCode::InternalError.code(),
                    "Internal server error: {}",
                    msg
                );
                ErrorResponse::new(
                    ErrorCode::InternalError,
                    ErrorCode::InternalError.default_message(),
                )
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                ErrorResponse::new(ErrorCode::ServiceUnavailable, msg)
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Flattens validator errors into `{field: [{code, message, params}]}`.
pub fn validation_details(errors: &ValidationErrors) -> serde_json::Value {
    let details = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<serde_json::Value> = errors
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), serde_json::Value::Array(messages))
        })
        .collect::<serde_json::Map<_, _>>();

    serde_json::Value::Object(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_renders_code_and_message() {
        let response = AppError::NotFound("Note not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["code"], 1004);
        assert_eq!(body["error"], "NOT_FOUND");
        assert_eq!(body["message"], "Note not found");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = AppError::InternalServerError("connection refused: 10.0.0.3".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert_eq!(body["message"], "Internal server error");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Unauthorized(String::new()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden(String::new()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::BadRequest(String::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ServiceUnavailable(String::new()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
