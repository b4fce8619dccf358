//! Type-safe error codes for API responses.
//!
//! Each code carries a string identifier for clients (`"NOT_FOUND"`), an
//! integer for logs and dashboards (`1004`) and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Request validation failed");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// Invalid UUID format in path or query parameter
    InvalidUuid,

    /// Request body could not be read as JSON of the expected shape
    InvalidJson,

    /// Requested resource was not found
    NotFound,

    /// Authentication credentials are missing or invalid
    Unauthorized,

    /// Authenticated caller does not own the resource
    Forbidden,

    /// Malformed request that is not a field validation failure
    BadRequest,

    // Server errors (5000-5999)
    /// An unexpected internal server error occurred
    InternalError,

    /// A feature or dependency is temporarily unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Machine-readable identifier sent to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InvalidUuid => "INVALID_UUID",
            ErrorCode::InvalidJson => "INVALID_JSON",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    /// Integer code for logging and monitoring.
    pub fn code(&self) -> i32 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidUuid => 1002,
            ErrorCode::InvalidJson => 1003,
            ErrorCode::NotFound => 1004,
            ErrorCode::Unauthorized => 1006,
            ErrorCode::Forbidden => 1007,
            ErrorCode::BadRequest => 1010,
            ErrorCode::InternalError => 5001,
            ErrorCode::ServiceUnavailable => 5003,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "Request validation failed",
            ErrorCode::InvalidUuid => "Invalid UUID format",
            ErrorCode::InvalidJson => "Invalid JSON body",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::Unauthorized => "Unauthorized",
            ErrorCode::Forbidden => "Forbidden",
            ErrorCode::BadRequest => "Bad request",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ServiceUnavailable => "Service is temporarily unavailable",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
