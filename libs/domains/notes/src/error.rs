use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_vector::VectorError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Missing caller identity")]
    Unauthorized,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Note {0} belongs to another user")]
    Forbidden(Uuid),

    #[error("Note not found: {0}")]
    NotFound(Uuid),

    #[error("Semantic search is disabled")]
    SearchUnavailable,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type NoteResult<T> = Result<T, NoteError>;

impl From<VectorError> for NoteError {
    fn from(err: VectorError) -> Self {
        NoteError::Internal(format!("Vector index error: {}", err))
    }
}

impl From<sea_orm::DbErr> for NoteError {
    fn from(err: sea_orm::DbErr) -> Self {
        NoteError::Internal(format!("Database error: {}", err))
    }
}

/// Convert NoteError to AppError for standardized error responses
impl From<NoteError> for AppError {
    fn from(err: NoteError) -> Self {
        match err {
            NoteError::Unauthorized => AppError::Unauthorized("Unauthorized".to_string()),
            NoteError::Validation(msg) => AppError::BadRequest(msg),
            NoteError::Forbidden(_) => AppError::Forbidden("Forbidden".to_string()),
            NoteError::NotFound(_) => AppError::NotFound("Note not found".to_string()),
            NoteError::SearchUnavailable => {
                AppError::ServiceUnavailable("Semantic search is disabled".to_string())
            }
            NoteError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for NoteError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let id = Uuid::now_v7();
        let cases = [
            (NoteError::Unauthorized, StatusCode::UNAUTHORIZED),
            (NoteError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (NoteError::Forbidden(id), StatusCode::FORBIDDEN),
            (NoteError::NotFound(id), StatusCode::NOT_FOUND),
            (
                NoteError::SearchUnavailable,
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                NoteError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_vector_errors_are_internal() {
        let err: NoteError = VectorError::Qdrant("unavailable".into()).into();
        assert!(matches!(err, NoteError::Internal(msg) if msg.contains("unavailable")));
    }
}
