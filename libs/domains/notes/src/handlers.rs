use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, AuthUser, JwtAuth, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, ServiceUnavailableResponse,
        UnauthorizedResponse,
    },
    jwt_auth_middleware,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::{NoteError, NoteResult};
use crate::models::{
    CreateNote, DeleteNote, Note, NoteEnvelope, ScoredNote, SearchNotes, UpdateNote,
    UpdatedNoteEnvelope,
};
use crate::repository::NoteRepository;
use crate::service::NoteService;

pub const TAG: &str = "notes";

/// OpenAPI documentation for Notes API
#[derive(OpenApi)]
#[openapi(
    paths(list_notes, create_note, update_note, delete_note, get_note, search_notes),
    components(
        schemas(
            Note,
            CreateNote,
            UpdateNote,
            DeleteNote,
            NoteEnvelope,
            UpdatedNoteEnvelope,
            ScoredNote
        ),
        responses(
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Personal notes, scoped to the authenticated caller")
    )
)]
pub struct ApiDoc;

/// Create the notes router. Every route requires a bearer token.
pub fn router<R: NoteRepository + 'static>(service: NoteService<R>, auth: JwtAuth) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            "/",
            get(list_notes)
                .post(create_note)
                .put(update_note)
                .delete(delete_note),
        )
        .route("/search", get(search_notes))
        .route("/{id}", get(get_note))
        .route_layer(middleware::from_fn_with_state(auth, jwt_auth_middleware))
        .with_state(shared_service)
}

/// Audit event for a note mutation, successful or not
fn mutation_audit<T>(
    user: &AuthUser,
    action: &str,
    note_id: Option<Uuid>,
    result: &NoteResult<T>,
    headers: &HeaderMap,
) -> AuditEvent {
    let outcome = match result {
        Ok(_) => AuditOutcome::Success,
        Err(NoteError::Forbidden(_) | NoteError::Unauthorized) => AuditOutcome::Denied,
        Err(_) => AuditOutcome::Failure,
    };

    AuditEvent::new(
        Some(user.id().to_string()),
        action,
        note_id.map(|id| format!("note:{}", id)),
        outcome,
    )
    .with_request(headers)
}

/// List the caller's notes, newest first
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's notes", body = Vec<Note>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_notes<R: NoteRepository>(
    user: AuthUser,
    State(service): State<Arc<NoteService<R>>>,
) -> Result<Json<Vec<Note>>, AppError> {
    let notes = service.list_notes(user.id()).await?;
    Ok(Json(notes))
}

/// Create a note owned by the caller
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    security(("bearer_auth" = [])),
    request_body = CreateNote,
    responses(
        (status = 201, description = "Note created", body = NoteEnvelope),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_note<R: NoteRepository>(
    user: AuthUser,
    State(service): State<Arc<NoteService<R>>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateNote>,
) -> Result<impl IntoResponse, AppError> {
    let result = service.create_note(user.id(), input).await;
    let note_id = result.as_ref().ok().map(|note| note.id);

    mutation_audit(&user, "note.create", note_id, &result, &headers)
        .with_details(json!({ "indexed": service.search_enabled() }))
        .log();

    let note = result?;
    Ok((StatusCode::CREATED, Json(NoteEnvelope { note })))
}

/// Replace the title and, when given, the content of one of the caller's notes
#[utoipa::path(
    put,
    path = "",
    tag = TAG,
    security(("bearer_auth" = [])),
    request_body = UpdateNote,
    responses(
        (status = 200, description = "Note updated", body = UpdatedNoteEnvelope),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_note<R: NoteRepository>(
    user: AuthUser,
    State(service): State<Arc<NoteService<R>>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<UpdateNote>,
) -> Result<Json<UpdatedNoteEnvelope>, AppError> {
    let id = input.id;
    let result = service.update_note(user.id(), input).await;
    mutation_audit(&user, "note.update", Some(id), &result, &headers).log();

    let updated_note = result?;
    Ok(Json(UpdatedNoteEnvelope { updated_note }))
}

/// Delete one of the caller's notes
#[utoipa::path(
    delete,
    path = "",
    tag = TAG,
    security(("bearer_auth" = [])),
    request_body = DeleteNote,
    responses(
        (status = 204, description = "Note deleted"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_note<R: NoteRepository>(
    user: AuthUser,
    State(service): State<Arc<NoteService<R>>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<DeleteNote>,
) -> Result<StatusCode, AppError> {
    let id = input.id;
    let result = service.delete_note(user.id(), input).await;
    mutation_audit(&user, "note.delete", Some(id), &result, &headers).log();

    result?;
    Ok(StatusCode::NO_CONTENT)
}

/// Semantic search over the caller's notes
#[utoipa::path(
    get,
    path = "/search",
    tag = TAG,
    security(("bearer_auth" = [])),
    params(SearchNotes),
    responses(
        (status = 200, description = "Matching notes, best first", body = Vec<ScoredNote>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn search_notes<R: NoteRepository>(
    user: AuthUser,
    State(service): State<Arc<NoteService<R>>>,
    params: Result<Query<SearchNotes>, QueryRejection>,
) -> Result<Json<Vec<ScoredNote>>, AppError> {
    let Query(params) = params?;
    let results = service.search_notes(user.id(), params).await?;
    Ok(Json(results))
}

/// Get one of the caller's notes
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note found", body = Note),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_note<R: NoteRepository>(
    user: AuthUser,
    State(service): State<Arc<NoteService<R>>>,
    UuidPath(id): UuidPath,
) -> Result<Json<Note>, AppError> {
    let note = service.get_note(user.id(), id).await?;
    Ok(Json(note))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser("user_1".to_string())
    }

    #[test]
    fn test_failed_create_is_audited_without_resource() {
        let result: NoteResult<Note> = Err(NoteError::Internal("index unavailable".to_string()));

        let event = mutation_audit(&user(), "note.create", None, &result, &HeaderMap::new());

        assert_eq!(event.action, "note.create");
        assert_eq!(event.user_id.as_deref(), Some("user_1"));
        assert_eq!(event.resource, None);
        assert_eq!(event.outcome, AuditOutcome::Failure);
    }

    #[test]
    fn test_ownership_failure_is_audited_as_denied() {
        let id = Uuid::now_v7();
        let result: NoteResult<()> = Err(NoteError::Forbidden(id));

        let event = mutation_audit(&user(), "note.delete", Some(id), &result, &HeaderMap::new());

        assert_eq!(event.resource, Some(format!("note:{}", id)));
        assert_eq!(event.outcome, AuditOutcome::Denied);
    }

    #[test]
    fn test_successful_update_is_audited_with_client_ip() {
        let id = Uuid::now_v7();
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());

        let event = mutation_audit(&user(), "note.update", Some(id), &Ok(()), &headers);

        assert_eq!(event.outcome, AuditOutcome::Success);
        assert_eq!(event.ip_address.as_deref(), Some("203.0.113.7"));
    }
}
