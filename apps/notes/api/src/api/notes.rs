use axum::Router;
use domain_notes::{NoteService, PgNoteRepository, handlers};

pub fn service(state: &crate::state::AppState) -> NoteService<PgNoteRepository> {
    let repository = PgNoteRepository::new(state.db.clone());
    let service = NoteService::new(repository);

    match &state.index {
        Some(index) => service.with_index(index.clone()),
        None => service,
    }
}

pub fn router(state: &crate::state::AppState) -> Router {
    handlers::router(service(state), state.jwt_auth.clone())
}
