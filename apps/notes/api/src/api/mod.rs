use axum::Router;

pub mod health;
pub mod notes;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix is added by `create_router`.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new().nest("/notes", notes::router(state))
}

/// Router with the /ready endpoint, merged next to the stateless app router.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
