//! Shared application state.
//!
//! Every client is built once in `main` and handed to the routers from here;
//! cloning only copies `Arc`s and pool handles.

use axum_helpers::JwtAuth;
use database::postgres::DatabaseConnection;
use domain_notes::SemanticNoteIndex;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: DatabaseConnection,
    pub jwt_auth: JwtAuth,
    /// Embedding provider plus vector index; `None` when semantic search is off
    pub index: Option<Arc<SemanticNoteIndex>>,
}
