//! Notes Domain
//!
//! Personal notes owned by the authenticated caller, kept in Postgres and
//! mirrored into a vector index for semantic search.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /api/notes endpoints, identity before validation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Ownership checks, row/index saga
//! └──┬───────┬──┘
//!    │       │
//! ┌──▼───┐ ┌─▼─────────┐
//! │ Repo │ │ NoteIndex │  ← Postgres rows / embeddings + Qdrant points
//! └──────┘ └───────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_notes::{handlers, InMemoryNoteRepository, NoteService};
//!
//! let repository = InMemoryNoteRepository::new();
//! let service = NoteService::new(repository);
//!
//! let auth = JwtAuth::new(&JwtConfig::new("a-secret-of-at-least-thirty-two-chars"));
//! let router = handlers::router(service, auth);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod index;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{NoteError, NoteResult};
pub use index::{NoteIndex, SemanticNoteIndex};
pub use models::{
    CreateNote, DeleteNote, NewNote, Note, NoteChanges, NoteEnvelope, ScoredNote, SearchNotes,
    UpdateNote, UpdatedNoteEnvelope,
};
pub use postgres::PgNoteRepository;
pub use repository::{InMemoryNoteRepository, NoteRepository};
pub use service::NoteService;
