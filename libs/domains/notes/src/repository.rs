use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{NoteError, NoteResult};
use crate::models::{NewNote, Note, NoteChanges};

/// Repository trait for Note persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note with a fresh id and store-assigned timestamps
    async fn create(&self, input: NewNote) -> NoteResult<Note>;

    async fn get_by_id(&self, id: Uuid) -> NoteResult<Option<Note>>;

    /// Notes of one owner, newest first
    async fn list_by_owner(&self, user_id: &str) -> NoteResult<Vec<Note>>;

    /// Notes of one owner among `ids`, in no particular order
    async fn list_by_ids(&self, user_id: &str, ids: Vec<Uuid>) -> NoteResult<Vec<Note>>;

    /// Replace title and content. Fails with `NotFound` when the row is gone.
    async fn update(&self, id: Uuid, changes: NoteChanges) -> NoteResult<Note>;

    /// Returns `false` when no row matched
    async fn delete(&self, id: Uuid) -> NoteResult<bool>;

    /// Re-insert a previously deleted note with its original id and timestamps
    async fn restore(&self, note: Note) -> NoteResult<()>;

    async fn set_needs_reindex(&self, id: Uuid, needs_reindex: bool) -> NoteResult<()>;

    /// Oldest flagged notes first
    async fn list_needs_reindex(&self, limit: u64) -> NoteResult<Vec<Note>>;
}

#[derive(Debug, Clone)]
struct StoredNote {
    note: Note,
    needs_reindex: bool,
}

/// In-memory implementation of NoteRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryNoteRepository {
    notes: Arc<RwLock<HashMap<Uuid, StoredNote>>>,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the note is flagged for reconciliation
    pub async fn needs_reindex(&self, id: Uuid) -> Option<bool> {
        self.notes.read().await.get(&id).map(|s| s.needs_reindex)
    }
}

#[async_trait]
impl NoteRepository for InMemoryNoteRepository {
    async fn create(&self, input: NewNote) -> NoteResult<Note> {
        let now = Utc::now();
        let note = Note {
            id: Uuid::now_v7(),
            title: input.title,
            content: input.content,
            user_id: input.user_id,
            created_at: now,
            updated_at: now,
        };

        self.notes.write().await.insert(
            note.id,
            StoredNote {
                note: note.clone(),
                needs_reindex: false,
            },
        );

        tracing::info!(note_id = %note.id, "Created note");
        Ok(note)
    }

    async fn get_by_id(&self, id: Uuid) -> NoteResult<Option<Note>> {
        let notes = self.notes.read().await;
        Ok(notes.get(&id).map(|s| s.note.clone()))
    }

    async fn list_by_owner(&self, user_id: &str) -> NoteResult<Vec<Note>> {
        let notes = self.notes.read().await;

        let mut result: Vec<Note> = notes
            .values()
            .filter(|s| s.note.user_id == user_id)
            .map(|s| s.note.clone())
            .collect();

        // Newest first; v7 ids break ties between equal timestamps
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(result)
    }

    async fn list_by_ids(&self, user_id: &str, ids: Vec<Uuid>) -> NoteResult<Vec<Note>> {
        let notes = self.notes.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| notes.get(id))
            .filter(|s| s.note.user_id == user_id)
            .map(|s| s.note.clone())
            .collect())
    }

    async fn update(&self, id: Uuid, changes: NoteChanges) -> NoteResult<Note> {
        let mut notes = self.notes.write().await;
        let stored = notes.get_mut(&id).ok_or(NoteError::NotFound(id))?;

        if stored.note.title != changes.title || stored.note.content != changes.content {
            stored.note.title = changes.title;
            stored.note.content = changes.content;
            stored.note.updated_at = Utc::now();
        }

        tracing::info!(note_id = %id, "Updated note");
        Ok(stored.note.clone())
    }

    async fn delete(&self, id: Uuid) -> NoteResult<bool> {
        let mut notes = self.notes.write().await;

        if notes.remove(&id).is_some() {
            tracing::info!(note_id = %id, "Deleted note");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn restore(&self, note: Note) -> NoteResult<()> {
        let mut notes = self.notes.write().await;
        tracing::info!(note_id = %note.id, "Restored note");
        notes.insert(
            note.id,
            StoredNote {
                note,
                needs_reindex: false,
            },
        );
        Ok(())
    }

    async fn set_needs_reindex(&self, id: Uuid, needs_reindex: bool) -> NoteResult<()> {
        let mut notes = self.notes.write().await;
        if let Some(stored) = notes.get_mut(&id) {
            stored.needs_reindex = needs_reindex;
        }
        Ok(())
    }

    async fn list_needs_reindex(&self, limit: u64) -> NoteResult<Vec<Note>> {
        let notes = self.notes.read().await;

        let mut result: Vec<Note> = notes
            .values()
            .filter(|s| s.needs_reindex)
            .map(|s| s.note.clone())
            .collect();

        result.sort_by(|a, b| a.updated_at.cmp(&b.updated_at));
        result.truncate(limit as usize);
        Ok(result)
    }
}
