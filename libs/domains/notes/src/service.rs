use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{NoteError, NoteResult};
use crate::index::NoteIndex;
use crate::models::{
    CreateNote, DeleteNote, NewNote, Note, NoteChanges, ScoredNote, SearchNotes, UpdateNote,
};
use crate::repository::NoteRepository;

/// Service layer for Note business logic.
///
/// Every mutation writes the row first and the index second. When the index
/// write fails the row write is compensated; when compensation fails too the
/// row is flagged `needs_reindex` for [`NoteService::reconcile_index`].
pub struct NoteService<R: NoteRepository> {
    repository: Arc<R>,
    index: Option<Arc<dyn NoteIndex>>,
}

impl<R: NoteRepository> NoteService<R> {
    /// Service without semantic search
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            index: None,
        }
    }

    pub fn with_index(mut self, index: Arc<dyn NoteIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn search_enabled(&self) -> bool {
        self.index.is_some()
    }

    pub async fn create_note(&self, user_id: &str, input: CreateNote) -> NoteResult<Note> {
        ensure_identity(user_id)?;
        input
            .validate()
            .map_err(|e| NoteError::Validation(e.to_string()))?;

        let note = self
            .repository
            .create(NewNote {
                title: input.title,
                content: input.content,
                user_id: user_id.to_string(),
            })
            .await?;

        let Some(index) = &self.index else {
            return Ok(note);
        };

        if let Err(err) = index.index(&note).await {
            tracing::error!(
                note_id = %note.id,
                error = %err,
                "Indexing new note failed, removing row"
            );

            if let Err(undo_err) = self.repository.delete(note.id).await {
                tracing::error!(
                    note_id = %note.id,
                    error = %undo_err,
                    "Could not remove unindexed note"
                );
                self.flag_for_reindex(note.id).await;
            }
            return Err(err);
        }

        Ok(note)
    }

    pub async fn get_note(&self, user_id: &str, id: Uuid) -> NoteResult<Note> {
        ensure_identity(user_id)?;
        self.owned_note(user_id, id).await
    }

    /// The caller's notes, newest first
    pub async fn list_notes(&self, user_id: &str) -> NoteResult<Vec<Note>> {
        ensure_identity(user_id)?;
        self.repository.list_by_owner(user_id).await
    }

    pub async fn update_note(&self, user_id: &str, input: UpdateNote) -> NoteResult<Note> {
        ensure_identity(user_id)?;
        input
            .validate()
            .map_err(|e| NoteError::Validation(e.to_string()))?;

        let previous = self.owned_note(user_id, input.id).await?;

        let changes = NoteChanges {
            title: input.title,
            content: input.content.or_else(|| previous.content.clone()),
        };
        let updated = self.repository.update(previous.id, changes).await?;

        let Some(index) = &self.index else {
            return Ok(updated);
        };

        if let Err(err) = index.index(&updated).await {
            tracing::error!(
                note_id = %updated.id,
                error = %err,
                "Reindexing note failed, restoring previous content"
            );

            if let Err(undo_err) = self
                .repository
                .update(previous.id, NoteChanges::from(&previous))
                .await
            {
                tracing::error!(
                    note_id = %previous.id,
                    error = %undo_err,
                    "Could not restore note"
                );
                self.flag_for_reindex(previous.id).await;
            }
            return Err(err);
        }

        Ok(updated)
    }

    pub async fn delete_note(&self, user_id: &str, input: DeleteNote) -> NoteResult<()> {
        ensure_identity(user_id)?;

        let snapshot = self.owned_note(user_id, input.id).await?;

        if !self.repository.delete(snapshot.id).await? {
            return Err(NoteError::NotFound(snapshot.id));
        }

        let Some(index) = &self.index else {
            return Ok(());
        };

        if let Err(err) = index.remove(snapshot.id).await {
            tracing::error!(
                note_id = %snapshot.id,
                error = %err,
                "Removing note from index failed, restoring row"
            );

            let id = snapshot.id;
            if let Err(undo_err) = self.repository.restore(snapshot).await {
                // The point outlives the row; owner-scoped hydration never returns it
                tracing::error!(
                    note_id = %id,
                    error = %undo_err,
                    "Could not restore deleted note, index point orphaned"
                );
            }
            return Err(err);
        }

        Ok(())
    }

    /// Semantic search over the caller's notes, best match first
    pub async fn search_notes(
        &self,
        user_id: &str,
        params: SearchNotes,
    ) -> NoteResult<Vec<ScoredNote>> {
        ensure_identity(user_id)?;
        let index = self.index.as_ref().ok_or(NoteError::SearchUnavailable)?;

        params
            .validate()
            .map_err(|e| NoteError::Validation(e.to_string()))?;

        let hits = index.search(user_id, &params.query, params.limit).await?;
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let ids = hits.iter().map(|(id, _)| *id).collect();
        let mut notes: HashMap<Uuid, Note> = self
            .repository
            .list_by_ids(user_id, ids)
            .await?
            .into_iter()
            .map(|note| (note.id, note))
            .collect();

        Ok(hits
            .into_iter()
            .filter_map(|(id, score)| notes.remove(&id).map(|note| ScoredNote { note, score }))
            .collect())
    }

    /// Re-index up to `batch` flagged notes. Returns how many were repaired.
    pub async fn reconcile_index(&self, batch: u64) -> NoteResult<usize> {
        let Some(index) = &self.index else {
            return Ok(0);
        };

        let pending = self.repository.list_needs_reindex(batch).await?;
        let mut repaired = 0;

        for note in pending {
            match index.index(&note).await {
                Ok(()) => {
                    self.repository.set_needs_reindex(note.id, false).await?;
                    repaired += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        note_id = %note.id,
                        error = %err,
                        "Reconciliation failed, keeping flag"
                    );
                }
            }
        }

        Ok(repaired)
    }

    async fn owned_note(&self, user_id: &str, id: Uuid) -> NoteResult<Note> {
        let note = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(NoteError::NotFound(id))?;

        if !note.is_owned_by(user_id) {
            return Err(NoteError::Forbidden(id));
        }

        Ok(note)
    }

    async fn flag_for_reindex(&self, id: Uuid) {
        if let Err(err) = self.repository.set_needs_reindex(id, true).await {
            tracing::error!(note_id = %id, error = %err, "Could not flag note for reindex");
        }
    }
}

fn ensure_identity(user_id: &str) -> NoteResult<()> {
    if user_id.is_empty() {
        return Err(NoteError::Unauthorized);
    }
    Ok(())
}
