use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{NoteError, NoteResult},
    models::{NewNote, Note, NoteChanges},
    repository::NoteRepository,
};

/// Postgres-backed NoteRepository
#[derive(Clone)]
pub struct PgNoteRepository {
    db: DatabaseConnection,
}

impl PgNoteRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn create(&self, input: NewNote) -> NoteResult<Note> {
        // Timestamps come from column defaults
        let active_model = entity::ActiveModel {
            id: Set(Uuid::now_v7()),
            title: Set(input.title),
            content: Set(input.content),
            user_id: Set(input.user_id),
            needs_reindex: Set(false),
            created_at: NotSet,
            updated_at: NotSet,
        };

        let model = active_model.insert(&self.db).await?;

        tracing::info!(note_id = %model.id, "Created note");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> NoteResult<Option<Note>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list_by_owner(&self, user_id: &str) -> NoteResult<Vec<Note>> {
        let models = entity::Entity::find()
            .filter(entity::Column::UserId.eq(user_id))
            .order_by_desc(entity::Column::CreatedAt)
            .order_by_desc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_by_ids(&self, user_id: &str, ids: Vec<Uuid>) -> NoteResult<Vec<Note>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = entity::Entity::find()
            .filter(entity::Column::UserId.eq(user_id))
            .filter(entity::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, changes: NoteChanges) -> NoteResult<Note> {
        // updated_at is maintained by the notes_touch_updated_at trigger
        let active_model = entity::ActiveModel {
            id: Set(id),
            title: Set(changes.title),
            content: Set(changes.content),
            ..Default::default()
        };

        match active_model.update(&self.db).await {
            Ok(model) => {
                tracing::info!(note_id = %id, "Updated note");
                Ok(model.into())
            }
            Err(DbErr::RecordNotUpdated) => Err(NoteError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: Uuid) -> NoteResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(note_id = %id, "Deleted note");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn restore(&self, note: Note) -> NoteResult<()> {
        let id = note.id;
        let active_model = entity::ActiveModel {
            id: Set(note.id),
            title: Set(note.title),
            content: Set(note.content),
            user_id: Set(note.user_id),
            needs_reindex: Set(false),
            created_at: Set(note.created_at.into()),
            updated_at: Set(note.updated_at.into()),
        };

        entity::Entity::insert(active_model)
            .exec_without_returning(&self.db)
            .await?;

        tracing::info!(note_id = %id, "Restored note");
        Ok(())
    }

    async fn set_needs_reindex(&self, id: Uuid, needs_reindex: bool) -> NoteResult<()> {
        entity::Entity::update_many()
            .col_expr(entity::Column::NeedsReindex, Expr::value(needs_reindex))
            .filter(entity::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        tracing::debug!(note_id = %id, needs_reindex, "Set reindex flag");
        Ok(())
    }

    async fn list_needs_reindex(&self, limit: u64) -> NoteResult<Vec<Note>> {
        let models = entity::Entity::find()
            .filter(entity::Column::NeedsReindex.eq(true))
            .order_by_asc(entity::Column::UpdatedAt)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
