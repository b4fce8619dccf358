use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notes::Table)
                    .if_not_exists()
                    .col(pk_uuid(Notes::Id))
                    .col(text(Notes::Title))
                    .col(text_null(Notes::Content))
                    .col(string(Notes::UserId))
                    .col(boolean(Notes::NeedsReindex).default(false))
                    .col(
                        timestamp_with_time_zone(Notes::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Notes::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing is always owner-scoped and newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_notes_user_id_created_at")
                    .table(Notes::Table)
                    .col(Notes::UserId)
                    .col(Notes::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_notes_needs_reindex ON notes (id) WHERE needs_reindex",
            )
            .await?;

        // Flag flips by reconciliation do not count as edits
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER notes_touch_updated_at
                    BEFORE UPDATE ON notes
                    FOR EACH ROW
                    WHEN (OLD.title IS DISTINCT FROM NEW.title
                          OR OLD.content IS DISTINCT FROM NEW.content)
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TRIGGER IF EXISTS notes_touch_updated_at ON notes")
            .await?;

        manager
            .drop_table(Table::drop().table(Notes::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Notes {
    Table,
    Id,
    Title,
    Content,
    UserId,
    NeedsReindex,
    CreatedAt,
    UpdatedAt,
}
