use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum PostUpvotes {
    Table,
    Id,
    PostId,
    UserSession,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostUpvotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostUpvotes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostUpvotes::PostId).uuid().not_null())
                    .col(
                        ColumnDef::new(PostUpvotes::UserSession)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PostUpvotes::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_upvotes_post_id")
                            .from(PostUpvotes::Table, PostUpvotes::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One upvote per (post, session); lets the write be a single idempotent statement.
        manager
            .create_index(
                Index::create()
                    .name("idx_post_upvotes_unique")
                    .table(PostUpvotes::Table)
                    .col(PostUpvotes::PostId)
                    .col(PostUpvotes::UserSession)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostUpvotes::Table).to_owned())
            .await
    }
}
