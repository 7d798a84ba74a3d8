use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum PostReports {
    Table,
    Id,
    PostId,
    Reason,
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
                    .table(PostReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostReports::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostReports::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostReports::Reason).text().not_null())
                    .col(
                        ColumnDef::new(PostReports::UserSession)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PostReports::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_reports_post_id")
                            .from(PostReports::Table, PostReports::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_reports_post_id")
                    .table(PostReports::Table)
                    .col(PostReports::PostId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostReports::Table).to_owned())
            .await
    }
}
