use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    Name,
    Email,
    Title,
    Description,
    Severity,
    State,
    City,
    Latitude,
    Longitude,
    PhotoUrl,
    VideoUrl,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Posts::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Posts::Email).string_len(255).null())
                    .col(ColumnDef::new(Posts::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Posts::Description).text().null())
                    .col(ColumnDef::new(Posts::Severity).string_len(10).not_null())
                    .col(ColumnDef::new(Posts::State).string_len(100).not_null())
                    .col(ColumnDef::new(Posts::City).string_len(100).not_null())
                    .col(ColumnDef::new(Posts::Latitude).double().not_null())
                    .col(ColumnDef::new(Posts::Longitude).double().not_null())
                    .col(ColumnDef::new(Posts::PhotoUrl).text().not_null())
                    .col(ColumnDef::new(Posts::VideoUrl).text().null())
                    .col(
                        ColumnDef::new(Posts::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Posts::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}
