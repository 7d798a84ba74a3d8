use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_posts_created
             ON posts (created_at DESC)",
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_posts_severity_created
             ON posts (severity, created_at DESC)",
        )
        .await?;

        db.execute_unprepared(
            "ALTER TABLE posts ADD CONSTRAINT chk_posts_severity
             CHECK (severity IN ('high', 'medium', 'low'))",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("ALTER TABLE posts DROP CONSTRAINT IF EXISTS chk_posts_severity")
            .await?;
        db.execute_unprepared("DROP INDEX IF EXISTS idx_posts_created")
            .await?;
        db.execute_unprepared("DROP INDEX IF EXISTS idx_posts_severity_created")
            .await?;

        Ok(())
    }
}
