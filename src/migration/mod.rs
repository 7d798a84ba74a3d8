use sea_orm_migration::prelude::*;

mod m20250601_000001_create_posts_table;
mod m20250601_000002_create_post_upvotes_table;
mod m20250601_000003_create_post_comments_table;
mod m20250601_000004_create_post_reports_table;
mod m20250601_000005_add_feed_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_posts_table::Migration),
            Box::new(m20250601_000002_create_post_upvotes_table::Migration),
            Box::new(m20250601_000003_create_post_comments_table::Migration),
            Box::new(m20250601_000004_create_post_reports_table::Migration),
            Box::new(m20250601_000005_add_feed_indexes::Migration),
        ]
    }
}
