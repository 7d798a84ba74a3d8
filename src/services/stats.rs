use crate::{
    error::AppResult,
    models::{post, Post, Severity},
    services::cache::CacheService,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};

pub const CACHE_KEY_STATS: &str = "stats:community";
const CACHE_TTL_STATS: u64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityStats {
    pub total_posts: u64,
    pub this_week: u64,
    pub high_priority: u64,
    pub medium_priority: u64,
    pub low_priority: u64,
}

pub struct StatsService {
    db: DatabaseConnection,
    cache: Option<CacheService>,
}

impl StatsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, cache: None }
    }

    pub fn with_cache(mut self, cache: CacheService) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn community_stats(&self) -> AppResult<CommunityStats> {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get::<CommunityStats>(CACHE_KEY_STATS).await {
                return Ok(cached);
            }
        }

        let total_posts = Post::find().count(&self.db).await?;

        let week_ago = chrono::Utc::now().naive_utc() - chrono::Duration::days(7);
        let this_week = Post::find()
            .filter(post::Column::CreatedAt.gte(week_ago))
            .count(&self.db)
            .await?;

        let mut stats = CommunityStats {
            total_posts,
            this_week,
            ..Default::default()
        };
        for severity in Severity::ALL {
            let count = Post::find()
                .filter(post::Column::Severity.eq(severity))
                .count(&self.db)
                .await?;
            match severity {
                Severity::High => stats.high_priority = count,
                Severity::Medium => stats.medium_priority = count,
                Severity::Low => stats.low_priority = count,
            }
        }

        if let Some(cache) = &self.cache {
            cache.set(CACHE_KEY_STATS, &stats, CACHE_TTL_STATS).await;
        }

        Ok(stats)
    }

    /// Drop the cached summary after a write that changes it.
    pub async fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate(CACHE_KEY_STATS).await;
        }
    }
}
