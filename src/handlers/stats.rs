use crate::error::AppResult;
use crate::response::ApiResponse;
use crate::services::cache::CacheService;
use crate::services::stats::{CommunityStats, StatsService};
use axum::{response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total_posts: u64,
    /// Posts created in the last 7 days
    pub this_week: u64,
    pub high_priority: u64,
    pub medium_priority: u64,
    pub low_priority: u64,
}

impl From<CommunityStats> for StatsResponse {
    fn from(s: CommunityStats) -> Self {
        Self {
            total_posts: s.total_posts,
            this_week: s.this_week,
            high_priority: s.high_priority,
            medium_priority: s.medium_priority,
            low_priority: s.low_priority,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses(
        (status = 200, description = "Community statistics", body = StatsResponse),
    ),
    tag = "stats"
)]
pub async fn get_stats(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
) -> AppResult<impl IntoResponse> {
    let mut service = StatsService::new(db);
    if let Some(Extension(cache)) = cache {
        service = service.with_cache(cache);
    }

    let stats = service.community_stats().await?;
    Ok(ApiResponse::ok(StatsResponse::from(stats)))
}
