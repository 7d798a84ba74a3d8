use crate::error::{AppError, AppResult};
use crate::middleware::ViewerSession;
use crate::models::{PostModel, Severity};
use crate::response::{resolve_pagination, ApiResponse, PaginatedResponse};
use crate::services::cache::CacheService;
use crate::services::engagement::{Engagement, EngagementService};
use crate::services::feed_filter::{build_predicates, FeedFilters};
use crate::services::post::{NewPost, PostService};
use crate::services::stats::StatsService;
use crate::utils::external_map_url;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Fields of the post creation form. Every field is optional on the wire so a
/// missing one is reported as a validation error rather than a decode failure.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CreatePostRequest {
    /// Reporter display name
    #[validate(length(max = 100))]
    pub name: String,
    /// Reporter email, never shown publicly
    #[validate(length(max = 255))]
    pub email: Option<String>,
    /// Short headline for the issue
    #[validate(length(max = 200))]
    pub title: String,
    pub description: Option<String>,
    /// One of high, medium, low
    pub severity: Option<String>,
    #[validate(length(max = 100))]
    pub state: String,
    #[validate(length(max = 100))]
    pub city: String,
    /// Decimal degrees
    pub latitude: Option<f64>,
    /// Decimal degrees
    pub longitude: Option<f64>,
    /// URL returned by the image upload endpoint
    #[validate(length(max = 2048))]
    pub photo_url: String,
    #[validate(length(max = 2048))]
    pub video_url: Option<String>,
}

impl CreatePostRequest {
    fn into_new_post(self) -> AppResult<NewPost> {
        let severity = match self.severity.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(AppError::Validation("Severity is required".to_string()))
            }
            Some(raw) => raw.parse::<Severity>().map_err(AppError::Validation)?,
        };
        let latitude = self
            .latitude
            .ok_or_else(|| AppError::Validation("Latitude is required".to_string()))?;
        let longitude = self
            .longitude
            .ok_or_else(|| AppError::Validation("Longitude is required".to_string()))?;

        Ok(NewPost {
            name: self.name,
            email: self.email,
            title: self.title,
            description: self.description,
            severity,
            state: self.state,
            city: self.city,
            latitude,
            longitude,
            photo_url: self.photo_url,
            video_url: self.video_url,
        })
    }
}

/// A post as rendered on a feed card, with read-time engagement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: Uuid,
    /// Reporter display name
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub state: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_url: String,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub upvote_count: u64,
    pub comment_count: u64,
    /// Whether the requesting session has upvoted this post
    pub viewer_has_upvoted: bool,
    /// Link to the coordinates on an external map
    pub map_url: String,
}

impl PostResponse {
    pub fn new(p: PostModel, engagement: Engagement) -> Self {
        Self {
            map_url: external_map_url(p.latitude, p.longitude),
            id: p.id,
            name: p.name,
            title: p.title,
            description: p.description,
            severity: p.severity,
            state: p.state,
            city: p.city,
            latitude: p.latitude,
            longitude: p.longitude,
            photo_url: p.photo_url,
            video_url: p.video_url,
            created_at: p.created_at.and_utc(),
            upvote_count: engagement.upvote_count,
            comment_count: engagement.comment_count,
            viewer_has_upvoted: engagement.viewer_has_upvoted,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct FeedQuery {
    /// Free-text search over title and description
    pub q: Option<String>,
    /// high, medium, low, or all
    pub severity: Option<String>,
    /// Substring of city or state
    pub location: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

fn parse_severity_filter(raw: Option<&str>) -> AppResult<Option<Severity>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(AppError::Validation),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(FeedQuery),
    responses(
        (status = 200, description = "Feed page, newest first", body = PaginatedResponse<PostResponse>),
        (status = 400, description = "Unknown severity", body = AppError),
    ),
    tag = "posts"
)]
pub async fn list_posts(
    Extension(db): Extension<DatabaseConnection>,
    session: ViewerSession,
    Query(params): Query<FeedQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, per_page) = resolve_pagination(params.page, params.per_page);
    let filters = FeedFilters {
        severity: parse_severity_filter(params.severity.as_deref())?,
        location: params.location,
    };
    let predicates = build_predicates(&filters, params.q.as_deref());

    let (posts, total) = PostService::new(db.clone())
        .list(&predicates, page, per_page)
        .await?;

    let items: Vec<PostResponse> = EngagementService::new(db)
        .enrich(posts, Some(session.id()))
        .await
        .into_iter()
        .map(|(post, engagement)| PostResponse::new(post, engagement))
        .collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post details", body = PostResponse),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn get_post(
    Extension(db): Extension<DatabaseConnection>,
    session: ViewerSession,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let post = PostService::new(db.clone()).get_by_id(id).await?;
    let (post, engagement) = EngagementService::new(db)
        .enrich_one(post, Some(session.id()))
        .await;

    Ok(ApiResponse::ok(PostResponse::new(post, engagement)))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Validation error", body = AppError),
    ),
    tag = "posts"
)]
pub async fn create_post(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
    Json(payload): Json<CreatePostRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let post = PostService::new(db.clone())
        .create(payload.into_new_post()?)
        .await?;

    if let Some(Extension(cache)) = cache {
        StatsService::new(db).with_cache(cache).invalidate().await;
    }

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            PostResponse::new(post, Engagement::default()),
            "Your report has been posted",
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_request() -> CreatePostRequest {
        CreatePostRequest {
            name: "Jane".to_string(),
            title: "Pothole on Main St".to_string(),
            severity: Some("high".to_string()),
            state: "CA".to_string(),
            city: "Springfield".to_string(),
            latitude: Some(37.12),
            longitude: Some(-122.45),
            photo_url: "/uploads/post-photos/1-a.jpg".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn missing_severity_is_a_validation_error() {
        let mut req = complete_request();
        req.severity = None;
        match req.into_new_post() {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Severity is required"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_severity_is_rejected() {
        let mut req = complete_request();
        req.severity = Some("urgent".to_string());
        assert!(matches!(req.into_new_post(), Err(AppError::Validation(_))));
    }

    #[test]
    fn complete_request_converts() {
        let post = complete_request().into_new_post().unwrap();
        assert_eq!(post.severity, Severity::High);
        assert_eq!(post.latitude, 37.12);
    }

    #[test]
    fn severity_filter_accepts_all_and_blank() {
        assert_eq!(parse_severity_filter(None).unwrap(), None);
        assert_eq!(parse_severity_filter(Some(" ")).unwrap(), None);
        assert_eq!(parse_severity_filter(Some("ALL")).unwrap(), None);
        assert_eq!(
            parse_severity_filter(Some("Medium")).unwrap(),
            Some(Severity::Medium)
        );
        assert!(parse_severity_filter(Some("severe")).is_err());
    }
}
