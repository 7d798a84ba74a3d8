use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Road Report API", description = "Community road-issue reports"),
    paths(
        crate::handlers::health::health_check,
        // Posts
        crate::handlers::post::list_posts,
        crate::handlers::post::get_post,
        crate::handlers::post::create_post,
        // Engagement
        crate::handlers::upvote::set_upvote,
        crate::handlers::comment::list_comments,
        crate::handlers::comment::create_comment,
        crate::handlers::report::create_report,
        // Media
        crate::handlers::upload::upload_image,
        // Stats
        crate::handlers::stats::get_stats,
    ),
    components(
        schemas(
            crate::response::ApiResponse<serde_json::Value>,
            crate::response::PaginatedResponse<serde_json::Value>,
            crate::error::AppError,
            crate::models::Severity,
            crate::handlers::post::PostResponse,
            crate::handlers::post::CreatePostRequest,
            crate::handlers::post::FeedQuery,
            crate::handlers::upvote::SetUpvoteRequest,
            crate::handlers::upvote::UpvoteResponse,
            crate::handlers::comment::CommentResponse,
            crate::handlers::comment::CreateCommentRequest,
            crate::handlers::report::CreateReportRequest,
            crate::handlers::report::ReportResponse,
            crate::handlers::upload::UploadResponse,
            crate::handlers::stats::StatsResponse,
        )
    ),
    tags(
        (name = "health", description = "Service status"),
        (name = "posts", description = "Road issue posts and the feed"),
        (name = "upvotes", description = "Per-session upvotes"),
        (name = "comments", description = "Post comments"),
        (name = "reports", description = "Flag a post for moderation"),
        (name = "uploads", description = "Photo uploads"),
        (name = "stats", description = "Community statistics"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/",
            "/api/v1/posts",
            "/api/v1/posts/{id}",
            "/api/v1/posts/{id}/upvote",
            "/api/v1/posts/{id}/comments",
            "/api/v1/posts/{id}/reports",
            "/api/v1/upload/image",
            "/api/v1/stats",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }
    }
}
