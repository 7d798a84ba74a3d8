use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::session_middleware;
use crate::services::upload::MAX_IMAGE_SIZE;
use axum::{extract::DefaultBodyLimit, middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

/// Room for multipart framing around a maximum-size image.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_SIZE + 64 * 1024;

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

fn api_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let public_read = public_read_routes(&rate_limit_config);
    let write = write_routes(&rate_limit_config);

    public_read
        .merge(write)
        .layer(middleware::from_fn(session_middleware))
}

/// Feed reads: listing, single post, comments, stats.
fn public_read_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/posts", routing::get(handlers::post::list_posts))
        .route("/posts/{id}", routing::get(handlers::post::get_post))
        .route(
            "/posts/{id}/comments",
            routing::get(handlers::comment::list_comments),
        )
        .route("/stats", routing::get(handlers::stats::get_stats));

    with_optional_rate_limit(router, config.enabled, config.public_read)
}

/// Writes scoped by the viewer session. None of them authenticate.
fn write_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/posts", routing::post(handlers::post::create_post))
        .route(
            "/posts/{id}/upvote",
            routing::put(handlers::upvote::set_upvote),
        )
        .route(
            "/posts/{id}/comments",
            routing::post(handlers::comment::create_comment),
        )
        .route(
            "/posts/{id}/reports",
            routing::post(handlers::report::create_report),
        )
        .route(
            "/upload/image",
            routing::post(handlers::upload::upload_image)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        );

    with_optional_rate_limit(router, config.enabled, config.write)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    match GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
    {
        Some(governor_conf) => router.layer(GovernorLayer::new(governor_conf)),
        None => {
            tracing::warn!(?rule, "Invalid rate limit rule, route group left unlimited");
            router
        }
    }
}
