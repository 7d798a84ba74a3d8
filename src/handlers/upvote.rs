use crate::error::{AppError, AppResult};
use crate::middleware::ViewerSession;
use crate::response::ApiResponse;
use crate::services::upvote::UpvoteService;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct SetUpvoteRequest {
    /// Desired state of this session's upvote
    pub upvoted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpvoteResponse {
    pub upvoted: bool,
    /// Authoritative count after the write
    pub upvote_count: u64,
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}/upvote",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = SetUpvoteRequest,
    responses(
        (status = 200, description = "Upvote state applied", body = UpvoteResponse),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "upvotes"
)]
pub async fn set_upvote(
    Extension(db): Extension<DatabaseConnection>,
    session: ViewerSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetUpvoteRequest>,
) -> AppResult<impl IntoResponse> {
    let state = UpvoteService::new(db)
        .set_upvote(id, session.id(), payload.upvoted)
        .await?;

    Ok(ApiResponse::ok(UpvoteResponse {
        upvoted: state.upvoted,
        upvote_count: state.upvote_count,
    }))
}
