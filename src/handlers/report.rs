use crate::error::{AppError, AppResult};
use crate::middleware::ViewerSession;
use crate::response::ApiResponse;
use crate::services::report::ReportService;
use axum::{extract::Path, http::StatusCode, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateReportRequest {
    /// Why the post should be reviewed
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponse {
    pub id: Uuid,
    pub post_id: Uuid,
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/reports",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report recorded", body = ReportResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "reports"
)]
pub async fn create_report(
    Extension(db): Extension<DatabaseConnection>,
    session: ViewerSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReportRequest>,
) -> AppResult<impl IntoResponse> {
    let report = ReportService::new(db)
        .create_report(id, session.id(), &payload.reason)
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            ReportResponse {
                id: report.id,
                post_id: report.post_id,
            },
            "Thanks, the post has been flagged for review",
        ),
    ))
}
